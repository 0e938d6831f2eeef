//! Per-category predicates over a facts snapshot.
//!
//! Each predicate reads only the facts it needs; a missing one aborts
//! with a [`FactsError`] naming it rather than yielding `false`.

use chrono::Datelike;
use roster_core::{Facts, FactsError};

use crate::error::{ConfigError, EvalError};
use crate::schema::{
    AmountDetails, AmountKind, BlockCategory, BlockDefinition, BlockDetails, DependencyDetails,
    DependencyKind, GroupDetails, GroupMode, RepeatDetails, TimeframeDetails,
};

// ── Dispatcher ──────────────────────────────────────────────────────

/// Evaluate a single condition block.
pub(crate) fn evaluate_block(
    block: &BlockDefinition,
    facts: &Facts,
    tolerance_percent: f64,
) -> Result<bool, EvalError> {
    match &block.details {
        BlockDetails::Repeat(d) => evaluate_repeat(d, facts).map_err(EvalError::from),
        BlockDetails::Timeframe(d) => evaluate_timeframe(d, facts).map_err(EvalError::from),
        BlockDetails::Amount(d) => evaluate_amount(&block.id, d, facts, tolerance_percent),
        BlockDetails::Group(d) => evaluate_group(d, facts).map_err(EvalError::from),
        BlockDetails::Dependency(d) => evaluate_dependency(&block.id, d, facts),
        BlockDetails::Exception(_) => Err(ConfigError::NotACondition {
            id: block.id.clone(),
            category: BlockCategory::Exception,
        }
        .into()),
    }
}

// ── Repeat ──────────────────────────────────────────────────────────

/// The condition must recur exactly `number` times; 0 leaves it open.
pub(crate) fn evaluate_repeat(details: &RepeatDetails, facts: &Facts) -> Result<bool, FactsError> {
    if details.number == 0 {
        return Ok(true);
    }
    Ok(facts.require_occurrences()? == details.number)
}

// ── Timeframe ───────────────────────────────────────────────────────

/// The current date must fall on a configured weekday and ISO week, and the
/// current shift must be compatible with one of the configured shifts.
pub(crate) fn evaluate_timeframe(
    details: &TimeframeDetails,
    facts: &Facts,
) -> Result<bool, FactsError> {
    let days = non_empty(&details.days);
    let weeks = non_empty(&details.weeks);
    let shifts = non_empty(&details.shifts);

    if days.is_some() || weeks.is_some() {
        let date = facts.require_date()?;
        if let Some(days) = days {
            if !days.contains(&date.weekday()) {
                return Ok(false);
            }
        }
        if let Some(weeks) = weeks {
            if !weeks.contains(&date.iso_week().week()) {
                return Ok(false);
            }
        }
    }

    match (shifts, facts.shift) {
        (Some(shifts), Some(current)) => Ok(shifts.iter().any(|s| s.is_compatible_with(current))),
        // An unspecified shift is compatible with any configuration.
        _ => Ok(true),
    }
}

fn non_empty<T>(set: &Option<Vec<T>>) -> Option<&[T]> {
    set.as_deref().filter(|s| !s.is_empty())
}

// ── Amount ──────────────────────────────────────────────────────────

/// Inclusive range an amount block accepts.
pub(crate) fn amount_bounds(
    id: &str,
    details: &AmountDetails,
    tolerance_percent: f64,
) -> Result<(f64, f64), ConfigError> {
    let kind = AmountKind::from_id(id).ok_or_else(|| ConfigError::UnknownBlock {
        category: BlockCategory::Amount,
        id: id.to_string(),
    })?;
    let single = || {
        details.single_input().ok_or(ConfigError::MissingDetail {
            id: id.to_string(),
            field: "top",
        })
    };

    let bounds = match kind {
        AmountKind::Approximately => {
            let input = single()?;
            let margin = input.abs() * tolerance_percent / 100.0;
            (input - margin, input + margin)
        }
        AmountKind::AtMost => (0.0, single()?),
        AmountKind::AtLeast => (single()?, f64::INFINITY),
        AmountKind::Exactly => {
            let input = single()?;
            (input, input)
        }
        AmountKind::Between => {
            let bottom = details.bottom.ok_or(ConfigError::MissingDetail {
                id: id.to_string(),
                field: "bottom",
            })?;
            let top = details.top.ok_or(ConfigError::MissingDetail {
                id: id.to_string(),
                field: "top",
            })?;
            (bottom, top)
        }
    };
    Ok(bounds)
}

/// The measured value must lie within the block's inclusive range.
pub(crate) fn evaluate_amount(
    id: &str,
    details: &AmountDetails,
    facts: &Facts,
    tolerance_percent: f64,
) -> Result<bool, EvalError> {
    let (bottom, top) = amount_bounds(id, details, tolerance_percent)?;
    let value = facts.require_value()?;
    Ok(bottom <= value && value <= top)
}

// ── Group ───────────────────────────────────────────────────────────

/// Role presence test; an empty role list does not constrain.
pub(crate) fn evaluate_group(details: &GroupDetails, facts: &Facts) -> Result<bool, FactsError> {
    if details.roles.is_empty() {
        return Ok(true);
    }
    let present = facts.require_present_roles()?;
    let result = match details.mode {
        GroupMode::All => details.roles.iter().all(|r| present.contains(r)),
        GroupMode::Any => details.roles.iter().any(|r| present.contains(r)),
    };
    Ok(result)
}

// ── Dependency ──────────────────────────────────────────────────────

/// Compare role headcounts as selected by the block's kind.
pub(crate) fn evaluate_dependency(
    id: &str,
    details: &DependencyDetails,
    facts: &Facts,
) -> Result<bool, EvalError> {
    let kind = DependencyKind::from_id(id).ok_or_else(|| ConfigError::UnknownBlock {
        category: BlockCategory::Dependency,
        id: id.to_string(),
    })?;
    if kind == DependencyKind::Unconstrained {
        return Ok(true);
    }
    if details.roles.len() < kind.role_count() {
        return Err(ConfigError::MissingDetail {
            id: id.to_string(),
            field: "roles",
        }
        .into());
    }

    let count = |index: usize| -> Result<f64, FactsError> {
        Ok(f64::from(facts.role_count(&details.roles[index])?))
    };
    let [ratio1, ratio2] = details.ratio;

    let result = match kind {
        DependencyKind::Unconstrained => true,
        DependencyKind::Present => count(0)? > 0.0,
        DependencyKind::Absent => count(0)? == 0.0,
        DependencyKind::Needs => count(1)? >= ratio1 * count(0)?,
        // TODO: confirm with the scheduling team whether the right-hand side
        // should read role2; this compares role1 against itself.
        DependencyKind::Helps => {
            let role1 = count(0)?;
            role1 < ratio1 * role1
        }
        DependencyKind::Ratio => count(0)? * ratio1 < count(1)? * ratio2,
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};
    use roster_core::Shift;

    const TOLERANCE: f64 = 15.0;

    fn amount(id: &str, bottom: Option<f64>, top: Option<f64>, value: f64) -> Result<bool, EvalError> {
        evaluate_amount(
            id,
            &AmountDetails { bottom, top },
            &Facts::new().with_value(value),
            TOLERANCE,
        )
    }

    fn dependency(id: &str, roles: &[&str], ratio: [f64; 2], facts: &Facts) -> Result<bool, EvalError> {
        let details = DependencyDetails {
            roles: roles.iter().map(|r| r.to_string()).collect(),
            ratio,
        };
        evaluate_dependency(id, &details, facts)
    }

    // ── Amount ──────────────────────────────────────────────────────

    #[test]
    fn approximately_accepts_fifteen_percent_band() {
        for value in [85.0, 90.0, 100.0, 114.5, 115.0] {
            assert_eq!(amount("A0", None, Some(100.0), value), Ok(true), "{}", value);
        }
        assert_eq!(amount("A0", None, Some(100.0), 116.0), Ok(false));
        assert_eq!(amount("A0", None, Some(100.0), 84.0), Ok(false));
    }

    #[test]
    fn at_most_forces_zero_bottom() {
        assert_eq!(amount("A1", Some(2.0), Some(3.0), 0.0), Ok(true));
        assert_eq!(amount("A1", None, Some(3.0), 0.0), Ok(true));
        assert_eq!(amount("A1", None, Some(3.0), 3.0), Ok(true));
        assert_eq!(amount("A1", None, Some(3.0), 4.0), Ok(false));
    }

    #[test]
    fn at_least_has_no_ceiling() {
        assert_eq!(amount("A2", Some(2.0), None, 2.0), Ok(true));
        assert_eq!(amount("A2", Some(2.0), None, 1e9), Ok(true));
        assert_eq!(amount("A2", Some(2.0), None, 1.0), Ok(false));
    }

    #[test]
    fn exactly_matches_single_input() {
        assert_eq!(amount("A3", None, Some(2.0), 2.0), Ok(true));
        assert_eq!(amount("A3", None, Some(2.0), 3.0), Ok(false));
        assert_eq!(amount("a3", Some(4.0), None, 4.0), Ok(true));
    }

    #[test]
    fn between_uses_both_inputs_verbatim() {
        assert_eq!(amount("A4", Some(2.0), Some(4.0), 2.0), Ok(true));
        assert_eq!(amount("A4", Some(2.0), Some(4.0), 4.0), Ok(true));
        assert_eq!(amount("A4", Some(2.0), Some(4.0), 4.5), Ok(false));
        assert_eq!(
            amount("A4", None, Some(4.0), 3.0),
            Err(EvalError::Config(ConfigError::MissingDetail {
                id: "A4".to_string(),
                field: "bottom"
            }))
        );
    }

    #[test]
    fn amount_without_value_names_the_missing_fact() {
        let result = evaluate_amount("A1", &AmountDetails::at_most(3.0), &Facts::new(), TOLERANCE);
        assert_eq!(result, Err(EvalError::Facts(FactsError::missing("value"))));
    }

    // ── Timeframe ───────────────────────────────────────────────────

    #[test]
    fn timeframe_matches_weekday_and_week() {
        // 2024-03-11 is a Monday in ISO week 11.
        let monday = Facts::new().with_date(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        let weekdays = TimeframeDetails {
            days: Some(vec![Weekday::Mon, Weekday::Tue]),
            weeks: Some(vec![11, 12]),
            shifts: None,
        };
        assert_eq!(evaluate_timeframe(&weekdays, &monday), Ok(true));

        let weekend = TimeframeDetails {
            days: Some(vec![Weekday::Sat, Weekday::Sun]),
            ..TimeframeDetails::default()
        };
        assert_eq!(evaluate_timeframe(&weekend, &monday), Ok(false));

        let other_week = TimeframeDetails {
            weeks: Some(vec![20]),
            ..TimeframeDetails::default()
        };
        assert_eq!(evaluate_timeframe(&other_week, &monday), Ok(false));
    }

    #[test]
    fn timeframe_shift_compatibility() {
        let morning_only = TimeframeDetails {
            shifts: Some(vec![Shift::Morning]),
            ..TimeframeDetails::default()
        };
        let full = TimeframeDetails {
            shifts: Some(vec![Shift::Full]),
            ..TimeframeDetails::default()
        };

        let afternoon = Facts::new().with_shift(Shift::Afternoon);
        assert_eq!(evaluate_timeframe(&morning_only, &afternoon), Ok(false));
        assert_eq!(evaluate_timeframe(&full, &afternoon), Ok(true));
        assert_eq!(
            evaluate_timeframe(&morning_only, &Facts::new().with_shift(Shift::Full)),
            Ok(true)
        );
        assert_eq!(evaluate_timeframe(&morning_only, &Facts::new()), Ok(true));
    }

    #[test]
    fn unconstrained_timeframe_needs_no_date() {
        let open = TimeframeDetails {
            weeks: Some(Vec::new()),
            ..TimeframeDetails::default()
        };
        assert_eq!(evaluate_timeframe(&open, &Facts::new()), Ok(true));

        let days = TimeframeDetails {
            days: Some(vec![Weekday::Mon]),
            ..TimeframeDetails::default()
        };
        assert_eq!(
            evaluate_timeframe(&days, &Facts::new()),
            Err(FactsError::missing("current_date"))
        );
    }

    // ── Group ───────────────────────────────────────────────────────

    #[test]
    fn group_all_versus_any() {
        let facts = Facts::new().with_roles(["nurse", "lead"]);
        let all = GroupDetails {
            roles: vec!["nurse".into(), "doctor".into()],
            mode: GroupMode::All,
        };
        let any = GroupDetails {
            mode: GroupMode::Any,
            ..all.clone()
        };
        assert_eq!(evaluate_group(&all, &facts), Ok(false));
        assert_eq!(evaluate_group(&any, &facts), Ok(true));
        assert_eq!(
            evaluate_group(&any, &Facts::new()),
            Err(FactsError::missing("present_roles"))
        );
        assert_eq!(evaluate_group(&GroupDetails::default(), &Facts::new()), Ok(true));
    }

    // ── Dependency ──────────────────────────────────────────────────

    #[test]
    fn present_and_absent() {
        let facts = Facts::new().with_role_count("lead", 1).with_role_count("nurse", 0);
        assert_eq!(dependency("D1", &["lead"], [1.0, 1.0], &facts), Ok(true));
        assert_eq!(dependency("D1", &["nurse"], [1.0, 1.0], &facts), Ok(false));
        assert_eq!(dependency("D2", &["nurse"], [1.0, 1.0], &facts), Ok(true));
        assert_eq!(dependency("D2", &["trainee"], [1.0, 1.0], &facts), Ok(true));
    }

    #[test]
    fn needs_scales_role1_by_ratio() {
        let facts = Facts::new().with_role_count("trainee", 2).with_role_count("nurse", 4);
        assert_eq!(dependency("D3", &["trainee", "nurse"], [2.0, 1.0], &facts), Ok(true));
        assert_eq!(dependency("D3", &["trainee", "nurse"], [3.0, 1.0], &facts), Ok(false));
    }

    #[test]
    fn helps_compares_role1_with_itself() {
        let facts = Facts::new().with_role_count("trainee", 2).with_role_count("nurse", 50);
        assert_eq!(dependency("D4", &["trainee"], [2.0, 1.0], &facts), Ok(true));
        assert_eq!(dependency("D4", &["trainee", "nurse"], [0.5, 1.0], &facts), Ok(false));
    }

    #[test]
    fn ratio_compares_weighted_counts() {
        let first = Facts::new().with_role_count("a", 2).with_role_count("b", 5);
        assert_eq!(dependency("D5", &["a", "b"], [3.0, 1.0], &first), Ok(false));

        let second = Facts::new().with_role_count("a", 1).with_role_count("b", 10);
        assert_eq!(dependency("D5", &["a", "b"], [2.0, 1.0], &second), Ok(true));
    }

    #[test]
    fn dependency_errors_are_specific() {
        let facts = Facts::new().with_role_count("a", 1);
        assert_eq!(
            dependency("D5", &["a"], [1.0, 1.0], &facts),
            Err(EvalError::Config(ConfigError::MissingDetail {
                id: "D5".to_string(),
                field: "roles"
            }))
        );
        assert_eq!(
            dependency("D1", &["a"], [1.0, 1.0], &Facts::new()),
            Err(EvalError::Facts(FactsError::missing("role_counts")))
        );
        assert_eq!(dependency("D0", &[], [1.0, 1.0], &Facts::new()), Ok(true));
    }

    // ── Repeat ──────────────────────────────────────────────────────

    #[test]
    fn repeat_counts_occurrences() {
        let open = RepeatDetails { number: 0 };
        let twice = RepeatDetails { number: 2 };
        assert_eq!(evaluate_repeat(&open, &Facts::new()), Ok(true));
        assert_eq!(evaluate_repeat(&twice, &Facts::new().with_occurrences(2)), Ok(true));
        assert_eq!(evaluate_repeat(&twice, &Facts::new().with_occurrences(3)), Ok(false));
        assert_eq!(
            evaluate_repeat(&twice, &Facts::new()),
            Err(FactsError::missing("occurrences"))
        );
    }
}
