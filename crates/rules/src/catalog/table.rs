//! Authored building blocks. Only main-clause entries are listed here;
//! their condition twins are derived when the catalog is built.

use chrono::Weekday;
use roster_core::Shift;

use crate::schema::{
    AmountDetails, BlockDefinition, BlockDetails, DependencyDetails, ExceptionOperator,
    GroupDetails, GroupMode, RepeatDetails, TimeframeDetails,
};

fn repeat(number: u32) -> BlockDetails {
    BlockDetails::Repeat(RepeatDetails { number })
}

fn timeframe(
    days: Option<Vec<Weekday>>,
    weeks: Option<Vec<u32>>,
    shifts: Option<Vec<Shift>>,
) -> BlockDetails {
    BlockDetails::Timeframe(TimeframeDetails { days, weeks, shifts })
}

fn amount(details: AmountDetails) -> BlockDetails {
    BlockDetails::Amount(details)
}

fn group(mode: GroupMode) -> BlockDetails {
    BlockDetails::Group(GroupDetails {
        roles: Vec::new(),
        mode,
    })
}

fn dependency() -> BlockDetails {
    BlockDetails::Dependency(DependencyDetails::default())
}

/// Every authored block, in declaration order.
pub(crate) fn authored_blocks() -> Vec<BlockDefinition> {
    use Weekday::*;

    vec![
        // ── Repeat ──
        BlockDefinition::new("W0", "", repeat(0)).as_default(),
        BlockDefinition::new("W1", "jeden", repeat(0)),
        BlockDefinition::new("W2", "nur", repeat(1)),
        BlockDefinition::new("W3", "mal pro", repeat(2)),
        // ── Timeframe ──
        BlockDefinition::new("T0", "", timeframe(None, None, None)).as_default(),
        BlockDefinition::new(
            "T1",
            "an Wochentagen",
            timeframe(Some(vec![Mon, Tue, Wed, Thu, Fri]), None, None),
        ),
        BlockDefinition::new("T2", "am Wochenende", timeframe(Some(vec![Sat, Sun]), None, None)),
        BlockDefinition::new("T3", "in Kalenderwoche", timeframe(None, Some(Vec::new()), None)),
        BlockDefinition::new("T4", "in der Schicht", timeframe(None, None, Some(vec![Shift::Full]))),
        // ── Amount ──
        BlockDefinition::new("A0", "ungefähr", amount(AmountDetails::at_most(1.0))),
        BlockDefinition::new("A1", "maximal", amount(AmountDetails::at_most(1.0))).as_default(),
        BlockDefinition::new("A2", "minimal", amount(AmountDetails::at_least(1.0))),
        BlockDefinition::new("A3", "genau", amount(AmountDetails::at_most(1.0))),
        BlockDefinition::new("A4", "zwischen", amount(AmountDetails::between(0.0, 1.0))),
        // ── Group ──
        BlockDefinition::new("G0", "", group(GroupMode::Any)).as_default(),
        BlockDefinition::new("G1", "alle aus", group(GroupMode::All)),
        BlockDefinition::new("G2", "einer aus", group(GroupMode::Any)),
        // ── Dependency ──
        BlockDefinition::new("D0", "", dependency()).as_default(),
        BlockDefinition::new("D1", "anwesend", dependency()),
        BlockDefinition::new("D2", "abwesend", dependency()),
        BlockDefinition::new("D3", "braucht", dependency()),
        BlockDefinition::new("D4", "hilft", dependency()),
        BlockDefinition::new("D5", "im Verhältnis", dependency()),
        // ── Exception ──
        BlockDefinition::exception("E0", "", ExceptionOperator::None, "").as_default(),
        BlockDefinition::exception(
            "E1",
            "und",
            ExceptionOperator::And,
            "maximal 3 Schichten pro Woche und nur in der Frühschicht",
        ),
        BlockDefinition::exception(
            "E2",
            "oder",
            ExceptionOperator::Or,
            "genau 2 Schichten am Wochenende oder ein ganzer Tag",
        ),
        BlockDefinition::exception(
            "E3",
            "aber",
            ExceptionOperator::But,
            "nicht am Montag, aber wenn eine Leitung anwesend ist",
        ),
        BlockDefinition::exception(
            "E4",
            "außer",
            ExceptionOperator::Except,
            "maximal 3 Schichten pro Woche, außer eine Leitung ist anwesend",
        ),
        BlockDefinition::exception(
            "E5",
            "höchstens",
            ExceptionOperator::LimitMax,
            "maximal 5 Schichten pro Woche, höchstens 40 Stunden",
        ),
        BlockDefinition::exception(
            "E6",
            "mindestens",
            ExceptionOperator::LimitMin,
            "maximal 5 Schichten pro Woche, mindestens 20 Stunden",
        ),
    ]
}
