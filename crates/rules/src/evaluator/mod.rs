//! Rule evaluation against a facts snapshot.
//!
//! A clause holds when all five of its condition predicates hold. The
//! main and secondary verdicts are then merged by the rule's exception
//! operator ([`combine`]). Evaluation is pure: rules and facts are only
//! read, so batches are spread over the rayon pool without locking.

mod combine;
mod predicates;

use std::collections::BTreeMap;

use rayon::prelude::*;
use roster_core::config::{
    EvaluationConfig, DEFAULT_APPROX_TOLERANCE_PERCENT, DEFAULT_PARALLEL_THRESHOLD,
};
use roster_core::Facts;
use serde::Serialize;
use tracing::warn;

use crate::error::EvalError;
use crate::schema::{BlockDefinition, Rule};

pub use combine::combine;

use combine::limit_holds;
use predicates::evaluate_block;

// ── Verdict ─────────────────────────────────────────────────────────

/// Outcome of one rule, as reported to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Satisfied,
    Violated,
    /// A required fact was missing; the rule could not be decided.
    Unknown { field: String },
    /// The rule itself is misconfigured.
    Invalid { reason: String },
}

impl Verdict {
    pub fn is_decided(&self) -> bool {
        matches!(self, Verdict::Satisfied | Verdict::Violated)
    }
}

impl From<Result<bool, EvalError>> for Verdict {
    fn from(result: Result<bool, EvalError>) -> Self {
        match result {
            Ok(true) => Verdict::Satisfied,
            Ok(false) => Verdict::Violated,
            Err(EvalError::Facts(e)) => Verdict::Unknown {
                field: e.field.to_string(),
            },
            Err(EvalError::Config(e)) => Verdict::Invalid {
                reason: e.to_string(),
            },
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Satisfied => write!(f, "satisfied"),
            Verdict::Violated => write!(f, "violated"),
            Verdict::Unknown { field } => write!(f, "unknown (missing `{}`)", field),
            Verdict::Invalid { reason } => write!(f, "invalid ({})", reason),
        }
    }
}

// ── Rule evaluator ──────────────────────────────────────────────────

/// Evaluates rules built by the [`crate::RuleFactory`].
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluator {
    /// Half-width of the "ungefähr" band, in percent of the input.
    pub approx_tolerance_percent: f64,
    /// Batches at least this large are evaluated in parallel.
    pub parallel_threshold: usize,
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self {
            approx_tolerance_percent: DEFAULT_APPROX_TOLERANCE_PERCENT,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl RuleEvaluator {
    pub fn from_config(config: &EvaluationConfig) -> Self {
        Self {
            approx_tolerance_percent: config.approx_tolerance_percent,
            parallel_threshold: config.parallel_threshold,
        }
    }

    /// Evaluate one rule.
    ///
    /// The operator is parsed first, so a misconfigured exception fails
    /// the rule before any fact is read. The secondary clause is only
    /// evaluated when the operator reads it.
    pub fn evaluate(&self, rule: &Rule, facts: &Facts) -> Result<bool, EvalError> {
        let operator = rule.operator()?;
        let main = self.evaluate_clause(&rule.main.conditions(), facts)?;

        let secondary = if operator.uses_secondary_clause() {
            self.evaluate_clause(&rule.secondary.conditions(), facts)?
        } else {
            limit_holds(&rule.main.exception, operator, facts)?.unwrap_or(false)
        };

        Ok(combine(main, secondary, operator))
    }

    /// AND of the clause's condition predicates.
    ///
    /// A false predicate does not short-circuit, so the first error in slot
    /// order is reported regardless of earlier outcomes.
    pub fn evaluate_clause(
        &self,
        conditions: &[&BlockDefinition],
        facts: &Facts,
    ) -> Result<bool, EvalError> {
        let mut holds = true;
        for block in conditions {
            holds &= evaluate_block(block, facts, self.approx_tolerance_percent)?;
        }
        Ok(holds)
    }

    /// Evaluate one rule and log why it could not be decided.
    pub fn verdict(&self, rule: &Rule, facts: &Facts) -> Verdict {
        let result = self.evaluate(rule, facts);
        if let Err(e) = &result {
            warn!(rule_id = %rule.id, error = %e, "rule not decided");
        }
        Verdict::from(result)
    }

    /// Evaluate many rules against one facts snapshot.
    ///
    /// A failing rule only affects its own entry.
    pub fn evaluate_batch(&self, rules: &[Rule], facts: &Facts) -> BTreeMap<String, Verdict> {
        if rules.len() < self.parallel_threshold {
            rules
                .iter()
                .map(|rule| (rule.id.clone(), self.verdict(rule, facts)))
                .collect()
        } else {
            rules
                .par_iter()
                .map(|rule| (rule.id.clone(), self.verdict(rule, facts)))
                .collect()
        }
    }
}
