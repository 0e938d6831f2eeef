//! Category-specific parameter shapes carried by building blocks.

use chrono::Weekday;
use roster_core::Shift;
use serde::{Deserialize, Serialize};

use super::BlockCategory;

/// Parameters of a block, tagged by its category.
///
/// On the wire the tag and payload sit side by side as
/// `{"category": "amount", "details": {"top": 3}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "details", rename_all = "snake_case")]
pub enum BlockDetails {
    Repeat(RepeatDetails),
    Timeframe(TimeframeDetails),
    Amount(AmountDetails),
    Group(GroupDetails),
    Dependency(DependencyDetails),
    Exception(ExceptionDetails),
}

impl BlockDetails {
    pub fn category(&self) -> BlockCategory {
        match self {
            BlockDetails::Repeat(_) => BlockCategory::Repeat,
            BlockDetails::Timeframe(_) => BlockCategory::Timeframe,
            BlockDetails::Amount(_) => BlockCategory::Amount,
            BlockDetails::Group(_) => BlockCategory::Group,
            BlockDetails::Dependency(_) => BlockCategory::Dependency,
            BlockDetails::Exception(_) => BlockCategory::Exception,
        }
    }

    /// Parse an untagged details object as the shape of `category`.
    pub fn from_value(
        category: BlockCategory,
        value: serde_json::Value,
    ) -> serde_json::Result<BlockDetails> {
        match category {
            BlockCategory::Repeat => serde_json::from_value(value).map(BlockDetails::Repeat),
            BlockCategory::Timeframe => serde_json::from_value(value).map(BlockDetails::Timeframe),
            BlockCategory::Amount => serde_json::from_value(value).map(BlockDetails::Amount),
            BlockCategory::Group => serde_json::from_value(value).map(BlockDetails::Group),
            BlockCategory::Dependency => {
                serde_json::from_value(value).map(BlockDetails::Dependency)
            }
            BlockCategory::Exception => serde_json::from_value(value).map(BlockDetails::Exception),
        }
    }

    /// The payload without its category tag.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            BlockDetails::Repeat(d) => serde_json::to_value(d),
            BlockDetails::Timeframe(d) => serde_json::to_value(d),
            BlockDetails::Amount(d) => serde_json::to_value(d),
            BlockDetails::Group(d) => serde_json::to_value(d),
            BlockDetails::Dependency(d) => serde_json::to_value(d),
            BlockDetails::Exception(d) => serde_json::to_value(d),
        }
    }
}

// ── Repeat ───────────────────────────────────────────────────────────

/// How often the main condition may recur within the timeframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepeatDetails {
    /// 0 leaves the recurrence unconstrained ("jeden").
    pub number: u32,
}

// ── Timeframe ────────────────────────────────────────────────────────

/// Days, ISO weeks and shifts a rule applies to. Unset or empty sets do
/// not constrain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeframeDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<Weekday>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shifts: Option<Vec<Shift>>,
}

// ── Amount ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmountDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
}

impl AmountDetails {
    pub fn at_most(top: f64) -> Self {
        Self { bottom: None, top: Some(top) }
    }

    pub fn at_least(bottom: f64) -> Self {
        Self { bottom: Some(bottom), top: None }
    }

    pub fn between(bottom: f64, top: f64) -> Self {
        Self { bottom: Some(bottom), top: Some(top) }
    }

    /// The one number a single-input amount was given, wherever it was put.
    pub fn single_input(&self) -> Option<f64> {
        self.top.or(self.bottom)
    }
}

/// How an amount block turns its inputs into an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountKind {
    /// "ungefähr": the input widened by the tolerance band.
    Approximately,
    /// "maximal": `[0, input]`.
    AtMost,
    /// "minimal": `[input, ∞)`.
    AtLeast,
    /// "genau": `[input, input]`.
    Exactly,
    /// "zwischen": `[bottom, top]` verbatim.
    Between,
}

impl AmountKind {
    pub fn from_id(id: &str) -> Option<AmountKind> {
        match id.to_uppercase().as_str() {
            "A0" => Some(AmountKind::Approximately),
            "A1" => Some(AmountKind::AtMost),
            "A2" => Some(AmountKind::AtLeast),
            "A3" => Some(AmountKind::Exactly),
            "A4" => Some(AmountKind::Between),
            _ => None,
        }
    }
}

// ── Group ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// Every listed role must be present.
    All,
    /// At least one listed role must be present.
    #[default]
    Any,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupDetails {
    pub roles: Vec<String>,
    pub mode: GroupMode,
}

// ── Dependency ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DependencyDetails {
    /// `[role1]` or `[role1, role2]` depending on the kind.
    pub roles: Vec<String>,
    /// `[ratio1, ratio2]`. Single-ratio kinds read only the first entry.
    pub ratio: [f64; 2],
}

impl Default for DependencyDetails {
    fn default() -> Self {
        Self {
            roles: Vec::new(),
            ratio: [1.0, 1.0],
        }
    }
}

/// Comparison a dependency block performs between role headcounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// No dependency configured.
    Unconstrained,
    /// "anwesend": `count(role1) > 0`.
    Present,
    /// "abwesend": `count(role1) == 0`.
    Absent,
    /// "braucht": `count(role2) >= ratio1 * count(role1)`.
    Needs,
    /// "hilft": `count(role1) < ratio1 * count(role1)`.
    Helps,
    /// "im Verhältnis": `count(role1) * ratio1 < count(role2) * ratio2`.
    Ratio,
}

impl DependencyKind {
    pub fn from_id(id: &str) -> Option<DependencyKind> {
        match id.to_uppercase().as_str() {
            "D0" => Some(DependencyKind::Unconstrained),
            "D1" => Some(DependencyKind::Present),
            "D2" => Some(DependencyKind::Absent),
            "D3" => Some(DependencyKind::Needs),
            "D4" => Some(DependencyKind::Helps),
            "D5" => Some(DependencyKind::Ratio),
            _ => None,
        }
    }

    /// Number of roles the comparison reads.
    pub fn role_count(&self) -> usize {
        match self {
            DependencyKind::Unconstrained => 0,
            DependencyKind::Present | DependencyKind::Absent | DependencyKind::Helps => 1,
            DependencyKind::Needs | DependencyKind::Ratio => 2,
        }
    }
}

// ── Exception ────────────────────────────────────────────────────────

/// Operator tag plus the optional bounds of the limit operators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExceptionDetails {
    /// Raw operator tag, parsed into [`super::ExceptionOperator`] at evaluation.
    pub operator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}
