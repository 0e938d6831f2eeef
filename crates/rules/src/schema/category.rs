//! Block category and clause role enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six facets a scheduling constraint is composed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    Repeat,
    Timeframe,
    Amount,
    Group,
    Dependency,
    Exception,
}

impl BlockCategory {
    /// All categories in slot order.
    pub const ALL: [BlockCategory; 6] = [
        BlockCategory::Repeat,
        BlockCategory::Timeframe,
        BlockCategory::Amount,
        BlockCategory::Group,
        BlockCategory::Dependency,
        BlockCategory::Exception,
    ];

    /// Categories that also appear in the secondary clause.
    pub const CONDITIONS: [BlockCategory; 5] = [
        BlockCategory::Repeat,
        BlockCategory::Timeframe,
        BlockCategory::Amount,
        BlockCategory::Group,
        BlockCategory::Dependency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockCategory::Repeat => "repeat",
            BlockCategory::Timeframe => "timeframe",
            BlockCategory::Amount => "amount",
            BlockCategory::Group => "group",
            BlockCategory::Dependency => "dependency",
            BlockCategory::Exception => "exception",
        }
    }

    /// Exceptions never appear in the secondary clause, so they have no
    /// lowercase condition twin.
    pub fn has_condition_twin(&self) -> bool {
        !matches!(self, BlockCategory::Exception)
    }

    /// Only amount blocks are mandatory in every rule.
    pub fn is_required(&self) -> bool {
        matches!(self, BlockCategory::Amount)
    }
}

impl fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "repeat" => Ok(BlockCategory::Repeat),
            "timeframe" => Ok(BlockCategory::Timeframe),
            "amount" => Ok(BlockCategory::Amount),
            "group" => Ok(BlockCategory::Group),
            "dependency" => Ok(BlockCategory::Dependency),
            "exception" => Ok(BlockCategory::Exception),
            other => Err(format!("unknown block category: '{}'", other)),
        }
    }
}

/// Which clause of a rule a block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseRole {
    /// Uppercase ids, the primary condition.
    Main,
    /// Lowercase ids, the clause paired with the main one by an exception.
    Condition,
}

impl ClauseRole {
    /// Role encoded by the case of an id's first character.
    pub fn of_id(id: &str) -> Option<ClauseRole> {
        let first = id.chars().next()?;
        if first.is_uppercase() {
            Some(ClauseRole::Main)
        } else if first.is_lowercase() {
            Some(ClauseRole::Condition)
        } else {
            None
        }
    }

    /// Rewrite `id` so its case matches this role.
    pub fn normalize_id(&self, id: &str) -> String {
        match self {
            ClauseRole::Main => id.to_uppercase(),
            ClauseRole::Condition => id.to_lowercase(),
        }
    }
}
