//! Exception operators combining the main and secondary clause.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the main verdict merges with the secondary one.
///
/// The order of the operands matters for `But` and `Except`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionOperator {
    /// `main`
    None,
    /// `main && secondary`
    And,
    /// `main || secondary`
    Or,
    /// `!main && secondary`
    But,
    /// `main && !secondary`
    Except,
    /// `main && value <= max`
    LimitMax,
    /// `main && value >= min`
    LimitMin,
}

impl ExceptionOperator {
    pub const ALL: [ExceptionOperator; 7] = [
        ExceptionOperator::None,
        ExceptionOperator::And,
        ExceptionOperator::Or,
        ExceptionOperator::But,
        ExceptionOperator::Except,
        ExceptionOperator::LimitMax,
        ExceptionOperator::LimitMin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExceptionOperator::None => "NONE",
            ExceptionOperator::And => "AND",
            ExceptionOperator::Or => "OR",
            ExceptionOperator::But => "BUT",
            ExceptionOperator::Except => "EXCEPT",
            ExceptionOperator::LimitMax => "LIMIT_MAX",
            ExceptionOperator::LimitMin => "LIMIT_MIN",
        }
    }

    /// Whether the secondary clause takes part in the combination.
    pub fn uses_secondary_clause(&self) -> bool {
        matches!(
            self,
            ExceptionOperator::And
                | ExceptionOperator::Or
                | ExceptionOperator::But
                | ExceptionOperator::Except
        )
    }
}

impl fmt::Display for ExceptionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExceptionOperator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(ExceptionOperator::None),
            "AND" => Ok(ExceptionOperator::And),
            "OR" => Ok(ExceptionOperator::Or),
            "BUT" => Ok(ExceptionOperator::But),
            "EXCEPT" => Ok(ExceptionOperator::Except),
            "LIMIT_MAX" => Ok(ExceptionOperator::LimitMax),
            "LIMIT_MIN" => Ok(ExceptionOperator::LimitMin),
            other => Err(format!("unknown exception operator: '{}'", other)),
        }
    }
}
