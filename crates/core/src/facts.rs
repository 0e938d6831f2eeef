use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FactsError;

/// Part of the day a shift covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Afternoon,
    Full,
}

impl Shift {
    /// Morning and afternoon exclude each other; a full shift overlaps both.
    pub fn is_compatible_with(self, other: Shift) -> bool {
        !matches!(
            (self, other),
            (Shift::Morning, Shift::Afternoon) | (Shift::Afternoon, Shift::Morning)
        )
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Morning => write!(f, "morning"),
            Shift::Afternoon => write!(f, "afternoon"),
            Shift::Full => write!(f, "full"),
        }
    }
}

impl FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morning" | "vormittag" => Ok(Shift::Morning),
            "afternoon" | "nachmittag" => Ok(Shift::Afternoon),
            "full" | "ganztag" => Ok(Shift::Full),
            other => Err(format!("unknown shift: '{}'", other)),
        }
    }
}

/// Snapshot of scheduling data a rule is evaluated against.
///
/// Every field is optional: a predicate only asks for the facts it needs
/// and reports a [`FactsError`] naming the first one that is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Facts {
    /// Measured quantity compared against amount bounds (e.g. shifts this week).
    pub value: Option<f64>,
    /// How often the condition recurred within the timeframe.
    pub occurrences: Option<u32>,
    pub current_date: Option<NaiveDate>,
    /// `None` means unspecified, which is compatible with any shift.
    pub shift: Option<Shift>,
    pub present_roles: Option<BTreeSet<String>>,
    /// Headcount per role. Roles absent from the map count as zero.
    pub role_counts: Option<HashMap<String, u32>>,
    /// Value checked against the ceiling/floor of a limit exception.
    pub limit_value: Option<f64>,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_occurrences(mut self, occurrences: u32) -> Self {
        self.occurrences = Some(occurrences);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.current_date = Some(date);
        self
    }

    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shift = Some(shift);
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.present_roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_role_count(mut self, role: impl Into<String>, count: u32) -> Self {
        self.role_counts
            .get_or_insert_with(HashMap::new)
            .insert(role.into(), count);
        self
    }

    pub fn with_limit_value(mut self, value: f64) -> Self {
        self.limit_value = Some(value);
        self
    }

    pub fn require_value(&self) -> Result<f64, FactsError> {
        self.value.ok_or(FactsError::missing("value"))
    }

    pub fn require_occurrences(&self) -> Result<u32, FactsError> {
        self.occurrences.ok_or(FactsError::missing("occurrences"))
    }

    pub fn require_date(&self) -> Result<NaiveDate, FactsError> {
        self.current_date.ok_or(FactsError::missing("current_date"))
    }

    pub fn require_present_roles(&self) -> Result<&BTreeSet<String>, FactsError> {
        self.present_roles
            .as_ref()
            .ok_or(FactsError::missing("present_roles"))
    }

    pub fn require_limit_value(&self) -> Result<f64, FactsError> {
        self.limit_value.ok_or(FactsError::missing("limit_value"))
    }

    /// Headcount for `role`, zero when the role is not listed.
    pub fn role_count(&self, role: &str) -> Result<u32, FactsError> {
        let counts = self
            .role_counts
            .as_ref()
            .ok_or(FactsError::missing("role_counts"))?;
        Ok(counts.get(role).copied().unwrap_or(0))
    }
}
