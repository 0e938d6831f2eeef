use thiserror::Error;

/// A predicate needed a fact the caller did not supply.
///
/// Evaluation of the affected rule aborts; the verdict becomes "unknown"
/// rather than a false negative.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing fact `{field}`")]
pub struct FactsError {
    pub field: &'static str,
}

impl FactsError {
    pub fn missing(field: &'static str) -> Self {
        Self { field }
    }
}
