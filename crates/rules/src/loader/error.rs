//! Error types and per-row load results for the rule table.

/// Errors that can occur while loading, editing or saving the rule table.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV text itself is malformed (e.g. an unterminated quote).
    #[error("CSV error: {0}")]
    Csv(String),

    /// A condition or operator cell is not valid blueprint JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rule validation error (e.g. missing or placeholder id).
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result alias for rule table operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of loading a single table row.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    /// 1-based data row, not counting the header.
    pub row: usize,
    pub status: LoadStatus,
}

/// Status of a single row load attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// Row became an active rule.
    Loaded { rule_id: String },
    /// Row kept in the raw table but not activated (no id, duplicate id, ...).
    Skipped { reason: String },
    /// Row could not be parsed.
    Failed { error: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }
}
