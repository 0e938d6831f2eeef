//! Catalog and evaluation error types.

use roster_core::FactsError;

use crate::schema::BlockCategory;

/// Misconfiguration of the catalog or of a single rule's blocks.
///
/// Fatal only for the category or rule involved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("category '{category}' has no default block")]
    MissingDefault { category: BlockCategory },

    #[error("category '{category}' has several default blocks: {}", .ids.join(", "))]
    DuplicateDefault {
        category: BlockCategory,
        ids: Vec<String>,
    },

    #[error("block '{block}' uses unknown exception operator '{operator}'")]
    UnknownOperator { block: String, operator: String },

    #[error("unknown {category} block '{id}'")]
    UnknownBlock { category: BlockCategory, id: String },

    #[error("block '{id}' is missing detail `{field}`")]
    MissingDetail { id: String, field: &'static str },

    #[error("block '{id}' of category {category} cannot be used as a condition")]
    NotACondition { id: String, category: BlockCategory },

    #[error("block '{id}' carries {found} details where {expected} was expected")]
    DetailsMismatch {
        id: String,
        expected: BlockCategory,
        found: BlockCategory,
    },
}

/// Why a single rule could not be evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Facts(#[from] FactsError),
}
