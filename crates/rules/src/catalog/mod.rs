//! Static registry of building blocks.
//!
//! The catalog is built once from the authored table plus the derived
//! lowercase condition twins of every uppercase main block, and is
//! read-only afterwards, so it can be shared across threads without locking.

mod table;
mod twins;


pub use twins::derive_condition_twins;

use crate::error::ConfigError;
use crate::schema::{BlockCategory, BlockDefinition, ClauseRole};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockCatalog {
    entries: Vec<BlockDefinition>,
}

impl BlockCatalog {
    /// Build a catalog from authored entries, deriving missing condition twins.
    pub fn new(authored: Vec<BlockDefinition>) -> Self {
        Self {
            entries: derive_condition_twins(authored),
        }
    }

    /// The standard scheduling vocabulary.
    pub fn standard() -> Self {
        Self::new(table::authored_blocks())
    }

    pub fn entries(&self) -> &[BlockDefinition] {
        &self.entries
    }

    pub fn lookup(&self, category: BlockCategory, id: &str) -> Option<&BlockDefinition> {
        self.entries
            .iter()
            .find(|b| b.id == id && b.category() == category)
    }

    /// Entries of one category, in declaration order.
    pub fn list_by_category(&self, category: BlockCategory) -> Vec<&BlockDefinition> {
        self.entries
            .iter()
            .filter(|b| b.category() == category)
            .collect()
    }

    /// Entries of one category usable in the given clause.
    pub fn list_by_role(&self, category: BlockCategory, role: ClauseRole) -> Vec<&BlockDefinition> {
        self.entries
            .iter()
            .filter(|b| b.category() == category && b.role() == role)
            .collect()
    }

    /// Ids of one category and clause, for diagnostics.
    pub fn ids(&self, category: BlockCategory, role: ClauseRole) -> Vec<&str> {
        self.list_by_role(category, role)
            .into_iter()
            .map(|b| b.id.as_str())
            .collect()
    }

    /// The main-clause fallback of a category.
    pub fn default_of(&self, category: BlockCategory) -> Result<&BlockDefinition, ConfigError> {
        self.default_for(category, ClauseRole::Main)
    }

    /// The secondary-clause fallback of a category (the twin of the main default).
    pub fn condition_default_of(
        &self,
        category: BlockCategory,
    ) -> Result<&BlockDefinition, ConfigError> {
        self.default_for(category, ClauseRole::Condition)
    }

    /// The single entry flagged as default for a category and clause.
    pub fn default_for(
        &self,
        category: BlockCategory,
        role: ClauseRole,
    ) -> Result<&BlockDefinition, ConfigError> {
        let defaults: Vec<&BlockDefinition> = self
            .list_by_role(category, role)
            .into_iter()
            .filter(|b| b.is_default)
            .collect();
        match defaults.as_slice() {
            [single] => Ok(*single),
            [] => Err(ConfigError::MissingDefault { category }),
            many => Err(ConfigError::DuplicateDefault {
                category,
                ids: many.iter().map(|b| b.id.clone()).collect(),
            }),
        }
    }

    /// Every default misconfiguration, one error per affected category and clause.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for category in BlockCategory::ALL {
            if let Err(e) = self.default_of(category) {
                errors.push(e);
            }
            if category.has_condition_twin() {
                if let Err(e) = self.condition_default_of(category) {
                    errors.push(e);
                }
            }
        }
        errors
    }
}

impl Default for BlockCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
