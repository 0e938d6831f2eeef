//! Building-block definitions and their human/machine renderings.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::{BlockCategory, BlockDetails, ClauseRole, ExceptionDetails, ExceptionOperator};

/// A catalog entry, and the per-rule copy made from it.
///
/// The category is carried by `details`, so a block can never hold
/// parameters of another category than its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub id: String,
    /// Display text. Empty for the no-op default of a category.
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub details: BlockDetails,
    /// Human-readable form of exception blocks, used instead of `label`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub is_condition: bool,
}

/// Stable `{category, id, label, details}` shape persisted by collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineBlock {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub details: BlockDetails,
}

impl BlockDefinition {
    /// A main-clause block. Role flags follow from the id's case.
    pub fn new(id: impl Into<String>, label: impl Into<String>, details: BlockDetails) -> Self {
        let id = id.into();
        let is_main = ClauseRole::of_id(&id) == Some(ClauseRole::Main);
        let is_required = details.category().is_required();
        Self {
            id,
            label: label.into(),
            details,
            example: None,
            is_default: false,
            is_required,
            is_main,
            is_condition: !is_main,
        }
    }

    /// An exception block carrying its operator tag and example sentence.
    pub fn exception(
        id: impl Into<String>,
        label: impl Into<String>,
        operator: ExceptionOperator,
        example: impl Into<String>,
    ) -> Self {
        let details = BlockDetails::Exception(ExceptionDetails {
            operator: operator.as_str().to_string(),
            min: None,
            max: None,
        });
        let mut block = Self::new(id, label, details);
        block.example = Some(example.into());
        block
    }

    /// Mark this block as its category's fallback.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn category(&self) -> BlockCategory {
        self.details.category()
    }

    pub fn role(&self) -> ClauseRole {
        if self.is_main {
            ClauseRole::Main
        } else {
            ClauseRole::Condition
        }
    }

    /// The lowercase condition twin of an uppercase main block.
    ///
    /// `None` for exception blocks and for ids not starting with an
    /// uppercase letter.
    pub fn condition_twin(&self) -> Option<BlockDefinition> {
        if !self.category().has_condition_twin()
            || ClauseRole::of_id(&self.id) != Some(ClauseRole::Main)
        {
            return None;
        }
        let mut twin = self.clone();
        twin.id = self.id.to_lowercase();
        twin.is_main = false;
        twin.is_condition = true;
        Some(twin)
    }

    pub fn to_human_readable(&self) -> &str {
        match self.category() {
            BlockCategory::Exception => self.example.as_deref().unwrap_or(&self.label),
            _ => &self.label,
        }
    }

    pub fn to_machine_readable(&self) -> MachineBlock {
        MachineBlock {
            id: self.id.clone(),
            label: self.label.clone(),
            details: self.details.clone(),
        }
    }

    /// Parse the operator tag of an exception block.
    pub fn exception_operator(&self) -> Result<ExceptionOperator, ConfigError> {
        let details = self.exception_details()?;
        details
            .operator
            .parse()
            .map_err(|_| ConfigError::UnknownOperator {
                block: self.id.clone(),
                operator: details.operator.clone(),
            })
    }

    pub fn exception_details(&self) -> Result<&ExceptionDetails, ConfigError> {
        match &self.details {
            BlockDetails::Exception(details) => Ok(details),
            other => Err(ConfigError::DetailsMismatch {
                id: self.id.clone(),
                expected: BlockCategory::Exception,
                found: other.category(),
            }),
        }
    }
}

impl MachineBlock {
    pub fn category(&self) -> BlockCategory {
        self.details.category()
    }
}
