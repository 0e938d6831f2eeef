//! The rule unit consumed by the evaluator.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::{
    BlockCategory, BlockDefinition, Blueprint, ClauseBlueprint, ExceptionOperator, SlotBlueprint,
};

/// Resolved main clause: five conditions and the exception linking it to
/// the secondary clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainClause {
    pub repeat: BlockDefinition,
    pub timeframe: BlockDefinition,
    pub amount: BlockDefinition,
    pub group: BlockDefinition,
    pub dependency: BlockDefinition,
    pub exception: BlockDefinition,
}

/// Resolved secondary clause. It cannot carry a nested exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub repeat: BlockDefinition,
    pub timeframe: BlockDefinition,
    pub amount: BlockDefinition,
    pub group: BlockDefinition,
    pub dependency: BlockDefinition,
}

impl MainClause {
    /// Condition blocks in slot order, without the exception.
    pub fn conditions(&self) -> [&BlockDefinition; 5] {
        [
            &self.repeat,
            &self.timeframe,
            &self.amount,
            &self.group,
            &self.dependency,
        ]
    }

    pub fn blocks(&self) -> [&BlockDefinition; 6] {
        [
            &self.repeat,
            &self.timeframe,
            &self.amount,
            &self.group,
            &self.dependency,
            &self.exception,
        ]
    }
}

impl Clause {
    pub fn conditions(&self) -> [&BlockDefinition; 5] {
        [
            &self.repeat,
            &self.timeframe,
            &self.amount,
            &self.group,
            &self.dependency,
        ]
    }
}

/// A scheduling constraint assembled by the rule factory.
///
/// Owns private copies of its blocks; edits go through the factory again
/// with [`Rule::to_blueprint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub main: MainClause,
    pub secondary: Clause,
}

impl Rule {
    pub fn operator(&self) -> Result<ExceptionOperator, ConfigError> {
        self.main.exception.exception_operator()
    }

    /// Human-readable sentence built from the non-empty block texts.
    ///
    /// The secondary clause is only rendered when the operator reads it.
    pub fn describe(&self) -> String {
        let mut parts: Vec<&str> = self
            .main
            .blocks()
            .into_iter()
            .map(BlockDefinition::to_human_readable)
            .filter(|s| !s.is_empty())
            .collect();
        let uses_secondary = self
            .operator()
            .map(|op| op.uses_secondary_clause())
            .unwrap_or(false);
        if uses_secondary {
            parts.extend(
                self.secondary
                    .conditions()
                    .into_iter()
                    .map(BlockDefinition::to_human_readable)
                    .filter(|s| !s.is_empty()),
            );
        }
        parts.join(" ")
    }

    /// A complete blueprint that rebuilds this rule, details included.
    pub fn to_blueprint(&self) -> Blueprint {
        let mut blueprint = Blueprint::new().with_id(self.id.clone());
        for block in self.main.blocks() {
            blueprint.main.set(block.category(), slot_of(block));
        }
        blueprint.secondary = clause_blueprint(&self.secondary.conditions());
        blueprint
    }
}

fn slot_of(block: &BlockDefinition) -> SlotBlueprint {
    let slot = SlotBlueprint::of(block.id.clone());
    match block.details.to_value() {
        Ok(details) => slot.with_details(details),
        Err(_) => slot,
    }
}

fn clause_blueprint(blocks: &[&BlockDefinition]) -> ClauseBlueprint {
    let mut clause = ClauseBlueprint::default();
    for block in blocks {
        if block.category() != BlockCategory::Exception {
            clause.set(block.category(), slot_of(block));
        }
    }
    clause
}
