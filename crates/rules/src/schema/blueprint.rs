//! Partial rule descriptions consumed by the rule factory.

use serde::{Deserialize, Serialize};

use super::BlockCategory;

/// Requested block for one slot: an id and optional parameters.
///
/// Deserialization never fails: a bare string is taken as the id, an
/// object contributes its `type` and `details`, anything else is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct SlotBlueprint {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SlotBlueprint {
    pub fn of(id: impl Into<String>) -> Self {
        Self {
            type_id: Some(serde_json::Value::String(id.into())),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The requested id, if it was given as a string.
    pub fn id(&self) -> Option<&str> {
        self.type_id.as_ref().and_then(|v| v.as_str())
    }
}

impl From<serde_json::Value> for SlotBlueprint {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(_) => Self {
                type_id: Some(value),
                details: None,
            },
            serde_json::Value::Object(mut map) => Self {
                type_id: map.remove("type"),
                details: map.remove("details"),
            },
            _ => Self::default(),
        }
    }
}

/// The five condition slots shared by both clauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClauseBlueprint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<SlotBlueprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<SlotBlueprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<SlotBlueprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<SlotBlueprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency: Option<SlotBlueprint>,
}

impl ClauseBlueprint {
    pub fn slot(&self, category: BlockCategory) -> Option<&SlotBlueprint> {
        match category {
            BlockCategory::Repeat => self.repeat.as_ref(),
            BlockCategory::Timeframe => self.timeframe.as_ref(),
            BlockCategory::Amount => self.amount.as_ref(),
            BlockCategory::Group => self.group.as_ref(),
            BlockCategory::Dependency => self.dependency.as_ref(),
            BlockCategory::Exception => None,
        }
    }

    /// Set a slot. Exception slots are ignored; they live on the main clause.
    pub fn set(&mut self, category: BlockCategory, slot: SlotBlueprint) {
        let target = match category {
            BlockCategory::Repeat => &mut self.repeat,
            BlockCategory::Timeframe => &mut self.timeframe,
            BlockCategory::Amount => &mut self.amount,
            BlockCategory::Group => &mut self.group,
            BlockCategory::Dependency => &mut self.dependency,
            BlockCategory::Exception => return,
        };
        *target = Some(slot);
    }
}

/// The five condition slots plus the exception slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainBlueprint {
    #[serde(flatten)]
    pub conditions: ClauseBlueprint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<SlotBlueprint>,
}

impl MainBlueprint {
    pub fn slot(&self, category: BlockCategory) -> Option<&SlotBlueprint> {
        match category {
            BlockCategory::Exception => self.exception.as_ref(),
            other => self.conditions.slot(other),
        }
    }

    pub fn set(&mut self, category: BlockCategory, slot: SlotBlueprint) {
        match category {
            BlockCategory::Exception => self.exception = Some(slot),
            other => self.conditions.set(other, slot),
        }
    }
}

/// A possibly partial description of a rule. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blueprint {
    /// Keeps the id of the rule being edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub main: MainBlueprint,
    pub secondary: ClauseBlueprint,
}

impl Blueprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_main(mut self, category: BlockCategory, slot: SlotBlueprint) -> Self {
        self.main.set(category, slot);
        self
    }

    pub fn with_secondary(mut self, category: BlockCategory, slot: SlotBlueprint) -> Self {
        self.secondary.set(category, slot);
        self
    }
}
