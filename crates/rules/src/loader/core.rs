//! [`RuleStore`]: the rule table held in memory, with load/save lifecycle.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::factory::RuleFactory;
use crate::schema::{Blueprint, ClauseBlueprint, Rule, SlotBlueprint};

use super::csv::{self, RuleRecord};
use super::error::{LoadResult, LoadStatus, Result, RuleError};

/// Columns a row needs before it can become an active rule.
pub const MANDATORY_COLUMNS: [&str; 4] = ["id", "condition1", "operator", "condition2"];

/// Id marking a row that is kept in the table but not active.
const PLACEHOLDER_ID: &str = "?";

// ── Rule row ────────────────────────────────────────────────────────

/// One rule as stored in the table.
///
/// `condition1` and `condition2` hold clause blueprints as JSON; `operator`
/// holds the exception slot as JSON or as a bare id such as `E4`. Empty
/// cells fall back to the catalog defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleRow {
    pub id: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub condition1: String,
    pub operator: String,
    pub condition2: String,
    pub description: String,
}

impl RuleRow {
    pub fn from_record(record: &RuleRecord) -> Self {
        let cell = |name: &str| record.get(name).cloned().unwrap_or_default();
        Self {
            id: cell("id").trim().to_string(),
            rule_type: cell("type"),
            condition1: cell("condition1"),
            operator: cell("operator"),
            condition2: cell("condition2"),
            description: cell("description"),
        }
    }

    pub fn to_record(&self) -> RuleRecord {
        let mut record = RuleRecord::new();
        record.insert("id".to_string(), self.id.clone());
        record.insert("type".to_string(), self.rule_type.clone());
        record.insert("condition1".to_string(), self.condition1.clone());
        record.insert("operator".to_string(), self.operator.clone());
        record.insert("condition2".to_string(), self.condition2.clone());
        record.insert("description".to_string(), self.description.clone());
        record
    }

    /// Serialize a built rule, keeping every slot's id and details.
    pub fn from_rule(rule: &Rule, rule_type: impl Into<String>) -> Result<Self> {
        let blueprint = rule.to_blueprint();
        let operator = match &blueprint.main.exception {
            Some(slot) => serde_json::to_string(slot)?,
            None => String::new(),
        };
        Ok(Self {
            id: rule.id.clone(),
            rule_type: rule_type.into(),
            condition1: serde_json::to_string(&blueprint.main.conditions)?,
            operator,
            condition2: serde_json::to_string(&blueprint.secondary)?,
            description: rule.describe(),
        })
    }

    /// Whether the row carries a real id.
    pub fn has_id(&self) -> bool {
        !self.id.is_empty() && self.id != PLACEHOLDER_ID
    }

    /// The blueprint described by the row's cells.
    pub fn blueprint(&self) -> Result<Blueprint> {
        let mut blueprint = Blueprint::new();
        if self.has_id() {
            blueprint.id = Some(self.id.clone());
        }
        blueprint.main.conditions = parse_clause(&self.condition1)?;
        blueprint.main.exception = parse_operator(&self.operator)?;
        blueprint.secondary = parse_clause(&self.condition2)?;
        Ok(blueprint)
    }
}

fn parse_clause(cell: &str) -> Result<ClauseBlueprint> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(ClauseBlueprint::default());
    }
    Ok(serde_json::from_str(cell)?)
}

fn parse_operator(cell: &str) -> Result<Option<SlotBlueprint>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    if cell.starts_with('{') || cell.starts_with('"') {
        let value: serde_json::Value = serde_json::from_str(cell)?;
        return Ok(Some(SlotBlueprint::from(value)));
    }
    Ok(Some(SlotBlueprint::of(cell)))
}

// ── Rule store ──────────────────────────────────────────────────────

/// The rule table: every parsed row, plus the active rules keyed by id.
///
/// Rows without an id (or with the `?` placeholder), duplicate ids and
/// rows with unparseable cells stay in [`raw`](Self::raw) so saving
/// does not lose them, but are not active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleStore {
    raw: Vec<RuleRecord>,
    active: IndexMap<String, RuleRow>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a rule table. Row problems are reported per row and never
    /// abort the load; only malformed CSV does.
    pub fn load_str(input: &str) -> Result<(Self, Vec<LoadResult>)> {
        let table = csv::parse_table(input)?;
        let missing: Vec<&str> = MANDATORY_COLUMNS
            .iter()
            .copied()
            .filter(|column| !table.header.iter().any(|h| h == column))
            .collect();

        let mut store = Self::new();
        let mut results = Vec::with_capacity(table.rows.len());

        for (index, fields) in table.rows.iter().enumerate() {
            let row = index + 1;
            let (record, folded) = table.record(fields);
            let status = if folded {
                LoadStatus::Failed {
                    error: format!(
                        "row has {} fields, header has {}; extra fields kept in the last column",
                        fields.len(),
                        table.header.len()
                    ),
                }
            } else {
                store.admit(&record, &missing)
            };
            store.raw.push(record);

            match &status {
                LoadStatus::Loaded { .. } => {}
                LoadStatus::Skipped { reason } => warn!(row, reason = %reason, "skipped rule row"),
                LoadStatus::Failed { error } => warn!(row, error = %error, "failed to load rule row"),
            }
            results.push(LoadResult { row, status });
        }

        info!(
            rows = store.raw.len(),
            active = store.active.len(),
            "loaded rule table"
        );
        Ok((store, results))
    }

    /// Read and parse a rule table file.
    pub fn load_file(path: &Path) -> Result<(Self, Vec<LoadResult>)> {
        let contents = fs::read_to_string(path)?;
        info!(path = %path.display(), "reading rule table");
        Self::load_str(&contents)
    }

    fn admit(&mut self, record: &RuleRecord, missing_columns: &[&str]) -> LoadStatus {
        if let Some(column) = missing_columns.first() {
            return LoadStatus::Skipped {
                reason: format!("missing column `{}`", column),
            };
        }
        let row = RuleRow::from_record(record);
        if !row.has_id() {
            return LoadStatus::Skipped {
                reason: "row has no rule id".to_string(),
            };
        }
        if self.active.contains_key(&row.id) {
            return LoadStatus::Skipped {
                reason: format!("duplicate rule id '{}'", row.id),
            };
        }
        if let Err(e) = row.blueprint() {
            return LoadStatus::Failed {
                error: e.to_string(),
            };
        }
        let rule_id = row.id.clone();
        self.active.insert(rule_id.clone(), row);
        LoadStatus::Loaded { rule_id }
    }

    /// Every parsed row, active or not, in file order.
    pub fn raw(&self) -> &[RuleRecord] {
        &self.raw
    }

    /// Active rules keyed by id, in file order.
    pub fn active(&self) -> &IndexMap<String, RuleRow> {
        &self.active
    }

    pub fn get(&self, id: &str) -> Option<&RuleRow> {
        self.active.get(id)
    }

    /// Insert or replace a rule. A replaced row keeps its table position
    /// and any extra columns.
    pub fn upsert(&mut self, row: RuleRow) -> Result<()> {
        if !row.has_id() {
            return Err(RuleError::Validation(format!(
                "rule id must not be empty or '{}'",
                PLACEHOLDER_ID
            )));
        }
        row.blueprint()?;

        let existing = self
            .raw
            .iter_mut()
            .find(|record| record_id(record) == Some(row.id.as_str()));
        match existing {
            Some(record) => record.extend(row.to_record()),
            None => self.raw.push(row.to_record()),
        }

        info!(rule_id = %row.id, "upserted rule");
        self.active.insert(row.id.clone(), row);
        Ok(())
    }

    /// Remove a rule from both the active set and the raw table.
    pub fn remove(&mut self, id: &str) -> Option<RuleRow> {
        self.raw.retain(|record| record_id(record) != Some(id));
        let removed = self.active.shift_remove(id);
        if removed.is_some() {
            info!(rule_id = %id, "removed rule");
        }
        removed
    }

    /// The raw table as CSV text.
    pub fn to_csv(&self) -> String {
        csv::write_records(&self.raw)
    }

    /// Atomically write the raw table.
    ///
    /// Writes to a `.tmp` file next to `path` first, then renames it over
    /// the final path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RuleError::Validation(format!("not a file path: {}", path.display())))?;
        let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp_path, self.to_csv())?;
        fs::rename(&tmp_path, path)?;

        info!(path = %path.display(), rows = self.raw.len(), "saved rule table");
        Ok(())
    }

    /// Build every active rule. Rows are validated on admission, so none
    /// is expected to fail here; one that does is logged and left out.
    pub fn build_rules(&self, factory: &RuleFactory) -> Vec<Rule> {
        self.active
            .values()
            .filter_map(|row| match row.blueprint() {
                Ok(blueprint) => Some(factory.build(&blueprint)),
                Err(e) => {
                    warn!(rule_id = %row.id, error = %e, "failed to build rule");
                    None
                }
            })
            .collect()
    }
}

fn record_id(record: &RuleRecord) -> Option<&str> {
    record.get("id").map(|id| id.trim())
}
