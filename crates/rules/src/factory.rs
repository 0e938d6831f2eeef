//! Assembles well-formed rules from partial blueprints.
//!
//! Every one of the eleven slots (six main, five secondary) resolves to a
//! concrete block. Unknown or missing condition ids fall back to the
//! category's default; this is never an error and only shows up in debug
//! logs. The exception slot is stricter: an id naming neither a catalog
//! block nor an operator is kept as an unresolved block, which the
//! evaluator reports as [`ConfigError::UnknownOperator`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::BlockCatalog;
use crate::error::ConfigError;
use crate::fuzzy::fuzzy_match;
use crate::schema::{
    BlockCategory, BlockDefinition, BlockDetails, Blueprint, Clause, ClauseRole, ExceptionDetails,
    ExceptionOperator, MainClause, Rule, SlotBlueprint,
};

pub struct RuleFactory {
    catalog: Arc<BlockCatalog>,
    defaults: HashMap<(BlockCategory, ClauseRole), BlockDefinition>,
}

impl RuleFactory {
    /// Create a factory over `catalog`.
    ///
    /// Fails when a category lacks a unique default, since resolution
    /// could not fall back for that slot.
    pub fn new(catalog: Arc<BlockCatalog>) -> Result<Self, ConfigError> {
        let mut defaults = HashMap::new();
        for category in BlockCategory::ALL {
            let block = catalog.default_of(category)?;
            defaults.insert((category, ClauseRole::Main), block.clone());
            if category.has_condition_twin() {
                let block = catalog.condition_default_of(category)?;
                defaults.insert((category, ClauseRole::Condition), block.clone());
            }
        }
        Ok(Self { catalog, defaults })
    }

    /// Factory over the standard catalog.
    pub fn standard() -> Result<Self, ConfigError> {
        Self::new(Arc::new(BlockCatalog::standard()))
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// Build a rule, reusing the blueprint's id or generating a fresh one.
    pub fn build(&self, blueprint: &Blueprint) -> Rule {
        let id = blueprint.id.clone().unwrap_or_else(new_rule_id);

        let main_slot = |category: BlockCategory| {
            self.resolve(category, ClauseRole::Main, blueprint.main.slot(category))
        };
        let secondary_slot = |category: BlockCategory| {
            self.resolve(category, ClauseRole::Condition, blueprint.secondary.slot(category))
        };

        Rule {
            id,
            main: MainClause {
                repeat: main_slot(BlockCategory::Repeat),
                timeframe: main_slot(BlockCategory::Timeframe),
                amount: main_slot(BlockCategory::Amount),
                group: main_slot(BlockCategory::Group),
                dependency: main_slot(BlockCategory::Dependency),
                exception: main_slot(BlockCategory::Exception),
            },
            secondary: Clause {
                repeat: secondary_slot(BlockCategory::Repeat),
                timeframe: secondary_slot(BlockCategory::Timeframe),
                amount: secondary_slot(BlockCategory::Amount),
                group: secondary_slot(BlockCategory::Group),
                dependency: secondary_slot(BlockCategory::Dependency),
            },
        }
    }

    /// Resolve one slot to a private copy of a catalog block.
    ///
    /// The requested id is matched after normalizing its case to the
    /// clause, so `a3` in a main slot selects `A3`.
    fn resolve(
        &self,
        category: BlockCategory,
        role: ClauseRole,
        slot: Option<&SlotBlueprint>,
    ) -> BlockDefinition {
        let requested = slot.and_then(SlotBlueprint::id);
        let mut block = match requested {
            Some(id) => match self.catalog.lookup(category, &role.normalize_id(id)) {
                Some(found) => found.clone(),
                None if category == BlockCategory::Exception => self.resolve_operator(id),
                None => self.fallback(category, role, Some(id)),
            },
            None => self.fallback(category, role, None),
        };

        if let Some(overrides) = slot.and_then(|s| s.details.as_ref()) {
            let merged = block
                .details
                .to_value()
                .map(|base| deep_merge(&base, overrides))
                .and_then(|value| BlockDetails::from_value(category, value));
            match merged {
                Ok(details) if changes_operator(&block.details, &details) => debug!(
                    block = %block.id,
                    "ignoring blueprint details that replace the exception operator"
                ),
                Ok(details) => block.details = details,
                Err(e) => debug!(
                    block = %block.id,
                    error = %e,
                    "ignoring blueprint details that do not fit the block"
                ),
            }
        }
        block
    }

    /// Exception slot ids that are not catalog ids.
    ///
    /// An operator name such as `EXCEPT` selects the catalog block carrying
    /// that operator. Anything else becomes an unresolved block whose
    /// operator tag is the requested id, so the rule fails at evaluation.
    fn resolve_operator(&self, requested: &str) -> BlockDefinition {
        let name = requested.trim().to_uppercase();
        if let Ok(operator) = name.parse::<ExceptionOperator>() {
            let found = self
                .catalog
                .list_by_role(BlockCategory::Exception, ClauseRole::Main)
                .into_iter()
                .find(|block| block.exception_operator() == Ok(operator));
            if let Some(block) = found {
                return block.clone();
            }
        }

        let candidates = self.catalog.ids(BlockCategory::Exception, ClauseRole::Main);
        warn!(
            requested = %requested,
            did_you_mean = %fuzzy_match(requested, &candidates).unwrap_or("-"),
            "unknown exception operator, rule will not evaluate"
        );
        BlockDefinition::new(
            name.clone(),
            "",
            BlockDetails::Exception(ExceptionDetails {
                operator: name,
                min: None,
                max: None,
            }),
        )
    }

    fn fallback(
        &self,
        category: BlockCategory,
        role: ClauseRole,
        requested: Option<&str>,
    ) -> BlockDefinition {
        let block = self.defaults[&(category, role)].clone();
        if let Some(id) = requested {
            let candidates = self.catalog.ids(category, role);
            let suggestion = fuzzy_match(id, &candidates).unwrap_or("-");
            debug!(
                category = %category,
                requested = %id,
                fallback = %block.id,
                did_you_mean = %suggestion,
                "unknown block id, using category default"
            );
        }
        block
    }
}

/// Exception blocks only take `min`/`max` overrides; the operator is
/// fixed by the catalog entry.
fn changes_operator(base: &BlockDetails, merged: &BlockDetails) -> bool {
    match (base, merged) {
        (BlockDetails::Exception(base), BlockDetails::Exception(merged)) => {
            base.operator != merged.operator
        }
        _ => false,
    }
}

/// Deep-merge blueprint details over the catalog's: objects merge
/// recursively, anything else in `overrides` replaces the base value.
fn deep_merge(base: &serde_json::Value, overrides: &serde_json::Value) -> serde_json::Value {
    match (base, overrides) {
        (serde_json::Value::Object(bm), serde_json::Value::Object(om)) => {
            let mut merged = bm.clone();
            for (key, value) in om {
                let next = match bm.get(key) {
                    Some(base_value) => deep_merge(base_value, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            serde_json::Value::Object(merged)
        }
        (_, overrides) => overrides.clone(),
    }
}

/// Random v4 UUID, unique across rapid successive calls.
fn new_rule_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AmountDetails, ExceptionDetails, ExceptionOperator, GroupDetails, GroupMode};
    use std::collections::HashSet;

    fn factory() -> RuleFactory {
        RuleFactory::standard().unwrap()
    }

    fn main_ids(rule: &Rule) -> Vec<&str> {
        rule.main.blocks().into_iter().map(|b| b.id.as_str()).collect()
    }

    fn secondary_ids(rule: &Rule) -> Vec<&str> {
        rule.secondary.conditions().into_iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn empty_blueprint_resolves_to_defaults() {
        let rule = factory().build(&Blueprint::new());
        assert_eq!(main_ids(&rule), vec!["W0", "T0", "A1", "G0", "D0", "E0"]);
        assert_eq!(secondary_ids(&rule), vec!["w0", "t0", "a1", "g0", "d0"]);
    }

    #[test]
    fn empty_json_object_is_a_valid_blueprint() {
        let blueprint: Blueprint = serde_json::from_str("{}").unwrap();
        let rule = factory().build(&blueprint);
        assert_eq!(main_ids(&rule), vec!["W0", "T0", "A1", "G0", "D0", "E0"]);
    }

    #[test]
    fn known_ids_are_used() {
        let blueprint: Blueprint = serde_json::from_value(serde_json::json!({
            "main": {
                "amount": { "type": "A4" },
                "group": { "type": "G1" },
                "exception": { "type": "E4" }
            },
            "secondary": {
                "dependency": { "type": "d1" }
            }
        }))
        .unwrap();

        let rule = factory().build(&blueprint);
        assert_eq!(main_ids(&rule), vec!["W0", "T0", "A4", "G1", "D0", "E4"]);
        assert_eq!(secondary_ids(&rule), vec!["w0", "t0", "a1", "g0", "d1"]);
        assert_eq!(rule.operator(), Ok(ExceptionOperator::Except));
    }

    #[test]
    fn unknown_or_malformed_ids_fall_back_silently() {
        let blueprint: Blueprint = serde_json::from_value(serde_json::json!({
            "main": {
                "amount": { "type": "A99" },
                "repeat": { "type": 3 },
                "group": "not-a-block",
                "exception": { "type": 4 }
            },
            "secondary": {
                "timeframe": { "type": "T7" },
                "group": null
            }
        }))
        .unwrap();

        let rule = factory().build(&blueprint);
        assert_eq!(main_ids(&rule), vec!["W0", "T0", "A1", "G0", "D0", "E0"]);
        assert_eq!(secondary_ids(&rule), vec!["w0", "t0", "a1", "g0", "d0"]);
    }

    #[test]
    fn unknown_exception_id_is_kept_unresolved() {
        let blueprint =
            Blueprint::new().with_main(BlockCategory::Exception, SlotBlueprint::of("E9"));
        let factory = factory();
        let rule = factory.build(&blueprint);

        assert_eq!(rule.main.exception.id, "E9");
        assert_eq!(
            rule.operator(),
            Err(ConfigError::UnknownOperator {
                block: "E9".to_string(),
                operator: "E9".to_string(),
            })
        );
        assert_eq!(factory.build(&rule.to_blueprint()), rule);
    }

    #[test]
    fn operator_name_selects_its_catalog_block() {
        let blueprint =
            Blueprint::new().with_main(BlockCategory::Exception, SlotBlueprint::of("except"));
        let rule = factory().build(&blueprint);
        assert_eq!(rule.main.exception.id, "E4");
        assert_eq!(rule.operator(), Ok(ExceptionOperator::Except));
    }

    #[test]
    fn details_cannot_replace_the_exception_operator() {
        let blueprint = Blueprint::new().with_main(
            BlockCategory::Exception,
            SlotBlueprint::of("E5").with_details(serde_json::json!({ "operator": "OR", "max": 40 })),
        );
        let rule = factory().build(&blueprint);
        assert_eq!(rule.operator(), Ok(ExceptionOperator::LimitMax));
        assert_eq!(rule.main.exception.exception_details().unwrap().max, None);
    }

    #[test]
    fn slot_case_is_normalized_to_clause() {
        let blueprint = Blueprint::new()
            .with_main(BlockCategory::Amount, SlotBlueprint::of("a3"))
            .with_secondary(BlockCategory::Amount, SlotBlueprint::of("A2"));
        let rule = factory().build(&blueprint);
        assert_eq!(rule.main.amount.id, "A3");
        assert!(rule.main.amount.is_main);
        assert_eq!(rule.secondary.amount.id, "a2");
        assert!(rule.secondary.amount.is_condition);
    }

    #[test]
    fn blueprint_details_override_catalog_defaults() {
        let blueprint = Blueprint::new()
            .with_main(
                BlockCategory::Amount,
                SlotBlueprint::of("A1").with_details(serde_json::json!({ "top": 3 })),
            )
            .with_main(
                BlockCategory::Exception,
                SlotBlueprint::of("E5")
                    .with_details(serde_json::json!({ "operator": "LIMIT_MAX", "max": 40 })),
            );
        let factory = factory();
        let rule = factory.build(&blueprint);

        assert_eq!(
            rule.main.amount.details,
            BlockDetails::Amount(AmountDetails::at_most(3.0))
        );
        assert_eq!(
            rule.main.exception.details,
            BlockDetails::Exception(ExceptionDetails {
                operator: "LIMIT_MAX".to_string(),
                min: None,
                max: Some(40.0),
            })
        );

        // The catalog entry is untouched.
        let catalog_entry = factory.catalog().lookup(BlockCategory::Amount, "A1").unwrap();
        assert_eq!(
            catalog_entry.details,
            BlockDetails::Amount(AmountDetails::at_most(1.0))
        );
    }

    #[test]
    fn partial_details_keep_the_rest_of_the_catalog_payload() {
        let blueprint = Blueprint::new().with_main(
            BlockCategory::Group,
            SlotBlueprint::of("G1").with_details(serde_json::json!({ "roles": ["lead", "nurse"] })),
        );
        let rule = factory().build(&blueprint);
        assert_eq!(
            rule.main.group.details,
            BlockDetails::Group(GroupDetails {
                roles: vec!["lead".to_string(), "nurse".to_string()],
                mode: GroupMode::All,
            })
        );
    }

    #[test]
    fn details_of_the_wrong_shape_are_ignored() {
        let blueprint = Blueprint::new().with_main(
            BlockCategory::Amount,
            SlotBlueprint::of("A1").with_details(serde_json::json!({ "roles": ["nurse"] })),
        );
        let rule = factory().build(&blueprint);
        assert_eq!(
            rule.main.amount.details,
            BlockDetails::Amount(AmountDetails::at_most(1.0))
        );
    }

    #[test]
    fn mutating_a_rule_block_leaves_the_catalog_alone() {
        let factory = factory();
        let mut rule = factory.build(&Blueprint::new());
        rule.main.amount.label = "changed".to_string();
        rule.main.amount.details = BlockDetails::Amount(AmountDetails::at_most(99.0));

        let entry = factory.catalog().default_of(BlockCategory::Amount).unwrap();
        assert_eq!(entry.label, "maximal");
        assert_eq!(entry.details, BlockDetails::Amount(AmountDetails::at_most(1.0)));
    }

    #[test]
    fn blueprint_id_is_kept_and_fresh_ids_are_unique() {
        let factory = factory();
        let kept = factory.build(&Blueprint::new().with_id("rule-7"));
        assert_eq!(kept.id, "rule-7");

        let ids: HashSet<String> = (0..200)
            .map(|_| factory.build(&Blueprint::new()).id)
            .collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn to_blueprint_rebuilds_an_equal_rule() {
        let factory = factory();
        let blueprint = Blueprint::new()
            .with_main(
                BlockCategory::Amount,
                SlotBlueprint::of("A4").with_details(serde_json::json!({ "bottom": 2, "top": 4 })),
            )
            .with_main(BlockCategory::Exception, SlotBlueprint::of("E3"))
            .with_secondary(
                BlockCategory::Group,
                SlotBlueprint::of("g1").with_details(serde_json::json!({ "roles": ["lead"] })),
            );
        let rule = factory.build(&blueprint);
        let rebuilt = factory.build(&rule.to_blueprint());
        assert_eq!(rebuilt, rule);
    }

    #[test]
    fn factory_refuses_catalog_without_defaults() {
        let entries: Vec<BlockDefinition> = BlockCatalog::standard()
            .entries()
            .iter()
            .filter(|b| !(b.category() == BlockCategory::Dependency && b.is_default))
            .cloned()
            .collect();
        let result = RuleFactory::new(Arc::new(BlockCatalog::new(entries)));
        assert!(matches!(
            result,
            Err(ConfigError::MissingDefault {
                category: BlockCategory::Dependency
            })
        ));
    }
}
