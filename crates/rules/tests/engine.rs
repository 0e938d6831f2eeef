//! End-to-end tests: the sample rule table in `data/rules.csv` goes through
//! catalog, factory and evaluator.

use std::path::PathBuf;

use chrono::NaiveDate;
use roster_core::{Facts, Shift};
use roster_rules::loader::LoadStatus;
use roster_rules::{BlockCatalog, BlockCategory, RuleEvaluator, RuleFactory, RuleStore, Verdict};

/// Integration tests run from the crate directory, so we go up two levels.
fn sample_table() -> PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/rules.csv")
}

fn load_rules() -> Vec<roster_rules::Rule> {
    let (store, _) = RuleStore::load_file(&sample_table()).unwrap();
    store.build_rules(&RuleFactory::standard().unwrap())
}

/// Monday morning, week 12: two nurses, one trainee, a doctor, no lead.
fn monday_morning() -> Facts {
    Facts::new()
        .with_value(2.0)
        .with_date(NaiveDate::from_ymd_opt(2024, 3, 18).unwrap())
        .with_shift(Shift::Morning)
        .with_roles(["nurse", "doctor"])
        .with_role_count("nurse", 2)
        .with_role_count("trainee", 1)
        .with_role_count("doctor", 1)
        .with_limit_value(44.0)
}

#[test]
fn sample_table_loads() {
    let (store, results) = RuleStore::load_file(&sample_table()).unwrap();
    assert_eq!(results.len(), 6);
    assert_eq!(results.iter().filter(|r| r.status.is_loaded()).count(), 5);
    assert!(matches!(results[5].status, LoadStatus::Skipped { .. }));
    assert_eq!(store.raw().len(), 6);
    assert!(store.get("max-shifts-week").is_some());
}

#[test]
fn sample_rules_against_monday_morning() {
    let rules = load_rules();
    let verdicts = RuleEvaluator::default().evaluate_batch(&rules, &monday_morning());

    assert_eq!(verdicts.len(), 5);
    assert_eq!(verdicts["max-shifts-week"], Verdict::Satisfied);
    assert_eq!(verdicts["weekend-approx"], Verdict::Violated);
    assert_eq!(verdicts["trainee-needs-nurse"], Verdict::Satisfied);
    assert_eq!(verdicts["morning-team"], Verdict::Satisfied);
    assert_eq!(verdicts["overtime-cap"], Verdict::Violated);
}

#[test]
fn lead_presence_vetoes_the_shift_cap() {
    let rules = load_rules();
    let facts = monday_morning().with_role_count("lead", 1);
    let verdicts = RuleEvaluator::default().evaluate_batch(&rules, &facts);
    assert_eq!(verdicts["max-shifts-week"], Verdict::Violated);
}

#[test]
fn overtime_limit_applies_within_band() {
    let rules = load_rules();
    let evaluator = RuleEvaluator::default();

    let within = monday_morning().with_value(38.0);
    assert_eq!(evaluator.evaluate_batch(&rules, &within)["overtime-cap"], Verdict::Satisfied);

    let over = within.with_limit_value(46.0);
    assert_eq!(evaluator.evaluate_batch(&rules, &over)["overtime-cap"], Verdict::Violated);
}

#[test]
fn missing_facts_are_unknown_not_false() {
    let rules = load_rules();
    let verdicts = RuleEvaluator::default().evaluate_batch(&rules, &Facts::new().with_value(2.0));

    assert_eq!(
        verdicts["weekend-approx"],
        Verdict::Unknown {
            field: "current_date".to_string()
        }
    );
    assert_eq!(
        verdicts["morning-team"],
        Verdict::Unknown {
            field: "present_roles".to_string()
        }
    );
    assert!(verdicts.values().all(|v| !v.is_decided()));
}

#[test]
fn parallel_batch_matches_sequential() {
    let rules = load_rules();
    let facts = monday_morning();
    let sequential = RuleEvaluator {
        parallel_threshold: usize::MAX,
        ..RuleEvaluator::default()
    };
    let parallel = RuleEvaluator {
        parallel_threshold: 0,
        ..RuleEvaluator::default()
    };
    assert_eq!(
        sequential.evaluate_batch(&rules, &facts),
        parallel.evaluate_batch(&rules, &facts)
    );
}

#[test]
fn saved_table_rebuilds_identical_rules() {
    let (store, _) = RuleStore::load_file(&sample_table()).unwrap();
    let dir = tempfile::TempDir::new().expect("create tempdir");
    let path = dir.path().join("rules.csv");
    store.save(&path).unwrap();

    let factory = RuleFactory::standard().unwrap();
    let (reloaded, _) = RuleStore::load_file(&path).unwrap();
    assert_eq!(reloaded.build_rules(&factory), store.build_rules(&factory));
}

#[test]
fn empty_blueprint_uses_catalog_defaults() {
    let catalog = BlockCatalog::standard();
    assert!(catalog.validate().is_empty());

    let rule = RuleFactory::standard()
        .unwrap()
        .build(&roster_rules::Blueprint::default());
    let main: Vec<&str> = rule.main.blocks().into_iter().map(|b| b.id.as_str()).collect();
    let secondary: Vec<&str> = rule
        .secondary
        .conditions()
        .into_iter()
        .map(|b| b.id.as_str())
        .collect();
    assert_eq!(main, vec!["W0", "T0", "A1", "G0", "D0", "E0"]);
    assert_eq!(secondary, vec!["w0", "t0", "a1", "g0", "d0"]);
    assert_eq!(rule.main.amount.category(), BlockCategory::Amount);
}
