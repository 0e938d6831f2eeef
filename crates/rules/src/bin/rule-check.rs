//! rule-check — evaluate the rule table against one facts snapshot.
//!
//! Loads the rule table (CSV), builds every active rule from the standard
//! block catalog and prints one verdict per rule. Rows that could not be
//! loaded are reported as warnings and do not change the exit code.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use roster_core::config::load_dotenv;
use roster_core::{Config, Facts};
use roster_rules::loader::LoadStatus;
use roster_rules::{RuleEvaluator, RuleFactory, RuleStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Evaluate scheduling rules against a facts snapshot.
#[derive(Parser, Debug)]
#[command(name = "rule-check", version, about)]
struct Cli {
    /// Path to the rule table. Defaults to the configured RULES_FILE.
    #[arg(long, env = "RULES_FILE")]
    rules: Option<PathBuf>,

    /// Facts snapshot: inline JSON object or path to a JSON file.
    #[arg(long)]
    facts: String,

    /// Print verdicts as a JSON object keyed by rule id.
    #[arg(long)]
    json: bool,
}

fn read_facts(arg: &str) -> Result<Facts> {
    let text = if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        fs::read_to_string(arg).with_context(|| format!("failed to read facts file {}", arg))?
    };
    serde_json::from_str(&text).context("failed to parse facts JSON")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let rules_path = cli.rules.unwrap_or_else(|| config.rules.rules_file.clone());
    let facts = read_facts(&cli.facts)?;

    let (store, results) = RuleStore::load_file(&rules_path)
        .with_context(|| format!("failed to load rule table {}", rules_path.display()))?;
    let rejected = results
        .iter()
        .filter(|r| !matches!(r.status, LoadStatus::Loaded { .. }))
        .count();
    if rejected > 0 {
        warn!(rejected, "some rule rows were not loaded");
    }

    let factory = RuleFactory::standard().context("standard block catalog is misconfigured")?;
    let evaluator = RuleEvaluator::from_config(&config.evaluation);
    let rules = store.build_rules(&factory);
    info!(rules = rules.len(), "evaluating rules");

    let verdicts = evaluator.evaluate_batch(&rules, &facts);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&verdicts)?);
    } else {
        for rule in &rules {
            if let Some(verdict) = verdicts.get(&rule.id) {
                println!("{}\t{}\t{}", rule.id, verdict, rule.describe());
            }
        }
    }

    Ok(())
}
