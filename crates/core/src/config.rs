use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .filter(|v: &f64| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub rules: RulesConfig,
    pub evaluation: EvaluationConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ROSTER_PROFILE`. When set (e.g. `STAGING`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("ROSTER_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            rules: RulesConfig::from_env_profiled(p),
            evaluation: EvaluationConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  rules:       file={}", self.rules.rules_file.display());
        tracing::info!(
            "  evaluation:  approx_tolerance={}%, parallel_threshold={}",
            self.evaluation.approx_tolerance_percent,
            self.evaluation.parallel_threshold
        );
    }

    /// Return a view safe for API responses.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "rules": { "rules_file": self.rules.rules_file },
            "evaluation": {
                "approx_tolerance_percent": self.evaluation.approx_tolerance_percent,
                "parallel_threshold": self.evaluation.parallel_threshold,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            rules: RulesConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

// ── Rule storage ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    pub rules_file: PathBuf,
}

impl RulesConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            rules_file: PathBuf::from(profiled_env_or(p, "RULES_FILE", "data/rules.csv")),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            rules_file: PathBuf::from("data/rules.csv"),
        }
    }
}

// ── Evaluation ────────────────────────────────────────────────

/// Band width of the "ungefähr" amount, in percent of the literal bound.
pub const DEFAULT_APPROX_TOLERANCE_PERCENT: f64 = 15.0;

/// Batches below this many rules are evaluated on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub approx_tolerance_percent: f64,
    pub parallel_threshold: usize,
}

impl EvaluationConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            approx_tolerance_percent: profiled_env_f64(
                p,
                "APPROX_TOLERANCE_PERCENT",
                DEFAULT_APPROX_TOLERANCE_PERCENT,
            ),
            parallel_threshold: profiled_env_usize(
                p,
                "PARALLEL_THRESHOLD",
                DEFAULT_PARALLEL_THRESHOLD,
            ),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            approx_tolerance_percent: DEFAULT_APPROX_TOLERANCE_PERCENT,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.profile_label(), "default");
        assert_eq!(config.rules.rules_file, PathBuf::from("data/rules.csv"));
        assert_eq!(config.evaluation.approx_tolerance_percent, 15.0);
        assert_eq!(config.evaluation.parallel_threshold, 64);
    }

    #[test]
    fn profiled_lookup_prefers_prefixed_key() {
        // Unique keys so parallel tests do not race on the environment.
        env::set_var("ROSTERTEST_PARALLEL_THRESHOLD", "8");
        let config = Config::for_profile("rostertest");
        assert_eq!(config.profile, "ROSTERTEST");
        assert_eq!(config.evaluation.parallel_threshold, 8);
        env::remove_var("ROSTERTEST_PARALLEL_THRESHOLD");
    }

    #[test]
    fn summary_exposes_evaluation_settings() {
        let summary = Config::default().redacted_summary();
        assert_eq!(summary["profile"], "default");
        assert_eq!(summary["evaluation"]["parallel_threshold"], 64);
    }
}
