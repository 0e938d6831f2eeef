//! Scheduling-constraint rule engine.
//!
//! This crate provides:
//! - A static catalog of typed building blocks with derived condition twins
//! - A permissive factory resolving partial blueprints into complete rules
//! - Category predicates and exception operators evaluating rules against facts
//! - A CSV-backed rule table store with per-row load results

pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod factory;
mod fuzzy;
pub mod loader;
pub mod schema;

pub use catalog::BlockCatalog;
pub use error::{ConfigError, EvalError};
pub use evaluator::{combine, RuleEvaluator, Verdict};
pub use factory::RuleFactory;
pub use loader::{RuleRow, RuleStore};
pub use schema::{BlockCategory, BlockDefinition, Blueprint, ExceptionOperator, Rule};
