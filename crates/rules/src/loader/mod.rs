//! Rule table persistence.
//!
//! Rules are stored one per row in a CSV table with the columns
//! `id, type, condition1, operator, condition2, description`. The
//! [`RuleStore`] owns the parsed table; collaborators pass it around
//! explicitly and call [`RuleStore::save`] to persist edits.

mod core;
pub mod csv;
mod error;


pub use self::core::{RuleRow, RuleStore, MANDATORY_COLUMNS};
pub use self::csv::{CsvTable, RuleRecord};
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
