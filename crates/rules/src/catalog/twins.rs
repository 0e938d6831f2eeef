//! Derivation of lowercase condition twins.

use std::collections::HashSet;

use crate::schema::BlockDefinition;

/// Append a condition twin for every uppercase main block that lacks one.
///
/// Authored lowercase entries are never overwritten, and twins are only
/// added for ids not yet present, so applying this twice yields the same
/// list as applying it once.
pub fn derive_condition_twins(mut entries: Vec<BlockDefinition>) -> Vec<BlockDefinition> {
    let mut known: HashSet<String> = entries.iter().map(|b| b.id.clone()).collect();
    let twins: Vec<BlockDefinition> = entries
        .iter()
        .filter_map(BlockDefinition::condition_twin)
        .filter(|twin| known.insert(twin.id.clone()))
        .collect();
    entries.extend(twins);
    entries
}
