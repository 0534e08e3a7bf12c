use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ident::SubjectId;
use crate::unit::Unit;

/// The export/import envelope: language pair, subject identity and the
/// ordered unit list. Unit order is tree traversal order; it matters for
/// human review, not for correctness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub source_language: String,
    pub target_language: String,
    pub subject: SubjectId,
    /// Human-readable locator (URL path) for display only, never identity.
    pub subject_path: String,
    pub units: Vec<Unit>,
}

impl Document {
    pub fn tool_id(&self) -> String {
        self.subject.tool_id()
    }

    /// Units partitioned by group id, in first-seen group order.
    pub fn grouped_units(&self) -> Vec<(String, Vec<&Unit>)> {
        group_units_by_group_id(&self.units)
    }
}

/// Stable collect-by-key grouping. All occurrences of a group id end up in
/// one group even when they are not adjacent in the list; group order is
/// first-seen order and units keep their relative order within a group.
pub fn group_units_by_group_id(units: &[Unit]) -> Vec<(String, Vec<&Unit>)> {
    let mut groups: Vec<(String, Vec<&Unit>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for unit in units {
        match index.get(unit.group_id.as_str()) {
            Some(&at) => groups[at].1.push(unit),
            None => {
                index.insert(unit.group_id.as_str(), groups.len());
                groups.push((unit.group_id.clone(), vec![unit]));
            }
        }
    }
    groups
}
