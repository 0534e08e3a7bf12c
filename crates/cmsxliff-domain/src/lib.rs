use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Advisory produced by the import gates; surfaced to the user next to the
/// preview instead of blocking the import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImportWarning {
    /// Machine-readable kind, e.g. "stale-version".
    pub kind: String,
    pub message: String,
}

/// What an apply pass did to the content tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImportSummary {
    pub schema_version: u32,
    /// Units in the reconciled document handed to apply.
    pub total_units: usize,
    /// Units actually written into plugin or record fields.
    pub applied_units: usize,
    pub persisted_plugins: usize,
    pub persisted_records: usize,
    /// Group ids whose node vanished between export and import.
    pub skipped_groups: Vec<String>,
}

/// One row of the pre-import preview shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UnitPreview {
    pub unit_id: String,
    pub group_label: String,
    pub field_label: Option<String>,
    pub source: String,
    pub target: String,
}
