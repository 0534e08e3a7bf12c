use serde::{Deserialize, Serialize};

use crate::ident::unit_id_format;

/// One translatable field occurrence: the source text of a single field on a
/// content node, plus the translated target once a translator filled it in.
///
/// Units are value types. Every extraction or parse pass creates fresh ones;
/// reconciliation matches them by `(group_id, field_name)`, never by object
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Owning content node: a plugin instance id, or a synthetic
    /// `METADATA__…`/`EXTENSION__…` group.
    pub group_id: String,
    /// Type name of the owning node, carried as a note for translators.
    pub group_type: String,
    /// Display name of the owning node, carried as a note for translators.
    pub group_label: String,
    pub field_name: String,
    /// Dispatch tag selecting custom extractor/importer behavior.
    pub field_type: String,
    #[serde(default)]
    pub field_label: Option<String>,
    pub source: String,
    #[serde(default)]
    pub target: String,
    /// Hard ceiling on the target length; `None` means unbounded.
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl Unit {
    /// Stable composite key: `{group_id}__{field_name}`.
    pub fn unit_id(&self) -> String {
        unit_id_format(&[&self.group_id, &self.field_name])
    }

    /// Length in characters, so limits behave the same for non-ASCII text.
    pub fn target_length(&self) -> usize {
        self.target.chars().count()
    }

    pub fn is_over_length(&self) -> bool {
        match self.max_length {
            Some(max_length) => self.target_length() > max_length,
            None => false,
        }
    }

    /// The `<note>` texts in wire order: group type, group label, field
    /// label, plus a max-length hint when a limit is set.
    pub fn notes(&self) -> Vec<String> {
        let mut notes = vec![
            self.group_type.clone(),
            self.group_label.clone(),
            self.field_label.clone().unwrap_or_default(),
        ];
        if let Some(max_length) = self.max_length {
            notes.push(format!("Max characters: {max_length}"));
        }
        notes
    }
}
