//! The seam between the XLIFF pipeline and the content management system.
//!
//! The pipeline only ever touches the tree through [`ContentStore`]; a real
//! CMS binds the trait to its storage, while [`MemoryStore`] backs tests and
//! the file-based CLI.

mod lang;
mod memory;

use cmsxliff_core::{Result, SubjectId};
use serde::{Deserialize, Serialize};

pub use lang::{with_language, with_language_mut, LanguageScope};
pub use memory::{
    MemoryStore, PersistEvent, PluginData, PluginFieldData, RecordData, RecordFieldData,
    SubjectData,
};

/// Declared type of a content field. The first four are the built-in
/// translatable kinds; everything else is an `Other` tag that only becomes
/// translatable through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Char,
    Text,
    Url,
    Slug,
    Other(String),
}

impl FieldKind {
    pub fn tag(&self) -> &str {
        match self {
            FieldKind::Char => "char",
            FieldKind::Text => "text",
            FieldKind::Url => "url",
            FieldKind::Slug => "slug",
            FieldKind::Other(tag) => tag,
        }
    }
}

impl From<String> for FieldKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "char" => FieldKind::Char,
            "text" => FieldKind::Text,
            "url" => FieldKind::Url,
            "slug" => FieldKind::Slug,
            _ => FieldKind::Other(value),
        }
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.tag().to_string()
    }
}

/// A declared field together with its live value in the queried language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Non-empty means the field is an enumerated choice, not free text.
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub value: String,
}

impl FieldSpec {
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }
}

/// Read view of one plugin instance in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginNode {
    pub id: String,
    pub plugin_type: String,
    pub label: String,
    pub fields: Vec<FieldSpec>,
}

/// Addresses a non-plugin record (content object, URL record, extension).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub kind: String,
    pub id: String,
}

impl RecordRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self { kind: kind.into(), id: id.into() }
    }
}

/// A metadata field resolved to the record that actually owns it. The owner
/// may differ from the subject's own content record (e.g. the slug living on
/// a URL record).
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataBinding {
    pub owner: RecordRef,
    pub owner_type: String,
    pub owner_label: String,
    pub field: FieldSpec,
}

/// A satellite record attached to a subject, carrying its own translatable
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionRecord {
    pub record: RecordRef,
    pub record_type: String,
    pub label: String,
    pub fields: Vec<FieldSpec>,
}

/// Identity facts about a subject used by the import gates.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectInfo {
    pub id: SubjectId,
    /// Content version when the host tracks versions.
    pub version: Option<u64>,
    /// Groups content records that are versions of the same logical item.
    pub lineage: Option<String>,
}

impl SubjectInfo {
    /// Placeholder info for a subject the store no longer knows about.
    pub fn unresolved(id: SubjectId) -> Self {
        Self { id, version: None, lineage: None }
    }
}

/// Read/write accessors into the content tree. Reads are side-effect free;
/// the active language is the only piece of ambient state (interior
/// mutability, switched via [`with_language`]/[`with_language_mut`]) and
/// affects metadata/record field resolution the way the host CMS resolves
/// language-sensitive accessors.
pub trait ContentStore {
    fn subject_info(&self, subject: &SubjectId) -> Result<SubjectInfo>;
    fn absolute_path(&self, subject: &SubjectId, language: &str) -> Result<String>;

    /// Declared placeholder slots of a subject, in declaration order.
    fn placeholder_slots(&self, subject: &SubjectId) -> Result<Vec<String>>;
    /// Root plugins of one placeholder in one language, position-ordered.
    fn top_level_plugins(
        &self,
        subject: &SubjectId,
        slot: &str,
        language: &str,
    ) -> Result<Vec<PluginNode>>;
    /// Direct children of a plugin, position-ordered.
    fn child_plugins(&self, plugin_id: &str) -> Result<Vec<PluginNode>>;
    fn find_plugin(&self, plugin_id: &str) -> Result<Option<PluginNode>>;
    fn set_plugin_field(&mut self, plugin_id: &str, field: &str, value: &str) -> Result<()>;
    fn persist_plugin(&mut self, plugin_id: &str) -> Result<()>;

    /// Resolve one metadata field to its owning record and live value in the
    /// active language. `None` when the owning record has no such field.
    fn metadata_field(&self, subject: &SubjectId, field_name: &str)
        -> Result<Option<MetadataBinding>>;
    /// The subject's backing record with all of its declared fields, values
    /// in the active language. Used for model subjects whose whole record is
    /// the metadata.
    fn subject_record_fields(&self, subject: &SubjectId) -> Result<(RecordRef, Vec<FieldSpec>)>;
    /// Extension records attached to the subject, values in the active
    /// language.
    fn extension_records(&self, subject: &SubjectId) -> Result<Vec<ExtensionRecord>>;
    fn find_record(&self, record: &RecordRef) -> Result<Option<Vec<FieldSpec>>>;
    /// Write a record field in the active language.
    fn set_record_field(&mut self, record: &RecordRef, field: &str, value: &str) -> Result<()>;
    fn persist_record(&mut self, record: &RecordRef) -> Result<()>;

    fn active_language(&self) -> String;
    fn set_active_language(&self, code: &str);
}
