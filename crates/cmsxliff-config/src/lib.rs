//! Process-wide configuration, built once at startup and passed by reference
//! into the extractor, codec and reconciler.
//!
//! The data-only part loads from `cmsxliff.toml` (CWD first, then the user
//! config dir). The registries hold code and are populated programmatically
//! by the embedder after loading.

use std::collections::BTreeMap;

use cmsxliff_core::{SubjectKind, ToolInfo, Unit};
use cmsxliff_store::{FieldSpec, PluginNode};
use serde::Deserialize;

/// Structural field names that are never translated, whatever their type.
pub const RESERVED_FIELD_NAMES: &[&str] = &["language", "path", "plugin_type", "rte"];

/// What to do when the import gates detect a version mismatch between the
/// exported record and the currently edited one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalenessPolicy {
    /// Surface an advisory warning next to the preview.
    #[default]
    Warn,
    /// Refuse the import.
    Fail,
}

/// One metadata field to extract: field name plus the label shown to
/// translators.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetadataFieldSpec {
    pub name: String,
    pub label: String,
}

impl MetadataFieldSpec {
    pub fn new(name: &str, label: &str) -> Self {
        Self { name: name.into(), label: label.into() }
    }
}

/// Per-record-kind adjustment of the metadata field list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelMetadataOverride {
    #[serde(default)]
    pub include: Vec<MetadataFieldSpec>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Everything a custom extractor needs to build units for one field.
pub struct FieldExtractContext<'a> {
    pub group_id: &'a str,
    pub group_type: &'a str,
    pub group_label: &'a str,
    pub field: &'a FieldSpec,
    pub source: &'a str,
}

/// Emits units for a field type with composite content (e.g. rich text
/// embedding several sub-strings). May emit zero, one or many units.
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, ctx: &FieldExtractContext<'_>) -> Vec<Unit>;
}

/// Inverse of a custom extractor: turns a translated unit into the concrete
/// `(field, value)` assignments to write on the owning node.
pub trait FieldImporter: Send + Sync {
    fn assignments(&self, unit: &Unit) -> Vec<(String, String)>;
}

/// Domain-specific veto over field translatability, applied on top of the
/// built-in eligibility checks. `node` is present for plugin fields and
/// absent for metadata/extension fields.
pub trait FieldValidator: Send + Sync {
    fn is_translatable(&self, field: &FieldSpec, node: Option<&PluginNode>) -> bool;
}

/// The runtime configuration object. Data fields are public; the registries
/// go through the `register_*`/lookup methods.
pub struct XliffConfig {
    pub tool: ToolInfo,
    /// Field-kind tags translatable in addition to the built-in ones.
    pub extra_field_kinds: Vec<String>,
    /// Ordered metadata fields extracted from page and alias subjects.
    pub metadata_fields: Vec<MetadataFieldSpec>,
    /// Metadata list adjustments keyed by record kind.
    pub model_metadata: BTreeMap<String, ModelMetadataOverride>,
    pub staleness: StalenessPolicy,
    extractors: BTreeMap<String, Box<dyn FieldExtractor>>,
    importers: BTreeMap<String, Box<dyn FieldImporter>>,
    validators: Vec<Box<dyn FieldValidator>>,
}

impl Default for XliffConfig {
    fn default() -> Self {
        Self {
            tool: ToolInfo::default(),
            extra_field_kinds: Vec::new(),
            metadata_fields: vec![
                MetadataFieldSpec::new("title", "Title"),
                MetadataFieldSpec::new("slug", "Slug"),
                MetadataFieldSpec::new("menu_title", "Menu Title"),
                MetadataFieldSpec::new("page_title", "Page Title"),
                MetadataFieldSpec::new("meta_description", "Description meta tag"),
            ],
            model_metadata: BTreeMap::new(),
            staleness: StalenessPolicy::default(),
            extractors: BTreeMap::new(),
            importers: BTreeMap::new(),
            validators: Vec::new(),
        }
    }
}

impl XliffConfig {
    pub fn register_extractor(&mut self, tag: impl Into<String>, extractor: Box<dyn FieldExtractor>) {
        self.extractors.insert(tag.into(), extractor);
    }

    pub fn field_extractor(&self, tag: &str) -> Option<&dyn FieldExtractor> {
        self.extractors.get(tag).map(|e| e.as_ref())
    }

    pub fn register_importer(&mut self, tag: impl Into<String>, importer: Box<dyn FieldImporter>) {
        self.importers.insert(tag.into(), importer);
    }

    pub fn field_importer(&self, tag: &str) -> Option<&dyn FieldImporter> {
        self.importers.get(tag).map(|i| i.as_ref())
    }

    pub fn register_validator(&mut self, validator: Box<dyn FieldValidator>) {
        self.validators.push(validator);
    }

    pub fn validators(&self) -> &[Box<dyn FieldValidator>] {
        &self.validators
    }

    /// The configured metadata list for page/alias subjects; model subjects
    /// take all fields of their backing record instead.
    pub fn metadata_spec_for(&self, kind: &SubjectKind) -> Option<&[MetadataFieldSpec]> {
        match kind {
            SubjectKind::Page | SubjectKind::Alias => Some(&self.metadata_fields),
            SubjectKind::Model(_) => None,
        }
    }

    pub fn from_file_config(file: FileConfig) -> Self {
        let mut config = Self::default();
        if let Some(name) = file.tool_name {
            config.tool.name = name;
        }
        if let Some(company) = file.tool_company {
            config.tool.company = company;
        }
        if let Some(staleness) = file.staleness {
            config.staleness = staleness;
        }
        if let Some(kinds) = file.extra_field_kinds {
            config.extra_field_kinds = kinds;
        }
        if let Some(fields) = file.metadata_fields {
            config.metadata_fields = fields;
        }
        if let Some(models) = file.model_metadata {
            config.model_metadata = models;
        }
        config
    }
}

/// The serializable subset of the configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub tool_name: Option<String>,
    pub tool_company: Option<String>,
    pub staleness: Option<StalenessPolicy>,
    pub extra_field_kinds: Option<Vec<String>>,
    pub metadata_fields: Option<Vec<MetadataFieldSpec>>,
    pub model_metadata: Option<BTreeMap<String, ModelMetadataOverride>>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    Other(String),
}

/// Search order: `CWD/cmsxliff.toml`, then
/// `<config_dir>/cmsxliff/cmsxliff.toml`. Earlier files win field by field.
pub fn load_file_config() -> Result<FileConfig, ConfigError> {
    let mut merged = FileConfig::default();
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join("cmsxliff.toml");
        if let Ok(text) = std::fs::read_to_string(&path) {
            let cfg = toml::from_str::<FileConfig>(&text)
                .map_err(|e| ConfigError::Other(format!("{}: {e}", path.display())))?;
            merged = merge(merged, cfg);
        }
    }
    if let Some(base) = dirs::config_dir() {
        let path = base.join("cmsxliff").join("cmsxliff.toml");
        if let Ok(text) = std::fs::read_to_string(&path) {
            let cfg = toml::from_str::<FileConfig>(&text)
                .map_err(|e| ConfigError::Other(format!("{}: {e}", path.display())))?;
            merged = merge(merged, cfg);
        }
    }
    Ok(merged)
}

/// Load the runtime configuration, falling back to defaults when no file is
/// present or readable.
pub fn load() -> XliffConfig {
    XliffConfig::from_file_config(load_file_config().unwrap_or_default())
}

fn merge(mut a: FileConfig, b: FileConfig) -> FileConfig {
    if a.tool_name.is_none() {
        a.tool_name = b.tool_name;
    }
    if a.tool_company.is_none() {
        a.tool_company = b.tool_company;
    }
    if a.staleness.is_none() {
        a.staleness = b.staleness;
    }
    if a.extra_field_kinds.is_none() {
        a.extra_field_kinds = b.extra_field_kinds;
    }
    if a.metadata_fields.is_none() {
        a.metadata_fields = b.metadata_fields;
    }
    if a.model_metadata.is_none() {
        a.model_metadata = b.model_metadata;
    }
    a
}
