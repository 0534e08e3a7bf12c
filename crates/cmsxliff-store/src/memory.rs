use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use cmsxliff_core::{Result, SubjectId, XliffError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    ContentStore, ExtensionRecord, FieldKind, FieldSpec, MetadataBinding, PluginNode, RecordRef,
    SubjectInfo,
};

/// A whole content tree held in memory, loadable from and savable to a JSON
/// file. Stands in for the CMS storage in tests and behind the CLI.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    pub default_language: String,
    #[serde(default)]
    pub subjects: Vec<SubjectData>,
    #[serde(default)]
    pub plugins: Vec<PluginData>,
    #[serde(default)]
    pub records: Vec<RecordData>,
    #[serde(skip)]
    active_language: RefCell<String>,
    #[serde(skip)]
    persist_log: Vec<PersistEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectData {
    pub kind: String,
    pub id: String,
    /// Ties content records that are versions of the same logical item.
    #[serde(default)]
    pub lineage: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    /// Absolute URL path per language.
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
    /// Declared placeholder slots, in declaration order.
    #[serde(default)]
    pub placeholders: Vec<String>,
    /// The record carrying this subject's metadata fields.
    #[serde(default)]
    pub metadata_record: Option<RecordRef>,
    /// Per-field owner overrides (e.g. the slug living on a URL record).
    #[serde(default)]
    pub field_owners: BTreeMap<String, RecordRef>,
    /// Extension records attached to this subject.
    #[serde(default)]
    pub extensions: Vec<RecordRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginData {
    pub id: String,
    pub subject_kind: String,
    pub subject_id: String,
    pub placeholder: String,
    pub language: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub position: i64,
    pub plugin_type: String,
    pub label: String,
    #[serde(default)]
    pub fields: Vec<PluginFieldData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginFieldData {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordData {
    pub kind: String,
    pub id: String,
    /// Type name, e.g. "PageContent"; carried into unit notes.
    pub type_name: String,
    /// Display name, e.g. "page content".
    pub label: String,
    #[serde(default)]
    pub fields: Vec<RecordFieldData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFieldData {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub choices: Vec<String>,
    /// Value per language.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// One persist call, in call order. Tests assert write granularity and
/// partial-apply behavior against this log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistEvent {
    Plugin(String),
    Record(RecordRef),
}

impl MemoryStore {
    pub fn new(default_language: &str) -> Self {
        Self {
            default_language: default_language.to_string(),
            active_language: RefCell::new(default_language.to_string()),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let store: MemoryStore = serde_json::from_str(json)
            .map_err(|e| XliffError::Store(format!("invalid tree file: {e}")))?;
        let default_language = store.default_language.clone();
        store.set_active_language(&default_language);
        Ok(store)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| XliffError::Store(format!("failed to serialize tree: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| XliffError::Store(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .map_err(|e| XliffError::Store(format!("failed to write {}: {e}", path.display())))
    }

    pub fn persist_events(&self) -> &[PersistEvent] {
        &self.persist_log
    }

    fn find_subject(&self, subject: &SubjectId) -> Result<&SubjectData> {
        self.subjects
            .iter()
            .find(|s| s.kind == subject.kind.as_str() && s.id == subject.id)
            .ok_or_else(|| XliffError::Store(format!("subject {subject} does not exist")))
    }

    fn find_plugin_data(&self, plugin_id: &str) -> Option<&PluginData> {
        self.plugins.iter().find(|p| p.id == plugin_id)
    }

    fn find_record_data(&self, record: &RecordRef) -> Option<&RecordData> {
        self.records
            .iter()
            .find(|r| r.kind == record.kind && r.id == record.id)
    }

    fn plugin_node(&self, data: &PluginData) -> PluginNode {
        PluginNode {
            id: data.id.clone(),
            plugin_type: data.plugin_type.clone(),
            label: data.label.clone(),
            fields: data
                .fields
                .iter()
                .map(|f| FieldSpec {
                    name: f.name.clone(),
                    label: f.label.clone(),
                    kind: f.kind.clone(),
                    max_length: f.max_length,
                    choices: f.choices.clone(),
                    value: f.value.clone(),
                })
                .collect(),
        }
    }

    fn record_field_spec(&self, field: &RecordFieldData) -> FieldSpec {
        let language = self.active_language();
        FieldSpec {
            name: field.name.clone(),
            label: field.label.clone(),
            kind: field.kind.clone(),
            max_length: field.max_length,
            choices: field.choices.clone(),
            value: field.values.get(&language).cloned().unwrap_or_default(),
        }
    }

    fn record_field_specs(&self, data: &RecordData) -> Vec<FieldSpec> {
        data.fields.iter().map(|f| self.record_field_spec(f)).collect()
    }

    fn metadata_record_ref(&self, subject: &SubjectId) -> Result<RecordRef> {
        let data = self.find_subject(subject)?;
        data.metadata_record.clone().ok_or_else(|| {
            XliffError::Extraction(format!("did not find a metadata record for {subject}"))
        })
    }
}

impl ContentStore for MemoryStore {
    fn subject_info(&self, subject: &SubjectId) -> Result<SubjectInfo> {
        let data = self.find_subject(subject)?;
        Ok(SubjectInfo {
            id: subject.clone(),
            version: data.version,
            lineage: data.lineage.clone(),
        })
    }

    fn absolute_path(&self, subject: &SubjectId, language: &str) -> Result<String> {
        let data = self.find_subject(subject)?;
        Ok(data.paths.get(language).cloned().unwrap_or_default())
    }

    fn placeholder_slots(&self, subject: &SubjectId) -> Result<Vec<String>> {
        Ok(self.find_subject(subject)?.placeholders.clone())
    }

    fn top_level_plugins(
        &self,
        subject: &SubjectId,
        slot: &str,
        language: &str,
    ) -> Result<Vec<PluginNode>> {
        let mut matches: Vec<&PluginData> = self
            .plugins
            .iter()
            .filter(|p| {
                p.subject_kind == subject.kind.as_str()
                    && p.subject_id == subject.id
                    && p.placeholder == slot
                    && p.language == language
                    && p.parent.is_none()
            })
            .collect();
        matches.sort_by_key(|p| p.position);
        Ok(matches.into_iter().map(|p| self.plugin_node(p)).collect())
    }

    fn child_plugins(&self, plugin_id: &str) -> Result<Vec<PluginNode>> {
        let mut matches: Vec<&PluginData> = self
            .plugins
            .iter()
            .filter(|p| p.parent.as_deref() == Some(plugin_id))
            .collect();
        matches.sort_by_key(|p| p.position);
        Ok(matches.into_iter().map(|p| self.plugin_node(p)).collect())
    }

    fn find_plugin(&self, plugin_id: &str) -> Result<Option<PluginNode>> {
        Ok(self.find_plugin_data(plugin_id).map(|p| self.plugin_node(p)))
    }

    fn set_plugin_field(&mut self, plugin_id: &str, field: &str, value: &str) -> Result<()> {
        let plugin = self
            .plugins
            .iter_mut()
            .find(|p| p.id == plugin_id)
            .ok_or_else(|| XliffError::Store(format!("plugin {plugin_id} does not exist")))?;
        let slot = plugin
            .fields
            .iter_mut()
            .find(|f| f.name == field)
            .ok_or_else(|| {
                XliffError::Store(format!("plugin {plugin_id} has no field \"{field}\""))
            })?;
        slot.value = value.to_string();
        Ok(())
    }

    fn persist_plugin(&mut self, plugin_id: &str) -> Result<()> {
        if self.find_plugin_data(plugin_id).is_none() {
            return Err(XliffError::Store(format!("plugin {plugin_id} does not exist")));
        }
        self.persist_log.push(PersistEvent::Plugin(plugin_id.to_string()));
        Ok(())
    }

    fn metadata_field(
        &self,
        subject: &SubjectId,
        field_name: &str,
    ) -> Result<Option<MetadataBinding>> {
        let data = self.find_subject(subject)?;
        let owner = match data.field_owners.get(field_name) {
            Some(owner) => owner.clone(),
            None => self.metadata_record_ref(subject)?,
        };
        let Some(record) = self.find_record_data(&owner) else {
            return Err(XliffError::Store(format!(
                "record \"{}\" with id {} does not exist",
                owner.kind, owner.id
            )));
        };
        let Some(field) = record.fields.iter().find(|f| f.name == field_name) else {
            debug!(subject = %subject, field = field_name, "metadata field not declared, skipping");
            return Ok(None);
        };
        Ok(Some(MetadataBinding {
            owner,
            owner_type: record.type_name.clone(),
            owner_label: record.label.clone(),
            field: self.record_field_spec(field),
        }))
    }

    fn subject_record_fields(&self, subject: &SubjectId) -> Result<(RecordRef, Vec<FieldSpec>)> {
        let owner = self.metadata_record_ref(subject)?;
        let record = self.find_record_data(&owner).ok_or_else(|| {
            XliffError::Store(format!(
                "record \"{}\" with id {} does not exist",
                owner.kind, owner.id
            ))
        })?;
        Ok((owner, self.record_field_specs(record)))
    }

    fn extension_records(&self, subject: &SubjectId) -> Result<Vec<ExtensionRecord>> {
        let data = self.find_subject(subject)?;
        let mut out = Vec::new();
        for reference in &data.extensions {
            let Some(record) = self.find_record_data(reference) else {
                debug!(kind = %reference.kind, id = %reference.id, "extension record missing, skipping");
                continue;
            };
            out.push(ExtensionRecord {
                record: reference.clone(),
                record_type: record.type_name.clone(),
                label: record.label.clone(),
                fields: self.record_field_specs(record),
            });
        }
        Ok(out)
    }

    fn find_record(&self, record: &RecordRef) -> Result<Option<Vec<FieldSpec>>> {
        Ok(self.find_record_data(record).map(|r| self.record_field_specs(r)))
    }

    fn set_record_field(&mut self, record: &RecordRef, field: &str, value: &str) -> Result<()> {
        let language = self.active_language();
        let data = self
            .records
            .iter_mut()
            .find(|r| r.kind == record.kind && r.id == record.id)
            .ok_or_else(|| {
                XliffError::Store(format!(
                    "record \"{}\" with id {} does not exist",
                    record.kind, record.id
                ))
            })?;
        let slot = data.fields.iter_mut().find(|f| f.name == field).ok_or_else(|| {
            XliffError::Store(format!(
                "record \"{}\" with id {} has no field \"{field}\"",
                record.kind, record.id
            ))
        })?;
        slot.values.insert(language, value.to_string());
        Ok(())
    }

    fn persist_record(&mut self, record: &RecordRef) -> Result<()> {
        if self.find_record_data(record).is_none() {
            return Err(XliffError::Store(format!(
                "record \"{}\" with id {} does not exist",
                record.kind, record.id
            )));
        }
        self.persist_log.push(PersistEvent::Record(record.clone()));
        Ok(())
    }

    fn active_language(&self) -> String {
        let current = self.active_language.borrow();
        if current.is_empty() {
            self.default_language.clone()
        } else {
            current.clone()
        }
    }

    fn set_active_language(&self, code: &str) {
        *self.active_language.borrow_mut() = code.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmsxliff_core::SubjectKind;

    fn store_with_page() -> MemoryStore {
        let mut store = MemoryStore::new("en");
        store.subjects.push(SubjectData {
            kind: "page".into(),
            id: "1".into(),
            lineage: None,
            version: None,
            paths: BTreeMap::from([("en".into(), "/en/home".into())]),
            placeholders: vec!["content".into()],
            metadata_record: Some(RecordRef::new("page_content", "10")),
            field_owners: BTreeMap::new(),
            extensions: vec![],
        });
        store.plugins.push(PluginData {
            id: "100".into(),
            subject_kind: "page".into(),
            subject_id: "1".into(),
            placeholder: "content".into(),
            language: "en".into(),
            parent: None,
            position: 1,
            plugin_type: "TextPlugin".into(),
            label: "Text".into(),
            fields: vec![PluginFieldData {
                name: "body".into(),
                label: "Body".into(),
                kind: FieldKind::Text,
                max_length: None,
                choices: vec![],
                value: "Hello".into(),
            }],
        });
        store.records.push(RecordData {
            kind: "page_content".into(),
            id: "10".into(),
            type_name: "PageContent".into(),
            label: "page content".into(),
            fields: vec![RecordFieldData {
                name: "title".into(),
                label: "Title".into(),
                kind: FieldKind::Char,
                max_length: Some(255),
                choices: vec![],
                values: BTreeMap::from([("en".into(), "Home".into()), ("de".into(), "Start".into())]),
            }],
        });
        store
    }

    #[test]
    fn record_values_follow_the_active_language() {
        let store = store_with_page();
        let subject = SubjectId::new(SubjectKind::Page, "1");
        let binding = store.metadata_field(&subject, "title").unwrap().unwrap();
        assert_eq!(binding.field.value, "Home");

        store.set_active_language("de");
        let binding = store.metadata_field(&subject, "title").unwrap().unwrap();
        assert_eq!(binding.field.value, "Start");
    }

    #[test]
    fn persist_calls_are_logged_in_order() {
        let mut store = store_with_page();
        store.persist_plugin("100").unwrap();
        store.persist_record(&RecordRef::new("page_content", "10")).unwrap();
        assert_eq!(
            store.persist_events(),
            &[
                PersistEvent::Plugin("100".into()),
                PersistEvent::Record(RecordRef::new("page_content", "10")),
            ]
        );
    }

    #[test]
    fn json_round_trip_preserves_the_tree() {
        let store = store_with_page();
        let json = store.to_json().unwrap();
        let reloaded = MemoryStore::from_json(&json).unwrap();
        assert_eq!(reloaded.subjects.len(), 1);
        assert_eq!(reloaded.plugins.len(), 1);
        assert_eq!(reloaded.active_language(), "en");
    }

    #[test]
    fn unknown_subject_is_a_store_error() {
        let store = store_with_page();
        let missing = SubjectId::new(SubjectKind::Page, "999");
        assert!(matches!(
            store.subject_info(&missing),
            Err(XliffError::Store(_))
        ));
    }
}
