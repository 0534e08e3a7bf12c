//! Tree walker: turns the plugin tree, metadata fields and extension records
//! of one subject into an ordered list of translation units.

use cmsxliff_config::{FieldExtractContext, XliffConfig, RESERVED_FIELD_NAMES};
use cmsxliff_core::{
    ensure_plain_component, extension_group_id, metadata_group_id, Result, SubjectId, SubjectKind,
    Unit, XliffError,
};
use cmsxliff_store::{
    with_language, ContentStore, FieldKind, FieldSpec, MetadataBinding, PluginNode,
};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Also extract the subject's metadata fields (title, slug, ...).
    pub include_metadata: bool,
    /// Accept subjects without any plugin content. Used by bulk export
    /// where some subjects carry metadata only.
    pub allow_empty: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { include_metadata: true, allow_empty: false }
    }
}

pub fn has_translatable_kind(field: &FieldSpec, config: &XliffConfig) -> bool {
    match &field.kind {
        FieldKind::Char | FieldKind::Text | FieldKind::Url | FieldKind::Slug => true,
        FieldKind::Other(tag) => config.extra_field_kinds.iter().any(|t| t == tag),
    }
}

pub fn is_not_reserved(name: &str) -> bool {
    !RESERVED_FIELD_NAMES.contains(&name)
}

pub fn is_field_to_translate(
    field: &FieldSpec,
    node: Option<&PluginNode>,
    config: &XliffConfig,
) -> bool {
    has_translatable_kind(field, config)
        && is_not_reserved(&field.name)
        && !field.has_choices()
        && config.validators().iter().all(|v| v.is_translatable(field, node))
}

/// Emit units for one field, delegating to a registered custom extractor
/// when the field's type tag has one.
fn units_from_field(
    group_id: &str,
    group_type: &str,
    group_label: &str,
    field: &FieldSpec,
    field_label: &str,
    config: &XliffConfig,
) -> Result<Vec<Unit>> {
    ensure_plain_component(&field.name, "field name")?;
    if let Some(extractor) = config.field_extractor(field.kind.tag()) {
        return Ok(extractor.extract(&FieldExtractContext {
            group_id,
            group_type,
            group_label,
            field,
            source: &field.value,
        }));
    }
    Ok(vec![Unit {
        group_id: group_id.to_string(),
        group_type: group_type.to_string(),
        group_label: group_label.to_string(),
        field_name: field.name.clone(),
        field_type: field.kind.tag().to_string(),
        field_label: Some(field_label.to_string()),
        source: field.value.clone(),
        target: String::new(),
        max_length: field.max_length,
    }])
}

fn units_from_plugin(node: &PluginNode, config: &XliffConfig) -> Result<Vec<Unit>> {
    let mut units = Vec::new();
    for field in &node.fields {
        if !is_field_to_translate(field, Some(node), config) {
            continue;
        }
        // Only non-empty source text round-trips.
        if field.value.is_empty() {
            continue;
        }
        units.extend(units_from_field(
            &node.id,
            &node.plugin_type,
            &node.label,
            field,
            &field.label,
            config,
        )?);
    }
    Ok(units)
}

/// Pre-order DFS: a node's own units come before its children's, children
/// before the next sibling, matching the visual document order.
fn units_from_plugin_tree<S: ContentStore + ?Sized>(
    store: &S,
    config: &XliffConfig,
    node: &PluginNode,
) -> Result<Vec<Unit>> {
    ensure_plain_component(&node.id, "plugin id")?;
    debug!(plugin = %node.id, plugin_type = %node.plugin_type, "extracting plugin");
    let mut units = units_from_plugin(node, config)?;
    for child in store.child_plugins(&node.id)? {
        units.extend(units_from_plugin_tree(store, config, &child)?);
    }
    Ok(units)
}

fn units_from_placeholder<S: ContentStore + ?Sized>(
    store: &S,
    config: &XliffConfig,
    subject: &SubjectId,
    slot: &str,
    language: &str,
) -> Result<Vec<Unit>> {
    let mut units = Vec::new();
    for node in store.top_level_plugins(subject, slot, language)? {
        units.extend(units_from_plugin_tree(store, config, &node)?);
    }
    Ok(units)
}

fn units_from_binding(
    group_id: &str,
    binding: &MetadataBinding,
    label: &str,
    config: &XliffConfig,
) -> Result<Vec<Unit>> {
    if !is_field_to_translate(&binding.field, None, config) {
        return Ok(Vec::new());
    }
    if binding.field.value.is_empty() {
        return Ok(Vec::new());
    }
    units_from_field(
        group_id,
        &binding.owner_type,
        &binding.owner_label,
        &binding.field,
        label,
        config,
    )
}

/// The metadata field list for a subject: the configured list for pages and
/// aliases, every declared field of the backing record for model subjects,
/// adjusted by the per-record-kind include/exclude overrides.
fn metadata_field_names<S: ContentStore + ?Sized>(
    store: &S,
    config: &XliffConfig,
    subject: &SubjectId,
) -> Result<Vec<(String, String)>> {
    let (owner, record_fields) = store.subject_record_fields(subject)?;
    let mut names: Vec<(String, String)> = match config.metadata_spec_for(&subject.kind) {
        Some(spec) => spec.iter().map(|f| (f.name.clone(), f.label.clone())).collect(),
        None => record_fields.into_iter().map(|f| (f.name.clone(), f.label)).collect(),
    };
    if let Some(overrides) = config.model_metadata.get(&owner.kind) {
        for included in &overrides.include {
            if !names.iter().any(|(name, _)| name == &included.name) {
                names.push((included.name.clone(), included.label.clone()));
            }
        }
        names.retain(|(name, _)| !overrides.exclude.contains(name));
    }
    Ok(names)
}

fn metadata_units<S: ContentStore + ?Sized>(
    store: &S,
    config: &XliffConfig,
    subject: &SubjectId,
    language: &str,
) -> Result<Vec<Unit>> {
    // Metadata accessors are language-sensitive; switch for the duration and
    // restore on the way out.
    with_language(store, language, |store| {
        let mut units = Vec::new();
        for (field_name, label) in metadata_field_names(store, config, subject)? {
            let Some(binding) = store.metadata_field(subject, &field_name)? else {
                continue;
            };
            ensure_plain_component(&binding.owner.kind, "record kind")?;
            ensure_plain_component(&binding.owner.id, "record id")?;
            let group_id = metadata_group_id(&binding.owner.kind, &binding.owner.id);
            units.extend(units_from_binding(&group_id, &binding, &label, config)?);
        }
        Ok(units)
    })
}

fn extension_units<S: ContentStore + ?Sized>(
    store: &S,
    config: &XliffConfig,
    subject: &SubjectId,
    language: &str,
) -> Result<Vec<Unit>> {
    with_language(store, language, |store| {
        let mut units = Vec::new();
        for extension in store.extension_records(subject)? {
            ensure_plain_component(&extension.record.kind, "record kind")?;
            ensure_plain_component(&extension.record.id, "record id")?;
            let group_id = extension_group_id(&extension.record.kind, &extension.record.id);
            for field in &extension.fields {
                let binding = MetadataBinding {
                    owner: extension.record.clone(),
                    owner_type: extension.record_type.clone(),
                    owner_label: extension.label.clone(),
                    field: field.clone(),
                };
                units.extend(units_from_binding(&group_id, &binding, &field.label, config)?);
            }
        }
        Ok(units)
    })
}

/// Extract every translatable unit of `subject` in `language`.
///
/// Result order: metadata units, extension units, then plugin units in tree
/// traversal order. Fails when the subject has no plugin content unless
/// `allow_empty` is set; metadata alone does not satisfy the guard.
pub fn extract_units<S: ContentStore + ?Sized>(
    store: &S,
    config: &XliffConfig,
    subject: &SubjectId,
    language: &str,
    options: &ExtractOptions,
) -> Result<Vec<Unit>> {
    let mut plugin_units = Vec::new();
    for slot in store.placeholder_slots(subject)? {
        debug!(slot = %slot, "walking placeholder");
        plugin_units.extend(units_from_placeholder(store, config, subject, &slot, language)?);
    }

    if !options.allow_empty && plugin_units.is_empty() {
        return Err(XliffError::Extraction(
            "no translatable content found; copy plugins from an existing page first".into(),
        ));
    }

    let mut units = Vec::new();
    if options.include_metadata {
        units.extend(metadata_units(store, config, subject, language)?);
    }
    if subject.kind == SubjectKind::Page {
        units.extend(extension_units(store, config, subject, language)?);
    }
    units.extend(plugin_units);
    Ok(units)
}
