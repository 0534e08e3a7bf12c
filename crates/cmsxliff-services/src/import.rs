use std::collections::HashMap;

use cmsxliff_config::XliffConfig;
use cmsxliff_core::{
    classify_group_id, Document, GroupNamespace, Result, SubjectId, Unit, XliffError,
};
use cmsxliff_domain::{ImportSummary, ImportWarning, UnitPreview, SCHEMA_VERSION};
use cmsxliff_extract::{extract_units, ExtractOptions};
use cmsxliff_import_xliff::parse_document;
use cmsxliff_store::{with_language_mut, ContentStore, RecordRef, SubjectInfo};
use cmsxliff_validate::validate_document;
use tracing::{debug, warn};

/// Diff the imported units against the freshly extracted current state.
///
/// Pure: groups absent from the current state are dropped (their node was
/// deleted since export), units whose field no longer exists are dropped,
/// and units whose target equals the live source are dropped as no-ops.
/// Survivors keep the imported order.
pub fn compare_units(units_to_import: &[Unit], units_from_store: &[Unit]) -> Vec<Unit> {
    let mut current_by_group: HashMap<&str, HashMap<&str, &Unit>> = HashMap::new();
    for unit in units_from_store {
        current_by_group
            .entry(unit.group_id.as_str())
            .or_default()
            .insert(unit.field_name.as_str(), unit);
    }

    let mut final_units = Vec::new();
    for unit in units_to_import {
        let Some(current_fields) = current_by_group.get(unit.group_id.as_str()) else {
            debug!(group = %unit.group_id, "group exists in xliff but not in the tree, dropping");
            continue;
        };
        let Some(current_unit) = current_fields.get(unit.field_name.as_str()) else {
            debug!(
                group = %unit.group_id,
                field = %unit.field_name,
                "field exists in xliff but not in the tree, dropping"
            );
            continue;
        };
        if unit.target == current_unit.source {
            debug!(
                group = %unit.group_id,
                field = %unit.field_name,
                "target matches the live value, nothing to apply"
            );
            continue;
        }
        final_units.push(unit.clone());
    }
    final_units
}

/// The whole pre-apply import path: parse, gate, reconcile.
///
/// Returns the document with its unit list replaced by the reconciled
/// subset, plus any advisory warnings from the gates.
pub fn prepare_import<S: ContentStore + ?Sized>(
    store: &S,
    config: &XliffConfig,
    xml: &str,
    current_subject: &SubjectId,
    current_language: &str,
) -> Result<(Document, Vec<ImportWarning>)> {
    let mut document = parse_document(xml)?;

    let current_info = store.subject_info(current_subject)?;
    let exported_info = store
        .subject_info(&document.subject)
        .unwrap_or_else(|_| SubjectInfo::unresolved(document.subject.clone()));
    let warnings = validate_document(
        &current_info,
        &document,
        &exported_info,
        current_language,
        config.staleness,
    )?;

    let current_units = extract_units(
        store,
        config,
        current_subject,
        &document.target_language,
        &ExtractOptions { include_metadata: true, allow_empty: false },
    )?;
    document.units = compare_units(&document.units, &current_units);
    Ok((document, warnings))
}

fn field_assignments(config: &XliffConfig, unit: &Unit) -> Vec<(String, String)> {
    match config.field_importer(&unit.field_type) {
        Some(importer) => importer.assignments(unit),
        None => vec![(unit.field_name.clone(), unit.target.clone())],
    }
}

fn apply_record_group<S: ContentStore + ?Sized>(
    store: &mut S,
    config: &XliffConfig,
    record: &RecordRef,
    units: &[&Unit],
    target_language: &str,
    summary: &mut ImportSummary,
) -> Result<()> {
    with_language_mut(store, target_language, |store| {
        if store.find_record(record)?.is_none() {
            return Err(XliffError::Store(format!(
                "record \"{}\" with id {} does not exist",
                record.kind, record.id
            )));
        }
        for unit in units {
            for (field, value) in field_assignments(config, unit) {
                store.set_record_field(record, &field, &value)?;
            }
        }
        store.persist_record(record)?;
        summary.persisted_records += 1;
        summary.applied_units += units.len();
        Ok(())
    })
}

fn apply_plugin_group<S: ContentStore + ?Sized>(
    store: &mut S,
    config: &XliffConfig,
    plugin_id: &str,
    units: &[&Unit],
    summary: &mut ImportSummary,
) -> Result<()> {
    if store.find_plugin(plugin_id)?.is_none() {
        // The node was deleted since export; its translation is lost.
        warn!(plugin = %plugin_id, "plugin exists in xliff but not in the tree, skipping");
        summary.skipped_groups.push(plugin_id.to_string());
        return Ok(());
    }
    for unit in units {
        for (field, value) in field_assignments(config, unit) {
            store.set_plugin_field(plugin_id, &field, &value)?;
        }
    }
    // One write per node, after all of its fields are set.
    store.persist_plugin(plugin_id)?;
    summary.persisted_plugins += 1;
    summary.applied_units += units.len();
    Ok(())
}

/// Write a reconciled document back into the tree.
///
/// Node by node, no cross-node transaction: a failure partway through leaves
/// the groups already applied in place.
pub fn apply_document<S: ContentStore + ?Sized>(
    store: &mut S,
    config: &XliffConfig,
    document: &Document,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary {
        schema_version: SCHEMA_VERSION,
        total_units: document.units.len(),
        ..ImportSummary::default()
    };
    for (group_id, units) in document.grouped_units() {
        match classify_group_id(&group_id)? {
            GroupNamespace::Metadata { record_kind, record_id }
            | GroupNamespace::Extension { record_kind, record_id } => {
                let record = RecordRef::new(record_kind, record_id);
                apply_record_group(
                    store,
                    config,
                    &record,
                    &units,
                    &document.target_language,
                    &mut summary,
                )?;
            }
            GroupNamespace::Plugin(plugin_id) => {
                apply_plugin_group(store, config, plugin_id, &units, &mut summary)?;
            }
        }
    }
    Ok(summary)
}

/// Preview rows for the reconciled units, for UI/CLI display.
pub fn unit_previews(units: &[Unit]) -> Vec<UnitPreview> {
    units
        .iter()
        .map(|unit| UnitPreview {
            unit_id: unit.unit_id(),
            group_label: unit.group_label.clone(),
            field_label: unit.field_label.clone(),
            source: unit.source.clone(),
            target: unit.target.clone(),
        })
        .collect()
}
