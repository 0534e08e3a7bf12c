use std::io::{BufRead, Write};
use std::path::PathBuf;

use cmsxliff_import_xliff::parse_document;
use cmsxliff_services::{apply_document, prepare_import, unit_previews};
use cmsxliff_store::MemoryStore;
use color_eyre::eyre::{bail, Result};
use owo_colors::OwoColorize;

#[allow(clippy::too_many_arguments)]
pub fn run_import(
    tree: PathBuf,
    file: PathBuf,
    subject: Option<String>,
    language: Option<String>,
    yes: bool,
    dry_run: bool,
    use_color: bool,
) -> Result<()> {
    tracing::debug!(event = "import_args", tree = ?tree, file = ?file, subject = ?subject, language = ?language, yes = yes, dry_run = dry_run);

    let mut store = MemoryStore::load(&tree)?;
    let config = cmsxliff_config::load();
    let xml = std::fs::read_to_string(&file)?;

    // The admin UI knows which subject and language the user is editing; on
    // the command line they default to what the file declares.
    let uploaded = parse_document(&xml)?;
    let current_subject = match subject {
        Some(reference) => super::parse_subject(&reference)?,
        None => uploaded.subject.clone(),
    };
    let current_language = language.unwrap_or_else(|| uploaded.target_language.clone());

    let (document, warnings) =
        prepare_import(&store, &config, &xml, &current_subject, &current_language)?;

    for warning in &warnings {
        ui_warn!("{}", warning.message);
    }

    if document.units.is_empty() {
        ui_info!("no units to import from {}: nothing differs from the current content", file.display());
        return Ok(());
    }

    ui_out!(
        "found {} units in {} for subject {} and language {}",
        document.units.len(),
        file.display(),
        document.subject,
        document.target_language
    );
    ui_out!("");
    for preview in unit_previews(&document.units) {
        if use_color {
            ui_out!("{}", preview.unit_id.cyan());
        } else {
            ui_out!("{}", preview.unit_id);
        }
        if let Some(label) = &preview.field_label {
            ui_out!("  {} ({})", label, preview.group_label);
        }
        ui_out!("  {} -> {}", preview.source, preview.target);
    }
    ui_out!("");

    if dry_run {
        ui_info!("dry run, nothing was written");
        return Ok(());
    }

    if !yes && !confirm()? {
        bail!("aborted");
    }

    let summary = apply_document(&mut store, &config, &document)?;
    store.save(&tree)?;

    ui_ok!(
        "successfully imported {} units for subject {} and language {}",
        summary.applied_units,
        document.subject,
        document.target_language
    );
    if !summary.skipped_groups.is_empty() {
        ui_warn!(
            "skipped {} groups whose nodes no longer exist: {}",
            summary.skipped_groups.len(),
            summary.skipped_groups.join(", ")
        );
    }
    Ok(())
}

fn confirm() -> Result<bool> {
    print!("Do you want to import the units? This will save them directly into the tree file. (y/n): ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim() == "y")
}
