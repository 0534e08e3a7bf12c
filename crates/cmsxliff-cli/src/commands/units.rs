use std::path::PathBuf;

use cmsxliff_core::group_units_by_group_id;
use cmsxliff_extract::{extract_units, ExtractOptions};
use cmsxliff_services::unit_previews;
use cmsxliff_store::MemoryStore;
use color_eyre::eyre::Result;
use owo_colors::OwoColorize;

pub fn run_units(
    tree: PathBuf,
    subject: String,
    language: String,
    json: bool,
    use_color: bool,
) -> Result<()> {
    tracing::debug!(event = "units_args", tree = ?tree, subject = %subject, language = %language, json = json);

    let store = MemoryStore::load(&tree)?;
    let config = cmsxliff_config::load();
    let subject = super::parse_subject(&subject)?;

    let units = extract_units(&store, &config, &subject, &language, &ExtractOptions::default())?;

    if json {
        let previews = unit_previews(&units);
        ui_out!("{}", serde_json::to_string_pretty(&previews)?);
        return Ok(());
    }

    ui_ok!("found {} xliff units on {} for language {}", units.len(), subject, language);
    ui_out!("");
    for (group_id, group) in group_units_by_group_id(&units) {
        if use_color {
            ui_out!("Group: {}", group_id.cyan());
        } else {
            ui_out!("Group: {}", group_id);
        }
        for unit in group {
            let label = unit.field_label.as_deref().unwrap_or(&unit.field_name);
            ui_out!("  {} [{}] = {}", label, unit.field_type, unit.source);
        }
        ui_out!("");
    }
    Ok(())
}
