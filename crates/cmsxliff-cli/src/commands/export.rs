use std::path::PathBuf;

use cmsxliff_core::XliffVersion;
use cmsxliff_store::MemoryStore;
use cmsxliff_validate::language_code_looks_valid;
use color_eyre::eyre::{bail, Result};

pub fn run_export(
    tree: PathBuf,
    subject: String,
    source_lang: String,
    target_lang: String,
    out: Option<PathBuf>,
) -> Result<()> {
    tracing::debug!(event = "export_args", tree = ?tree, subject = %subject, source_lang = %source_lang, target_lang = %target_lang, out = ?out);

    if source_lang == target_lang {
        bail!("xliff source language and target language should not be the same");
    }
    for code in [&source_lang, &target_lang] {
        if !language_code_looks_valid(code) {
            bail!("\"{code}\" does not look like a language code");
        }
    }

    let store = MemoryStore::load(&tree)?;
    let config = cmsxliff_config::load();
    let subject = super::parse_subject(&subject)?;

    let export = cmsxliff_services::export_subject(
        &store,
        &config,
        &subject,
        &source_lang,
        &target_lang,
        XliffVersion::V1_2,
    )?;

    let out_path = out.unwrap_or_else(|| PathBuf::from(&export.file_name));
    std::fs::write(&out_path, &export.content)?;
    ui_ok!("successfully exported xliff file: {}", out_path.display());
    Ok(())
}
