use cmsxliff_config::XliffConfig;
use cmsxliff_core::{Document, Result, SubjectId, XliffVersion};
use cmsxliff_export_xliff::{export_file_name, render_document};
use cmsxliff_extract::{extract_units, ExtractOptions};
use cmsxliff_store::ContentStore;

/// A rendered export, ready to be written or offered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct XliffExport {
    pub content: String,
    pub file_name: String,
}

/// Extract the subject in the target language and wrap the units in a
/// document envelope. The target-language tree holds the (usually copied,
/// not yet translated) content a translator works from.
pub fn build_export_document<S: ContentStore + ?Sized>(
    store: &S,
    config: &XliffConfig,
    subject: &SubjectId,
    source_language: &str,
    target_language: &str,
) -> Result<Document> {
    let units = extract_units(
        store,
        config,
        subject,
        target_language,
        &ExtractOptions { include_metadata: true, allow_empty: false },
    )?;
    Ok(Document {
        source_language: source_language.to_string(),
        target_language: target_language.to_string(),
        subject: subject.clone(),
        subject_path: store.absolute_path(subject, target_language)?,
        units,
    })
}

/// The whole export path: extract, envelope, render, name the file.
pub fn export_subject<S: ContentStore + ?Sized>(
    store: &S,
    config: &XliffConfig,
    subject: &SubjectId,
    source_language: &str,
    target_language: &str,
    version: XliffVersion,
) -> Result<XliffExport> {
    let document =
        build_export_document(store, config, subject, source_language, target_language)?;
    let content = render_document(version, &document, &config.tool)?;
    let file_name = export_file_name(&document.subject_path, target_language);
    Ok(XliffExport { content, file_name })
}
