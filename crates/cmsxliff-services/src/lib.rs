//! High-level orchestration layer over the lower cmsxliff crates.
//! Intentionally thin: exposes the stable pipelines used by the CLI and by
//! embedders, so the lower crates stay importable on their own.

mod export;
mod import;

pub use export::{build_export_document, export_subject, XliffExport};
pub use import::{apply_document, compare_units, prepare_import, unit_previews};

pub use cmsxliff_core::{Document, Result, Unit};
