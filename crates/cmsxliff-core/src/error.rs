use thiserror::Error;

/// Umbrella error for everything the XLIFF pipeline can reject. Boundary
/// code (CLI, embedders) catches this one type and shows the message.
#[derive(Debug, Error)]
pub enum XliffError {
    /// Deployment/setup defect: unsupported version, missing namespace or
    /// handler mapping. Not correctable by the person uploading a file.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Extraction walked the tree and found nothing translatable.
    #[error("export error: {0}")]
    Extraction(String),

    /// The uploaded document is not a usable XLIFF file.
    #[error("xliff error: {0}")]
    Format(String),

    /// The document is well-formed but must not be imported here
    /// (wrong language, wrong subject, over-length translation).
    #[error("import error: {0}")]
    Import(String),

    /// The content store could not resolve or persist a record.
    #[error("store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, XliffError>;
