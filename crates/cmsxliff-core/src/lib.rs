//! Shared model used across the cmsxliff crates: translation units, the
//! export/import document envelope, the stable identity encoding that ties
//! both to the content tree, and the error taxonomy.

mod document;
mod error;
mod ident;
mod unit;
mod version;

pub use document::{group_units_by_group_id, Document};
pub use error::{Result, XliffError};
pub use ident::{
    classify_group_id, ensure_plain_component, extension_group_id, metadata_group_id,
    split_unit_id, unit_id_format, GroupNamespace, SubjectId, SubjectKind, EXTENSION_GROUP_ID,
    METADATA_GROUP_ID, UNIT_ID_DELIMITER,
};
pub use unit::Unit;
pub use version::{ToolInfo, XliffVersion};
