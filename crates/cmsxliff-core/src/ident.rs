use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, XliffError};

/// Joins the parts of every composite id in the wire format. Reserved:
/// field names, record kinds and raw instance ids must not contain it.
pub const UNIT_ID_DELIMITER: &str = "__";

/// Group id namespace for subject metadata (title, slug, ...).
pub const METADATA_GROUP_ID: &str = "METADATA";

/// Group id namespace for satellite extension records.
pub const EXTENSION_GROUP_ID: &str = "EXTENSION";

pub fn unit_id_format(parts: &[&str]) -> String {
    parts.join(UNIT_ID_DELIMITER)
}

/// Split a trans-unit id into `(group_id, field_name)`.
///
/// The split happens on the *last* delimiter occurrence: metadata and
/// extension group ids legitimately contain the delimiter themselves
/// (`METADATA__page_content__4__title`), the field name never does.
pub fn split_unit_id(unit_id: &str) -> Result<(&str, &str)> {
    unit_id
        .rsplit_once(UNIT_ID_DELIMITER)
        .ok_or_else(|| XliffError::Format(format!("invalid trans-unit id: \"{unit_id}\"")))
}

/// Reject raw id components that would make a composite id ambiguous.
pub fn ensure_plain_component(value: &str, what: &str) -> Result<()> {
    if value.is_empty() || value.contains(UNIT_ID_DELIMITER) {
        return Err(XliffError::Extraction(format!(
            "{what} \"{value}\" must not be empty or contain \"{UNIT_ID_DELIMITER}\""
        )));
    }
    Ok(())
}

pub fn metadata_group_id(record_kind: &str, record_id: &str) -> String {
    unit_id_format(&[METADATA_GROUP_ID, record_kind, record_id])
}

pub fn extension_group_id(record_kind: &str, record_id: &str) -> String {
    unit_id_format(&[EXTENSION_GROUP_ID, record_kind, record_id])
}

/// Which part of the content tree a group id addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupNamespace<'a> {
    Metadata { record_kind: &'a str, record_id: &'a str },
    Extension { record_kind: &'a str, record_id: &'a str },
    Plugin(&'a str),
}

pub fn classify_group_id(group_id: &str) -> Result<GroupNamespace<'_>> {
    for (prefix, metadata) in [(METADATA_GROUP_ID, true), (EXTENSION_GROUP_ID, false)] {
        let Some(rest) = group_id.strip_prefix(prefix) else {
            continue;
        };
        let Some(rest) = rest.strip_prefix(UNIT_ID_DELIMITER) else {
            continue;
        };
        let (record_kind, record_id) = rest.split_once(UNIT_ID_DELIMITER).ok_or_else(|| {
            XliffError::Format(format!("malformed {prefix} group id: \"{group_id}\""))
        })?;
        return Ok(if metadata {
            GroupNamespace::Metadata { record_kind, record_id }
        } else {
            GroupNamespace::Extension { record_kind, record_id }
        });
    }
    Ok(GroupNamespace::Plugin(group_id))
}

/// The kind of content a document was produced from. Pages and aliases are
/// first-class; anything else is an arbitrary model record addressed by its
/// kind name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubjectKind {
    Page,
    Alias,
    Model(String),
}

impl SubjectKind {
    pub fn as_str(&self) -> &str {
        match self {
            SubjectKind::Page => "page",
            SubjectKind::Alias => "alias",
            SubjectKind::Model(name) => name,
        }
    }
}

impl From<String> for SubjectKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "page" => SubjectKind::Page,
            "alias" => SubjectKind::Alias,
            _ => SubjectKind::Model(value),
        }
    }
}

impl From<SubjectKind> for String {
    fn from(kind: SubjectKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the content item a document belongs to: a type discriminator
/// plus an instance id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId {
    pub kind: SubjectKind,
    pub id: String,
}

impl SubjectId {
    pub fn new(kind: SubjectKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    /// Wire encoding used by the `<tool tool-id>` attribute.
    pub fn tool_id(&self) -> String {
        unit_id_format(&[self.kind.as_str(), &self.id])
    }

    /// Decode a tool id. Older exports carried a bare instance id with no
    /// type discriminator; those default to a page subject.
    pub fn from_tool_id(raw: &str) -> Self {
        match raw.rsplit_once(UNIT_ID_DELIMITER) {
            Some((kind, id)) => Self::new(SubjectKind::from(kind.to_string()), id),
            None => Self::new(SubjectKind::Page, raw),
        }
    }

    /// Parse the `kind:id` form used on the command line.
    pub fn parse(value: &str) -> Result<Self> {
        match value.split_once(':') {
            Some((kind, id)) if !kind.is_empty() && !id.is_empty() => {
                Ok(Self::new(SubjectKind::from(kind.to_string()), id))
            }
            _ => Err(XliffError::Format(format!(
                "invalid subject reference \"{value}\", expected kind:id"
            ))),
        }
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
