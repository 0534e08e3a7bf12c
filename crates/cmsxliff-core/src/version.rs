use serde::{Deserialize, Serialize};

use crate::error::{Result, XliffError};

/// Supported XLIFF versions. Closed set; only 1.2 is defined today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XliffVersion {
    V1_2,
}

/// Version to XML namespace mapping for the rendered/parsed documents.
const XLIFF_NAMESPACES: &[(XliffVersion, &str)] = &[(
    XliffVersion::V1_2,
    "urn:oasis:names:tc:xliff:document:1.2",
)];

impl XliffVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            XliffVersion::V1_2 => "1.2",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "1.2" => Ok(XliffVersion::V1_2),
            _ => Err(XliffError::Configuration(format!(
                "unsupported xliff version: \"{value}\""
            ))),
        }
    }

    pub fn namespace(&self) -> Result<&'static str> {
        XLIFF_NAMESPACES
            .iter()
            .find(|(version, _)| version == self)
            .map(|(_, namespace)| *namespace)
            .ok_or_else(|| {
                XliffError::Configuration(format!(
                    "namespace for xliff version {} does not exist",
                    self.as_str()
                ))
            })
    }
}

/// Identity of the exporting tool, written into the `<tool>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub company: String,
}

impl Default for ToolInfo {
    fn default() -> Self {
        Self { name: "cmsxliff".into(), company: "cms-xliff".into() }
    }
}
