//! Gates that run between parsing and reconciliation. Order matters and is
//! part of the contract: lengths, then language, then identity, then
//! version freshness.

use std::sync::OnceLock;

use cmsxliff_config::StalenessPolicy;
use cmsxliff_core::{Document, Result, Unit, XliffError};
use cmsxliff_domain::ImportWarning;
use cmsxliff_store::SubjectInfo;
use regex::Regex;

/// Fail fast on the first unit whose target exceeds its limit.
pub fn validate_max_lengths(units: &[Unit]) -> Result<()> {
    for unit in units {
        let Some(max_length) = unit.max_length else {
            continue;
        };
        let target_length = unit.target_length();
        if target_length > max_length {
            let field = unit.field_label.as_deref().unwrap_or(&unit.field_name);
            return Err(XliffError::Import(format!(
                "text in \"{field}\" with content \"{target}\" has too many characters, \
                 should be {max_length} but is {target_length}",
                target = unit.target
            )));
        }
    }
    Ok(())
}

/// The document must target the language currently being edited.
pub fn validate_language(document: &Document, current_language: &str) -> Result<()> {
    if document.target_language != current_language {
        return Err(XliffError::Import(format!(
            "current language \"{current_language}\" is not the same as xliff target \
             language \"{target}\"",
            target = document.target_language
        )));
    }
    Ok(())
}

/// The document must belong to the subject currently being edited. When both
/// sides carry a lineage the lineage decides, so a versioned CMS that
/// allocates a new content record per version still matches; otherwise the
/// instance id decides.
pub fn validate_identity(current: &SubjectInfo, exported: &SubjectInfo) -> Result<()> {
    let same_kind = current.id.kind == exported.id.kind;
    let same_instance = match (&current.lineage, &exported.lineage) {
        (Some(current_lineage), Some(exported_lineage)) => current_lineage == exported_lineage,
        _ => current.id.id == exported.id.id,
    };
    if !(same_kind && same_instance) {
        return Err(XliffError::Import(format!(
            "current subject {current} is not the same as xliff subject {exported}; \
             you can only import to the same page you exported from",
            current = current.id,
            exported = exported.id
        )));
    }
    Ok(())
}

/// Advisory check that the export is not newer than what is being edited.
/// Policy decides whether a mismatch warns or fails.
pub fn validate_freshness(
    current: &SubjectInfo,
    exported: &SubjectInfo,
    policy: StalenessPolicy,
) -> Result<Option<ImportWarning>> {
    let message = match (current.version, exported.version) {
        (Some(current_version), Some(exported_version)) if exported_version > current_version => {
            format!(
                "xliff file was exported from version {exported_version} but the current \
                 content is version {current_version}; review before importing"
            )
        }
        (Some(_), Some(_)) => return Ok(None),
        // Without version tracking, fall back to plain id equality.
        _ if current.id.id == exported.id.id => return Ok(None),
        _ => format!(
            "xliff file was exported from {exported} which is not the record currently \
             being edited ({current})",
            exported = exported.id,
            current = current.id
        ),
    };
    match policy {
        StalenessPolicy::Warn => Ok(Some(ImportWarning { kind: "stale-version".into(), message })),
        StalenessPolicy::Fail => Err(XliffError::Import(message)),
    }
}

/// Run every gate in the documented order and collect the advisories.
pub fn validate_document(
    current: &SubjectInfo,
    document: &Document,
    exported: &SubjectInfo,
    current_language: &str,
    policy: StalenessPolicy,
) -> Result<Vec<ImportWarning>> {
    validate_max_lengths(&document.units)?;
    validate_language(document, current_language)?;
    validate_identity(current, exported)?;
    let mut warnings = Vec::new();
    if let Some(warning) = validate_freshness(current, exported, policy)? {
        warnings.push(warning);
    }
    Ok(warnings)
}

/// Loose shape check for language codes given on the command line.
pub fn language_code_looks_valid(code: &str) -> bool {
    static LANGUAGE_CODE_RE: OnceLock<Regex> = OnceLock::new();
    let re = LANGUAGE_CODE_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").unwrap());
    re.is_match(code)
}
