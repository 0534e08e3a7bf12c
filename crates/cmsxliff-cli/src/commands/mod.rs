pub mod export;
pub mod import;
pub mod schema;
pub mod units;

use cmsxliff_core::SubjectId;
use color_eyre::eyre::{eyre, Result};

pub fn parse_subject(reference: &str) -> Result<SubjectId> {
    SubjectId::parse(reference).map_err(|e| eyre!("{e}"))
}
