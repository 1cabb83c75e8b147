//! Paper filename convention.
//!
//! `<subject>_<season><yy>_<kind>_<paper>[_...].pdf`, e.g. `9700_s22_qp_12.pdf`.
//! Fields are underscore-delimited and compared uppercased; the second field
//! is a season letter followed by a two-digit year in the 2000s.

use std::path::Path;
use std::sync::LazyLock;

use papercut_shared::{PaperInfo, PapercutError, Result};
use regex::Regex;

/// Matches `S22`: season letter, two-digit year.
static SEASON_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z])(\d{2})$").expect("season/year regex"));

/// Derive a paper's identity from its filename.
pub fn parse_paper_info(path: &Path) -> Result<PaperInfo> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .ok_or_else(|| PapercutError::naming(format!("{} has no file name", path.display())))?;

    let fields: Vec<&str> = stem.split('_').collect();
    if fields.len() < 4 {
        return Err(PapercutError::naming(format!(
            "{stem}: expected <subject>_<season><yy>_<kind>_<paper>, found {} field(s)",
            fields.len()
        )));
    }

    let (subject, season_year, paper) = (fields[0], fields[1], fields[3]);
    let caps = SEASON_YEAR_RE.captures(season_year).ok_or_else(|| {
        PapercutError::naming(format!(
            "{stem}: '{season_year}' is not a season letter followed by a two-digit year"
        ))
    })?;
    let yy: u16 = caps[2]
        .parse()
        .map_err(|_| PapercutError::naming(format!("{stem}: bad year '{}'", &caps[2])))?;

    if subject.is_empty() || paper.is_empty() {
        return Err(PapercutError::naming(format!(
            "{stem}: subject code and paper number must not be empty"
        )));
    }

    Ok(PaperInfo {
        subject_code: subject.to_string(),
        year: 2000 + yy,
        season: caps[1].to_string(),
        paper: paper.to_string(),
        name: format!("{subject}_{season_year}_{paper}"),
    })
}
