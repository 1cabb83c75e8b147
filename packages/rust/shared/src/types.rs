//! Core domain types for papercut indexes.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Column names of the index file, in header order.
pub const INDEX_COLUMNS: [&str; 7] = [
    "subject_code",
    "year",
    "season",
    "paper",
    "question",
    "filename",
    "text",
];

/// Remove all whitespace and uppercase the remainder.
///
/// Used for captured question text, blank-page markers, and search strings.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

// ---------------------------------------------------------------------------
// PaperInfo
// ---------------------------------------------------------------------------

/// Identity of a source paper, derived once from its filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperInfo {
    /// Subject syllabus code (e.g., `9700`).
    pub subject_code: String,
    /// Four-digit exam year.
    pub year: u16,
    /// Season letter (e.g., `S`, `W`, `M`).
    pub season: String,
    /// Paper/variant number (e.g., `12`).
    pub paper: String,
    /// Short paper name: `<subject>_<seasonYear>_<paper>`.
    pub name: String,
}

impl PaperInfo {
    /// Side-label text stamped on every page of a question file.
    pub fn question_label(&self, question: u32) -> String {
        format!("{}-Q{question}", self.name)
    }

    /// Deterministic output path of a question file under `output_dir`.
    pub fn question_path(&self, output_dir: &Path, question: u32) -> PathBuf {
        output_dir
            .join(&self.subject_code)
            .join(self.year.to_string())
            .join(format!("{}.pdf", self.question_label(question)))
    }
}

// ---------------------------------------------------------------------------
// IndexRecord
// ---------------------------------------------------------------------------

/// One row of the question index; `filename` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub subject_code: String,
    pub year: u16,
    pub season: String,
    pub paper: String,
    pub question: u32,
    /// Path of the question file, as written.
    pub filename: String,
    /// Normalized text captured inside the question's vertical span.
    pub text: String,
}

impl IndexRecord {
    /// Build a record for one extracted question.
    pub fn new(info: &PaperInfo, question: u32, filename: impl Into<String>, text: String) -> Self {
        Self {
            subject_code: info.subject_code.clone(),
            year: info.year,
            season: info.season.clone(),
            paper: info.paper.clone(),
            question,
            filename: filename.into(),
            text,
        }
    }

    /// Look up a column value by its header name.
    pub fn column(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "subject_code" => Cow::Borrowed(self.subject_code.as_str()),
            "year" => Cow::Owned(self.year.to_string()),
            "season" => Cow::Borrowed(self.season.as_str()),
            "paper" => Cow::Borrowed(self.paper.as_str()),
            "question" => Cow::Owned(self.question.to_string()),
            "filename" => Cow::Borrowed(self.filename.as_str()),
            "text" => Cow::Borrowed(self.text.as_str()),
            _ => return None,
        };
        Some(value)
    }
}

// ---------------------------------------------------------------------------
// QueryPredicate
// ---------------------------------------------------------------------------

/// One fuzzy-match condition of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPredicate {
    /// Index column to search.
    #[serde(alias = "column_name")]
    pub column: String,
    /// Text to look for; normalized before matching.
    pub search_string: String,
    /// Minimum similarity ratio in `[0, 1]`.
    pub similarity: f64,
}

impl QueryPredicate {
    pub fn new(column: impl Into<String>, search_string: impl Into<String>, similarity: f64) -> Self {
        Self {
            column: column.into(),
            search_string: search_string.into(),
            similarity,
        }
    }
}

impl std::str::FromStr for QueryPredicate {
    type Err = crate::PapercutError;

    /// Parse `column:search string:similarity`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (column, rest) = s.split_once(':').ok_or_else(|| {
            crate::PapercutError::validation(format!(
                "predicate '{s}' must look like column:search:similarity"
            ))
        })?;
        let (search, similarity) = rest.rsplit_once(':').ok_or_else(|| {
            crate::PapercutError::validation(format!("predicate '{s}' is missing a similarity"))
        })?;
        let similarity: f64 = similarity.trim().parse().map_err(|_| {
            crate::PapercutError::validation(format!(
                "predicate '{s}': similarity '{similarity}' is not a number"
            ))
        })?;
        Ok(Self::new(column.trim(), search, similarity))
    }
}
