//! CSV-backed question index.
//!
//! The [`IndexStore`] wraps a header-first CSV file with the columns
//! `subject_code, year, season, paper, question, filename, text`.
//! Batches append rows after each document and compact once at the end.
//!
//! **Access rules:**
//! - Splitting: read-write via [`IndexStore::open`]
//! - Querying: read-only via [`IndexStore::open_readonly`]

mod compact;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use papercut_shared::{IndexRecord, PapercutError, Result};
use tracing::{debug, info};

pub use compact::compact;

/// Row counts before and after a compaction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactStats {
    pub before: usize,
    pub after: usize,
}

impl CompactStats {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Handle on the CSV index file.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
    readonly: bool,
}

fn index_err(path: &Path, e: csv::Error) -> PapercutError {
    PapercutError::Index(format!("{}: {e}", path.display()))
}

impl IndexStore {
    /// Open the index at `path` for appending and compaction.
    ///
    /// The file itself is created lazily by the first append.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            readonly: false,
        }
    }

    /// Open the index at `path` for reading only.
    pub fn open_readonly(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            readonly: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(PapercutError::Index(format!(
                "{} is opened in read-only mode",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Whether the file holds anything yet (and therefore a header).
    fn has_content(&self) -> bool {
        std::fs::metadata(&self.path).is_ok_and(|m| m.len() > 0)
    }

    /// Append records, writing the header first if the file is new or empty.
    pub fn append(&self, records: &[IndexRecord]) -> Result<()> {
        self.check_writable()?;
        if records.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PapercutError::io(parent, e))?;
        }

        let write_header = !self.has_content();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PapercutError::io(&self.path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for record in records {
            writer
                .serialize(record)
                .map_err(|e| index_err(&self.path, e))?;
        }
        writer
            .flush()
            .map_err(|e| PapercutError::io(&self.path, e))?;

        debug!(rows = records.len(), header = write_header, "appended index rows");
        Ok(())
    }

    /// Read every record in file order. A missing file is an empty index.
    pub fn load(&self) -> Result<Vec<IndexRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "index file not found, treating as empty");
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(|e| index_err(&self.path, e))?;

        reader
            .deserialize()
            .collect::<std::result::Result<Vec<IndexRecord>, _>>()
            .map_err(|e| index_err(&self.path, e))
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Rewrite the file keeping only the first row per `filename`.
    pub fn compact(&self) -> Result<CompactStats> {
        self.check_writable()?;
        let records = self.load()?;
        let before = records.len();
        let kept = compact(records);
        let stats = CompactStats {
            before,
            after: kept.len(),
        };

        if stats.removed() > 0 {
            // Staged in a sibling file; a failed rewrite must leave the index intact.
            let staging = self.staging_path();
            let mut writer = csv::Writer::from_path(&staging).map_err(|e| index_err(&staging, e))?;
            for record in &kept {
                writer.serialize(record).map_err(|e| index_err(&staging, e))?;
            }
            writer.flush().map_err(|e| PapercutError::io(&staging, e))?;
            drop(writer);
            std::fs::rename(&staging, &self.path).map_err(|e| PapercutError::write(&self.path, e))?;
            debug!(path = %self.path.display(), "replaced index with compacted copy");
        }

        info!(
            before = stats.before,
            after = stats.after,
            removed = stats.removed(),
            "index compacted"
        );
        Ok(stats)
    }
}
