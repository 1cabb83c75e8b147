//! End-to-end `split` pipeline: discover → name → segment → write → index.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, instrument, warn};

use papercut_discovery::{DiscoveryOptions, discover, parse_paper_info};
use papercut_pdf::PdfDocument;
use papercut_shared::{AppConfig, Result, SegmentationConfig};
use papercut_storage::{CompactStats, IndexStore};

use crate::splitter::{SplitOutcome, split_document};

/// Configuration for a split batch.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Root directory for question files.
    pub output_dir: PathBuf,
    /// CSV index appended to after each document.
    pub index_file: PathBuf,
    pub discovery: DiscoveryOptions,
    pub layout: SegmentationConfig,
}

impl From<&AppConfig> for SplitConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            output_dir: config.defaults.output_dir.clone(),
            index_file: config.defaults.index_file.clone(),
            discovery: DiscoveryOptions::from(&config.discovery),
            layout: config.segmentation.clone(),
        }
    }
}

/// Accumulated result of a split batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Source papers found by discovery.
    pub discovered: usize,
    /// Papers that produced question files.
    pub split: Vec<PathBuf>,
    /// Papers rejected as a whole, with the reason.
    pub rejected: Vec<(PathBuf, String)>,
    /// Question files written across all papers.
    pub written: Vec<PathBuf>,
    /// Question files that failed to write.
    pub failed_writes: Vec<(PathBuf, String)>,
    /// Index rows appended before compaction.
    pub records_appended: usize,
    pub compaction: Option<CompactStats>,
    pub elapsed: Duration,
}

impl BatchReport {
    fn accept(&mut self, source: &Path, outcome: SplitOutcome) {
        self.split.push(source.to_path_buf());
        self.records_appended += outcome.records.len();
        self.written.extend(outcome.written);
        self.failed_writes.extend(outcome.failed_writes);
    }

    fn reject(&mut self, source: &Path, reason: String) {
        self.rejected.push((source.to_path_buf(), reason));
    }
}

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a source paper is processed.
    fn document_started(&self, path: &Path, current: usize, total: usize);
    /// Called when the batch completes.
    fn done(&self, report: &BatchReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_started(&self, _path: &Path, _current: usize, _total: usize) {}
    fn done(&self, _report: &BatchReport) {}
}

/// Open, name and split one paper.
fn split_one(path: &Path, config: &SplitConfig) -> Result<SplitOutcome> {
    let info = parse_paper_info(path)?;
    let doc = PdfDocument::open(path)?;
    split_document(&doc, &info, &config.output_dir, &config.layout)
}

/// Run the full `split` pipeline.
///
/// 1. Discover source papers under `root`
/// 2. Per paper: parse the filename, segment, write question files
/// 3. Append the paper's records to the index
/// 4. Compact the index once
///
/// A rejected paper is logged and skipped; index failures abort the batch.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn split_batch(
    root: &Path,
    config: &SplitConfig,
    progress: &dyn ProgressReporter,
) -> Result<BatchReport> {
    let start = Instant::now();
    let mut report = BatchReport::default();

    progress.phase("Discovering papers");
    let sources = discover(root, &config.discovery)?;
    report.discovered = sources.len();
    if sources.is_empty() {
        warn!("no source papers found");
    }

    let store = IndexStore::open(&config.index_file);

    progress.phase("Splitting papers");
    for (i, source) in sources.iter().enumerate() {
        progress.document_started(source, i + 1, sources.len());
        match split_one(source, config) {
            Ok(outcome) => {
                store.append(&outcome.records)?;
                info!(
                    source = %source.display(),
                    questions = outcome.records.len(),
                    failed = outcome.failed_writes.len(),
                    "split paper"
                );
                report.accept(source, outcome);
            }
            Err(e) => {
                error!(source = %source.display(), error = %e, "paper rejected");
                report.reject(source, e.to_string());
            }
        }
    }

    progress.phase("Compacting index");
    report.compaction = Some(store.compact()?);
    report.elapsed = start.elapsed();

    info!(
        discovered = report.discovered,
        split = report.split.len(),
        rejected = report.rejected.len(),
        written = report.written.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "split batch complete"
    );
    progress.done(&report);
    Ok(report)
}
