//! Source-paper discovery and filename-convention parsing.
//!
//! A batch starts from a path: a file is taken as-is, a directory is walked
//! recursively for question papers (`*.pdf` files whose path contains `qp`).
//! Each paper's identity ([`PaperInfo`]) comes from its filename alone.

mod naming;

use std::path::{Path, PathBuf};

use papercut_shared::{DiscoveryConfig, PapercutError, Result};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

pub use naming::parse_paper_info;
pub use papercut_shared::PaperInfo;

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for the discovery process.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Required file extension, without the dot.
    pub extension: String,
    /// Substring every crawled path must contain.
    pub name_token: String,
    /// Walk directories; when false the path is used as a single file.
    pub crawl: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for DiscoveryOptions {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            extension: config.extension.clone(),
            name_token: config.name_token.clone(),
            crawl: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Collect the source papers under `root`, sorted by path.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn discover(root: &Path, opts: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(PapercutError::validation(format!(
            "source path {} does not exist",
            root.display()
        )));
    }

    if root.is_file() || !opts.crawl {
        debug!("using single source file");
        return Ok(vec![root.to_path_buf()]);
    }

    let suffix = format!(".{}", opts.extension);
    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_source_paper(path, &suffix, &opts.name_token))
        .collect::<Vec<_>>();

    files.sort();
    info!(count = files.len(), "discovered source papers");
    Ok(files)
}

fn is_source_paper(path: &Path, suffix: &str, token: &str) -> bool {
    let display = path.to_string_lossy();
    display.ends_with(suffix) && display.contains(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "papercut-discovery-test-{}",
            uuid::Uuid::now_v7()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn walks_directories_for_question_papers() {
        let root = temp_dir();
        fs::create_dir_all(root.join("9700").join("2022")).unwrap();
        for name in [
            "9700/2022/9700_s22_qp_12.pdf",
            "9700/2022/9700_s22_ms_12.pdf",
            "9700/9700_w21_qp_22.pdf",
            "notes_qp.txt",
        ] {
            fs::write(root.join(name), b"%PDF-1.5").unwrap();
        }

        let found = discover(&root, &DiscoveryOptions::default()).expect("discover");
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["9700_s22_qp_12.pdf", "9700_w21_qp_22.pdf"]);

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn single_file_is_taken_as_is() {
        let root = temp_dir();
        let file = root.join("anything.pdf");
        fs::write(&file, b"%PDF-1.5").unwrap();

        let found = discover(&file, &DiscoveryOptions::default()).expect("discover");
        assert_eq!(found, vec![file]);

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn missing_root_is_an_error() {
        let missing = std::env::temp_dir().join("papercut-no-such-dir-for-tests");
        let err = discover(&missing, &DiscoveryOptions::default()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
