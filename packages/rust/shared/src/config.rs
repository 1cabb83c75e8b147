//! Application configuration for papercut.
//!
//! User config lives at `~/.papercut/papercut.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PapercutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "papercut.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".papercut";

// ---------------------------------------------------------------------------
// Config structs (matching papercut.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Source-file discovery.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Question segmentation layout.
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Sheet compositing layout.
    #[serde(default)]
    pub compositing: CompositingConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Root directory for question files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Path of the CSV index.
    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            index_file: default_index_file(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("questions")
}
fn default_index_file() -> PathBuf {
    PathBuf::from("questions").join("database.csv")
}

/// `[discovery]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// File extension of source papers (without the dot).
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Token a crawled path must contain (question papers are `qp`).
    #[serde(default = "default_name_token")]
    pub name_token: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            name_token: default_name_token(),
        }
    }
}

fn default_extension() -> String {
    "pdf".into()
}
fn default_name_token() -> String {
    "qp".into()
}

/// `[segmentation]` section. All lengths are PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Page border trimmed off continuation pages; also the lowest anchor y.
    #[serde(default = "default_split_border")]
    pub border: f32,

    /// Anchors must start left of this x.
    #[serde(default = "default_anchor_max_x")]
    pub anchor_max_x: f32,

    /// Anchors must sit at least this far below the first page's top.
    #[serde(default = "default_top_clearance")]
    pub top_clearance: f32,

    /// Space kept above an anchor when trimming a question's first page.
    #[serde(default = "default_anchor_padding")]
    pub anchor_padding: f32,

    /// A next anchor below this y leaves part of its page to the current question.
    #[serde(default = "default_trailing_page_y")]
    pub trailing_page_y: f32,

    /// Width every question page is clipped to.
    #[serde(default = "default_sheet_width")]
    pub sheet_width: f32,

    /// Font size of the rotated side label.
    #[serde(default = "default_label_font_size")]
    pub label_font_size: f32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            border: default_split_border(),
            anchor_max_x: default_anchor_max_x(),
            top_clearance: default_top_clearance(),
            anchor_padding: default_anchor_padding(),
            trailing_page_y: default_trailing_page_y(),
            sheet_width: default_sheet_width(),
            label_font_size: default_label_font_size(),
        }
    }
}

fn default_split_border() -> f32 {
    45.0
}
fn default_anchor_max_x() -> f32 {
    120.0
}
fn default_top_clearance() -> f32 {
    40.0
}
fn default_anchor_padding() -> f32 {
    10.0
}
fn default_trailing_page_y() -> f32 {
    700.0
}
fn default_sheet_width() -> f32 {
    595.0
}
fn default_sheet_height() -> f32 {
    842.0
}
fn default_label_font_size() -> f32 {
    12.0
}

/// `[compositing]` section. All lengths are PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositingConfig {
    /// Initial vertical cursor on every sheet.
    #[serde(default = "default_merge_border")]
    pub border: f32,

    /// Gap left below each placed page.
    #[serde(default = "default_padding")]
    pub padding: f32,

    #[serde(default = "default_sheet_width")]
    pub sheet_width: f32,

    #[serde(default = "default_sheet_height")]
    pub sheet_height: f32,
}

impl Default for CompositingConfig {
    fn default() -> Self {
        Self {
            border: default_merge_border(),
            padding: default_padding(),
            sheet_width: default_sheet_width(),
            sheet_height: default_sheet_height(),
        }
    }
}

fn default_merge_border() -> f32 {
    20.0
}
fn default_padding() -> f32 {
    10.0
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.papercut/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PapercutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.papercut/papercut.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PapercutError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        PapercutError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PapercutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PapercutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PapercutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

impl AppConfig {
    /// Reject layouts that cannot produce a page.
    pub fn validate(&self) -> Result<()> {
        let c = &self.compositing;
        if c.sheet_height <= c.border {
            return Err(PapercutError::config(format!(
                "compositing.sheet_height ({}) must exceed compositing.border ({})",
                c.sheet_height, c.border
            )));
        }
        if c.sheet_width <= 0.0 || self.segmentation.sheet_width <= 0.0 {
            return Err(PapercutError::config("sheet_width must be positive"));
        }
        if self.discovery.extension.is_empty() {
            return Err(PapercutError::config("discovery.extension must not be empty"));
        }
        Ok(())
    }
}
