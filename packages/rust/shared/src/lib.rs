//! Shared types, error model, and configuration for papercut.
//!
//! This crate is the foundation depended on by all other papercut crates.
//! It provides:
//! - [`PapercutError`], the unified error type
//! - Domain types ([`PaperInfo`], [`IndexRecord`], [`QueryPredicate`])
//! - Configuration ([`AppConfig`], layout sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CompositingConfig, DefaultsConfig, DiscoveryConfig, SegmentationConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{PapercutError, Result};
pub use types::{INDEX_COLUMNS, IndexRecord, PaperInfo, QueryPredicate, normalize_text};
