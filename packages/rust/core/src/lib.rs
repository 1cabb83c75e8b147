//! Core pipeline orchestration and domain logic for papercut.
//!
//! This crate ties together discovery, PDF scanning, and the index into the
//! end-to-end workflows: splitting papers into questions ([`split_batch`]),
//! querying the index ([`query`]), and composing results ([`compose`]).

pub mod compose;
pub mod pipeline;
pub mod query;
pub mod segment;
pub mod similarity;
pub mod splitter;

pub use compose::{ComposeReport, compose};
pub use pipeline::{BatchReport, ProgressReporter, SilentProgress, SplitConfig, split_batch};
pub use query::{Query, query};
pub use splitter::{SplitOutcome, split_document};
