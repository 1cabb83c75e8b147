//! PDF primitives for papercut, built on `lopdf`.
//!
//! - [`PdfDocument`]: a loaded source document with page boxes and a lazy
//!   text-run scan per page ([`TextRuns`])
//! - [`PdfWriter`]: assembles new documents from imported pages, placed with
//!   an affine translation and clipped to a box, optionally side-labelled
//! - [`PageBox`] / [`Matrix`]: the geometry shared by both

mod document;
#[cfg(test)]
mod fixture;
mod geometry;
mod scan;
mod writer;

pub use document::PdfDocument;
pub use geometry::{Matrix, PageBox};
pub use scan::{TextRun, TextRuns};
pub use writer::{ImportedDocument, OutputPage, PdfWriter, Placement};

/// Map any `lopdf` error into the shared error type.
pub(crate) fn pdf_err(e: impl std::fmt::Display) -> papercut_shared::PapercutError {
    papercut_shared::PapercutError::Pdf(e.to_string())
}
