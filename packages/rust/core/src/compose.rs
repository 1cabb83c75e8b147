//! Sheet compositing: stack question pages top-down onto fixed-size sheets.
//!
//! Pages are never split or scaled. A page that does not fit below the
//! current cursor starts a new sheet, unless the sheet is still empty, in
//! which case it is placed anyway and overflows.

use std::path::{Path, PathBuf};

use papercut_pdf::{OutputPage, PageBox, PdfDocument, PdfWriter, Placement};
use papercut_shared::{CompositingConfig, Result};
use tracing::{debug, info, instrument};

/// A page's position on a sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Index into the packed item list.
    pub item: usize,
    /// Distance from the sheet top to the page's top edge.
    pub cursor: f32,
}

/// One output sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub slots: Vec<Slot>,
}

/// Summary of a compose run.
#[derive(Debug, Clone)]
pub struct ComposeReport {
    pub output: PathBuf,
    pub sources: usize,
    pub pages: usize,
    pub sheets: usize,
    pub bytes: usize,
}

/// Assign pages of the given heights to sheets, in order.
///
/// Always returns at least one sheet.
pub fn pack(heights: &[f32], layout: &CompositingConfig) -> Vec<Sheet> {
    let mut sheets = vec![Sheet::default()];
    let mut cursor = layout.border;

    for (item, &height) in heights.iter().enumerate() {
        // Only break after a placed page, so an oversize first page never leaves a blank sheet.
        let current_has_pages = sheets.last().is_some_and(|s| !s.slots.is_empty());
        if cursor + height > layout.sheet_height && current_has_pages {
            sheets.push(Sheet::default());
            cursor = layout.border;
        }
        if let Some(sheet) = sheets.last_mut() {
            sheet.slots.push(Slot { item, cursor });
        }
        cursor += height + layout.padding;
    }

    sheets
}

/// Compose the pages of `sources` onto sheets and write them to `output`.
///
/// Sources are ordered by ascending page count (stable). Unreadable sources
/// and a failed final write are errors.
#[instrument(skip_all, fields(sources = sources.len(), output = %output.display()))]
pub fn compose(sources: &[PathBuf], output: &Path, layout: &CompositingConfig) -> Result<ComposeReport> {
    let mut docs = sources
        .iter()
        .map(|path| PdfDocument::open(path).map(|doc| (path, doc)))
        .collect::<Result<Vec<_>>>()?;
    docs.sort_by_key(|(_, doc)| doc.page_count());

    let mut writer = PdfWriter::new();
    let mut pages = Vec::new();
    for (path, doc) in &docs {
        let imported = writer.import(doc);
        pages.extend(imported.pages().iter().map(|page| (*path, *page)));
    }

    let heights: Vec<f32> = pages.iter().map(|(_, page)| page.media_box.height()).collect();
    let sheets = pack(&heights, layout);

    for (number, sheet) in sheets.iter().enumerate() {
        let placements = sheet
            .slots
            .iter()
            .map(|slot| {
                let (origin, page) = pages[slot.item];
                let media = page.media_box;
                let bottom = layout.sheet_height - slot.cursor - media.height();
                debug!(
                    sheet = number,
                    origin = %origin.display(),
                    cursor = slot.cursor,
                    bottom,
                    "placing page"
                );
                Placement {
                    page,
                    clip: media,
                    dy: bottom - media.bottom,
                }
            })
            .collect();

        writer.add_page(OutputPage {
            media_box: PageBox::sized(layout.sheet_width, layout.sheet_height),
            placements,
            label: None,
        })?;
    }

    let bytes = writer.save(output)?;
    let report = ComposeReport {
        output: output.to_path_buf(),
        sources: docs.len(),
        pages: pages.len(),
        sheets: sheets.len(),
        bytes,
    };
    info!(pages = report.pages, sheets = report.sheets, bytes, "composed document");
    Ok(report)
}
