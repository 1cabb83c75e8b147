//! Per-document question extraction: scan, segment, render, write.

use std::path::{Path, PathBuf};

use papercut_pdf::{OutputPage, PdfDocument, PdfWriter, Placement};
use papercut_shared::{IndexRecord, PaperInfo, PapercutError, Result, SegmentationConfig};
use tracing::{debug, info, instrument, warn};

use crate::segment::{self, PageScan, QuestionPlan, Segmentation};

/// What one document produced.
#[derive(Debug, Default)]
pub struct SplitOutcome {
    /// One record per question file actually written.
    pub records: Vec<IndexRecord>,
    pub written: Vec<PathBuf>,
    /// Question files that could not be written, with the reason.
    pub failed_writes: Vec<(PathBuf, String)>,
}

/// Read the geometry and text runs of every page.
pub fn scan_pages(doc: &PdfDocument) -> Result<Vec<PageScan>> {
    (0..doc.page_count())
        .map(|index| {
            Ok(PageScan {
                media_box: doc.page_box(index)?,
                runs: doc.text_runs(index)?.collect(),
            })
        })
        .collect()
}

/// Build the PDF bytes of one question.
fn render_question(
    doc: &PdfDocument,
    seg: &Segmentation,
    plan: &QuestionPlan,
    label: String,
    layout: &SegmentationConfig,
) -> Result<Vec<u8>> {
    let mut writer = PdfWriter::new().with_label_size(layout.label_font_size);
    let imported = writer.import(doc);

    for slice in &plan.slices {
        let source_index = seg.retained[slice.page];
        let page = imported.page(source_index).ok_or_else(|| {
            PapercutError::Pdf(format!("source page {source_index} missing after import"))
        })?;
        debug!(
            question = plan.question,
            source_page = source_index,
            bottom = slice.clip.bottom,
            top = slice.clip.top,
            "placing question slice"
        );
        writer.add_page(OutputPage {
            media_box: slice.output_box(),
            placements: vec![Placement {
                page,
                clip: slice.clip,
                dy: -slice.clip.bottom,
            }],
            label: Some(label.clone()),
        })?;
    }

    writer.finish()
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PapercutError::write(parent, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| PapercutError::write(path, e))
}

/// Split one source document into per-question files under `output_dir`.
///
/// Either the whole document is rejected (no files, no records), or every
/// question is rendered and then written; a failed write only loses that
/// question.
#[instrument(skip_all, fields(paper = %info.name))]
pub fn split_document(
    doc: &PdfDocument,
    info: &PaperInfo,
    output_dir: &Path,
    layout: &SegmentationConfig,
) -> Result<SplitOutcome> {
    let pages = scan_pages(doc)?;
    let seg = segment::segment(pages, layout)?;
    info!(
        pages = doc.page_count(),
        retained = seg.retained.len(),
        questions = seg.questions.len(),
        "segmented document"
    );

    let rendered = seg
        .questions
        .iter()
        .map(|plan| {
            let bytes = render_question(doc, &seg, plan, info.question_label(plan.question), layout)?;
            Ok((plan, bytes))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut outcome = SplitOutcome::default();
    for (plan, bytes) in rendered {
        let path = info.question_path(output_dir, plan.question);
        match write_file(&path, &bytes) {
            Ok(()) => {
                debug!(path = %path.display(), bytes = bytes.len(), "wrote question file");
                outcome.records.push(IndexRecord::new(
                    info,
                    plan.question,
                    path.display().to_string(),
                    plan.text.clone(),
                ));
                outcome.written.push(path);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping question file");
                outcome.failed_writes.push((path, e.to_string()));
            }
        }
    }

    Ok(outcome)
}
