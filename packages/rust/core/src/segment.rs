//! Question segmentation over scanned page text.
//!
//! Pure functions from per-page text runs to a split plan:
//!
//! 1. Drop blank/additional pages (bold `BLANKPAGE` / `ADDITIONALPAGE`).
//! 2. Find bold numeric anchors in the left margin, accepting only the
//!    next expected question number.
//! 3. Reject the document unless the anchors run 1, 2, 3, ...
//! 4. Cut each question from its anchor down to the next one, trimming
//!    borders on continuation pages and capturing the text in between.
//!
//! Nothing here touches the filesystem; see [`crate::splitter`] for output.

use std::sync::LazyLock;

use papercut_pdf::{PageBox, TextRun};
use papercut_shared::{PapercutError, Result, SegmentationConfig, normalize_text};
use regex::Regex;
use tracing::debug;

/// First contiguous run of ASCII digits.
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit regex"));

/// Bold markers of pages that carry no question content.
const EXCLUDED_MARKERS: [&str; 2] = ["BLANKPAGE", "ADDITIONALPAGE"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Geometry and text of one source page.
#[derive(Debug, Clone)]
pub struct PageScan {
    pub media_box: PageBox,
    pub runs: Vec<TextRun>,
}

/// An accepted question anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub question: u32,
    pub x: f32,
    pub y: f32,
    /// Index into the retained pages.
    pub page: usize,
}

/// The trimmed part of one retained page that belongs to a question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    /// Index into the retained pages.
    pub page: usize,
    /// Kept region in source coordinates.
    pub clip: PageBox,
}

impl PageSlice {
    /// Box of the output page once the slice's bottom is moved to 0.
    pub fn output_box(&self) -> PageBox {
        PageBox::new(self.clip.left, 0.0, self.clip.right, self.clip.height())
    }
}

/// Everything needed to write one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPlan {
    pub question: u32,
    pub slices: Vec<PageSlice>,
    /// Normalized text captured inside the slices.
    pub text: String,
}

/// Result of segmenting one document.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Source page index of each retained page.
    pub retained: Vec<usize>,
    pub boundaries: Vec<Boundary>,
    pub questions: Vec<QuestionPlan>,
}

// ---------------------------------------------------------------------------
// Phase 1: page filtering
// ---------------------------------------------------------------------------

/// Whether a page is a blank or additional-answer page.
pub fn is_excluded_page(runs: &[TextRun]) -> bool {
    runs.iter().filter(|run| run.bold).any(|run| {
        let text = normalize_text(&run.text);
        !text.is_empty() && EXCLUDED_MARKERS.iter().any(|m| text.contains(m))
    })
}

// ---------------------------------------------------------------------------
// Phase 2: boundary detection
// ---------------------------------------------------------------------------

/// The question number a run could be anchoring, ignoring position and font.
fn anchor_number(text: &str) -> Option<u32> {
    let digits = DIGITS_RE.find(text)?.as_str();
    if digits.len() > 2 {
        debug!(text, digits, "digit run too long for a question number");
        return None;
    }

    let first_digit = text.chars().next().is_some_and(|c| c.is_ascii_digit());
    let last_digit = text.chars().last().is_some_and(|c| c.is_ascii_digit());
    let labelled = text.contains("Question") && text.chars().count() < 12;
    if !(first_digit || labelled || last_digit) {
        return None;
    }

    digits.parse().ok()
}

/// Whether a run sits where question anchors are printed.
fn in_anchor_zone(run: &TextRun, first_page_top: f32, layout: &SegmentationConfig) -> bool {
    run.bold
        && run.x < layout.anchor_max_x
        && run.y >= layout.border
        && run.y <= first_page_top - layout.top_clearance
}

/// Scan retained pages in order and keep anchors numbered 1, 2, 3, ...
///
/// Candidates out of sequence are typographic noise and are skipped.
pub fn detect_boundaries(
    pages: &[PageScan],
    first_page_top: f32,
    layout: &SegmentationConfig,
) -> Vec<Boundary> {
    let mut accepted: Vec<Boundary> = Vec::new();

    let candidates = pages.iter().enumerate().flat_map(|(page, scan)| {
        scan.runs
            .iter()
            .filter(move |run| in_anchor_zone(run, first_page_top, layout))
            .filter_map(move |run| anchor_number(&run.text).map(|n| (page, run, n)))
    });

    for (page, run, number) in candidates {
        let expected = accepted.last().map_or(1, |b| b.question + 1);
        if number == expected {
            accepted.push(Boundary {
                question: number,
                x: run.x,
                y: run.y,
                page,
            });
        } else {
            debug!(page, number, expected, text = %run.text, "discarding out-of-sequence anchor");
        }
    }

    accepted
}

// ---------------------------------------------------------------------------
// Phase 3: order validation
// ---------------------------------------------------------------------------

/// Require a non-empty sequence 1, 2, 3, ... with no gaps.
pub fn validate_order(boundaries: &[Boundary]) -> Result<()> {
    let Some(first) = boundaries.first() else {
        return Err(PapercutError::ordering("no question anchors found"));
    };
    if first.question != 1 {
        return Err(PapercutError::ordering(format!(
            "first question is {}, expected 1",
            first.question
        )));
    }
    for pair in boundaries.windows(2) {
        if pair[1].question != pair[0].question + 1 {
            return Err(PapercutError::ordering(format!(
                "question {} follows question {}",
                pair[1].question, pair[0].question
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Phase 4: extraction plan
// ---------------------------------------------------------------------------

/// Cut each question from its anchor to the next one.
pub fn plan_questions(
    pages: &[PageScan],
    boundaries: &[Boundary],
    layout: &SegmentationConfig,
) -> Result<Vec<QuestionPlan>> {
    let Some(last_page) = pages.len().checked_sub(1) else {
        return Err(PapercutError::ordering("no retained pages"));
    };

    let mut plans = Vec::with_capacity(boundaries.len());
    for (i, boundary) in boundaries.iter().enumerate() {
        let (next_page, next_y) = boundaries
            .get(i + 1)
            .map_or((last_page, layout.border), |next| (next.page, next.y));

        // A next anchor low on its page leaves the top of that page to us.
        let trailing = usize::from(next_y < layout.trailing_page_y);
        let end = (next_page + trailing).max(boundary.page + 1).min(pages.len());

        let mut slices = Vec::with_capacity(end - boundary.page);
        let mut text = String::new();
        for page in boundary.page..end {
            let media = pages[page].media_box;
            let top = if page == boundary.page {
                boundary.y + layout.anchor_padding
            } else {
                media.top - layout.border
            };
            let bottom = if page == next_page {
                next_y
            } else {
                media.bottom + layout.border
            };

            if bottom >= top {
                return Err(PapercutError::ordering(format!(
                    "question {} has no content on retained page {page} (top {top}, bottom {bottom})",
                    boundary.question
                )));
            }

            for run in &pages[page].runs {
                if bottom < run.y && run.y < top {
                    text.push_str(&normalize_text(&run.text));
                }
            }

            slices.push(PageSlice {
                page,
                clip: PageBox::new(media.left, bottom, layout.sheet_width, top),
            });
        }

        plans.push(QuestionPlan {
            question: boundary.question,
            slices,
            text,
        });
    }

    Ok(plans)
}

/// Run all four phases over a document's scanned pages.
pub fn segment(pages: Vec<PageScan>, layout: &SegmentationConfig) -> Result<Segmentation> {
    let Some(first_page_top) = pages.first().map(|p| p.media_box.top) else {
        return Err(PapercutError::ordering("document has no pages"));
    };

    let (retained, kept): (Vec<usize>, Vec<PageScan>) = pages
        .into_iter()
        .enumerate()
        .filter(|(index, scan)| {
            let excluded = is_excluded_page(&scan.runs);
            if excluded {
                debug!(page = index, "excluding blank/additional page");
            }
            !excluded
        })
        .unzip();

    let boundaries = detect_boundaries(&kept, first_page_top, layout);
    validate_order(&boundaries)?;
    let questions = plan_questions(&kept, &boundaries, layout)?;

    Ok(Segmentation {
        retained,
        boundaries,
        questions,
    })
}
