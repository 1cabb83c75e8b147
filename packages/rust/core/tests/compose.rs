//! Composing split output back into sheets.

mod common;

use std::path::{Path, PathBuf};

use common::{paper, scratch_dir, split_config, two_question_paper, write};
use lopdf::Document;
use lopdf::content::Content;
use papercut_core::{SilentProgress, compose, query, split_batch};
use papercut_pdf::{PageBox, PdfDocument};
use papercut_shared::{CompositingConfig, QueryPredicate};
use papercut_storage::IndexStore;

/// Vertical `cm` offsets of the placed pages, per output sheet.
fn placement_offsets(path: &Path) -> Vec<Vec<f32>> {
    let doc = Document::load(path).expect("load output");
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let data = doc.get_page_content(page_id).expect("page content");
            Content::decode(&data)
                .expect("decode content")
                .operations
                .iter()
                .filter(|op| op.operator == "cm")
                .map(|op| op.operands[5].as_float().expect("cm dy"))
                .collect()
        })
        .collect()
}

/// Rewrite every page's MediaBox to start `bottom` points up.
fn raise_media_boxes(bytes: &[u8], bottom: f32, height: f32) -> Vec<u8> {
    let mut doc = Document::load_mem(bytes).expect("load paper");
    for page_id in doc.get_pages().into_values() {
        let media_box: Vec<lopdf::Object> =
            vec![0i64.into(), bottom.into(), 595i64.into(), (bottom + height).into()];
        doc.get_dictionary_mut(page_id)
            .expect("page dict")
            .set("MediaBox", media_box);
    }
    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save paper");
    out
}

#[test]
fn query_results_compose_onto_a4_sheets() {
    let dir = scratch_dir();
    let source = dir.join("9700_s22_qp_12.pdf");
    write(&source, &two_question_paper());
    let config = split_config(&dir);
    split_batch(&source, &config, &SilentProgress).expect("split");

    let rows = IndexStore::open_readonly(&config.index_file).load().expect("load");
    let hits = query(&rows, &[QueryPredicate::new("subject_code", "9700", 1.0)]).expect("query");
    assert_eq!(hits.len(), 2);

    // Q2 (one page, 615pt) is placed first; Q1's 665pt page overflows onto
    // sheet two, where its 105pt continuation still fits.
    let files: Vec<PathBuf> = hits.iter().map(PathBuf::from).collect();
    let output = dir.join("out").join("merged.pdf");
    let report = compose(&files, &output, &CompositingConfig::default()).expect("compose");
    assert_eq!(report.sources, 2);
    assert_eq!(report.pages, 3);
    assert_eq!(report.sheets, 2);
    assert!(report.bytes > 0);

    let merged = PdfDocument::open(&output).expect("open merged");
    assert_eq!(merged.page_count(), 2);
    for page in 0..2 {
        assert_eq!(merged.page_box(page).expect("box"), PageBox::sized(595.0, 842.0));
    }
    // dy = 842 - cursor - height: Q2 at 20; Q1 at 20, then 20 + 665 + 10.
    assert_eq!(placement_offsets(&output), vec![vec![207.0], vec![157.0, 42.0]]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn fewer_page_sources_are_placed_first() {
    let dir = scratch_dir();
    let long = dir.join("long.pdf");
    let short = dir.join("short.pdf");
    write(&long, &paper(300.0, vec![vec![], vec![], vec![]]));
    write(&short, &paper(500.0, vec![vec![]]));
    let output = dir.join("merged.pdf");

    // Listed long-first, but the one-page source leads sheet one. In list
    // order the sheets would be [L1, L2] and [L3, S].
    let report = compose(&[long, short], &output, &CompositingConfig::default()).expect("compose");
    assert_eq!((report.pages, report.sheets), (4, 2));
    assert_eq!(
        placement_offsets(&output),
        vec![vec![322.0, 12.0], vec![522.0, 212.0]]
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn raised_media_boxes_are_shifted_back_onto_the_sheet() {
    let dir = scratch_dir();
    let source = dir.join("raised.pdf");
    write(&source, &raise_media_boxes(&paper(300.0, vec![vec![]]), 100.0, 300.0));
    let output = dir.join("merged.pdf");

    compose(&[source], &output, &CompositingConfig::default()).expect("compose");
    // Page bottom lands at 842 - 20 - 300 = 522, so dy = 522 - 100.
    assert_eq!(placement_offsets(&output), vec![vec![422.0]]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn empty_selection_writes_one_blank_sheet() {
    let dir = scratch_dir();
    let output = dir.join("empty.pdf");
    let report = compose(&[], &output, &CompositingConfig::default()).expect("compose");
    assert_eq!((report.pages, report.sheets), (0, 1));
    assert_eq!(PdfDocument::open(&output).expect("open").page_count(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_source_is_an_error() {
    let dir = scratch_dir();
    let output = dir.join("out.pdf");
    let missing = vec![dir.join("nope.pdf")];
    assert!(compose(&missing, &output, &CompositingConfig::default()).is_err());
    assert!(!output.exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unwritable_output_propagates() {
    let dir = scratch_dir();
    // A regular file where the output's parent directory should be.
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, b"x").expect("write blocker");
    let output = blocker.join("merged.pdf");

    let err = compose(&[], &output, &CompositingConfig::default()).unwrap_err();
    assert!(err.to_string().contains("write error"));

    std::fs::remove_dir_all(&dir).ok();
}
