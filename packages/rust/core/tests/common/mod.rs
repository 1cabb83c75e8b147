//! Shared fixtures for papercut-core integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use papercut_core::SplitConfig;
use papercut_shared::AppConfig;

/// A text run on a fixture page.
pub struct Run {
    pub bold: bool,
    pub x: f32,
    pub y: f32,
    pub text: &'static str,
}

pub fn bold(x: f32, y: f32, text: &'static str) -> Run {
    Run { bold: true, x, y, text }
}

pub fn plain(x: f32, y: f32, text: &'static str) -> Run {
    Run { bold: false, x, y, text }
}

/// Build a PDF of `595 × height` pages holding the given runs.
pub fn paper(height: f32, pages: Vec<Vec<Run>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let fonts = doc.add_object(dictionary! {
        "F1" => dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        },
        "F2" => dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        },
    });

    let mut kids = Vec::new();
    for runs in pages {
        let mut operations = Vec::new();
        for run in runs {
            let font = if run.bold { "F1" } else { "F2" };
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![font.into(), 11i64.into()]),
                Operation::new("Td", vec![run.x.into(), run.y.into()]),
                Operation::new("Tj", vec![Object::string_literal(run.text)]),
                Operation::new("ET", vec![]),
            ]);
        }
        let content = Content { operations }.encode().expect("encode content");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let media_box: Vec<Object> = vec![0i64.into(), 0i64.into(), 595i64.into(), height.into()];
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box,
            "Resources" => dictionary! { "Font" => fonts },
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save fixture");
    bytes
}

/// The two-question paper: `1` at (50, 700) on page 0, `2` at (50, 650) on page 1.
pub fn two_question_paper() -> Vec<u8> {
    paper(
        800.0,
        vec![
            vec![bold(50.0, 700.0, "1"), plain(72.0, 650.0, "Define osmosis.")],
            vec![bold(50.0, 650.0, "2"), plain(72.0, 600.0, "Explain diffusion.")],
        ],
    )
}

/// A fresh scratch directory.
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("papercut_it_{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

pub fn write(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, bytes).expect("write fixture");
}

/// Default config rooted in `dir`.
pub fn split_config(dir: &Path) -> SplitConfig {
    let mut config = SplitConfig::from(&AppConfig::default());
    config.output_dir = dir.join("questions");
    config.index_file = dir.join("questions").join("database.csv");
    config
}
