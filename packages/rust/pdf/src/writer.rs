//! Output document assembly.
//!
//! Source pages are imported wholesale (object graph renumbered into the
//! output), then wrapped as Form XObjects whose `BBox` clips them to the
//! requested box. Each output page draws its forms under a translation,
//! so the imported source objects are never modified.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use papercut_shared::{PapercutError, Result};

use crate::document::{PdfDocument, inherited, resolve};
use crate::geometry::{Matrix, PageBox};
use crate::pdf_err;

/// Origin of the rotated side label, in output page space.
const LABEL_ORIGIN: (f32, f32) = (15.0, 10.0);

/// Resource name of the label font.
const LABEL_FONT: &str = "PcLabel";

/// A page of an imported document, addressable inside the writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportedPage {
    id: ObjectId,
    /// The page's MediaBox in its own coordinates.
    pub media_box: PageBox,
}

/// Pages of a source document copied into a [`PdfWriter`].
#[derive(Debug, Clone)]
pub struct ImportedDocument {
    pages: Vec<ImportedPage>,
}

impl ImportedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<ImportedPage> {
        self.pages.get(index).copied()
    }

    pub fn pages(&self) -> &[ImportedPage] {
        &self.pages
    }
}

/// One imported page drawn onto an output page.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub page: ImportedPage,
    /// Region of the source page to keep, in source coordinates.
    pub clip: PageBox,
    /// Vertical translation applied when drawing.
    pub dy: f32,
}

/// Description of one output page.
#[derive(Debug, Clone)]
pub struct OutputPage {
    pub media_box: PageBox,
    pub placements: Vec<Placement>,
    /// Text drawn rotated along the left edge.
    pub label: Option<String>,
}

/// Builds a new PDF from imported pages.
pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    label_font: Option<ObjectId>,
    label_size: f32,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            label_font: None,
            label_size: 12.0,
        }
    }

    /// Set the side-label font size.
    pub fn with_label_size(mut self, size: f32) -> Self {
        self.label_size = size;
        self
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Copy a source document's objects into this writer.
    pub fn import(&mut self, source: &PdfDocument) -> ImportedDocument {
        let mut copy = source.doc.clone();
        copy.renumber_objects_with(self.doc.max_id + 1);

        let pages = copy
            .get_pages()
            .into_values()
            .map(|id| ImportedPage {
                id,
                media_box: inherited(&copy, id, b"MediaBox")
                    .and_then(|obj| PageBox::from_object(resolve(&copy, obj)))
                    .unwrap_or(PageBox::sized(612.0, 792.0)),
            })
            .collect::<Vec<_>>();

        let copied_max = copy.objects.keys().map(|id| id.0).max().unwrap_or(0);
        self.doc.max_id = self.doc.max_id.max(copied_max).max(copy.max_id);
        self.doc.objects.extend(copy.objects);

        debug!(pages = pages.len(), max_id = self.doc.max_id, "imported document");
        ImportedDocument { pages }
    }

    /// Wrap an imported page as a Form XObject clipped to `clip`.
    fn form(&mut self, page: ImportedPage, clip: PageBox) -> Result<ObjectId> {
        let content = self.doc.get_page_content(page.id).map_err(pdf_err)?;
        let resources = inherited(&self.doc, page.id, b"Resources")
            .cloned()
            .unwrap_or_else(|| Object::Dictionary(Dictionary::new()));

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "FormType" => 1i64,
            "BBox" => clip.to_object(),
            "Resources" => resources,
        };
        Ok(self.doc.add_object(Stream::new(dict, content)))
    }

    fn label_font(&mut self) -> ObjectId {
        if let Some(id) = self.label_font {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.label_font = Some(id);
        id
    }

    /// Append an output page.
    pub fn add_page(&mut self, out: OutputPage) -> Result<()> {
        let mut operations = Vec::new();
        let mut xobjects = Dictionary::new();

        for (i, placement) in out.placements.iter().enumerate() {
            let form_id = self.form(placement.page, placement.clip)?;
            let name = format!("Pc{i}");
            xobjects.set(name.clone(), form_id);
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                Matrix::translate(0.0, placement.dy).to_operands(),
            ));
            operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
            operations.push(Operation::new("Q", vec![]));
        }

        let mut resources = dictionary! { "XObject" => xobjects };

        if let Some(label) = &out.label {
            let font_id = self.label_font();
            resources.set("Font", dictionary! { LABEL_FONT => font_id });
            // Rotate 90 degrees counter-clockwise so the label reads upwards.
            let rotated = Matrix {
                a: 0.0,
                b: 1.0,
                c: -1.0,
                d: 0.0,
                e: LABEL_ORIGIN.0,
                f: LABEL_ORIGIN.1,
            };
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![LABEL_FONT.into(), self.label_size.into()]),
                Operation::new("Tm", rotated.to_operands()),
                Operation::new("Tj", vec![Object::string_literal(label.as_str())]),
                Operation::new("ET", vec![]),
            ]);
        }

        let content = Content { operations }.encode().map_err(pdf_err)?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => out.media_box.to_object(),
            "Resources" => resources,
            "Contents" => content_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Finish the page tree, drop unreferenced imports, compress, and serialize.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let pruned = self.doc.prune_objects();
        debug!(pruned = pruned.len(), pages = count, "finalizing document");
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer).map_err(pdf_err)?;
        Ok(buffer)
    }

    /// Serialize and write to `path`, creating parent directories.
    pub fn save(self, path: &Path) -> Result<usize> {
        let bytes = self.finish()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PapercutError::write(parent, e))?;
        }
        std::fs::write(path, &bytes).map_err(|e| PapercutError::write(path, e))?;
        Ok(bytes.len())
    }
}
