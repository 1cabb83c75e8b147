//! Loaded source documents: page boxes, fonts, and text scans.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use papercut_shared::{PapercutError, Result};

use crate::geometry::PageBox;
use crate::pdf_err;
use crate::scan::{PageFont, TextRuns};

/// US Letter, used when a page tree carries no MediaBox at all.
const FALLBACK_MEDIA_BOX: PageBox = PageBox {
    left: 0.0,
    bottom: 0.0,
    right: 612.0,
    top: 792.0,
};

/// A source PDF opened for reading.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub(crate) doc: Document,
    pub(crate) pages: Vec<ObjectId>,
    path: Option<PathBuf>,
}

impl PdfDocument {
    /// Load a document from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| PapercutError::io(path, e))?;
        let mut doc = Self::from_bytes(&bytes)
            .map_err(|e| PapercutError::Pdf(format!("{}: {e}", path.display())))?;
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Parse a document held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(pdf_err)?;
        let pages = doc.get_pages().into_values().collect();
        Ok(Self {
            doc,
            pages,
            path: None,
        })
    }

    /// Path the document was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages.get(index).copied().ok_or_else(|| {
            PapercutError::Pdf(format!(
                "page {index} out of range ({} pages)",
                self.pages.len()
            ))
        })
    }

    /// The page's MediaBox, following page-tree inheritance.
    pub fn page_box(&self, index: usize) -> Result<PageBox> {
        let page_id = self.page_id(index)?;
        Ok(inherited(&self.doc, page_id, b"MediaBox")
            .and_then(|obj| PageBox::from_object(resolve(&self.doc, obj)))
            .unwrap_or(FALLBACK_MEDIA_BOX))
    }

    /// Scan a page's content stream for text runs.
    pub fn text_runs(&self, index: usize) -> Result<TextRuns<'_>> {
        let page_id = self.page_id(index)?;
        let data = self.doc.get_page_content(page_id).map_err(pdf_err)?;
        let content = Content::decode(&data).map_err(pdf_err)?;
        let fonts = page_fonts(&self.doc, page_id);
        debug!(
            page = index,
            operations = content.operations.len(),
            fonts = fonts.len(),
            "scanning page content"
        );
        Ok(TextRuns::new(content.operations, fonts))
    }
}

/// Follow a reference to its target, or return the object itself.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj) {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Look up an inheritable page attribute, walking `/Parent` links.
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    // Bounded walk guards against cyclic Parent chains.
    for _ in 0..64 {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?;
        node = resolve_dict(doc, parent)?;
    }
    None
}

/// Map each font resource name on a page to its `BaseFont` and encoding.
///
/// Fonts with neither `/Encoding` nor `/ToUnicode` get no encoding and are
/// decoded byte-for-byte.
fn page_fonts(doc: &Document, page_id: ObjectId) -> HashMap<Vec<u8>, PageFont<'_>> {
    let mut fonts = HashMap::new();
    let Some(resources) = inherited(doc, page_id, b"Resources").and_then(|r| resolve_dict(doc, r))
    else {
        return fonts;
    };
    let Some(font_dict) = resources.get(b"Font").ok().and_then(|f| resolve_dict(doc, f)) else {
        return fonts;
    };
    for (name, value) in font_dict.iter() {
        let Some(font) = resolve_dict(doc, value) else {
            continue;
        };
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|base| match resolve(doc, base) {
                Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
                _ => None,
            })
            .unwrap_or_else(|| String::from_utf8_lossy(name).into_owned());
        let encoding = if font.has(b"Encoding") || font.has(b"ToUnicode") {
            match font.get_font_encoding(doc) {
                Ok(encoding) => Some(encoding),
                Err(e) => {
                    debug!(font = %base_font, error = %e, "unsupported font encoding");
                    None
                }
            }
        } else {
            None
        };
        fonts.insert(name.clone(), PageFont { base_font, encoding });
    }
    fonts
}
