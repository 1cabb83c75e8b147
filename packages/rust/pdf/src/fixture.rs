//! Small hand-built PDFs for unit tests.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

/// `/ToUnicode` for the composite font: two-byte glyph codes.
const COMPOSITE_CMAP: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0014> <0031>
<0015> <0032>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end
";

/// `/ToUnicode` for the remapped simple font: one-byte codes.
const REMAPPED_CMAP: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<00> <FF>
endcodespacerange
2 beginbfchar
<01> <0031>
<02> <0032>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end
";

/// Which fixture font a run is shown in.
#[derive(Clone, Copy)]
enum Face {
    Bold,
    Regular,
    /// Type0 bold font, Identity-H with a ToUnicode map.
    Composite,
    /// Subset bold font with a `/Differences` encoding and a ToUnicode map.
    Remapped,
}

impl Face {
    fn resource(self) -> &'static str {
        match self {
            Face::Bold => "F1",
            Face::Regular => "F2",
            Face::Composite => "F3",
            Face::Remapped => "F4",
        }
    }
}

/// A page of fixture text on a `595 × height` page.
pub(crate) struct FixturePage {
    height: f32,
    runs: Vec<(Face, f32, f32, Object)>,
}

impl FixturePage {
    pub(crate) fn new(height: f32) -> Self {
        Self {
            height,
            runs: Vec::new(),
        }
    }

    pub(crate) fn bold(mut self, x: f32, y: f32, text: &str) -> Self {
        self.runs.push((Face::Bold, x, y, Object::string_literal(text)));
        self
    }

    pub(crate) fn regular(mut self, x: f32, y: f32, text: &str) -> Self {
        self.runs.push((Face::Regular, x, y, Object::string_literal(text)));
        self
    }

    /// Show two-byte glyph codes in the composite font.
    pub(crate) fn composite(mut self, x: f32, y: f32, codes: &[u16]) -> Self {
        let bytes = codes.iter().flat_map(|code| code.to_be_bytes()).collect();
        self.runs
            .push((Face::Composite, x, y, Object::String(bytes, StringFormat::Hexadecimal)));
        self
    }

    /// Show one-byte codes in the remapped font.
    pub(crate) fn remapped(mut self, x: f32, y: f32, codes: &[u8]) -> Self {
        self.runs.push((
            Face::Remapped,
            x,
            y,
            Object::String(codes.to_vec(), StringFormat::Hexadecimal),
        ));
        self
    }
}

/// Serialize fixture pages into PDF bytes.
pub(crate) fn fixture_pdf(pages: &[FixturePage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let composite_map = doc.add_object(Stream::new(
        lopdf::Dictionary::new(),
        COMPOSITE_CMAP.as_bytes().to_vec(),
    ));
    let composite = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "ABCDEF+Arial-BoldMT",
        "Encoding" => "Identity-H",
        "ToUnicode" => composite_map,
    });
    let remapped_map = doc.add_object(Stream::new(
        lopdf::Dictionary::new(),
        REMAPPED_CMAP.as_bytes().to_vec(),
    ));
    let differences: Vec<Object> = vec![
        1i64.into(),
        Object::Name(b"one".to_vec()),
        Object::Name(b"two".to_vec()),
    ];
    let remapped = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "ABCDEF+TimesNewRomanPS-BoldMT",
        "Encoding" => dictionary! {
            "Type" => "Encoding",
            "Differences" => differences,
        },
        "ToUnicode" => remapped_map,
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => bold,
            "F2" => regular,
            "F3" => composite,
            "F4" => remapped,
        },
    });

    let mut kids = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        for (face, x, y, shown) in &page.runs {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![face.resource().into(), 11i64.into()]),
                Operation::new("Td", vec![(*x).into(), (*y).into()]),
                Operation::new("Tj", vec![shown.clone()]),
                Operation::new("ET", vec![]),
            ]);
        }
        let content = Content { operations }.encode().expect("encode fixture content");
        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), content));
        let media_box: Vec<Object> =
            vec![0i64.into(), 0i64.into(), 595i64.into(), page.height.into()];
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box,
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
            "Resources" => resources,
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
