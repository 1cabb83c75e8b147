//! Lazy text-run scanning over a decoded page content stream.
//!
//! Tracks just enough graphics and text state (`q`/`Q`, `cm`, `BT`, `Tf`,
//! `Td`/`TD`/`Tm`/`T*`/`TL`) to report where each shown string starts.
//! Glyph advances are not modelled: every show operator yields one run
//! positioned at the current text matrix. Shown bytes are decoded through
//! the active font's encoding (`/Encoding` or `/ToUnicode`), falling back
//! to Latin-1 when the font has none that `lopdf` understands.

use std::collections::HashMap;

use lopdf::content::Operation;
use lopdf::{Document, Encoding, Object};

use crate::geometry::{Matrix, number};

/// One shown string with its user-space origin and font.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    /// `BaseFont` of the active font, or the resource name if unresolved.
    pub font: String,
    pub bold: bool,
}

impl TextRun {
    /// Build a run from parts; boldness follows the font name.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font: impl Into<String>) -> Self {
        let font = font.into();
        Self {
            text: text.into(),
            x,
            y,
            bold: font.contains("Bold"),
            font,
        }
    }
}

/// A page font resource: its `BaseFont` and, when resolvable, its encoding.
pub(crate) struct PageFont<'a> {
    pub(crate) base_font: String,
    pub(crate) encoding: Option<Encoding<'a>>,
}

impl PageFont<'_> {
    fn decode(&self, bytes: &[u8]) -> String {
        self.encoding
            .as_ref()
            .and_then(|encoding| Document::decode_text(encoding, bytes).ok())
            .unwrap_or_else(|| latin1(bytes))
    }
}

/// Iterator over the text runs of one page, in content-stream order.
pub struct TextRuns<'a> {
    operations: std::vec::IntoIter<Operation>,
    fonts: HashMap<Vec<u8>, PageFont<'a>>,
    ctm: Matrix,
    stack: Vec<Matrix>,
    tm: Matrix,
    tlm: Matrix,
    leading: f32,
    font: Option<Vec<u8>>,
}

impl<'a> TextRuns<'a> {
    pub(crate) fn new(operations: Vec<Operation>, fonts: HashMap<Vec<u8>, PageFont<'a>>) -> Self {
        Self {
            operations: operations.into_iter(),
            fonts,
            ctm: Matrix::IDENTITY,
            stack: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            leading: 0.0,
            font: None,
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translate(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }

    fn current_font(&self) -> Option<&PageFont<'a>> {
        self.font.as_ref().and_then(|name| self.fonts.get(name))
    }

    fn decode(&self, bytes: &[u8]) -> String {
        match self.current_font() {
            Some(font) => font.decode(bytes),
            None => latin1(bytes),
        }
    }

    fn emit(&self, text: String) -> Option<TextRun> {
        if text.is_empty() {
            return None;
        }
        let (x, y) = self.tm.then(&self.ctm).origin();
        let font = match (self.current_font(), &self.font) {
            (Some(font), _) => font.base_font.clone(),
            (None, Some(name)) => String::from_utf8_lossy(name).into_owned(),
            (None, None) => String::new(),
        };
        Some(TextRun::new(text, x, y, font))
    }

    /// Decode a string operand with the active font and emit it.
    fn show(&self, operand: Option<&Object>) -> Option<TextRun> {
        let bytes = operand.and_then(string_bytes)?;
        self.emit(self.decode(bytes))
    }

    /// Apply one operator; returns a run for text-showing operators.
    fn apply(&mut self, op: Operation) -> Option<TextRun> {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => {
                self.stack.push(self.ctm);
                None
            }
            "Q" => {
                if let Some(ctm) = self.stack.pop() {
                    self.ctm = ctm;
                }
                None
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.then(&self.ctm);
                }
                None
            }
            "BT" => {
                self.tm = Matrix::IDENTITY;
                self.tlm = Matrix::IDENTITY;
                None
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.font = Some(name.clone());
                }
                None
            }
            "TL" => {
                if let Some(l) = operands.first().and_then(number) {
                    self.leading = l;
                }
                None
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    if op.operator == "TD" {
                        self.leading = -ty;
                    }
                    self.next_line(tx, ty);
                }
                None
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.tm = m;
                    self.tlm = m;
                }
                None
            }
            "T*" => {
                self.next_line(0.0, -self.leading);
                None
            }
            "Tj" => self.show(operands.first()),
            "'" => {
                self.next_line(0.0, -self.leading);
                self.show(operands.first())
            }
            "\"" => {
                self.next_line(0.0, -self.leading);
                self.show(operands.get(2))
            }
            "TJ" => match operands.first() {
                Some(Object::Array(items)) => {
                    let text: String = items
                        .iter()
                        .filter_map(string_bytes)
                        .map(|bytes| self.decode(bytes))
                        .collect();
                    self.emit(text)
                }
                _ => None,
            },
            _ => None,
        }
    }
}

impl Iterator for TextRuns<'_> {
    type Item = TextRun;

    fn next(&mut self) -> Option<TextRun> {
        while let Some(op) = self.operations.next() {
            if let Some(run) = self.apply(op) {
                return Some(run);
            }
        }
        None
    }
}

fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

/// Byte-for-byte decoding for fonts without a usable encoding.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
