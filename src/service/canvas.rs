use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::DanfeError;

// A4 portrait, points
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 30.0;

const SECTION_SIZE: f32 = 10.0;
const LINE_SPACING: f32 = 1.2;

/// Approximate Helvetica advance per glyph, in ems. Good enough for
/// wrapping and centering a body-text document without shipping metrics.
const GLYPH_ADVANCE: f32 = 0.5;

/// Paginated A4 text canvas over a lopdf document.
///
/// The canvas owns line wrapping and page breaks; callers append lines and
/// labeled sections and call [`finish`](PageCanvas::finish) for the bytes.
pub struct PageCanvas {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    operations: Vec<Operation>,
    cursor_y: f32,
}

impl PageCanvas {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        Self {
            doc,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            operations: Vec::new(),
            cursor_y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Append a left-aligned line, wrapped at the right margin.
    pub fn line(&mut self, size: f32, text: &str) -> Result<(), DanfeError> {
        for part in wrap(text, size) {
            self.emit_line(&part, MARGIN, size)?;
        }
        Ok(())
    }

    /// Append a horizontally centered line.
    pub fn centered_line(&mut self, size: f32, text: &str) -> Result<(), DanfeError> {
        for part in wrap(text, size) {
            let x = ((PAGE_WIDTH - text_width(&part, size)) / 2.0).max(MARGIN);
            self.emit_line(&part, x, size)?;
        }
        Ok(())
    }

    /// Start a labeled section: an underlined heading in body size.
    pub fn section(&mut self, title: &str) -> Result<(), DanfeError> {
        self.emit_line(title, MARGIN, SECTION_SIZE)?;
        let y = self.cursor_y - 1.5;
        self.operations.extend([
            Operation::new("w", vec![0.5.into()]),
            Operation::new("m", vec![MARGIN.into(), y.into()]),
            Operation::new(
                "l",
                vec![(MARGIN + text_width(title, SECTION_SIZE)).into(), y.into()],
            ),
            Operation::new("S", vec![]),
        ]);
        Ok(())
    }

    /// Vertical gap between blocks
    pub fn gap(&mut self) {
        self.cursor_y -= SECTION_SIZE * LINE_SPACING;
    }

    /// Close the document and return the serialized PDF.
    pub fn finish(mut self) -> Result<Vec<u8>, DanfeError> {
        if !self.operations.is_empty() || self.page_ids.is_empty() {
            self.close_page()?;
        }

        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let count = self.page_ids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        };
        self.doc.objects.insert(self.pages_id, pages_dict.into());

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buffer = std::io::Cursor::new(Vec::new());
        self.doc.save_to(&mut buffer).map_err(lopdf::Error::from)?;
        Ok(buffer.into_inner())
    }

    fn emit_line(&mut self, text: &str, x: f32, size: f32) -> Result<(), DanfeError> {
        let height = size * LINE_SPACING;
        if self.cursor_y - height < MARGIN {
            self.close_page()?;
        }
        self.cursor_y -= height;
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), size.into()]),
            Operation::new("Td", vec![x.into(), self.cursor_y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    /// Flush the accumulated operations into a page object and reset the cursor.
    fn close_page(&mut self) -> Result<(), DanfeError> {
        let content = Content {
            operations: std::mem::take(&mut self.operations),
        };
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        self.cursor_y = PAGE_HEIGHT - MARGIN;
        Ok(())
    }
}

impl Default for PageCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_ADVANCE
}

/// Greedy word wrap against the printable width. A single word wider than
/// the line is left unsplit and overflows.
fn wrap(text: &str, size: f32) -> Vec<String> {
    let limit = PAGE_WIDTH - 2.0 * MARGIN;
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if current.is_empty() || text_width(&candidate, size) <= limit {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Helvetica is registered with WinAnsiEncoding; map the text into that
/// single-byte space and replace anything outside Latin-1 with '?'.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            cp @ 0x20..=0x7E => cp as u8,
            cp @ 0xA0..=0xFF => cp as u8,
            _ => b'?',
        })
        .collect()
}
