//! PDF renderer using printpdf
//!
//! Lays the blog out on A4 pages with the built-in Helvetica fonts, so no
//! font files need to ship with the binary.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::{wrap_line, DocumentRenderer, ExportError, ExportFormat, Result};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LAYER_NAME: &str = "Layer 1";

/// PDF document renderer
pub struct PdfRenderer {
    /// Body font size in points
    pub font_size: f32,
    /// Title font size in points
    pub title_size: f32,
    /// Characters per wrapped line
    pub max_line_chars: usize,
}

impl PdfRenderer {
    /// Create a renderer with default layout
    pub fn new() -> Self {
        Self {
            font_size: 11.0,
            title_size: 16.0,
            max_line_chars: 90,
        }
    }

    fn line_height_mm(&self, size: f32) -> f32 {
        // 1pt = 0.3528mm, plus leading
        size * 0.3528 * 1.4
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the write position across pages
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl Cursor<'_> {
    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
            self.pages += 1;
        }
    }

    fn write(&mut self, text: &str, size: f32, height: f32, font: &IndirectFontRef) {
        self.ensure_room(height);
        self.y -= height;
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
    }
}

impl DocumentRenderer for PdfRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn render(&self, title: &str, text: &str) -> Result<Vec<u8>> {
        if title.trim().is_empty() && text.trim().is_empty() {
            return Err(ExportError::EmptyDocument);
        }

        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);

        let body_font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::PdfError(e.to_string()))?;
        let title_font = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::PdfError(e.to_string()))?;

        let mut cursor = Cursor {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        };

        let title_height = self.line_height_mm(self.title_size);
        let body_height = self.line_height_mm(self.font_size);
        let title_chars = self.max_line_chars * 2 / 3;

        if !title.trim().is_empty() {
            for line in wrap_line(title.trim(), title_chars.max(1)) {
                cursor.write(&line, self.title_size, title_height, &title_font);
            }
            cursor.y -= body_height;
        }

        for paragraph in text.lines() {
            if paragraph.trim().is_empty() {
                cursor.y -= body_height / 2.0;
                continue;
            }
            for line in wrap_line(paragraph, self.max_line_chars.max(1)) {
                cursor.write(&line, self.font_size, body_height, &body_font);
            }
        }

        let pages = cursor.pages;
        drop(cursor);

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| ExportError::PdfError(e.to_string()))?;
        tracing::debug!(pages, bytes = bytes.len(), "Rendered PDF");
        Ok(bytes)
    }
}
