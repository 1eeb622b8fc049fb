//! DOCX renderer using docx-rs
//!
//! Writes the title as a bold heading followed by one paragraph per
//! non-empty line of the blog.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};

use crate::{DocumentRenderer, ExportError, ExportFormat, Result};

/// DOCX document renderer
pub struct DocxRenderer {
    /// Title size in half-points
    pub title_size: usize,
}

impl DocxRenderer {
    /// Create a renderer with default settings
    pub fn new() -> Self {
        Self { title_size: 32 }
    }
}

impl Default for DocxRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRenderer for DocxRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    fn render(&self, title: &str, text: &str) -> Result<Vec<u8>> {
        if title.trim().is_empty() && text.trim().is_empty() {
            return Err(ExportError::EmptyDocument);
        }

        let mut docx = Docx::new();

        if !title.trim().is_empty() {
            docx = docx.add_paragraph(
                Paragraph::new().add_run(
                    Run::new()
                        .add_text(title.trim())
                        .bold()
                        .size(self.title_size),
                ),
            );
        }

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
        }

        let mut buf = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buf)
            .map_err(|e| ExportError::DocxError(e.to_string()))?;

        let bytes = buf.into_inner();
        tracing::debug!(bytes = bytes.len(), "Rendered DOCX");
        Ok(bytes)
    }
}
