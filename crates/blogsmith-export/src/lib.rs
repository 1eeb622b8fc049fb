//! Blogsmith Export - Render blog drafts as downloadable documents
//!
//! Supports rendering to:
//! - PDF (A4, Helvetica, word-wrapped and paginated)
//! - Microsoft Word (DOCX)
//!
//! Each renderer implements the `DocumentRenderer` trait and produces the
//! raw file bytes, ready to be attached to an email or written to disk.

use blogsmith_core::BlogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod docx;
pub mod pdf;

pub use docx::DocxRenderer;
pub use pdf::PdfRenderer;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while rendering a document
#[derive(Error, Debug)]
pub enum ExportError {
    /// PDF generation error
    #[error("PDF rendering error: {0}")]
    PdfError(String),

    /// DOCX generation error
    #[error("DOCX rendering error: {0}")]
    DocxError(String),

    /// Nothing to render
    #[error("Document has no content")]
    EmptyDocument,
}

pub type Result<T> = std::result::Result<T, ExportError>;

impl From<ExportError> for BlogError {
    fn from(err: ExportError) -> Self {
        BlogError::Render(err.to_string())
    }
}

// ============================================================================
// Formats
// ============================================================================

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    /// All formats, in attachment order
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Pdf, ExportFormat::Docx];

    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    /// MIME type of the rendered file
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ============================================================================
// Renderer Trait
// ============================================================================

/// Trait for document renderers
pub trait DocumentRenderer: Send + Sync {
    /// Output format of this renderer
    fn format(&self) -> ExportFormat;

    /// Render `text` under `title` and return the file bytes
    fn render(&self, title: &str, text: &str) -> Result<Vec<u8>>;
}

/// Get the renderer for a format
pub fn renderer_for(format: ExportFormat) -> Box<dyn DocumentRenderer> {
    match format {
        ExportFormat::Pdf => Box::new(PdfRenderer::new()),
        ExportFormat::Docx => Box::new(DocxRenderer::new()),
    }
}

// ============================================================================
// Attachments
// ============================================================================

/// A rendered file ready to be sent or saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Render the blog as a PDF and a DOCX named after the topic
pub fn render_attachments(topic: &str, text: &str) -> Result<Vec<Attachment>> {
    let stem = file_stem(topic);
    let mut attachments = Vec::with_capacity(ExportFormat::ALL.len());

    for format in ExportFormat::ALL {
        let data = renderer_for(format).render(topic, text)?;
        tracing::debug!(format = %format, bytes = data.len(), "Rendered attachment");
        attachments.push(Attachment {
            filename: format!("{stem}.{}", format.extension()),
            content_type: format.content_type().to_string(),
            data,
        });
    }

    Ok(attachments)
}

const MAX_STEM_CHARS: usize = 80;

/// Turn a topic into a safe filename stem
///
/// Keeps ASCII letters, digits, `-` and `_`; every other run of characters
/// becomes a single `-`. Falls back to `blog` when nothing survives.
pub fn file_stem(topic: &str) -> String {
    let mut stem = String::with_capacity(topic.len());
    let mut pending_dash = false;

    for c in topic.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending_dash && !stem.is_empty() {
                stem.push('-');
            }
            pending_dash = false;
            stem.push(c);
        } else {
            pending_dash = true;
        }
        if stem.len() >= MAX_STEM_CHARS {
            break;
        }
    }

    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "blog".to_string()
    } else {
        stem.to_string()
    }
}

/// Split `line` into pieces of at most `max_chars` characters at word boundaries
pub(crate) fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word = word.to_string();

        // Hard-split words that can never fit
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split_at = word
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            let rest = word.split_off(split_at);
            lines.push(word);
            word = rest;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// ============================================================================
// Tests
// ============================================================================
