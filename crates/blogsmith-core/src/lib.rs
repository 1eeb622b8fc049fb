//! Blogsmith Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout Blogsmith:
//! - Vector records loaded from the embedding index
//! - Scored search results and blog drafts
//! - Common error types
//! - The chat-completion client trait
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, IndexConfig, LlmConfig, LlmProvider, LoggingConfig, MailConfig,
    ServerConfig, SimilarityMetric,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Blogsmith operations
#[derive(Error, Debug)]
pub enum BlogError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BlogError>;

// ============================================================================
// Index Records
// ============================================================================

/// Descriptive metadata attached to a vector record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Source file the embedding was computed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Text snippet the embedding was computed from
    #[serde(default, alias = "content", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Any other fields present in the index file
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single entry of the embedding index
///
/// Records are immutable once the index is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Record identifier (assigned from position when the file omits it)
    #[serde(default, alias = "identifier")]
    pub id: String,

    /// Embedding vector
    #[serde(alias = "embedding")]
    pub vector: Vec<f32>,

    /// Associated metadata
    #[serde(flatten)]
    pub metadata: RecordMetadata,
}

impl VectorRecord {
    /// Create a record with no metadata
    pub fn new(id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: RecordMetadata::default(),
        }
    }

    /// Set the source filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.metadata.filename = Some(filename.into());
        self
    }

    /// Set the text snippet
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.metadata.text = Some(text.into());
        self
    }

    /// Human-readable label: filename, else text snippet, else identifier
    pub fn label(&self) -> &str {
        self.metadata
            .filename
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.metadata
                    .text
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
            })
            .unwrap_or(self.id.as_str())
    }
}

impl AsRef<[f32]> for VectorRecord {
    fn as_ref(&self) -> &[f32] {
        &self.vector
    }
}

/// A record paired with its per-request similarity score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub record: VectorRecord,
    pub score: f32,
}

impl ScoredRecord {
    pub fn label(&self) -> &str {
        self.record.label()
    }
}

// ============================================================================
// Drafts
// ============================================================================

/// Reference to an index record used as drafting context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    pub label: String,
    pub score: f32,
}

impl From<&ScoredRecord> for SourceRef {
    fn from(scored: &ScoredRecord) -> Self {
        Self {
            id: scored.record.id.clone(),
            label: scored.label().to_string(),
            score: scored.score,
        }
    }
}

/// A generated blog post with the context it was grounded in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogDraft {
    /// Requested topic
    pub topic: String,

    /// Generated blog text
    pub blog: String,

    /// Index records that were passed to the model
    pub sources: Vec<SourceRef>,

    /// Generation timestamp
    pub generated_at: DateTime<Utc>,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

// ============================================================================
// Chat Completion
// ============================================================================

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single chat-completion message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Trait for LLM clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a chat conversation and return the assistant's reply
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Generate a response to a single user prompt
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(&[ChatMessage::user(prompt)]).await
    }

    /// Client name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
