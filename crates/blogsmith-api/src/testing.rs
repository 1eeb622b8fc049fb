//! In-process doubles for router tests
//!
//! Only compiled with the `test-utils` feature.
//!
//! Author: hephaex@gmail.com

use crate::state::AppState;
use async_trait::async_trait;
use blogsmith_core::{AppConfig, BlogError, ChatMessage, LlmClient, Result, VectorRecord};
use blogsmith_mail::{MailReceipt, Mailer, OutgoingMail};
use blogsmith_rag::{BlogDrafter, DraftConfig};
use blogsmith_vector::{EmbeddingClient, Retriever, VectorIndex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Maps every text onto the same unit vector
pub struct StubEmbedding {
    pub calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingClient for StubEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0, 0.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        3
    }
}

/// Returns a canned post, or fails when told to
pub struct StubLlm {
    pub fail: AtomicBool,
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(BlogError::Llm("stub failure with internal detail".to_string()));
        }
        if let Some(last) = messages.last() {
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(last.content.clone());
            }
        }
        Ok("Headline\nIntro paragraph.\nWrap-up.".to_string())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Captures outgoing mail, or fails when told to
#[derive(Default)]
pub struct RecordingMailer {
    pub fail: AtomicBool,
    pub sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<MailReceipt> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(BlogError::Mail("stub mail failure".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail.clone());
        }
        Ok(MailReceipt {
            status: 200,
            message_id: Some("stub-1".to_string()),
        })
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Doubles plus the state wired over them
pub struct TestHarness {
    pub embedder: Arc<StubEmbedding>,
    pub llm: Arc<StubLlm>,
    pub mailer: Arc<RecordingMailer>,
    pub config: AppConfig,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            embedder: Arc::new(StubEmbedding {
                calls: AtomicUsize::new(0),
            }),
            llm: Arc::new(StubLlm {
                fail: AtomicBool::new(false),
                prompts: Mutex::new(Vec::new()),
            }),
            mailer: Arc::new(RecordingMailer::default()),
            config: AppConfig::default(),
        }
    }

    /// A small three-record index
    pub fn index() -> VectorIndex {
        VectorIndex::from_records(vec![
            VectorRecord::new("lease", vec![1.0, 0.0, 0.0]).with_filename("lease-extension.pdf"),
            VectorRecord::new("damp", vec![0.0, 1.0, 0.0]).with_filename("damp-survey.pdf"),
            VectorRecord::new("mixed", vec![0.7, 0.7, 0.0]).with_text("Valuation notes"),
        ])
        .unwrap_or_default()
    }

    /// Ready state with drafter and mailer
    pub fn state(&self) -> AppState {
        let retriever = Retriever::new(Arc::new(Self::index()), self.embedder.clone())
            .with_config(&self.config.index);
        let drafter = BlogDrafter::new(
            Arc::new(retriever),
            self.llm.clone(),
            DraftConfig::default(),
        );

        AppState::new(self.config.clone())
            .with_drafter(Arc::new(drafter))
            .with_mailer(self.mailer.clone())
    }

    /// Ready state without a mailer
    pub fn state_without_mail(&self) -> AppState {
        let mut state = self.state();
        state.mailer = None;
        state
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
