//! Blogsmith RAG - Retrieval-augmented blog drafting
//!
//! This crate implements the drafting pipeline:
//! - Retrieve the index records closest to the topic
//! - Build a grounded prompt from their labels
//! - Ask the chat-completion model for a blog post
//!
//! Author: hephaex@gmail.com

use blogsmith_core::{
    AppConfig, BlogDraft, BlogError, ChatMessage, LlmClient, Result, ScoredRecord, SourceRef,
};
use blogsmith_vector::{create_embedding_client, EmbeddingClient, Retriever, VectorIndex};
use std::sync::Arc;
use std::time::Instant;

pub mod llm;

pub use llm::{create_llm_client, OllamaClient, OpenAiClient};

/// Default drafting persona
pub const DEFAULT_PERSONA: &str = "We are RICS chartered surveyors and valuers.";

// ============================================================================
// Configuration
// ============================================================================

/// Drafting configuration
#[derive(Debug, Clone)]
pub struct DraftConfig {
    /// System persona the model writes as
    pub persona: String,

    /// Maximum context length for the LLM (in characters)
    pub max_context_length: usize,

    /// Number of index records to retrieve; `None` uses the retriever's setting
    pub top_k: Option<usize>,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            max_context_length: 8000,
            top_k: None,
        }
    }
}

// ============================================================================
// Drafter
// ============================================================================

/// Drafts blog posts grounded in the embedding index
pub struct BlogDrafter {
    retriever: Arc<Retriever>,
    llm_client: Arc<dyn LlmClient>,
    config: DraftConfig,
}

impl BlogDrafter {
    /// Create a new drafter
    pub fn new(
        retriever: Arc<Retriever>,
        llm_client: Arc<dyn LlmClient>,
        config: DraftConfig,
    ) -> Self {
        Self {
            retriever,
            llm_client,
            config,
        }
    }

    /// Wire a drafter over `index` using the configured embedding and chat providers
    pub fn from_config(config: &AppConfig, index: Arc<VectorIndex>) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingClient> = Arc::from(create_embedding_client(&config.llm)?);
        let llm_client: Arc<dyn LlmClient> = Arc::from(create_llm_client(&config.llm)?);
        let retriever = Retriever::new(index, embedder).with_config(&config.index);

        tracing::info!(
            provider = ?config.llm.provider,
            model = %config.llm.model,
            embedding_model = %config.llm.embedding_model,
            top_k = config.index.top_k,
            metric = %config.index.metric,
            "Drafter initialized"
        );

        Ok(Self::new(
            Arc::new(retriever),
            llm_client,
            DraftConfig::default(),
        ))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    /// Draft a blog post on `topic`
    pub async fn draft(&self, topic: &str) -> Result<BlogDraft> {
        let start = Instant::now();

        let topic = topic.trim();
        if topic.is_empty() {
            return Err(BlogError::InvalidInput("Missing topic".to_string()));
        }

        tracing::info!(topic, llm = self.llm_client.name(), "Drafting blog post");

        // Step 1: Retrieve context
        let matches = match self.config.top_k {
            Some(k) => self.retriever.search_top(topic, k).await?,
            None => self.retriever.search(topic).await?,
        };
        tracing::debug!("Retrieved {} context records", matches.len());

        // Step 2: Build prompt
        let (context, used) = self.build_context(&matches);
        let prompt = self.build_prompt(topic, &context);

        // Step 3: Generate
        let messages = [
            ChatMessage::system(self.config.persona.clone()),
            ChatMessage::user(prompt),
        ];
        let blog = self.llm_client.complete(&messages).await?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            topic,
            sources = used.len(),
            processing_time_ms,
            "Blog draft generated"
        );

        Ok(BlogDraft {
            topic: topic.to_string(),
            blog: blog.trim().to_string(),
            sources: used.iter().map(SourceRef::from).collect(),
            generated_at: chrono::Utc::now(),
            processing_time_ms,
        })
    }

    /// One `• <label>` line per match, stopping before the context budget
    /// (counted in characters) is exceeded. Returns the context lines and the matches they cover.
    fn build_context<'a>(&self, matches: &'a [ScoredRecord]) -> (Vec<String>, &'a [ScoredRecord]) {
        let mut lines = Vec::with_capacity(matches.len());
        let mut total_length = 0;

        for scored in matches {
            let line = format!("• {}", scored.label());
            let line_length = line.chars().count();
            if total_length + line_length > self.config.max_context_length {
                break;
            }
            total_length += line_length;
            lines.push(line);
        }

        let used = &matches[..lines.len()];
        (lines, used)
    }

    fn build_prompt(&self, topic: &str, context: &[String]) -> String {
        PromptBuilder::new()
            .topic(topic)
            .add_context(context.join("\n"))
            .add_instruction("Use only the documents above. Do not make anything up.")
            .add_instruction("Include a headline, an intro, key points, and a wrap-up.")
            .build()
    }
}

// ============================================================================
// Prompt Builder
// ============================================================================

/// Builder for drafting prompts
pub struct PromptBuilder {
    system_instruction: String,
    context_sections: Vec<String>,
    topic: String,
    instructions: Vec<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new() -> Self {
        Self {
            system_instruction: String::new(),
            context_sections: Vec::new(),
            topic: String::new(),
            instructions: Vec::new(),
        }
    }

    /// Set system instruction
    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Add a context section
    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        if !context.trim().is_empty() {
            self.context_sections.push(context);
        }
        self
    }

    /// Set the blog topic
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Add an instruction
    pub fn add_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Build the final prompt
    pub fn build(self) -> String {
        let mut prompt = String::new();

        if !self.system_instruction.is_empty() {
            prompt.push_str(&self.system_instruction);
            prompt.push_str("\n\n");
        }

        if !self.topic.is_empty() {
            prompt.push_str(&format!(
                "Write a professional blog post on the topic: \"{}\".\n\n",
                self.topic
            ));
        }

        prompt.push_str("Documents:\n");
        if self.context_sections.is_empty() {
            prompt.push_str("(none)\n");
        }
        for section in &self.context_sections {
            prompt.push_str(section);
            prompt.push('\n');
        }
        prompt.push('\n');

        if !self.instructions.is_empty() {
            prompt.push_str("Instructions:\n");
            for (i, inst) in self.instructions.iter().enumerate() {
                prompt.push_str(&format!("{}. {}\n", i + 1, inst));
            }
        }

        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blogsmith_core::{ChatRole, VectorRecord};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubEmbedding {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingClient for StubEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    /// Records the messages it receives and replies with a fixed post
    #[derive(Default)]
    struct RecordingLlm {
        seen: Mutex<Vec<ChatMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            if self.fail {
                return Err(BlogError::Llm("upstream unavailable".to_string()));
            }
            self.seen.lock().unwrap().extend_from_slice(messages);
            Ok("  # Headline\nBody text\n".to_string())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn drafter(llm: Arc<RecordingLlm>, config: DraftConfig) -> (BlogDrafter, Arc<StubEmbedding>) {
        let index = VectorIndex::from_records(vec![
            VectorRecord::new("a", vec![1.0, 0.0]).with_filename("lease-extension.pdf"),
            VectorRecord::new("b", vec![0.0, 1.0]).with_filename("damp.pdf"),
            VectorRecord::new("c", vec![0.8, 0.2]).with_text("Valuation basics"),
        ])
        .unwrap();
        let embedder = Arc::new(StubEmbedding {
            calls: AtomicUsize::new(0),
        });
        let retriever = Retriever::new(Arc::new(index), embedder.clone()).with_top_k(2);
        (
            BlogDrafter::new(Arc::new(retriever), llm, config),
            embedder,
        )
    }

    #[test]
    fn test_prompt_builder() {
        let prompt = PromptBuilder::new()
            .system("You are a helpful assistant.")
            .topic("Lease extensions")
            .add_context("• a.pdf\n• b.pdf")
            .add_instruction("Be concise")
            .add_instruction("Cite sources")
            .build();

        assert!(prompt.starts_with("You are a helpful assistant."));
        assert!(prompt.contains("topic: \"Lease extensions\""));
        assert!(prompt.contains("Documents:\n• a.pdf\n• b.pdf\n"));
        assert!(prompt.contains("1. Be concise"));
        assert!(prompt.contains("2. Cite sources"));
    }

    #[test]
    fn test_prompt_builder_without_context() {
        let prompt = PromptBuilder::new().topic("Roofs").add_context("  ").build();
        assert!(prompt.contains("Documents:\n(none)\n"));
    }

    #[tokio::test]
    async fn test_draft_uses_top_matches() {
        let llm = Arc::new(RecordingLlm::default());
        let (drafter, _) = drafter(llm.clone(), DraftConfig::default());

        let draft = drafter.draft("  Lease extensions ").await.unwrap();
        assert_eq!(draft.topic, "Lease extensions");
        assert_eq!(draft.blog, "# Headline\nBody text");

        let labels: Vec<&str> = draft.sources.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["lease-extension.pdf", "Valuation basics"]);

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, ChatRole::System);
        assert_eq!(seen[0].content, DEFAULT_PERSONA);
        assert!(seen[1].content.contains("• lease-extension.pdf\n• Valuation basics"));
        assert!(!seen[1].content.contains("damp.pdf"));
    }

    #[tokio::test]
    async fn test_draft_respects_context_budget() {
        let llm = Arc::new(RecordingLlm::default());
        let config = DraftConfig {
            max_context_length: "• lease-extension.pdf".chars().count(),
            ..Default::default()
        };
        let (drafter, _) = drafter(llm.clone(), config);

        let draft = drafter.draft("Lease").await.unwrap();
        assert_eq!(draft.sources.len(), 1);
        assert_eq!(draft.sources[0].id, "a");
    }

    #[tokio::test]
    async fn test_context_budget_counts_characters() {
        let index = VectorIndex::from_records(vec![VectorRecord::new("fr", vec![1.0, 0.0])
            .with_filename("Évaluation des loyers")])
        .unwrap();
        let embedder = Arc::new(StubEmbedding {
            calls: AtomicUsize::new(0),
        });
        let retriever = Retriever::new(Arc::new(index), embedder);

        let line = "• Évaluation des loyers";
        assert!(line.len() > line.chars().count());
        let config = DraftConfig {
            max_context_length: line.chars().count(),
            ..Default::default()
        };
        let llm = Arc::new(RecordingLlm::default());
        let drafter = BlogDrafter::new(Arc::new(retriever), llm.clone(), config);

        let draft = drafter.draft("Rent reviews").await.unwrap();
        assert_eq!(draft.sources.len(), 1);
        assert_eq!(draft.sources[0].label, "Évaluation des loyers");

        let seen = llm.seen.lock().unwrap();
        assert!(seen[1].content.contains(line));
        assert!(!seen[1].content.contains("(none)"));
    }

    #[tokio::test]
    async fn test_draft_top_k_override() {
        let llm = Arc::new(RecordingLlm::default());
        let config = DraftConfig {
            top_k: Some(3),
            ..Default::default()
        };
        let (drafter, _) = drafter(llm, config);

        let draft = drafter.draft("Lease").await.unwrap();
        assert_eq!(draft.sources.len(), 3);
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let index = Arc::new(VectorIndex::default());
        let err = BlogDrafter::from_config(&AppConfig::default(), index).err().unwrap();
        assert!(matches!(err, BlogError::Config(_)));
    }

    #[test]
    fn test_from_config_ollama() {
        let mut config = AppConfig::default();
        config.llm.provider = blogsmith_core::LlmProvider::Ollama;
        config.index.top_k = 3;

        let drafter = BlogDrafter::from_config(&config, Arc::new(VectorIndex::default())).unwrap();
        assert_eq!(drafter.retriever().top_k(), 3);
    }

    #[tokio::test]
    async fn test_blank_topic_rejected_before_remote_calls() {
        let llm = Arc::new(RecordingLlm::default());
        let (drafter, embedder) = drafter(llm.clone(), DraftConfig::default());

        let err = drafter.draft("   ").await.unwrap_err();
        assert!(matches!(err, BlogError::InvalidInput(_)));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert!(llm.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = Arc::new(RecordingLlm {
            fail: true,
            ..Default::default()
        });
        let (drafter, _) = drafter(llm, DraftConfig::default());

        let err = drafter.draft("Lease").await.unwrap_err();
        assert!(matches!(err, BlogError::Llm(_)));
    }
}
