//! Topic retrieval: embed the query, then scan the index
//!
//! Author: hephaex@gmail.com

use crate::embedding::EmbeddingClient;
use crate::index::VectorIndex;
use crate::similarity::SimilarityMetric;
use blogsmith_core::{IndexConfig, Result, ScoredRecord};
use std::sync::Arc;

/// Finds the index records most relevant to a free-text query
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingClient>,
    top_k: usize,
    metric: SimilarityMetric,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn EmbeddingClient>) -> Self {
        let defaults = IndexConfig::default();
        Self {
            index,
            embedder,
            top_k: defaults.top_k,
            metric: defaults.metric,
        }
    }

    /// Apply `top_k` and metric from config
    pub fn with_config(mut self, config: &IndexConfig) -> Self {
        self.top_k = config.top_k;
        self.metric = config.metric;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Search with the configured `top_k`.
    ///
    /// An empty or whitespace-only query returns no results and never
    /// reaches the embedding API.
    pub async fn search(&self, query: &str) -> Result<Vec<ScoredRecord>> {
        self.search_top(query, self.top_k).await
    }

    /// Search returning at most `k` records
    pub async fn search_top(&self, query: &str, k: usize) -> Result<Vec<ScoredRecord>> {
        let query = query.trim();
        if query.is_empty() {
            tracing::warn!("Skipping embedding: empty query");
            return Ok(Vec::new());
        }
        if k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(query, k, metric = %self.metric, "Searching index");
        let embedding = self.embedder.embed(query).await?;
        let hits = self.index.search(&embedding, k, self.metric)?;
        tracing::debug!("Index search returned {} results", hits.len());
        Ok(hits)
    }
}
