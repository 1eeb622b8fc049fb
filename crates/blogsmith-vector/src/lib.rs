//! Blogsmith Vector - Embedding index and similarity search
//!
//! Loads a precomputed embedding index into memory once and ranks its
//! records against query embeddings with a brute-force linear scan.

pub mod embedding;
pub mod index;
pub mod retriever;
pub mod similarity;

pub use embedding::{create_embedding_client, EmbeddingClient, OllamaEmbedding, OpenAiEmbedding};
pub use index::VectorIndex;
pub use retriever::Retriever;
pub use similarity::{cosine_similarity, dot_product, rank, ScoredIndex, SimilarityMetric};
