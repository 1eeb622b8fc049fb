//! Read-once in-memory embedding index
//!
//! The index file is JSON, either a bare array of records or an object with
//! a `vectors` array. It is loaded once at startup and never mutated.
//!
//! Author: hephaex@gmail.com

use crate::similarity::{rank, SimilarityMetric};
use blogsmith_core::{BlogError, Result, ScoredRecord, VectorRecord};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexFile {
    Bare(Vec<VectorRecord>),
    Wrapped { vectors: Vec<VectorRecord> },
}

impl IndexFile {
    fn into_records(self) -> Vec<VectorRecord> {
        match self {
            Self::Bare(records) | Self::Wrapped { vectors: records } => records,
        }
    }
}

/// Immutable collection of vector records searched by linear scan
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    records: Vec<VectorRecord>,
    dimension: Option<usize>,
}

impl VectorIndex {
    /// Load and validate an index file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| BlogError::Index(format!("Failed to read {}: {e}", path.display())))?;

        let index = Self::from_json(&data)
            .map_err(|e| BlogError::Index(format!("{}: {e}", path.display())))?;

        tracing::info!(
            path = %path.display(),
            records = index.len(),
            dimension = ?index.dimension(),
            "Loaded vector index"
        );
        Ok(index)
    }

    /// Parse an index from its JSON text
    pub fn from_json(data: &str) -> Result<Self> {
        let file: IndexFile = serde_json::from_str(data)
            .map_err(|e| BlogError::Index(format!("Invalid index JSON: {e}")))?;
        Self::from_records(file.into_records())
    }

    /// Build an index from records, assigning missing identifiers.
    ///
    /// Every record must carry a non-empty vector and all vectors must share
    /// one dimension.
    pub fn from_records(mut records: Vec<VectorRecord>) -> Result<Self> {
        let mut dimension = None;

        for (position, record) in records.iter_mut().enumerate() {
            if record.id.trim().is_empty() {
                record.id = format!("record-{position}");
            }

            if record.vector.is_empty() {
                return Err(BlogError::Index(format!(
                    "Record {} has an empty vector",
                    record.id
                )));
            }

            match dimension {
                None => dimension = Some(record.vector.len()),
                Some(expected) if expected != record.vector.len() => {
                    return Err(BlogError::Index(format!(
                        "Record {} has dimension {}, expected {expected}",
                        record.id,
                        record.vector.len()
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(Self { records, dimension })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shared vector dimension, `None` for an empty index
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    /// Return the `k` records most similar to `query`, best first
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        metric: SimilarityMetric,
    ) -> Result<Vec<ScoredRecord>> {
        if let Some(dimension) = self.dimension {
            if query.len() != dimension {
                return Err(BlogError::InvalidInput(format!(
                    "Query vector has dimension {}, index expects {dimension}",
                    query.len()
                )));
            }
        }

        Ok(rank(query, &self.records, k, metric)
            .into_iter()
            .map(|hit| ScoredRecord {
                record: self.records[hit.index].clone(),
                score: hit.score,
            })
            .collect())
    }
}
