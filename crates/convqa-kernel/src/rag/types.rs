//! Retrieval data types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Metadata key under which the similarity score is copied onto a document.
pub const SCORE_METADATA_KEY: &str = "score";

/// Equality filter on document metadata, forwarded to the vector store.
pub type MetadataFilter = HashMap<String, Value>;

/// A document as stored in (and returned by) a vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text content
    pub content: String,
    /// Arbitrary metadata (source file, page number, ...)
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether every entry of `filter` is present with an equal value.
    pub fn matches(&self, filter: &MetadataFilter) -> bool {
        filter
            .iter()
            .all(|(key, expected)| self.metadata.get(key) == Some(expected))
    }
}

/// A document returned by retrieval, annotated with its similarity score.
///
/// The score is carried both as a field and under
/// [`SCORE_METADATA_KEY`] in the metadata, so it survives serialization of
/// the metadata alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub metadata: HashMap<String, Value>,
    pub score: f32,
}

impl RetrievedDocument {
    /// Attach `score` to `document`, overwriting any upstream score entry.
    pub fn scored(document: Document, score: f32) -> Self {
        let Document {
            content,
            mut metadata,
        } = document;
        metadata.insert(SCORE_METADATA_KEY.to_string(), Value::from(score));
        Self {
            content,
            metadata,
            score,
        }
    }
}

/// Similarity metric used for comparing embedding vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine similarity
    #[default]
    Cosine,
    /// Euclidean distance mapped to `1 / (1 + d)`
    Euclidean,
    /// Dot product
    DotProduct,
}
