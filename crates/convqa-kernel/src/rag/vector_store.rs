//! Vector store and embedding capabilities
//!
//! Index construction and maintenance are the store's business; the chain
//! only needs a scored nearest-neighbour search and a query embedder.

use crate::error::ChainResult;
use crate::rag::types::{Document, MetadataFilter, SimilarityMetric};
use async_trait::async_trait;

/// Nearest-neighbour search over embedded documents.
///
/// # Example
///
/// ```rust,ignore
/// let embedding = embeddings.embed_query("refund policy").await?;
/// for (doc, score) in store.similarity_search_with_score(&embedding, 4, None).await? {
///     println!("{score:.2}: {}", doc.content);
/// }
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return up to `k` `(document, score)` pairs, most relevant first.
    ///
    /// When `filter` is given only documents whose metadata matches every
    /// entry are considered.
    async fn similarity_search_with_score(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> ChainResult<Vec<(Document, f32)>>;

    /// Similarity metric used by this store.
    fn similarity_metric(&self) -> SimilarityMetric {
        SimilarityMetric::Cosine
    }
}

/// Turns text into embedding vectors.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Embed a search query.
    async fn embed_query(&self, text: &str) -> ChainResult<Vec<f32>>;

    /// Embed documents for indexing.
    async fn embed_documents(&self, texts: &[String]) -> ChainResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed_query(text).await?);
        }
        Ok(out)
    }
}
