//! Score-annotating retriever adapter
//!
//! Composes a [`VectorStore`] with the [`Embeddings`] used to index it. Every
//! returned document carries its similarity score, both as a field and in
//! its metadata. The store's order is preserved; nothing is re-sorted.

use async_trait::async_trait;
use convqa_kernel::{
    ChainError, ChainResult, Embeddings, MetadataFilter, RetrievedDocument, Retriever, VectorStore,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct ScoredRetriever {
    store: Arc<dyn VectorStore>,
    embeddings: Arc<dyn Embeddings>,
}

impl ScoredRetriever {
    pub fn new(store: Arc<dyn VectorStore>, embeddings: Arc<dyn Embeddings>) -> Self {
        Self { store, embeddings }
    }
}

fn as_retrieval_failure(err: ChainError) -> ChainError {
    match err {
        ChainError::Retrieval(_) => err,
        other => ChainError::Retrieval(other.to_string()),
    }
}

#[async_trait]
impl Retriever for ScoredRetriever {
    async fn retrieve(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> ChainResult<Vec<RetrievedDocument>> {
        let embedding = self
            .embeddings
            .embed_query(query)
            .await
            .map_err(as_retrieval_failure)?;

        let results = self
            .store
            .similarity_search_with_score(&embedding, k, filter)
            .await
            .map_err(as_retrieval_failure)?;

        debug!(k, returned = results.len(), "similarity search finished");

        Ok(results
            .into_iter()
            .map(|(document, score)| RetrievedDocument::scored(document, score))
            .collect())
    }
}
