//! Retriever seam called by the chain

use crate::error::ChainResult;
use crate::rag::types::{MetadataFilter, RetrievedDocument};
use async_trait::async_trait;

/// Returns score-annotated documents for a query.
///
/// Implementations must attach a score to every document and return them in
/// the order the underlying search produced. Failures are reported as
/// [`ChainError::Retrieval`](crate::error::ChainError::Retrieval) and never
/// yield partial results.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> ChainResult<Vec<RetrievedDocument>>;
}
