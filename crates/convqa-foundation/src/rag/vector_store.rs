//! In-memory vector store implementation
//!
//! Brute-force similarity search over documents kept in insertion order.
//! Suitable for development, testing, and small corpora.

use crate::rag::similarity::compute_similarity;
use async_trait::async_trait;
use convqa_kernel::{
    ChainError, ChainResult, Document, Embeddings, MetadataFilter, SimilarityMetric, VectorStore,
};

struct StoredDocument {
    id: String,
    document: Document,
    embedding: Vec<f32>,
}

/// In-memory vector store using brute-force similarity search.
///
/// # Example
///
/// ```rust,ignore
/// use convqa_foundation::rag::{HashEmbeddings, InMemoryVectorStore};
///
/// let embeddings = HashEmbeddings::default();
/// let mut store = InMemoryVectorStore::cosine();
/// store.add_documents(&embeddings, vec![Document::new("Refunds within 30 days")]).await?;
///
/// let query = embeddings.embed_query("refund policy").await?;
/// let results = store.similarity_search_with_score(&query, 4, None).await?;
/// ```
pub struct InMemoryVectorStore {
    entries: Vec<StoredDocument>,
    metric: SimilarityMetric,
}

impl InMemoryVectorStore {
    pub fn new(metric: SimilarityMetric) -> Self {
        Self {
            entries: Vec::new(),
            metric,
        }
    }

    /// Create a new store using cosine similarity.
    pub fn cosine() -> Self {
        Self::new(SimilarityMetric::Cosine)
    }

    /// Insert or replace the document stored under `id`.
    pub fn upsert(&mut self, id: impl Into<String>, document: Document, embedding: Vec<f32>) {
        let id = id.into();
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.document = document;
                entry.embedding = embedding;
            }
            None => self.entries.push(StoredDocument {
                id,
                document,
                embedding,
            }),
        }
    }

    /// Embed and insert documents under fresh ids, returned in input order.
    pub async fn add_documents<E>(
        &mut self,
        embeddings: &E,
        documents: Vec<Document>,
    ) -> ChainResult<Vec<String>>
    where
        E: Embeddings + ?Sized,
    {
        let texts: Vec<String> = documents.iter().map(|doc| doc.content.clone()).collect();
        let vectors = embeddings.embed_documents(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(ChainError::Retrieval(format!(
                "embedder returned {} vectors for {} documents",
                vectors.len(),
                documents.len()
            )));
        }

        let mut ids = Vec::with_capacity(documents.len());
        for (document, embedding) in documents.into_iter().zip(vectors) {
            let id = uuid::Uuid::new_v4().to_string();
            self.upsert(id.clone(), document, embedding);
            ids.push(id);
        }
        Ok(ids)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::cosine()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn similarity_search_with_score(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> ChainResult<Vec<(Document, f32)>> {
        let mut scored: Vec<(Document, f32)> = self
            .entries
            .iter()
            .filter(|entry| filter.is_none_or(|f| entry.document.matches(f)))
            .map(|entry| {
                let score = compute_similarity(&entry.embedding, query_embedding, self.metric);
                (entry.document.clone(), score)
            })
            .collect();

        // stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    fn similarity_metric(&self) -> SimilarityMetric {
        self.metric
    }
}
