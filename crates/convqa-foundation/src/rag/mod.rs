//! Retrieval implementations
//!
//! Concrete implementations of the retrieval contracts defined in
//! convqa-kernel: the score-annotating retriever adapter, an in-memory
//! vector store and a deterministic local embedder.

pub mod embeddings;
pub mod scored_retriever;
pub mod similarity;
pub mod vector_store;

pub use embeddings::HashEmbeddings;
pub use scored_retriever::ScoredRetriever;
pub use similarity::compute_similarity;
pub use vector_store::InMemoryVectorStore;

// Re-export kernel types for convenience
pub use convqa_kernel::rag::{
    Document, Embeddings, MetadataFilter, RetrievedDocument, Retriever, SimilarityMetric, VectorStore,
};
