//! Retrieval contracts and types
//!
//! Defines the document model, the vector-store and embedding capabilities
//! the chain retrieves through, and the [`Retriever`] seam the chain calls.
//! Concrete implementations live in convqa-foundation.

pub mod retriever;
pub mod types;
pub mod vector_store;

pub use retriever::Retriever;
pub use types::{Document, MetadataFilter, RetrievedDocument, SimilarityMetric, SCORE_METADATA_KEY};
pub use vector_store::{Embeddings, VectorStore};
