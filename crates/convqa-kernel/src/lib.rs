//! ConvQA Kernel
//!
//! Contracts shared by every conversational retrieval QA chain: the data
//! model, the error kinds, and the traits the chain talks to (language model,
//! retriever, vector store, memory, event sink, transcript notifier).
//! Concrete implementations live in `convqa-foundation`.

// error module
pub mod error;

// config module
pub mod config;

// llm module
pub mod llm;

// rag module
pub mod rag;

// memory module
pub mod memory;

// stream module
pub mod stream;

// notify module
pub mod notify;

pub use error::{ChainError, ChainResult};
pub use llm::{BoxTokenStream, LanguageModel, StreamChunk, StreamError};
pub use memory::{ChainValues, ChatMemory, ConversationTurn, MemoryKeys, MemoryVariables, Role, SharedMemory};
pub use notify::TranscriptNotifier;
pub use rag::{Document, Embeddings, MetadataFilter, RetrievedDocument, Retriever, SimilarityMetric, VectorStore};
pub use stream::{EventSink, StreamEvent};
