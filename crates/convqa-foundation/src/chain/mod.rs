//! Conversational retrieval chains
//!
//! - [`ChainBuilder`] validates collaborators and options and binds memory
//! - [`ConversationalRetrievalChain`] runs invocations, head-less or streaming
//! - [`DocumentCombiner`] implements the stuff, map-reduce and refine strategies
//! - [`ExecutionController`] owns the per-invocation event sequence

mod builder;
mod combine;
mod conversational;
mod execution;
mod strategy;

pub use builder::ChainBuilder;
pub use combine::{DOCUMENT_SEPARATOR, DocumentCombiner};
pub use conversational::{ChainConfig, ConversationalRetrievalChain, InvocationRequest, InvocationResult};
pub use execution::{ExecutionController, ExecutionPhase};
pub use strategy::{CombinationStrategy, DEFAULT_RETRIEVAL_K, REFINE_DOCUMENT_LIMIT};
