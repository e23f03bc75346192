//! Crate-level error types for `convqa-kernel`.
//!
//! Every failure a chain can surface is one [`ChainError`] variant. The
//! variants map onto the propagation policy of the chain:
//!
//! - [`ChainError::Configuration`] is raised while assembling a chain, before
//!   any invocation is possible.
//! - [`ChainError::Retrieval`], [`ChainError::ModelInvocation`],
//!   [`ChainError::Memory`] and [`ChainError::Prompt`] abort the current
//!   invocation without touching memory.
//! - [`ChainError::Notification`] is only ever logged by the caller.

use crate::config::ConfigError;
use crate::llm::StreamError;
use thiserror::Error;

/// Result alias used across the chain contracts.
pub type ChainResult<T> = Result<T, ChainError>;

/// Chain error kinds
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChainError {
    /// The underlying similarity search (or query embedding) failed.
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// A model call failed, including mid-stream and mid-refinement failures.
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// Missing collaborator or invalid option at assembly time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Posting a transcript copy to an external service failed.
    #[error("Notification failed: {0}")]
    Notification(String),

    /// Memory storage failed or its key bindings do not match the chain outputs.
    #[error("Memory error: {0}")]
    Memory(String),

    /// A prompt template could not be rendered.
    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl ChainError {
    /// Short stable name of the error kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Retrieval(_) => "retrieval_failure",
            Self::ModelInvocation(_) => "model_invocation_failure",
            Self::Configuration(_) => "configuration_error",
            Self::Notification(_) => "notification_failure",
            Self::Memory(_) => "memory_failure",
            Self::Prompt(_) => "prompt_failure",
        }
    }

    /// Whether the error aborts the invocation it occurred in.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Notification(_))
    }
}

impl From<StreamError> for ChainError {
    fn from(err: StreamError) -> Self {
        ChainError::ModelInvocation(err.to_string())
    }
}

impl From<ConfigError> for ChainError {
    fn from(err: ConfigError) -> Self {
        ChainError::Configuration(err.to_string())
    }
}
