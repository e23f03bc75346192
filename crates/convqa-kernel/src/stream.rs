//! Stream events delivered to a live client
//!
//! An invocation writes its events to an [`EventSink`]; the sink decides how
//! they reach the client (channel, socket, SSE). Per invocation the sequence
//! is append-only and ends with exactly one terminal-class event:
//! [`StreamEvent::Terminal`] on success or [`StreamEvent::Error`] on failure.

use crate::rag::RetrievedDocument;
use serde::{Deserialize, Serialize};

/// Event emitted during one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental token of the final combination call
    #[serde(rename = "token")]
    TokenDelta(String),
    /// Retrieved documents, emitted once after the last token
    SourceDocuments(Vec<RetrievedDocument>),
    /// Human-readable failure message; ends the sequence
    Error(String),
    /// Successful end of the sequence
    #[serde(rename = "end")]
    Terminal,
}

impl StreamEvent {
    /// Whether this event ends an invocation's sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal | Self::Error(_))
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            Self::TokenDelta(token) => Some(token),
            _ => None,
        }
    }
}

/// Receiver of stream events
///
/// `emit` must not block; sinks backed by a closed transport drop events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: StreamEvent);
}
