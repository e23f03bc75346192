//! Provider-agnostic token streaming types

use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Why the model stopped producing tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
}

/// One incremental piece of model output
#[derive(Debug, Clone, Default)]
pub struct StreamChunk {
    /// Incremental text content
    pub delta: String,
    /// Set on the final chunk of a completion
    pub finish_reason: Option<FinishReason>,
}

impl StreamChunk {
    /// Text only chunk
    pub fn text(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            finish_reason: None,
        }
    }

    pub fn done(finish_reason: FinishReason) -> Self {
        Self {
            delta: String::new(),
            finish_reason: Some(finish_reason),
        }
    }

    pub fn is_done(&self) -> bool {
        self.finish_reason.is_some()
    }
}

/// Streaming errors
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum StreamError {
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Stream timeout: {0}")]
    Timeout(String),
}

impl StreamError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Blanket trait for `Stream<Item = Result<StreamChunk, StreamError>> + Send`
pub trait TokenStream: Stream<Item = Result<StreamChunk, StreamError>> + Send {}
impl<T> TokenStream for T where T: Stream<Item = Result<StreamChunk, StreamError>> + Send {}

/// Type erased token stream
pub type BoxTokenStream = Pin<Box<dyn TokenStream>>;

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn chunk_constructors_and_predicates() {
        let t = StreamChunk::text("hello");
        assert_eq!(t.delta, "hello");
        assert!(!t.is_done());

        let d = StreamChunk::done(FinishReason::Stop);
        assert!(d.is_done());
        assert!(d.delta.is_empty());
    }

    #[test]
    fn stream_error_display() {
        assert_eq!(
            StreamError::Connection("reset".into()).to_string(),
            "Connection error: reset"
        );
        assert_eq!(
            StreamError::provider("x", "y").to_string(),
            "Provider 'x' error: y"
        );
    }

    #[tokio::test]
    async fn box_token_stream_yields_in_order() {
        let items = vec![
            Ok(StreamChunk::text("Hi")),
            Err(StreamError::Connection("lost".into())),
            Ok(StreamChunk::done(FinishReason::Stop)),
        ];
        let mut s: BoxTokenStream = Box::pin(futures::stream::iter(items));

        assert_eq!(s.next().await.unwrap().unwrap().delta, "Hi");
        assert!(s.next().await.unwrap().is_err());
        assert!(s.next().await.unwrap().unwrap().is_done());
        assert!(s.next().await.is_none());
    }
}
