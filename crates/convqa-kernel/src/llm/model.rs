//! Language model capability
//!
//! The chain never talks to a provider directly; it only sees a
//! [`LanguageModel`] that turns a rendered prompt into text, optionally token
//! by token.

use async_trait::async_trait;

use super::streaming::{BoxTokenStream, FinishReason, StreamChunk};
use crate::error::ChainResult;

/// Completion capability used by every step of the chain
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model name, used in logs
    fn name(&self) -> &str;

    /// Run one completion and return the full text.
    async fn generate(&self, prompt: &str) -> ChainResult<String>;

    /// Run one completion, yielding tokens as they are produced.
    ///
    /// The default falls back to [`generate`](Self::generate) and yields the
    /// whole completion as a single chunk followed by a stop marker.
    async fn generate_stream(&self, prompt: &str) -> ChainResult<BoxTokenStream> {
        let text = self.generate(prompt).await?;
        let chunks = vec![
            Ok(StreamChunk::text(text)),
            Ok(StreamChunk::done(FinishReason::Stop)),
        ];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}
