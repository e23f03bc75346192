//! Streaming execution controller
//!
//! Tracks one invocation through `Idle -> Generating -> Combining ->
//! Completed | Failed` and writes its events to the attached sink. The
//! controller guarantees the event sequence ends with exactly one terminal
//! event: `Terminal` after a completion, `Error` after a failure, and
//! nothing once either has been sent.

use convqa_kernel::{
    BoxTokenStream, ChainError, ChainResult, EventSink, LanguageModel, RetrievedDocument,
    StreamEvent,
};
use futures::StreamExt;
use tracing::debug;

/// Phase of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPhase {
    Idle,
    /// Standalone-question rewrite and retrieval
    Generating,
    /// Combination calls; the final one is streamed
    Combining,
    Completed,
    Failed,
}

impl ExecutionPhase {
    pub fn can_transition_to(self, next: ExecutionPhase) -> bool {
        use ExecutionPhase::*;
        matches!(
            (self, next),
            (Idle, Generating)
                | (Generating, Combining)
                | (Combining, Completed)
                | (Idle | Generating | Combining, Failed)
        )
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

pub struct ExecutionController<'a> {
    phase: ExecutionPhase,
    sink: Option<&'a dyn EventSink>,
    verbose: bool,
}

impl<'a> ExecutionController<'a> {
    pub fn new(sink: Option<&'a dyn EventSink>, verbose: bool) -> Self {
        Self {
            phase: ExecutionPhase::Idle,
            sink,
            verbose,
        }
    }

    pub fn phase(&self) -> ExecutionPhase {
        self.phase
    }

    /// Whether a live client is attached.
    pub fn is_streaming(&self) -> bool {
        self.sink.is_some()
    }

    fn advance(&mut self, next: ExecutionPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal phase transition {:?} -> {:?}",
            self.phase,
            next
        );
        debug!(from = ?self.phase, to = ?next, "execution phase changed");
        self.phase = next;
    }

    fn emit(&self, event: StreamEvent) {
        if let Some(sink) = self.sink {
            sink.emit(event);
        }
    }

    pub fn begin_generating(&mut self) {
        self.advance(ExecutionPhase::Generating);
    }

    pub fn begin_combining(&mut self) {
        self.advance(ExecutionPhase::Combining);
    }

    /// Log a rendered prompt when verbose tracing is enabled.
    pub fn trace_prompt(&self, step: &str, prompt: &str) {
        if self.verbose {
            debug!(step, prompt, "rendered prompt");
        }
    }

    /// Run the final combination call.
    ///
    /// With a sink attached the completion is streamed and every non-empty
    /// token is forwarded as a `TokenDelta`; otherwise it runs head-less.
    /// The returned answer is the concatenation of the forwarded tokens.
    pub async fn final_completion(&self, model: &dyn LanguageModel, prompt: &str) -> ChainResult<String> {
        debug_assert_eq!(self.phase, ExecutionPhase::Combining);
        if !self.is_streaming() {
            return model.generate(prompt).await;
        }

        let stream = model.generate_stream(prompt).await?;
        self.forward_tokens(stream).await
    }

    async fn forward_tokens(&self, mut stream: BoxTokenStream) -> ChainResult<String> {
        let mut answer = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if !chunk.delta.is_empty() {
                answer.push_str(&chunk.delta);
                self.emit(StreamEvent::TokenDelta(chunk.delta));
            }
            if chunk.finish_reason.is_some() {
                break;
            }
        }
        Ok(answer)
    }

    /// Finish successfully: optional `SourceDocuments`, then `Terminal`.
    pub fn complete(&mut self, sources: Option<&[RetrievedDocument]>) {
        if self.phase.is_finished() {
            return;
        }
        self.advance(ExecutionPhase::Completed);
        if let Some(sources) = sources {
            self.emit(StreamEvent::SourceDocuments(sources.to_vec()));
        }
        self.emit(StreamEvent::Terminal);
    }

    /// Finish with a failure: a single `Error` event.
    pub fn fail(&mut self, err: &ChainError) {
        if self.phase.is_finished() {
            return;
        }
        self.advance(ExecutionPhase::Failed);
        self.emit(StreamEvent::Error(err.to_string()));
    }
}
