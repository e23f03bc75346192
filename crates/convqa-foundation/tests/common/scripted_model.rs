//! Scripted language model for integration tests.
//!
//! [`ScriptedModel`] answers from a FIFO queue of canned responses, falling
//! back to `"mock response"` once the queue is empty, and records every
//! prompt it receives. Streaming calls split the response on spaces so each
//! word arrives as its own token.
//!
//! ```rust,ignore
//! let model = ScriptedModel::builder()
//!     .respond_with("thanks!")
//!     .respond_with("You're welcome!")
//!     .build();
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use convqa_kernel::llm::FinishReason;
use convqa_kernel::{BoxTokenStream, ChainError, ChainResult, LanguageModel, StreamChunk, StreamError};

pub const DEFAULT_RESPONSE: &str = "mock response";

/// How a call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Generate,
    Stream,
}

enum Scripted {
    Text(String),
    Error(String),
    /// Stream these tokens, then fail
    BrokenStream(Vec<String>),
}

#[derive(Default)]
struct ModelState {
    calls: Vec<(CallKind, String)>,
    responses: VecDeque<Scripted>,
}

#[derive(Clone)]
pub struct ScriptedModel {
    state: Arc<Mutex<ModelState>>,
}

impl ScriptedModel {
    pub fn builder() -> ScriptedModelBuilder {
        ScriptedModelBuilder::default()
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("model state mutex poisoned")
            .calls
            .iter()
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().expect("model state mutex poisoned").calls.len()
    }

    pub fn calls_of(&self, kind: CallKind) -> usize {
        self.state
            .lock()
            .expect("model state mutex poisoned")
            .calls
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    fn next(&self, kind: CallKind, prompt: &str) -> Scripted {
        let mut state = self.state.lock().expect("model state mutex poisoned");
        state.calls.push((kind, prompt.to_string()));
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Scripted::Text(DEFAULT_RESPONSE.to_string()))
    }
}

/// Split text into word tokens that concatenate back to the input.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_string).collect()
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> ChainResult<String> {
        match self.next(CallKind::Generate, prompt) {
            Scripted::Text(text) => Ok(text),
            Scripted::Error(message) => Err(ChainError::ModelInvocation(message)),
            Scripted::BrokenStream(_) => Err(ChainError::ModelInvocation("stream broke".into())),
        }
    }

    async fn generate_stream(&self, prompt: &str) -> ChainResult<BoxTokenStream> {
        let items: Vec<Result<StreamChunk, StreamError>> = match self.next(CallKind::Stream, prompt) {
            Scripted::Text(text) => tokenize(&text)
                .into_iter()
                .map(|token| Ok(StreamChunk::text(token)))
                .chain(std::iter::once(Ok(StreamChunk::done(FinishReason::Stop))))
                .collect(),
            Scripted::Error(message) => return Err(ChainError::ModelInvocation(message)),
            Scripted::BrokenStream(tokens) => tokens
                .into_iter()
                .map(|token| Ok(StreamChunk::text(token)))
                .chain(std::iter::once(Err(StreamError::Connection("connection reset".into()))))
                .collect(),
        };
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

#[derive(Default)]
pub struct ScriptedModelBuilder {
    responses: VecDeque<Scripted>,
}

impl ScriptedModelBuilder {
    pub fn respond_with(mut self, text: impl Into<String>) -> Self {
        self.responses.push_back(Scripted::Text(text.into()));
        self
    }

    pub fn respond_with_error(mut self, message: impl Into<String>) -> Self {
        self.responses.push_back(Scripted::Error(message.into()));
        self
    }

    pub fn break_stream_after(mut self, tokens: &[&str]) -> Self {
        self.responses
            .push_back(Scripted::BrokenStream(tokens.iter().map(|t| t.to_string()).collect()));
        self
    }

    pub fn build(self) -> ScriptedModel {
        ScriptedModel {
            state: Arc::new(Mutex::new(ModelState {
                calls: Vec::new(),
                responses: self.responses,
            })),
        }
    }
}
