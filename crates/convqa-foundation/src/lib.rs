//! ConvQA Foundation
//!
//! Conversational retrieval QA on top of the `convqa-kernel` contracts:
//!
//! - [`prompt`]: standalone-question and combination prompts
//! - [`rag`]: score-annotating retriever adapter, in-memory vector store
//! - [`memory`]: key binding and an in-process buffer memory
//! - [`chain`]: chain assembly, the three combination strategies and the
//!   streaming execution controller
//! - [`sink`], [`notify`]: delivery of events and transcripts
//! - [`config`], [`logging`]: settings and tracing setup
//!
//! ```rust,ignore
//! use convqa_foundation::prelude::*;
//!
//! let chain = ChainBuilder::from_settings(&ChainSettings::load("convqa.toml")?)
//!     .with_model(model)
//!     .with_vector_store(store, embeddings)
//!     .build()
//!     .await?;
//!
//! let (sink, events) = event_channel();
//! let result = chain
//!     .invoke_streaming(InvocationRequest::new("What is the refund policy?"), &sink)
//!     .await?;
//! ```

pub mod chain;
pub mod config;
pub mod logging;
pub mod memory;
pub mod notify;
pub mod prompt;
pub mod rag;
pub mod sink;

pub use chain::{
    ChainBuilder, ChainConfig, CombinationStrategy, ConversationalRetrievalChain, ExecutionPhase,
    InvocationRequest, InvocationResult,
};
pub use config::{ChainSettings, NotifierSettings};
pub use convqa_kernel::{ChainError, ChainResult, StreamEvent};
pub use logging::{LogFormat, init_tracing};
pub use memory::{BufferMemory, bind_memory};
pub use notify::{HttpTranscriptNotifier, TranscriptSession};
pub use sink::{ChannelSink, event_channel};

/// Commonly used items
pub mod prelude {
    pub use crate::chain::{
        ChainBuilder, CombinationStrategy, ConversationalRetrievalChain, InvocationRequest,
        InvocationResult,
    };
    pub use crate::config::ChainSettings;
    pub use crate::memory::BufferMemory;
    pub use crate::rag::{HashEmbeddings, InMemoryVectorStore};
    pub use crate::sink::event_channel;
    pub use convqa_kernel::{
        ChainError, ChainResult, ConversationTurn, Document, EventSink, LanguageModel,
        RetrievedDocument, Retriever, StreamEvent,
    };
}
