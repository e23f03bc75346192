//! Conversational retrieval chain
//!
//! One invocation runs these steps against the chain's collaborators:
//!
//! 1. resolve history (caller-supplied, else the bound memory)
//! 2. rewrite the question into a standalone question (skipped without history)
//! 3. retrieve up to `k` scored documents for the standalone question
//! 4. combine the documents into an answer with the configured strategy
//! 5. record the exchange in memory
//! 6. return the answer, plus the sources when requested
//!
//! Any failure in steps 2 to 5 aborts the invocation and leaves memory as
//! it was; a supplied history and the new exchange are committed together. The memory lock is held from step 1 to step 5, so invocations
//! sharing a memory run one after another.

use super::combine::{DocumentCombiner, model_failure};
use super::execution::ExecutionController;
use super::strategy::CombinationStrategy;
use crate::memory::QUESTION_KEY;
use crate::prompt::PromptTemplate;
use convqa_kernel::memory::format_history;
use convqa_kernel::{
    ChainError, ChainResult, ChainValues, ChatMemory, ConversationTurn, EventSink, LanguageModel,
    MemoryVariables, MetadataFilter, RetrievedDocument, Retriever, SharedMemory,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

/// Options fixed when the chain is assembled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub strategy: CombinationStrategy,
    pub system_prompt: Option<String>,
    pub return_source_documents: bool,
    /// Effective retrieval size, already adjusted for the strategy
    pub retrieval_k: usize,
    pub verbose: bool,
}

/// Input of one invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    pub question: String,
    /// Full history re-supplied by a stateless caller; overrides memory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ConversationTurn>>,
    /// Equality filter on document metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<MetadataFilter>,
}

impl InvocationRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Output of one successful invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    #[serde(rename = "text")]
    pub answer: String,
    #[serde(
        rename = "sourceDocuments",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_documents: Option<Vec<RetrievedDocument>>,
}

pub struct ConversationalRetrievalChain {
    model: Arc<dyn LanguageModel>,
    retriever: Arc<dyn Retriever>,
    memory: SharedMemory,
    condense_prompt: PromptTemplate,
    combiner: DocumentCombiner,
    config: ChainConfig,
}

impl ConversationalRetrievalChain {
    pub(crate) fn new(
        model: Arc<dyn LanguageModel>,
        retriever: Arc<dyn Retriever>,
        memory: SharedMemory,
        condense_prompt: PromptTemplate,
        combiner: DocumentCombiner,
        config: ChainConfig,
    ) -> Self {
        Self {
            model,
            retriever,
            memory,
            condense_prompt,
            combiner,
            config,
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Memory bound to this chain.
    pub fn memory(&self) -> SharedMemory {
        self.memory.clone()
    }

    /// Run one invocation without a live client.
    pub async fn invoke(&self, request: InvocationRequest) -> ChainResult<InvocationResult> {
        self.run(request, None).await
    }

    /// Run one invocation, streaming its events to `sink`.
    ///
    /// The final result is returned as well; its answer equals the
    /// concatenation of the emitted token deltas.
    pub async fn invoke_streaming(
        &self,
        request: InvocationRequest,
        sink: &dyn EventSink,
    ) -> ChainResult<InvocationResult> {
        self.run(request, Some(sink)).await
    }

    async fn run(
        &self,
        request: InvocationRequest,
        sink: Option<&dyn EventSink>,
    ) -> ChainResult<InvocationResult> {
        let invocation_id = Uuid::new_v4();
        let span = info_span!(
            "chain_invoke",
            %invocation_id,
            strategy = %self.config.strategy,
            streaming = sink.is_some()
        );

        async move {
            let started = Instant::now();
            let mut controller = ExecutionController::new(sink, self.config.verbose);

            match self.execute(request, &mut controller).await {
                Ok(result) => {
                    controller.complete(result.source_documents.as_deref());
                    info!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        answer_len = result.answer.len(),
                        "invocation completed"
                    );
                    Ok(result)
                }
                Err(err) => {
                    error!(kind = err.kind(), error = %err, phase = ?controller.phase(), "invocation failed");
                    controller.fail(&err);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        request: InvocationRequest,
        controller: &mut ExecutionController<'_>,
    ) -> ChainResult<InvocationResult> {
        let InvocationRequest {
            question,
            history,
            filter,
        } = request;

        let mut memory = self.memory.lock().await;
        let chat_history = match &history {
            Some(turns) => format_history(turns),
            None => stored_history(&*memory).await?,
        };

        controller.begin_generating();
        let standalone = self.standalone_question(&question, &chat_history, controller).await?;

        let k = self.config.retrieval_k;
        let mut documents = self
            .retriever
            .retrieve(&standalone, k, filter.as_ref())
            .await
            .map_err(retrieval_failure)?;
        documents.truncate(k);
        info!(documents = documents.len(), k, "retrieved documents");

        controller.begin_combining();
        let answer = self
            .combiner
            .combine(self.model.as_ref(), &standalone, &documents, controller)
            .await?;

        let inputs = ChainValues::from([(QUESTION_KEY.to_string(), question)]);
        let outputs = ChainValues::from([(
            self.config.strategy.output_key().to_string(),
            answer.clone(),
        )]);
        memory.commit_exchange(history, &inputs, &outputs).await?;
        drop(memory);

        Ok(InvocationResult {
            answer,
            source_documents: self.config.return_source_documents.then_some(documents),
        })
    }

    async fn standalone_question(
        &self,
        question: &str,
        chat_history: &str,
        controller: &ExecutionController<'_>,
    ) -> ChainResult<String> {
        if chat_history.trim().is_empty() {
            debug!("no chat history, skipping question rewrite");
            return Ok(question.to_string());
        }

        let rendered = self
            .condense_prompt
            .render(&[("chat_history", chat_history), ("question", question)])?;
        controller.trace_prompt(&self.condense_prompt.id, &rendered);

        let rewritten = self.model.generate(&rendered).await.map_err(model_failure)?;
        let rewritten = rewritten.trim();
        if rewritten.is_empty() {
            debug!("empty rewrite, keeping the original question");
            return Ok(question.to_string());
        }
        debug!(standalone_question = rewritten, "rewrote question");
        Ok(rewritten.to_string())
    }
}

async fn stored_history(memory: &dyn ChatMemory) -> ChainResult<String> {
    let mut variables = memory.load_memory_variables().await?;
    Ok(match variables.remove(&memory.keys().memory_key) {
        Some(MemoryVariables::Messages(turns)) => format_history(&turns),
        Some(MemoryVariables::Text(text)) => text,
        None => String::new(),
    })
}

fn retrieval_failure(err: ChainError) -> ChainError {
    match err {
        ChainError::Retrieval(_) => err,
        other => ChainError::Retrieval(other.to_string()),
    }
}
