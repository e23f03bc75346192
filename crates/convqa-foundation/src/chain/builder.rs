//! Chain assembly

use super::combine::DocumentCombiner;
use super::conversational::{ChainConfig, ConversationalRetrievalChain};
use super::strategy::{CombinationStrategy, DEFAULT_RETRIEVAL_K};
use crate::config::ChainSettings;
use crate::memory::bind_memory;
use crate::prompt::{QaPrompts, condense_question_prompt};
use crate::rag::ScoredRetriever;
use convqa_kernel::{
    ChainError, ChainResult, Embeddings, LanguageModel, Retriever, SharedMemory, VectorStore,
};
use std::sync::Arc;
use tracing::info;

/// Builder for [`ConversationalRetrievalChain`]
///
/// A model and a retriever (or a vector store plus embeddings) are required;
/// everything else has a default.
///
/// ```rust,ignore
/// let chain = ChainBuilder::new()
///     .with_model(model)
///     .with_vector_store(store, embeddings)
///     .with_strategy(CombinationStrategy::MapReduce)
///     .return_source_documents(true)
///     .build()
///     .await?;
/// ```
pub struct ChainBuilder {
    model: Option<Arc<dyn LanguageModel>>,
    retriever: Option<Arc<dyn Retriever>>,
    memory: Option<SharedMemory>,
    strategy: CombinationStrategy,
    strategy_name: Option<String>,
    system_prompt: Option<String>,
    return_source_documents: bool,
    retrieval_k: usize,
    verbose: bool,
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self {
            model: None,
            retriever: None,
            memory: None,
            strategy: CombinationStrategy::default(),
            strategy_name: None,
            system_prompt: None,
            return_source_documents: false,
            retrieval_k: DEFAULT_RETRIEVAL_K,
            verbose: false,
        }
    }

    /// Start from loaded settings; collaborators still have to be supplied.
    pub fn from_settings(settings: &ChainSettings) -> Self {
        Self {
            strategy: settings.combination_strategy,
            system_prompt: settings.system_prompt.clone(),
            return_source_documents: settings.return_source_documents,
            retrieval_k: settings.retrieval_k,
            verbose: settings.verbose,
            ..Self::new()
        }
    }

    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Retrieve from a vector store through the score-annotating adapter.
    pub fn with_vector_store(self, store: Arc<dyn VectorStore>, embeddings: Arc<dyn Embeddings>) -> Self {
        self.with_retriever(Arc::new(ScoredRetriever::new(store, embeddings)))
    }

    /// Use an existing memory. Its key bindings are overwritten at build time.
    pub fn with_memory(mut self, memory: SharedMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_strategy(mut self, strategy: CombinationStrategy) -> Self {
        self.strategy = strategy;
        self.strategy_name = None;
        self
    }

    /// Select the strategy by name; an unknown name fails at build time.
    pub fn with_strategy_name(mut self, name: impl Into<String>) -> Self {
        self.strategy_name = Some(name.into());
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn return_source_documents(mut self, enabled: bool) -> Self {
        self.return_source_documents = enabled;
        self
    }

    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k;
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub async fn build(self) -> ChainResult<ConversationalRetrievalChain> {
        let model = self
            .model
            .ok_or_else(|| ChainError::Configuration("a language model is required".to_string()))?;
        let retriever = self.retriever.ok_or_else(|| {
            ChainError::Configuration("a retriever or vector store is required".to_string())
        })?;
        let strategy = match self.strategy_name.as_deref() {
            Some(name) => name.parse()?,
            None => self.strategy,
        };
        if self.retrieval_k == 0 {
            return Err(ChainError::Configuration(
                "retrieval_k must be at least 1".to_string(),
            ));
        }

        let system_prompt = self.system_prompt.filter(|prompt| !prompt.trim().is_empty());
        let memory = bind_memory(self.memory, strategy).await;
        let combiner = DocumentCombiner::new(QaPrompts::for_strategy(strategy, system_prompt.as_deref()));
        let config = ChainConfig {
            strategy,
            system_prompt,
            return_source_documents: self.return_source_documents,
            retrieval_k: strategy.effective_k(self.retrieval_k),
            verbose: self.verbose,
        };

        info!(
            model = model.name(),
            %strategy,
            retrieval_k = config.retrieval_k,
            return_source_documents = config.return_source_documents,
            "assembled conversational retrieval chain"
        );

        Ok(ConversationalRetrievalChain::new(
            model,
            retriever,
            memory,
            condense_question_prompt(),
            combiner,
            config,
        ))
    }
}
