//! Conversation memory
//!
//! A memory holds the conversation history a chain conditions on and records
//! each successful exchange. Key bindings tell the memory which chain input
//! is the question and which chain output is the answer; they are a call-site
//! concern and are rebound by the chain at assembly time through
//! [`ChatMemory::bind_keys`].

use crate::error::{ChainError, ChainResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Named string values flowing in or out of a chain step.
pub type ChainValues = HashMap<String, String>;

/// Memory shared between a chain and its caller.
///
/// The mutex also serializes invocations that share the memory: a chain
/// holds the lock from reading history until it records the new exchange.
pub type SharedMemory = Arc<Mutex<dyn ChatMemory>>;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
}

impl Role {
    /// Prefix used when a history is flattened to text.
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::Human => "Human",
            Role::Assistant => "Assistant",
        }
    }
}

/// One recorded message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Render turns as `Human: ...` / `Assistant: ...` lines.
pub fn format_history(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role.prefix(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Key names a memory reads and writes under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryKeys {
    /// Chain input holding the user question
    pub input_key: String,
    /// Chain output holding the answer
    pub output_key: String,
    /// Variable the history is exposed under
    pub memory_key: String,
    /// Expose history as structured turns instead of flattened text
    pub return_messages: bool,
}

impl Default for MemoryKeys {
    fn default() -> Self {
        Self {
            input_key: "input".to_string(),
            output_key: "output".to_string(),
            memory_key: "history".to_string(),
            return_messages: false,
        }
    }
}

/// History as exposed to a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryVariables {
    Messages(Vec<ConversationTurn>),
    Text(String),
}

/// Conversation memory capability
#[async_trait]
pub trait ChatMemory: Send + Sync {
    /// Current key bindings
    fn keys(&self) -> &MemoryKeys;

    /// Rebind key names in place.
    ///
    /// Callers must not assume a memory keeps its previous bindings after it
    /// has been handed to a chain.
    fn bind_keys(&mut self, keys: MemoryKeys);

    /// Recorded history, oldest first.
    async fn history(&self) -> ChainResult<Vec<ConversationTurn>>;

    /// Replace the whole history, e.g. with one re-supplied by a stateless caller.
    async fn replace_history(&mut self, turns: Vec<ConversationTurn>) -> ChainResult<()>;

    /// Record one exchange: the question, then the answer.
    async fn append_turn(&mut self, question: &str, answer: &str) -> ChainResult<()>;

    /// Forget everything.
    async fn clear(&mut self) -> ChainResult<()>;

    /// History exposed under the bound memory key.
    async fn load_memory_variables(&self) -> ChainResult<HashMap<String, MemoryVariables>> {
        let history = self.history().await?;
        let keys = self.keys();
        let value = if keys.return_messages {
            MemoryVariables::Messages(history)
        } else {
            MemoryVariables::Text(format_history(&history))
        };
        Ok(HashMap::from([(keys.memory_key.clone(), value)]))
    }

    /// Record an exchange from chain inputs and outputs using the bound keys.
    async fn save_context(&mut self, inputs: &ChainValues, outputs: &ChainValues) -> ChainResult<()> {
        self.commit_exchange(None, inputs, outputs).await
    }

    /// Optionally replace the history, then record an exchange, as one step.
    ///
    /// Both keys are resolved before anything is written. If recording the
    /// exchange fails after a replacement, the previous turns are restored.
    async fn commit_exchange(
        &mut self,
        history: Option<Vec<ConversationTurn>>,
        inputs: &ChainValues,
        outputs: &ChainValues,
    ) -> ChainResult<()> {
        let keys = self.keys();
        let question = inputs.get(&keys.input_key).ok_or_else(|| {
            ChainError::Memory(format!("input key '{}' missing from chain inputs", keys.input_key))
        })?;
        let answer = outputs.get(&keys.output_key).ok_or_else(|| {
            ChainError::Memory(format!("output key '{}' missing from chain outputs", keys.output_key))
        })?;

        let Some(turns) = history else {
            return self.append_turn(question, answer).await;
        };

        let previous = self.history().await?;
        self.replace_history(turns).await?;
        if let Err(err) = self.append_turn(question, answer).await {
            self.replace_history(previous).await?;
            return Err(err);
        }
        Ok(())
    }
}
