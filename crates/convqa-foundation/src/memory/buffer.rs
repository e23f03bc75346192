//! 缓冲记忆
//! Buffer memory
//!
//! Keeps the whole conversation in process, oldest turn first.

use async_trait::async_trait;
use convqa_kernel::{ChainResult, ChatMemory, ConversationTurn, MemoryKeys, SharedMemory};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct BufferMemory {
    keys: MemoryKeys,
    turns: Vec<ConversationTurn>,
}

impl BufferMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: MemoryKeys) -> Self {
        Self {
            keys,
            turns: Vec::new(),
        }
    }

    /// Seed the buffer with an existing conversation.
    pub fn with_history(mut self, turns: Vec<ConversationTurn>) -> Self {
        self.turns = turns;
        self
    }

    /// Wrap into a memory handle a chain can hold and the caller can keep.
    pub fn into_shared(self) -> SharedMemory {
        Arc::new(Mutex::new(self))
    }
}

#[async_trait]
impl ChatMemory for BufferMemory {
    fn keys(&self) -> &MemoryKeys {
        &self.keys
    }

    fn bind_keys(&mut self, keys: MemoryKeys) {
        self.keys = keys;
    }

    async fn history(&self) -> ChainResult<Vec<ConversationTurn>> {
        Ok(self.turns.clone())
    }

    async fn replace_history(&mut self, turns: Vec<ConversationTurn>) -> ChainResult<()> {
        self.turns = turns;
        Ok(())
    }

    async fn append_turn(&mut self, question: &str, answer: &str) -> ChainResult<()> {
        self.turns.push(ConversationTurn::human(question));
        self.turns.push(ConversationTurn::assistant(answer));
        Ok(())
    }

    async fn clear(&mut self) -> ChainResult<()> {
        self.turns.clear();
        Ok(())
    }
}
