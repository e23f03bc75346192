//! 记忆绑定
//! Memory binding
//!
//! Every chain reads history from `chat_history`, takes the question from
//! `question`, and records its answer from `text` (stuff, map-reduce) or
//! `output_text` (refine). An externally supplied memory is rebound to these
//! keys in place; without one a fresh [`BufferMemory`] is created.

mod buffer;

pub use buffer::BufferMemory;

use crate::chain::CombinationStrategy;
use convqa_kernel::{MemoryKeys, SharedMemory};

/// Chain input holding the user question
pub const QUESTION_KEY: &str = "question";
/// Variable the conversation history is exposed under
pub const CHAT_HISTORY_KEY: &str = "chat_history";
/// Answer output of the stuff and map-reduce combiners
pub const TEXT_OUTPUT_KEY: &str = "text";
/// Answer output of the refine combiner
pub const REFINE_OUTPUT_KEY: &str = "output_text";

/// Key bindings a chain of the given strategy expects.
pub fn chain_memory_keys(strategy: CombinationStrategy) -> MemoryKeys {
    MemoryKeys {
        input_key: QUESTION_KEY.to_string(),
        output_key: strategy.output_key().to_string(),
        memory_key: CHAT_HISTORY_KEY.to_string(),
        return_messages: true,
    }
}

/// Select or construct the memory a chain will hold.
pub async fn bind_memory(external: Option<SharedMemory>, strategy: CombinationStrategy) -> SharedMemory {
    let keys = chain_memory_keys(strategy);
    match external {
        Some(memory) => {
            memory.lock().await.bind_keys(keys);
            memory
        }
        None => BufferMemory::with_keys(keys).into_shared(),
    }
}
