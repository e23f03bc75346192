//! Document combination strategies

use crate::memory::{REFINE_OUTPUT_KEY, TEXT_OUTPUT_KEY};
use convqa_kernel::ChainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of documents retrieved when the caller does not say otherwise.
pub const DEFAULT_RETRIEVAL_K: usize = 4;

/// Fixed document count for refine: its cost grows with every document.
pub const REFINE_DOCUMENT_LIMIT: usize = 4;

/// How retrieved documents are merged with the question into one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationStrategy {
    /// All documents in one prompt, one model call
    #[default]
    Stuff,
    /// One call per document, then one reduce call over the partial answers
    MapReduce,
    /// One call per document, each refining the previous answer
    Refine,
}

impl CombinationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stuff => "stuff",
            Self::MapReduce => "map_reduce",
            Self::Refine => "refine",
        }
    }

    /// Chain output the final answer is published under.
    pub fn output_key(&self) -> &'static str {
        match self {
            Self::Refine => REFINE_OUTPUT_KEY,
            Self::Stuff | Self::MapReduce => TEXT_OUTPUT_KEY,
        }
    }

    /// Retrieval size actually used for a requested `k`.
    pub fn effective_k(&self, requested: usize) -> usize {
        match self {
            Self::Refine => REFINE_DOCUMENT_LIMIT,
            Self::Stuff | Self::MapReduce => requested,
        }
    }
}

impl fmt::Display for CombinationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CombinationStrategy {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stuff" => Ok(Self::Stuff),
            "map_reduce" => Ok(Self::MapReduce),
            "refine" => Ok(Self::Refine),
            other => Err(ChainError::Configuration(format!(
                "unknown combination strategy '{other}', expected one of: stuff, map_reduce, refine"
            ))),
        }
    }
}
