//! Prompt bodies for conversational retrieval QA
//!
//! One standalone-question template plus the combination prompts of each
//! strategy. An optional system prompt is prepended to the stuff and
//! map-reduce templates and spliced into the refine question template.

use super::template::{PromptTemplate, escape_braces};
use crate::chain::CombinationStrategy;

/// Rewrites a follow-up into a standalone question.
pub const CONDENSE_QUESTION_TEMPLATE: &str = "Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question, answer in the same language as the follow up question. include it in the standalone question.
If the follow up question seems to not require further information, like greeting, thanking, small talk, acknowledging answer etc., keep the standalone question same as the original.

Chat History:
{chat_history}
Follow Up Input: {question}
Standalone question:";

/// Stuff QA prompt used without a system prompt.
pub const DEFAULT_QA_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:";

/// Stuff QA prompt body placed after a system prompt.
pub const QA_TEMPLATE: &str = "
--START OF USER MESSAGE:
{question}
--END OF USER MESSAGE--
--START OF CONTEXT DATA:
{context}
--END OF CONTEXT DATA--
NOW MAKE A DECISION:
If the user message seems to not require further information, like greeting, thanking, small talk, acknowledging your answer etc., respond naturally (e.g. \"you are welcome\", \"have a great day\") and ignore the rest of this prompt.
OTHERWISE:
If the user message is not related to the context data, say you don't know the answer.
If the user message is relevant to the context data, answer it using the context data and not prior knowledge.";

/// Per-document map step of map-reduce.
pub const MAP_QUESTION_TEMPLATE: &str = "Use the following portion of a long document to see if any of the text is relevant to answer the question.
Return any relevant text verbatim.
{context}
Question: {question}
Relevant text, if any:";

/// Reduce step of map-reduce used without a system prompt.
pub const DEFAULT_MAP_REDUCE_TEMPLATE: &str = "Given the following extracted parts of a long document and a question, create a final answer.
If you don't know the answer, just say that you don't know. Don't try to make up an answer.

{summaries}

Question: {question}
Helpful Answer:";

/// Reduce step body placed after a system prompt.
pub const MAP_REDUCE_TEMPLATE: &str = "Given the following extracted parts of a long document and a question, create a final answer.

{summaries}

Question: {question}
Helpful Answer:";

/// Iterative refinement prompt.
pub const REFINE_TEMPLATE: &str = "The original question is as follows: {question}
We have provided an existing answer: {existing_answer}
We have the opportunity to refine the existing answer (only if needed) with some more context below.
------------
{context}
------------
Given the new context, refine the original answer to better answer the question.
If you can't find answer from the context, return the original answer.";

/// Initial refine prompt, with or without the injected system instruction.
pub fn refine_question_template(system_prompt: Option<&str>) -> String {
    match system_prompt {
        Some(system) => format!(
            "Context information is below.
---------------------
{{context}}
---------------------
Given the context information and not prior knowledge, {}
Answer the question: {{question}}.
Answer:",
            escape_braces(system)
        ),
        None => "Context information is below.
---------------------
{context}
---------------------
Given the context information and not prior knowledge, answer the question: {question}.
Answer:"
            .to_string(),
    }
}

fn with_system_prompt(system_prompt: Option<&str>, body: &str, default: &str) -> String {
    match system_prompt {
        Some(system) => format!("{}\n{}", escape_braces(system), body),
        None => default.to_string(),
    }
}

/// Standalone-question prompt
pub fn condense_question_prompt() -> PromptTemplate {
    PromptTemplate::new("condense-question", CONDENSE_QUESTION_TEMPLATE)
}

/// Stuff combination prompt
pub fn stuff_prompt(system_prompt: Option<&str>) -> PromptTemplate {
    PromptTemplate::new(
        "stuff-qa",
        with_system_prompt(system_prompt, QA_TEMPLATE, DEFAULT_QA_TEMPLATE),
    )
}

/// Map step prompt
pub fn map_prompt() -> PromptTemplate {
    PromptTemplate::new("map-question", MAP_QUESTION_TEMPLATE)
}

/// Reduce step prompt
pub fn combine_prompt(system_prompt: Option<&str>) -> PromptTemplate {
    PromptTemplate::new(
        "map-reduce-combine",
        with_system_prompt(system_prompt, MAP_REDUCE_TEMPLATE, DEFAULT_MAP_REDUCE_TEMPLATE),
    )
}

/// First refine call prompt
pub fn refine_question_prompt(system_prompt: Option<&str>) -> PromptTemplate {
    PromptTemplate::new("refine-question", refine_question_template(system_prompt))
}

/// Subsequent refine calls prompt
pub fn refine_prompt() -> PromptTemplate {
    PromptTemplate::new("refine", REFINE_TEMPLATE)
}

/// Combination prompts selected once for a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QaPrompts {
    Stuff {
        prompt: PromptTemplate,
    },
    MapReduce {
        map_prompt: PromptTemplate,
        combine_prompt: PromptTemplate,
    },
    Refine {
        question_prompt: PromptTemplate,
        refine_prompt: PromptTemplate,
    },
}

impl QaPrompts {
    pub fn for_strategy(strategy: CombinationStrategy, system_prompt: Option<&str>) -> Self {
        match strategy {
            CombinationStrategy::Stuff => Self::Stuff {
                prompt: stuff_prompt(system_prompt),
            },
            CombinationStrategy::MapReduce => Self::MapReduce {
                map_prompt: map_prompt(),
                combine_prompt: combine_prompt(system_prompt),
            },
            CombinationStrategy::Refine => Self::Refine {
                question_prompt: refine_question_prompt(system_prompt),
                refine_prompt: refine_prompt(),
            },
        }
    }
}
