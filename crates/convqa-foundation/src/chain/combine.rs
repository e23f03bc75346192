//! Document combination
//!
//! Turns the retrieved documents and the standalone question into one answer
//! with the prompts of the configured strategy. Intermediate model calls run
//! head-less; only the call that produces the final answer goes through
//! [`ExecutionController::final_completion`] and may stream.

use super::execution::ExecutionController;
use crate::prompt::QaPrompts;
use convqa_kernel::{ChainError, ChainResult, LanguageModel, RetrievedDocument};
use futures::future::try_join_all;
use tracing::debug;

/// Separator between documents in a stuffed context and between map summaries
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Normalize any failure of a model call to a model invocation failure.
pub(crate) fn model_failure(err: ChainError) -> ChainError {
    match err {
        ChainError::ModelInvocation(_) => err,
        other => ChainError::ModelInvocation(other.to_string()),
    }
}

fn join_contents(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

pub struct DocumentCombiner {
    prompts: QaPrompts,
}

impl DocumentCombiner {
    pub fn new(prompts: QaPrompts) -> Self {
        Self { prompts }
    }

    pub fn prompts(&self) -> &QaPrompts {
        &self.prompts
    }

    pub async fn combine(
        &self,
        model: &dyn LanguageModel,
        question: &str,
        documents: &[RetrievedDocument],
        controller: &ExecutionController<'_>,
    ) -> ChainResult<String> {
        match &self.prompts {
            QaPrompts::Stuff { prompt } => {
                let context = join_contents(documents);
                let rendered = prompt.render(&[("context", context.as_str()), ("question", question)])?;
                controller.trace_prompt(&prompt.id, &rendered);
                controller
                    .final_completion(model, &rendered)
                    .await
                    .map_err(model_failure)
            }

            QaPrompts::MapReduce {
                map_prompt,
                combine_prompt,
            } => {
                let map_inputs = documents
                    .iter()
                    .map(|doc| {
                        map_prompt.render(&[("context", doc.content.as_str()), ("question", question)])
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                for rendered in &map_inputs {
                    controller.trace_prompt(&map_prompt.id, rendered);
                }

                let summaries = try_join_all(map_inputs.iter().map(|rendered| model.generate(rendered)))
                    .await
                    .map_err(model_failure)?;
                debug!(summaries = summaries.len(), "map step finished");

                let summaries = summaries.join(DOCUMENT_SEPARATOR);
                let rendered =
                    combine_prompt.render(&[("summaries", summaries.as_str()), ("question", question)])?;
                controller.trace_prompt(&combine_prompt.id, &rendered);
                controller
                    .final_completion(model, &rendered)
                    .await
                    .map_err(model_failure)
            }

            QaPrompts::Refine {
                question_prompt,
                refine_prompt,
            } => {
                // Without documents the question prompt still runs once on an empty context.
                let contexts: Vec<&str> = if documents.is_empty() {
                    vec![""]
                } else {
                    documents.iter().map(|doc| doc.content.as_str()).collect()
                };
                let last = contexts.len() - 1;

                let mut answer = String::new();
                for (step, context) in contexts.into_iter().enumerate() {
                    let (id, rendered) = if step == 0 {
                        let rendered = question_prompt.render(&[("context", context), ("question", question)])?;
                        (&question_prompt.id, rendered)
                    } else {
                        let rendered = refine_prompt.render(&[
                            ("question", question),
                            ("existing_answer", answer.as_str()),
                            ("context", context),
                        ])?;
                        (&refine_prompt.id, rendered)
                    };
                    controller.trace_prompt(id, &rendered);

                    let result = if step == last {
                        controller.final_completion(model, &rendered).await
                    } else {
                        model.generate(&rendered).await
                    };
                    answer = result.map_err(model_failure)?;
                    debug!(step, "refine step finished");
                }
                Ok(answer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::CombinationStrategy;
    use async_trait::async_trait;
    use convqa_kernel::Document;
    use std::sync::Mutex;

    /// Answers every prompt with `answer-N` and records what it saw.
    #[derive(Default)]
    struct CountingModel {
        prompts: Mutex<Vec<String>>,
        fail_on_call: Option<usize>,
    }

    impl CountingModel {
        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for CountingModel {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, prompt: &str) -> ChainResult<String> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            let n = prompts.len();
            if self.fail_on_call == Some(n) {
                return Err(ChainError::Prompt("upstream rejected the request".into()));
            }
            Ok(format!("answer-{n}"))
        }
    }

    fn docs(contents: &[&str]) -> Vec<RetrievedDocument> {
        contents
            .iter()
            .map(|c| RetrievedDocument::scored(Document::new(*c), 0.5))
            .collect()
    }

    fn combiner(strategy: CombinationStrategy) -> DocumentCombiner {
        DocumentCombiner::new(QaPrompts::for_strategy(strategy, None))
    }

    fn combining_controller() -> ExecutionController<'static> {
        let mut controller = ExecutionController::new(None, false);
        controller.begin_generating();
        controller.begin_combining();
        controller
    }

    #[tokio::test]
    async fn stuff_makes_one_call_with_all_documents() {
        let model = CountingModel::default();
        let controller = combining_controller();

        let answer = combiner(CombinationStrategy::Stuff)
            .combine(&model, "refund?", &docs(&["doc one", "doc two"]), &controller)
            .await
            .unwrap();

        assert_eq!(answer, "answer-1");
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("doc one\n\ndoc two"));
        assert!(prompts[0].contains("Question: refund?"));
    }

    #[tokio::test]
    async fn map_reduce_maps_each_document_then_reduces() {
        let model = CountingModel::default();
        let controller = combining_controller();

        combiner(CombinationStrategy::MapReduce)
            .combine(&model, "q", &docs(&["a", "b", "c"]), &controller)
            .await
            .unwrap();

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 4);
        let reduce = prompts.last().unwrap();
        assert!(reduce.starts_with("Given the following extracted parts"));
        assert!(reduce.contains("answer-1\n\nanswer-2\n\nanswer-3"));
    }

    #[tokio::test]
    async fn refine_threads_existing_answer() {
        let model = CountingModel::default();
        let controller = combining_controller();

        let answer = combiner(CombinationStrategy::Refine)
            .combine(&model, "q", &docs(&["first", "second", "third"]), &controller)
            .await
            .unwrap();

        assert_eq!(answer, "answer-3");
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].starts_with("Context information is below."));
        assert!(prompts[1].contains("We have provided an existing answer: answer-1"));
        assert!(prompts[2].contains("We have provided an existing answer: answer-2"));
        assert!(prompts[2].contains("third"));
    }

    #[tokio::test]
    async fn refine_without_documents_runs_once() {
        let model = CountingModel::default();
        let controller = combining_controller();

        combiner(CombinationStrategy::Refine)
            .combine(&model, "q", &[], &controller)
            .await
            .unwrap();

        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test]
    async fn mid_refinement_failure_is_model_failure() {
        let model = CountingModel {
            fail_on_call: Some(2),
            ..Default::default()
        };
        let controller = combining_controller();

        let err = combiner(CombinationStrategy::Refine)
            .combine(&model, "q", &docs(&["a", "b", "c"]), &controller)
            .await
            .unwrap_err();

        assert!(matches!(err, ChainError::ModelInvocation(_)));
        assert_eq!(model.prompts().len(), 2);
    }

    #[tokio::test]
    async fn document_braces_are_not_placeholders() {
        let model = CountingModel::default();
        let controller = combining_controller();

        combiner(CombinationStrategy::Stuff)
            .combine(&model, "q", &docs(&["config: {question}"]), &controller)
            .await
            .unwrap();

        assert!(model.prompts()[0].contains("config: {question}"));
    }
}
