//! Retrieval and sink doubles for integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use convqa_kernel::{
    ChainError, ChainResult, Document, EventSink, MetadataFilter, RetrievedDocument, Retriever,
    StreamEvent, VectorStore,
};

/// Vector store returning the same ranked documents for every query,
/// ignoring `k` so callers can check their own truncation.
pub struct StaticStore {
    results: Vec<(Document, f32)>,
    requested_k: Mutex<Vec<usize>>,
}

impl StaticStore {
    pub fn new(results: Vec<(Document, f32)>) -> Self {
        Self {
            results,
            requested_k: Mutex::new(Vec::new()),
        }
    }

    /// `count` documents named `doc-0`, `doc-1`, ... with descending scores.
    pub fn numbered(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| {
                    (
                        Document::new(format!("doc-{i}")).with_metadata("source", format!("{i}.md")),
                        1.0 - i as f32 * 0.1,
                    )
                })
                .collect(),
        )
    }

    pub fn requested_k(&self) -> Vec<usize> {
        self.requested_k.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl VectorStore for StaticStore {
    async fn similarity_search_with_score(
        &self,
        _query_embedding: &[f32],
        k: usize,
        _filter: Option<&MetadataFilter>,
    ) -> ChainResult<Vec<(Document, f32)>> {
        self.requested_k.lock().expect("store mutex poisoned").push(k);
        Ok(self.results.clone())
    }
}

/// A retrieval query as seen by [`RecordingRetriever`]
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalQuery {
    pub query: String,
    pub k: usize,
    pub filter: Option<MetadataFilter>,
}

/// Retriever recording its queries; optionally failing every call.
#[derive(Default)]
pub struct RecordingRetriever {
    documents: Vec<RetrievedDocument>,
    failure: Option<String>,
    queries: Mutex<Vec<RetrievalQuery>>,
}

impl RecordingRetriever {
    pub fn returning(documents: Vec<RetrievedDocument>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<RetrievalQuery> {
        self.queries.lock().expect("retriever mutex poisoned").clone()
    }
}

#[async_trait]
impl Retriever for RecordingRetriever {
    async fn retrieve(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> ChainResult<Vec<RetrievedDocument>> {
        self.queries.lock().expect("retriever mutex poisoned").push(RetrievalQuery {
            query: query.to_string(),
            k,
            filter: filter.cloned(),
        });
        match &self.failure {
            Some(message) => Err(ChainError::Retrieval(message.clone())),
            None => Ok(self.documents.clone()),
        }
    }
}

pub fn scored_documents(contents: &[(&str, f32)]) -> Vec<RetrievedDocument> {
    contents
        .iter()
        .map(|(content, score)| RetrievedDocument::scored(Document::new(*content), *score))
        .collect()
}

/// Sink keeping every event it receives
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<StreamEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<StreamEvent> {
        self.events.lock().expect("sink mutex poisoned").clone()
    }

    pub fn tokens(&self) -> String {
        self.events()
            .iter()
            .filter_map(|event| event.as_token())
            .collect()
    }

    pub fn terminal_count(&self) -> usize {
        self.events().iter().filter(|event| event.is_terminal()).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: StreamEvent) {
        self.events.lock().expect("sink mutex poisoned").push(event);
    }
}
