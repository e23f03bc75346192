//! Transcript notifications
//!
//! A [`TranscriptSession`] copies each exchange of a conversation to an
//! external service: the user message before the chain runs, the answer
//! after it succeeds. Notifications run as background tasks; their failures
//! are logged and never reach the caller.

use crate::chain::{ConversationalRetrievalChain, InvocationRequest, InvocationResult};
use crate::config::NotifierSettings;
use async_trait::async_trait;
use convqa_kernel::{ChainError, ChainResult, EventSink, TranscriptNotifier};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

/// Body posted for every transcript message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptMessage<'a> {
    user_id: &'a str,
    session_id: &'a str,
    message: &'a str,
    is_bot: bool,
}

/// Posts transcript messages as JSON to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpTranscriptNotifier {
    client: reqwest::Client,
    endpoint: String,
    user_id: String,
}

impl HttpTranscriptNotifier {
    pub fn new(endpoint: impl Into<String>, user_id: impl Into<String>) -> ChainResult<Self> {
        Self::with_timeout(endpoint, user_id, Duration::from_secs(10))
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        user_id: impl Into<String>,
        timeout: Duration,
    ) -> ChainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            user_id: user_id.into(),
        })
    }

    pub fn from_settings(settings: &NotifierSettings) -> ChainResult<Self> {
        Self::with_timeout(
            settings.endpoint.clone(),
            settings.user_id.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TranscriptNotifier for HttpTranscriptNotifier {
    async fn notify(&self, session_id: &str, message: &str, is_bot: bool) -> ChainResult<()> {
        let payload = TranscriptMessage {
            user_id: &self.user_id,
            session_id,
            message,
            is_bot,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChainError::Notification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Notification(format!(
                "transcript endpoint returned {status}"
            )));
        }
        Ok(())
    }
}

/// A conversation whose exchanges are copied to a transcript service
pub struct TranscriptSession {
    chain: Arc<ConversationalRetrievalChain>,
    notifier: Arc<dyn TranscriptNotifier>,
    session_id: String,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl TranscriptSession {
    pub fn new(
        chain: Arc<ConversationalRetrievalChain>,
        notifier: Arc<dyn TranscriptNotifier>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            chain,
            notifier,
            session_id: session_id.into(),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Run one invocation, notifying before it starts and after it succeeds.
    pub async fn ask(
        &self,
        request: InvocationRequest,
        sink: Option<&dyn EventSink>,
    ) -> ChainResult<InvocationResult> {
        let user_message = self.dispatch(request.question.clone(), false, None);

        let result = match sink {
            Some(sink) => self.chain.invoke_streaming(request, sink).await,
            None => self.chain.invoke(request).await,
        };

        let last = match &result {
            Ok(reply) => self.dispatch(reply.answer.clone(), true, Some(user_message)),
            Err(_) => user_message,
        };
        self.track(last).await;

        result
    }

    /// Wait for every notification dispatched so far.
    pub async fn flush(&self) {
        let handles = std::mem::take(&mut *self.pending.lock().await);
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(session_id = %self.session_id, error = %err, "transcript task aborted");
            }
        }
    }

    async fn track(&self, handle: JoinHandle<()>) {
        let mut pending = self.pending.lock().await;
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }

    /// Spawn one notification; `after` keeps it behind an earlier message.
    fn dispatch(&self, message: String, is_bot: bool, after: Option<JoinHandle<()>>) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        let session_id = self.session_id.clone();
        let span = info_span!("transcript_notify", session_id = %session_id, is_bot);

        tokio::spawn(
            async move {
                if let Some(previous) = after {
                    if let Err(err) = previous.await {
                        warn!(error = %err, "earlier transcript task aborted");
                    }
                }
                match notifier.notify(&session_id, &message, is_bot).await {
                    Ok(()) => debug!("transcript message delivered"),
                    Err(err) => warn!(error = %err, "transcript notification failed"),
                }
            }
            .instrument(span),
        )
    }
}
