//! External transcript notification

use crate::error::ChainResult;
use async_trait::async_trait;

/// Publishes a copy of each chat message to an external transcript service.
///
/// Notifications are fire-and-forget: callers log a failed notification and
/// carry on, it never fails or delays an invocation.
#[async_trait]
pub trait TranscriptNotifier: Send + Sync {
    async fn notify(&self, session_id: &str, message: &str, is_bot: bool) -> ChainResult<()>;
}
