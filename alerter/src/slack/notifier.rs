//! Notifier trait definition

use async_trait::async_trait;

use super::SlackError;

/// Delivers alert text to a chat channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `text`, as a reply in `thread_ts` when given
    ///
    /// Returns the timestamp of the posted message, which identifies the
    /// thread when the message is a new root.
    async fn post_message(&self, text: &str, thread_ts: Option<&str>) -> Result<String, SlackError>;
}
