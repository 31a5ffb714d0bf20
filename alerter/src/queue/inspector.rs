//! QueueInspector trait definition

use async_trait::async_trait;

use super::{QueueError, QueueMessage};

/// Read-only view of the monitored queue
///
/// Implementations make exactly one attempt per call; callers treat any
/// error as fatal for the run.
#[async_trait]
pub trait QueueInspector: Send + Sync {
    /// Approximate number of messages currently visible in the queue
    async fn approximate_message_count(&self) -> Result<u64, QueueError>;

    /// Sample up to `max` messages without consuming them
    ///
    /// An empty result is not an error.
    async fn peek_messages(&self, max: i32) -> Result<Vec<QueueMessage>, QueueError>;
}
