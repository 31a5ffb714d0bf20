//! Queue inspection
//!
//! Provides the queue depth snapshot and a best-effort sample of queued
//! messages used to enrich alerts.

mod error;
pub mod inspector;
mod sqs;
mod types;

pub use error::QueueError;
pub use inspector::QueueInspector;
pub use sqs::{SqsInspector, parse_message_count, region_from_queue_url};
pub use types::QueueMessage;

/// Maximum number of messages SQS returns from a single receive
pub const MAX_PEEK_MESSAGES: i32 = 10;
