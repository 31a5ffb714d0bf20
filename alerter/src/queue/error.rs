//! Queue error types

use std::num::ParseIntError;
use thiserror::Error;

/// Errors talking to the queue service
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("{operation} request failed: {message}")]
    Request { operation: &'static str, message: String },

    #[error("Queue attribute {name} missing from response")]
    MissingAttribute { name: &'static str },

    #[error("Could not parse approximate number of messages ({value}) into an integer: {source}")]
    InvalidCount { value: String, source: ParseIntError },
}
