//! Slack error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while posting to Slack
#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Slack API error: {error}")]
    Api { error: String },

    #[error("Slack response did not include a message timestamp")]
    MissingTimestamp,
}
