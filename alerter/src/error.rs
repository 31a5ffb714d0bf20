//! Run error type naming the pipeline stage that failed

use thiserror::Error;

use crate::config::ConfigError;
use crate::queue::QueueError;
use crate::slack::SlackError;
use crate::state::StateError;

/// Any fatal error of a run
#[derive(Debug, Error)]
pub enum Error {
    #[error("error occurred while getting configuration from environment variables: {0}")]
    Config(#[from] ConfigError),

    #[error("error occurred while loading state: {0}")]
    LoadState(#[source] StateError),

    #[error("error occurred while getting sqs queue message count: {0}")]
    QueueCount(#[source] QueueError),

    #[error("error occurred while fetching sqs queue messages: {0}")]
    QueuePeek(#[source] QueueError),

    #[error("error occurred while sending slack alert message: {0}")]
    Notify(#[source] SlackError),

    #[error("error occurred while sending slack message details: {0}")]
    NotifyDetails(#[source] SlackError),

    #[error("error occurred while storing new state: {0}")]
    StoreState(#[source] StateError),
}

impl Error {
    /// Short name of the failed stage, for structured logs
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::LoadState(_) => "load-state",
            Error::QueueCount(_) => "queue-count",
            Error::QueuePeek(_) => "queue-peek",
            Error::Notify(_) => "notify",
            Error::NotifyDetails(_) => "notify-details",
            Error::StoreState(_) => "store-state",
        }
    }
}
