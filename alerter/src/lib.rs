//! SQS Alerter - scheduled queue depth alerts for Slack
//!
//! Each invocation inspects an SQS queue's approximate message count,
//! compares it with the count stored by the previous run, and posts to a
//! Slack channel when the observation changes. Alerts are grouped into
//! threads so that a noisy queue does not flood the channel.
//!
//! # Pipeline
//!
//! ```text
//! config -> state load -> queue count -> alert decision
//!        -> thread decision -> Slack post (+ message details) -> state store
//! ```
//!
//! # Modules
//!
//! - [`config`] - Environment-variable configuration
//! - [`state`] - Persisted YAML state record
//! - [`alert`] - Alert and thread decisions, message text
//! - [`queue`] - Queue inspector trait and SQS implementation
//! - [`slack`] - Notifier trait and Slack Web API client
//! - [`alerter`] - The run pipeline
//! - [`cli`] - Command-line interface

pub mod alert;
pub mod alerter;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod queue;
pub mod slack;
pub mod state;

// Re-export commonly used types
pub use alert::{AlertPolicy, ThreadDecision, decide_thread, should_alert};
pub use alerter::{Alerter, Notification, RunOutcome};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, ConfigError};
pub use error::Error;
pub use queue::{QueueError, QueueInspector, QueueMessage, SqsInspector};
pub use slack::{Notifier, SlackClient, SlackError};
pub use state::{State, StateError};
