//! Slack notification delivery
//!
//! Posts alerts through the Slack Web API, either as a new root message or as
//! a reply inside an existing thread.

mod client;
mod error;
pub mod notifier;

pub use client::SlackClient;
pub use error::SlackError;
pub use notifier::Notifier;
