//! Environment-variable configuration for sqs-alerter
//!
//! All configuration comes from the process environment. It is read once per
//! run and never changes afterwards.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::alert::AlertPolicy;

pub const SQS_QUEUE_URL_ENV_VAR: &str = "SQS_QUEUE_URL";
pub const SQS_QUEUE_NAME_ENV_VAR: &str = "SQS_QUEUE_NAME";
pub const ENVIRONMENT_NAME_ENV_VAR: &str = "ENVIRONMENT_NAME";
pub const SLACK_TOKEN_ENV_VAR: &str = "SLACK_TOKEN";
pub const SLACK_CHANNEL_ENV_VAR: &str = "SLACK_CHANNEL";
pub const SLACK_API_URL_ENV_VAR: &str = "SLACK_API_URL";
pub const STATE_FILE_PATH_ENV_VAR: &str = "STATE_FILE_PATH";
pub const NEW_THREAD_MIN_INTERVAL_ENV_VAR: &str = "NEW_THREAD_MIN_INTERVAL";
pub const ALERT_POLICY_ENV_VAR: &str = "ALERT_POLICY";
pub const INCLUDE_MESSAGE_DETAILS_ENV_VAR: &str = "INCLUDE_MESSAGE_DETAILS";

pub const DEFAULT_SQS_QUEUE_NAME: &str = "SQS Queue";
pub const DEFAULT_ENVIRONMENT_NAME: &str = "Production";
pub const DEFAULT_STATE_FILE_PATH: &str = "sqs-alerter-state.yaml";
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
pub const DEFAULT_NEW_THREAD_MIN_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} environment variable is required. Please define it")]
    Missing { name: &'static str },

    #[error("{name} environment variable is set but empty")]
    Empty { name: &'static str },

    #[error("{name} environment variable value ({value}) is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQS queue URL to inspect
    pub queue_url: String,

    /// Queue name shown in alert messages
    pub queue_name: String,

    /// Environment label shown in alert messages
    pub environment_name: String,

    /// Slack bot token used for chat.postMessage
    pub slack_token: String,

    /// Slack channel id or name to post into
    pub slack_channel: String,

    /// Slack Web API base URL
    pub slack_api_url: String,

    /// Location of the persisted state record
    pub state_file_path: PathBuf,

    /// Minimum age of the last thread before a new thread is started
    pub new_thread_min_interval: Duration,

    /// Which alert decision policy to apply
    pub alert_policy: AlertPolicy,

    /// Whether to post a follow-up with up to ten queued messages
    ///
    /// Sampling increments each message's receive count, so it is off unless
    /// asked for.
    pub include_message_details: bool,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        debug!("from_env: called");
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let queue_url = required(&lookup, SQS_QUEUE_URL_ENV_VAR)?;
        reqwest::Url::parse(&queue_url).map_err(|e| ConfigError::Invalid {
            name: SQS_QUEUE_URL_ENV_VAR,
            value: queue_url.clone(),
            reason: e.to_string(),
        })?;

        let queue_name = match lookup(SQS_QUEUE_NAME_ENV_VAR) {
            Some(name) => format!("{} (SQS Queue)", name),
            None => DEFAULT_SQS_QUEUE_NAME.to_string(),
        };

        let environment_name = lookup(ENVIRONMENT_NAME_ENV_VAR).unwrap_or_else(|| DEFAULT_ENVIRONMENT_NAME.to_string());

        let slack_token = required(&lookup, SLACK_TOKEN_ENV_VAR)?;
        let slack_channel = required(&lookup, SLACK_CHANNEL_ENV_VAR)?;
        let slack_api_url = lookup(SLACK_API_URL_ENV_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string());

        let state_file_path = lookup(STATE_FILE_PATH_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE_PATH));

        let new_thread_min_interval = match lookup(NEW_THREAD_MIN_INTERVAL_ENV_VAR) {
            Some(value) => parse_duration(&value).map_err(|reason| ConfigError::Invalid {
                name: NEW_THREAD_MIN_INTERVAL_ENV_VAR,
                value,
                reason,
            })?,
            None => DEFAULT_NEW_THREAD_MIN_INTERVAL,
        };

        let alert_policy = match lookup(ALERT_POLICY_ENV_VAR) {
            Some(value) => value.parse::<AlertPolicy>().map_err(|reason| ConfigError::Invalid {
                name: ALERT_POLICY_ENV_VAR,
                value,
                reason,
            })?,
            None => AlertPolicy::default(),
        };

        let include_message_details = match lookup(INCLUDE_MESSAGE_DETAILS_ENV_VAR) {
            Some(value) => parse_bool(&value).ok_or_else(|| ConfigError::Invalid {
                name: INCLUDE_MESSAGE_DETAILS_ENV_VAR,
                value,
                reason: "expected true or false".to_string(),
            })?,
            None => false,
        };

        let config = Self {
            queue_url,
            queue_name,
            environment_name,
            slack_token,
            slack_channel,
            slack_api_url,
            state_file_path,
            new_thread_min_interval,
            alert_policy,
            include_message_details,
        };
        debug!(
            queue_url = %config.queue_url,
            state_file = %config.state_file_path.display(),
            policy = %config.alert_policy,
            "from_lookup: loaded"
        );
        Ok(config)
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { name }),
        Some(value) => Ok(value),
        None => Err(ConfigError::Missing { name }),
    }
}

/// Parse a duration such as `3600`, `90s`, `30m`, `2h` or `1d`
///
/// A bare number is taken as seconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("empty duration".to_string());
    }

    let (digits, multiplier) = match value.char_indices().last() {
        Some((idx, 's')) => (&value[..idx], 1),
        Some((idx, 'm')) => (&value[..idx], 60),
        Some((idx, 'h')) => (&value[..idx], 60 * 60),
        Some((idx, 'd')) => (&value[..idx], 24 * 60 * 60),
        _ => (value, 1),
    };

    let amount: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("expected a number with an optional s/m/h/d suffix, got '{}'", value))?;

    amount
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", value))
}

/// Parse a boolean flag value
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
