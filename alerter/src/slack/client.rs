//! Slack Web API client
//!
//! Implements the Notifier trait on top of `chat.postMessage`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{Notifier, SlackError};
use crate::config::Config;

/// Request timeout for a single Slack call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack bot client bound to one channel
pub struct SlackClient {
    token: String,
    channel: String,
    base_url: String,
    http: Client,
}

impl SlackClient {
    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self, SlackError> {
        debug!(channel = %config.slack_channel, base_url = %config.slack_api_url, "from_config: called");
        Self::new(&config.slack_token, &config.slack_channel, &config.slack_api_url)
    }

    pub fn new(token: &str, channel: &str, base_url: &str) -> Result<Self, SlackError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sqs-alerter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            token: token.to_string(),
            channel: channel.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build the chat.postMessage request body
    fn build_request_body(&self, text: &str, thread_ts: Option<&str>) -> serde_json::Value {
        let mut body = serde_json::json!({
            "channel": self.channel,
            "text": text,
        });

        if let Some(ts) = thread_ts {
            debug!(%ts, "build_request_body: replying in thread");
            body["thread_ts"] = serde_json::json!(ts);
        }

        body
    }
}

/// Turn a decoded chat.postMessage response into the posted message ts
fn parse_response(response: PostMessageResponse) -> Result<String, SlackError> {
    if !response.ok {
        return Err(SlackError::Api {
            error: response.error.unwrap_or_else(|| "unknown_error".to_string()),
        });
    }

    response.ts.filter(|ts| !ts.is_empty()).ok_or(SlackError::MissingTimestamp)
}

#[async_trait]
impl Notifier for SlackClient {
    async fn post_message(&self, text: &str, thread_ts: Option<&str>) -> Result<String, SlackError> {
        debug!(channel = %self.channel, threaded = thread_ts.is_some(), "post_message: called");
        let url = format!("{}/chat.postMessage", self.base_url);
        let body = self.build_request_body(text, thread_ts);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("content-type", "application/json; charset=utf-8")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            debug!("post_message: rate limited (429)");
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return Err(SlackError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            debug!(%status, "post_message: HTTP error");
            let message = response.text().await.unwrap_or_default();
            return Err(SlackError::Http { status, message });
        }

        let api_response: PostMessageResponse = response.json().await?;
        let ts = parse_response(api_response)?;
        debug!(%ts, "post_message: success");
        Ok(ts)
    }
}

// Slack API response types

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
