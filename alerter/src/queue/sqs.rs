//! Amazon SQS implementation of QueueInspector

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::config::Region;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::{Message, MessageAttributeValue, MessageSystemAttributeName, QueueAttributeName};
use tracing::debug;

use super::{QueueError, QueueInspector, QueueMessage};

const APPROXIMATE_NUMBER_OF_MESSAGES: &str = "ApproximateNumberOfMessages";

/// SQS-backed queue inspector
pub struct SqsInspector {
    client: Client,
    queue_url: String,
}

impl SqsInspector {
    /// Build an inspector from the default AWS configuration chain
    ///
    /// Credentials come from the usual environment, profile and instance
    /// role providers. If no region is configured anywhere, the region is
    /// taken from the queue URL host.
    pub async fn from_env(queue_url: impl Into<String>) -> Self {
        let queue_url = queue_url.into();
        debug!(%queue_url, "from_env: called");

        let fallback_region = region_from_queue_url(&queue_url).map(Region::new);
        let region = RegionProviderChain::default_provider().or_else(fallback_region);
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;
        debug!(region = ?sdk_config.region(), "from_env: aws config loaded");

        Self::new(Client::new(&sdk_config), queue_url)
    }

    pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }
}

#[async_trait]
impl QueueInspector for SqsInspector {
    async fn approximate_message_count(&self) -> Result<u64, QueueError> {
        debug!(queue_url = %self.queue_url, "approximate_message_count: called");
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessages)
            .send()
            .await
            .map_err(|e| QueueError::Request {
                operation: "GetQueueAttributes",
                message: DisplayErrorContext(e).to_string(),
            })?;

        let value = output
            .attributes()
            .and_then(|attrs| attrs.get(&QueueAttributeName::ApproximateNumberOfMessages))
            .ok_or(QueueError::MissingAttribute {
                name: APPROXIMATE_NUMBER_OF_MESSAGES,
            })?;

        let count = parse_message_count(value)?;
        debug!(count, "approximate_message_count: parsed");
        Ok(count)
    }

    async fn peek_messages(&self, max: i32) -> Result<Vec<QueueMessage>, QueueError> {
        debug!(queue_url = %self.queue_url, max, "peek_messages: called");
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max)
            // messages become visible to consumers again immediately
            .visibility_timeout(0)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|e| QueueError::Request {
                operation: "ReceiveMessage",
                message: DisplayErrorContext(e).to_string(),
            })?;

        let messages: Vec<QueueMessage> = output.messages().iter().map(convert_message).collect();
        debug!(count = messages.len(), "peek_messages: received");
        Ok(messages)
    }
}

fn convert_message(msg: &Message) -> QueueMessage {
    let attributes: BTreeMap<String, String> = msg
        .attributes()
        .map(|attrs| {
            attrs
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.clone()))
                .collect()
        })
        .unwrap_or_default();

    let message_attributes: BTreeMap<String, String> = msg
        .message_attributes()
        .map(|attrs| {
            attrs
                .iter()
                .map(|(k, v)| (k.clone(), render_attribute_value(v)))
                .collect()
        })
        .unwrap_or_default();

    QueueMessage {
        message_id: msg.message_id().unwrap_or_default().to_string(),
        body: msg.body().unwrap_or_default().to_string(),
        attributes,
        message_attributes,
    }
}

fn render_attribute_value(value: &MessageAttributeValue) -> String {
    match value.string_value() {
        Some(s) => s.to_string(),
        None => format!("<{}>", value.data_type()),
    }
}

/// Parse the `ApproximateNumberOfMessages` attribute value
pub fn parse_message_count(value: &str) -> Result<u64, QueueError> {
    value.trim().parse().map_err(|source| QueueError::InvalidCount {
        value: value.to_string(),
        source,
    })
}

/// Derive the AWS region from an SQS queue URL
///
/// Handles both `https://sqs.<region>.amazonaws.com/...` and the legacy
/// `https://<region>.queue.amazonaws.com/...` forms.
pub fn region_from_queue_url(queue_url: &str) -> Option<String> {
    let url = reqwest::Url::parse(queue_url).ok()?;
    let host = url.host_str()?;
    let labels: Vec<&str> = host.split('.').collect();

    let region = match labels.as_slice() {
        ["sqs", region, "amazonaws", ..] => *region,
        [region, "queue", "amazonaws", ..] => *region,
        _ => return None,
    };

    if region.is_empty() { None } else { Some(region.to_string()) }
}
