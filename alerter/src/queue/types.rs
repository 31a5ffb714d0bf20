//! Queue data types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A message sampled from the queue for alert enrichment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueMessage {
    pub message_id: String,
    pub body: String,
    /// System attributes (`SentTimestamp`, `ApproximateReceiveCount`, ...)
    pub attributes: BTreeMap<String, String>,
    /// User message attributes rendered as strings
    pub message_attributes: BTreeMap<String, String>,
}

impl QueueMessage {
    /// When the message was sent, from the `SentTimestamp` attribute (epoch ms)
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.attributes.get("SentTimestamp")?.parse().ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sent_at() {
        let mut msg = QueueMessage::default();
        assert_eq!(msg.sent_at(), None);

        msg.attributes.insert("SentTimestamp".to_string(), "garbage".to_string());
        assert_eq!(msg.sent_at(), None);

        msg.attributes
            .insert("SentTimestamp".to_string(), "1700000000123".to_string());
        assert_eq!(msg.sent_at().unwrap().timestamp_millis(), 1_700_000_000_123);
    }
}
