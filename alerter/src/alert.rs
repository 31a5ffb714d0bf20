//! Alert and thread decisions plus alert message formatting

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::queue::QueueMessage;
use crate::state::State;

/// Maximum characters of a message body included in a detail follow-up
const MAX_BODY_CHARS: usize = 500;

/// Maximum characters of a single attribute name or value in a detail follow-up
const MAX_ATTRIBUTE_CHARS: usize = 200;

/// Budget for the message listing of a detail follow-up, under Slack's
/// 4,000 character guidance for `chat.postMessage` text
const MAX_DETAILS_CHARS: usize = 3500;

/// Which condition triggers an alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertPolicy {
    /// Alert only when the observed count differs from the stored one
    #[default]
    CountChange,

    /// Alert when the count differs or when no alert has ever been sent
    CountChangeOrUnsent,
}

impl AlertPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPolicy::CountChange => "count-change",
            AlertPolicy::CountChangeOrUnsent => "count-change-or-unsent",
        }
    }
}

impl fmt::Display for AlertPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count-change" => Ok(AlertPolicy::CountChange),
            "count-change-or-unsent" => Ok(AlertPolicy::CountChangeOrUnsent),
            other => Err(format!(
                "unknown alert policy '{}'. Supported: count-change, count-change-or-unsent",
                other
            )),
        }
    }
}

/// Decide whether the newly observed count warrants a notification
pub fn should_alert(previous: &State, current_count: u64, policy: AlertPolicy) -> bool {
    let changed = previous.queue_message_count != current_count;
    let decision = match policy {
        AlertPolicy::CountChange => changed,
        AlertPolicy::CountChangeOrUnsent => changed || !previous.alert_sent,
    };
    debug!(
        previous = previous.queue_message_count,
        current = current_count,
        alert_sent = previous.alert_sent,
        %policy,
        decision,
        "should_alert: decided"
    );
    decision
}

/// Where the next alert should be posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadDecision {
    /// Post a new root message and use it as the thread from now on
    StartNew,

    /// Reply inside the thread rooted at this timestamp
    Continue(String),
}

/// Decide whether to start a new thread or reply into the last one
///
/// An absent, empty, or unparseable timestamp starts a new thread. Otherwise
/// a new thread is started only once the last one is strictly older than
/// `min_interval`.
pub fn decide_thread(last_thread_ts: Option<&str>, now: DateTime<Utc>, min_interval: Duration) -> ThreadDecision {
    let ts = match last_thread_ts.map(str::trim) {
        Some(ts) if !ts.is_empty() => ts,
        _ => {
            debug!("decide_thread: no previous thread");
            return ThreadDecision::StartNew;
        }
    };

    let thread_start = match parse_slack_ts(ts) {
        Some(t) => t,
        None => {
            warn!(ts, "Could not parse last thread timestamp, starting a new thread");
            return ThreadDecision::StartNew;
        }
    };

    let elapsed = now.signed_duration_since(thread_start);
    let start_new = match chrono::Duration::from_std(min_interval) {
        Ok(limit) => elapsed > limit,
        // interval too large to ever be exceeded
        Err(_) => false,
    };
    debug!(ts, elapsed_secs = elapsed.num_seconds(), start_new, "decide_thread: decided");

    if start_new {
        ThreadDecision::StartNew
    } else {
        ThreadDecision::Continue(ts.to_string())
    }
}

/// Parse a Slack message timestamp (`"1700000000.123456"`) to whole seconds
pub fn parse_slack_ts(ts: &str) -> Option<DateTime<Utc>> {
    let secs: f64 = ts.trim().parse().ok()?;
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}

/// Text of the main alert message
pub fn alert_text(count: u64, queue_name: &str, environment_name: &str) -> String {
    if count == 0 {
        format!(
            ":white_check_mark: All clear! No messages are present in {} in {} environment",
            queue_name, environment_name
        )
    } else {
        format!(
            "Warning alert :warning:! {} messages are present in {} in {} environment :warning:",
            count, queue_name, environment_name
        )
    }
}

/// Text of the follow-up listing sampled queue messages
///
/// Returns `None` when there is nothing to report. Messages that do not fit
/// the size budget are left out and counted in a trailing note.
pub fn details_text(messages: &[QueueMessage]) -> Option<String> {
    if messages.is_empty() {
        return None;
    }

    let mut listing = String::new();
    let mut used = 0;
    let mut shown = 0;
    for msg in messages {
        let mut entry = message_entry(msg);
        if shown > 0 {
            entry.insert_str(0, "---\n");
        }
        let len = entry.chars().count();
        if used + len > MAX_DETAILS_CHARS {
            if shown > 0 {
                break;
            }
            entry = truncate(&entry, MAX_DETAILS_CHARS - 2);
            entry.push('\n');
        }
        used += entry.chars().count();
        listing.push_str(&entry);
        shown += 1;
    }

    let mut text = format!(
        "Showing {} of the messages currently in the queue:\n```\n{}```",
        shown, listing
    );
    let omitted = messages.len() - shown;
    if omitted > 0 {
        debug!(shown, omitted, "details_text: size budget reached");
        text.push_str(&format!("\n{} more sampled messages omitted to keep this post short", omitted));
    }
    Some(text)
}

fn message_entry(msg: &QueueMessage) -> String {
    let mut entry = format!("Message ID: {}\n", embed(&msg.message_id, MAX_ATTRIBUTE_CHARS));
    if let Some(sent) = msg.sent_at() {
        entry.push_str(&format!("Sent: {}\n", sent.to_rfc3339()));
    }
    if let Some(count) = msg.attributes.get("ApproximateReceiveCount") {
        entry.push_str(&format!("Receive count: {}\n", embed(count, MAX_ATTRIBUTE_CHARS)));
    }
    for (key, value) in &msg.message_attributes {
        entry.push_str(&format!(
            "{}: {}\n",
            embed(key, MAX_ATTRIBUTE_CHARS),
            embed(value, MAX_ATTRIBUTE_CHARS)
        ));
    }
    entry.push_str(&format!("Body: {}\n", embed(&msg.body, MAX_BODY_CHARS)));
    entry
}

/// Truncate `s` and break up backtick runs so it cannot close a code block
fn embed(s: &str, max_chars: usize) -> String {
    let truncated = truncate(s, max_chars);
    let mut out = String::with_capacity(truncated.len());
    let mut prev_backtick = false;
    for c in truncated.chars() {
        if c == '`' && prev_backtick {
            out.push('\u{200b}');
        }
        prev_backtick = c == '`';
        out.push(c);
    }
    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
