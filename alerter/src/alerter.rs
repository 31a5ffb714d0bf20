//! The alerter run pipeline
//!
//! One call to [`Alerter::run`] is one scheduled run: load the previous state,
//! observe the queue, notify Slack when the observation warrants it, and
//! persist the new state. Any error aborts the run before the state is
//! written, so the next run starts from the last completed one.

use std::sync::Arc;

use tracing::{debug, info};

use crate::alert::{ThreadDecision, alert_text, decide_thread, details_text, should_alert};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::Error;
use crate::queue::{MAX_PEEK_MESSAGES, QueueInspector};
use crate::slack::Notifier;
use crate::state::State;

/// How the alert of a run was delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Posted as a new root message with this timestamp
    NewThread(String),

    /// Posted as a reply in the thread rooted at this timestamp
    ThreadReply(String),
}

impl Notification {
    /// Timestamp of the thread the alert belongs to
    pub fn thread_ts(&self) -> &str {
        match self {
            Notification::NewThread(ts) | Notification::ThreadReply(ts) => ts,
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub previous_count: u64,
    pub current_count: u64,
    /// `None` when no alert was warranted
    pub notification: Option<Notification>,
    /// Number of queued messages included in the detail follow-up
    pub details_posted: usize,
    /// The state written at the end of the run
    pub state: State,
}

/// Queue depth alerter wired to its collaborators
pub struct Alerter {
    config: Config,
    queue: Arc<dyn QueueInspector>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl Alerter {
    pub fn new(
        config: Config,
        queue: Arc<dyn QueueInspector>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            queue,
            notifier,
            clock,
        }
    }

    /// Execute one run
    pub async fn run(&self) -> Result<RunOutcome, Error> {
        let state_path = &self.config.state_file_path;
        debug!(state_path = %state_path.display(), "run: called");

        let previous = State::load(state_path).map_err(Error::LoadState)?;

        let current_count = self
            .queue
            .approximate_message_count()
            .await
            .map_err(Error::QueueCount)?;
        info!(
            previous = previous.queue_message_count,
            current = current_count,
            "Observed queue message count"
        );

        let mut next = State {
            queue_message_count: current_count,
            last_thread_timestamp: previous.last_thread_timestamp.clone(),
            alert_sent: previous.alert_sent,
        };

        let mut notification = None;
        let mut details_posted = 0;

        if should_alert(&previous, current_count, self.config.alert_policy) {
            let sent = self.send_alert(current_count, previous.last_thread_timestamp.as_deref()).await?;

            if current_count > 0 && self.config.include_message_details {
                details_posted = self.send_details(sent.thread_ts()).await?;
            } else {
                debug!(current_count, "run: skipping message details");
            }

            next.last_thread_timestamp = Some(sent.thread_ts().to_string());
            next.alert_sent = true;
            notification = Some(sent);
        } else {
            info!("Queue message count unchanged, no alert sent");
        }

        next.store(state_path).map_err(Error::StoreState)?;
        debug!(?next, "run: state stored");

        Ok(RunOutcome {
            previous_count: previous.queue_message_count,
            current_count,
            notification,
            details_posted,
            state: next,
        })
    }

    async fn send_alert(&self, count: u64, last_thread_ts: Option<&str>) -> Result<Notification, Error> {
        let text = alert_text(count, &self.config.queue_name, &self.config.environment_name);
        let decision = decide_thread(last_thread_ts, self.clock.now(), self.config.new_thread_min_interval);

        match decision {
            ThreadDecision::StartNew => {
                let ts = self.notifier.post_message(&text, None).await.map_err(Error::Notify)?;
                info!(%ts, count, "Alert sent as a new thread");
                Ok(Notification::NewThread(ts))
            }
            ThreadDecision::Continue(thread_ts) => {
                // the reply's own ts is not needed, the thread stays rooted where it was
                self.notifier
                    .post_message(&text, Some(&thread_ts))
                    .await
                    .map_err(Error::Notify)?;
                info!(%thread_ts, count, "Alert sent to existing thread");
                Ok(Notification::ThreadReply(thread_ts))
            }
        }
    }

    /// Post a sample of queued messages into the alert thread
    async fn send_details(&self, thread_ts: &str) -> Result<usize, Error> {
        let messages = self
            .queue
            .peek_messages(MAX_PEEK_MESSAGES)
            .await
            .map_err(Error::QueuePeek)?;

        let Some(text) = details_text(&messages) else {
            debug!("send_details: no messages received, skipping follow-up");
            return Ok(0);
        };

        self.notifier
            .post_message(&text, Some(thread_ts))
            .await
            .map_err(Error::NotifyDetails)?;
        info!(count = messages.len(), %thread_ts, "Message details sent");
        Ok(messages.len())
    }
}
