//! CLI argument parsing for sqs-alerter
//!
//! The alerter takes no arguments; everything is configured through the
//! environment. clap still provides `--help` and `--version`.

use clap::Parser;

const AFTER_HELP: &str = "\
ENVIRONMENT:
  SQS_QUEUE_URL             URL of the SQS queue to watch (required)
  SQS_QUEUE_NAME            Queue name used in alerts (default: SQS Queue)
  ENVIRONMENT_NAME          Environment label used in alerts (default: Production)
  SLACK_TOKEN               Slack bot token (required)
  SLACK_CHANNEL             Slack channel to post into (required)
  SLACK_API_URL             Slack Web API base URL (default: https://slack.com/api)
  STATE_FILE_PATH           State file location (default: sqs-alerter-state.yaml)
  NEW_THREAD_MIN_INTERVAL   Minimum thread age before a new thread, e.g. 30m, 2h (default: 1h)
  ALERT_POLICY              count-change | count-change-or-unsent (default: count-change)
  INCLUDE_MESSAGE_DETAILS   Post up to ten queued messages with alerts (default: false).
                            Sampling increments ApproximateReceiveCount, which can push
                            messages to a dead-letter queue under a redrive policy
  LOG_LEVEL                 trace | debug | info | warn | error (default: info)

AWS credentials and region come from the standard AWS SDK configuration chain.";

#[derive(Parser, Debug)]
#[command(name = "sqs-alerter")]
#[command(author, version, about = "Alert to Slack when an SQS queue's message count changes", long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {}
