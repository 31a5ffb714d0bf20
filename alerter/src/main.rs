//! SQS Alerter - single-shot queue depth check
//!
//! CLI entry point meant to be run on a schedule.

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{error, info};

use sqs_alerter::cli::Cli;
use sqs_alerter::config::Config;
use sqs_alerter::{Alerter, Error, Notification, SlackClient, SqsInspector, SystemClock};

/// Environment variable holding the default log level
const LOG_LEVEL_ENV_VAR: &str = "LOG_LEVEL";

fn setup_logging(level_str: Option<&str>) -> Result<()> {
    // Note: Can't log here since logging isn't initialized yet
    let level = match level_str.map(|s| s.to_uppercase()).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {}", e))?;

    Ok(())
}

async fn run() -> Result<()> {
    let config = Config::from_env().map_err(Error::from)?;
    info!(
        queue = %config.queue_name,
        environment = %config.environment_name,
        policy = %config.alert_policy,
        "sqs-alerter starting"
    );

    let queue = SqsInspector::from_env(config.queue_url.clone()).await;
    let notifier = SlackClient::from_config(&config).context("Failed to create Slack client")?;

    let alerter = Alerter::new(config, Arc::new(queue), Arc::new(notifier), Arc::new(SystemClock));
    let outcome = alerter.run().await?;

    match &outcome.notification {
        Some(Notification::NewThread(ts)) => info!(%ts, count = outcome.current_count, "Run complete, new thread"),
        Some(Notification::ThreadReply(ts)) => info!(%ts, count = outcome.current_count, "Run complete, thread reply"),
        None => info!(count = outcome.current_count, "Run complete, no alert"),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _cli = Cli::parse();

    let log_level = std::env::var(LOG_LEVEL_ENV_VAR).ok();
    if let Err(e) = setup_logging(log_level.as_deref()).context("Failed to setup logging") {
        eprintln!("{:?}", e);
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (stage, message) = describe_failure(&e);
            error!(stage, "{}", message);
            ExitCode::FAILURE
        }
    }
}

/// Stage name and full cause chain of a fatal error
fn describe_failure(e: &eyre::Report) -> (&'static str, String) {
    let stage = e.downcast_ref::<Error>().map(Error::stage).unwrap_or("startup");
    (stage, format!("{:#}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqs_alerter::SlackError;

    #[test]
    fn test_describe_failure_keeps_cause_chain() {
        let report = Err::<(), _>(SlackError::Api {
            error: "invalid_auth".to_string(),
        })
        .context("Failed to create Slack client")
        .unwrap_err();

        let (stage, message) = describe_failure(&report);
        assert_eq!(stage, "startup");
        assert!(message.contains("Failed to create Slack client"));
        assert!(message.contains("invalid_auth"));
    }

    #[test]
    fn test_describe_failure_names_run_stage() {
        let report = eyre::Report::new(Error::from(sqs_alerter::ConfigError::Missing { name: "SLACK_TOKEN" }));

        let (stage, message) = describe_failure(&report);
        assert_eq!(stage, "config");
        assert!(message.contains("SLACK_TOKEN"));
    }
}
