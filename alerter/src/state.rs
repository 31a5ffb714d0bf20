//! Persisted state between alerter runs
//!
//! The state file is a small YAML document, rewritten in full after every
//! successful run:
//!
//! ```yaml
//! queueMessageCount: 12
//! lastThreadTimestamp: "1700000000.123456"
//! alertSent: true
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors reading or writing the state file
#[derive(Debug, Error)]
pub enum StateError {
    #[error("State file does not exist at {}. Create an empty file there for a first run", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read state file at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse yaml state file at {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_yaml::Error },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("Failed to write state file at {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Outcome of the most recently completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    /// Approximate queue depth seen by the last run
    #[serde(rename = "queueMessageCount")]
    pub queue_message_count: u64,

    /// Slack timestamp of the root message of the current alert thread
    #[serde(
        rename = "lastThreadTimestamp",
        alias = "lastthreadtimestamp",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_thread_timestamp: Option<String>,

    /// Whether any alert has been sent so far
    #[serde(rename = "alertSent")]
    pub alert_sent: bool,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl State {
    /// Load state from `path`
    ///
    /// The file must exist. An empty file is a first run and yields the
    /// default state.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "load: called");

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StateError::Missing {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        // an empty document deserializes to unit, not a mapping
        if content.trim().is_empty() {
            info!(path = %path.display(), "State file is empty, starting from empty state");
            return Ok(Self::default());
        }

        let state: Self = serde_yaml::from_str(&content).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?state, "load: parsed");
        Ok(state)
    }

    /// Write state to `path`, replacing any existing file
    ///
    /// The document is written to a sibling temporary file and renamed over
    /// the target, so a failed write leaves the previous state in place.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        let path = path.as_ref();
        debug!(path = %path.display(), ?self, "store: called");

        let content = serde_yaml::to_string(self).map_err(StateError::Serialize)?;

        let tmp_path = tmp_path_for(path);
        let write_err = |source: io::Error| StateError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Err(e) = fs::write(&tmp_path, content) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }

        debug!("store: written");
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
