use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Where background observers run.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    /// Tokio blocking pool when called from inside a runtime, a dedicated
    /// thread otherwise
    #[default]
    Auto,
    /// Always a fresh, named OS thread per callback
    Thread,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DispatchConfig {
    #[serde(default)]
    pub executor: ExecutorKind,

    /// Buffered background failures per subscriber before old ones are dropped
    #[serde(default = "default_failure_channel_capacity")]
    pub failure_channel_capacity: usize,

    /// Emit an `error!` event for every background failure
    #[serde(default = "default_log_background_failures")]
    pub log_background_failures: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorKind::default(),
            failure_channel_capacity: default_failure_channel_capacity(),
            log_background_failures: default_log_background_failures(),
        }
    }
}

impl DispatchConfig {
    /// # Errors
    /// Returns `Error::InvalidConfig` when the failure channel has no capacity
    pub fn validate(&self) -> Result<()> {
        if self.failure_channel_capacity == 0 {
            return Err(Error::InvalidConfig(
                "failure_channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_failure_channel_capacity() -> usize {
    64
}

fn default_log_background_failures() -> bool {
    true
}
