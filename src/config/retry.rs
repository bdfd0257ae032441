use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Fixed-delay retry template
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts (unit: milliseconds)
    #[serde(default = "default_backoff_delay_ms")]
    pub backoff_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_delay_ms: default_backoff_delay_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn backoff_delay(&self) -> Duration {
        Duration::from_millis(self.backoff_delay_ms)
    }

    pub fn validate(
        &self,
        name: &str,
    ) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig(format!(
                "{name}.max_attempts must be at least 1"
            )));
        }
        Ok(())
    }
}

/// Divide strategies by bootstrap stage
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RetryPolicies {
    // Topology application is the only stage that retries
    #[serde(default)]
    pub topology: RetryPolicy,
}

impl RetryPolicies {
    pub fn validate(&self) -> Result<()> {
        self.topology.validate("retry.topology")
    }
}

fn default_max_attempts() -> u32 {
    2
}
fn default_backoff_delay_ms() -> u64 {
    10_000
}
