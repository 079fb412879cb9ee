use std::time::Duration;

use serde::Deserialize;

use crate::poll::PollPolicy;

/// Judging pipeline configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct JudgingConfig {
    /// Poll ticks before a batch is declared timed out. Default: 30.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    /// Delay between poll ticks, shared by submissions and runs. Default: 2000.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_max_poll_attempts() -> u32 {
    PollPolicy::DEFAULT_MAX_ATTEMPTS
}
fn default_poll_interval_ms() -> u64 {
    PollPolicy::DEFAULT_INTERVAL.as_millis() as u64
}

impl JudgingConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.max_poll_attempts,
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}

impl Default for JudgingConfig {
    fn default() -> Self {
        Self {
            max_poll_attempts: default_max_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
