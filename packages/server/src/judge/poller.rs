use std::collections::HashMap;

use common::poll::PollPolicy;
use engine::{EngineSubmission, ExecutionClient};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum PollError {
    #[error("Judging timed out after {attempts} attempts{}", last_error_suffix(.last_error))]
    TimedOut {
        attempts: u32,
        last_error: Option<String>,
    },
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_ref()
        .map(|e| format!(" (last error: {e})"))
        .unwrap_or_default()
}

/// Waits for a dispatched batch to finish, within a bounded budget.
pub struct Poller<'a> {
    client: &'a dyn ExecutionClient,
    policy: PollPolicy,
}

impl<'a> Poller<'a> {
    pub fn new(client: &'a dyn ExecutionClient, policy: PollPolicy) -> Self {
        Self { client, policy }
    }

    /// Poll until every job has finished, then return the results in
    /// `tokens` order.
    ///
    /// A failed tick counts against the budget like an unfinished one.
    #[instrument(skip(self, tokens), fields(tokens = tokens.len()))]
    pub async fn wait(&self, tokens: &[String]) -> Result<Vec<EngineSubmission>, PollError> {
        let max_attempts = self.policy.max_attempts;
        let mut failed_ticks = 0u32;
        let mut last_error: Option<String> = None;

        for attempt in 1..=max_attempts {
            match self.client.fetch_batch(tokens).await {
                Ok(batch) => match complete_in_order(tokens, batch) {
                    Some(results) => {
                        debug!(attempt, "Batch finished");
                        return Ok(results);
                    }
                    None => debug!(attempt, "Batch still running"),
                },
                Err(e) => {
                    warn!(attempt, error = %e, "Poll tick failed");
                    failed_ticks += 1;
                    last_error = Some(e.to_string());
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.policy.interval).await;
            }
        }

        warn!(
            attempts = max_attempts,
            failed_ticks,
            "Batch did not finish within the poll budget"
        );
        Err(PollError::TimedOut {
            attempts: max_attempts,
            last_error,
        })
    }
}

/// `Some` when the batch holds one finished entry per token, re-ordered to
/// match `tokens`.
fn complete_in_order(
    tokens: &[String],
    batch: Vec<EngineSubmission>,
) -> Option<Vec<EngineSubmission>> {
    if batch.len() != tokens.len() || !batch.iter().all(EngineSubmission::is_finished) {
        return None;
    }

    // Without tokens in the response, position is all there is.
    if batch.iter().any(|s| s.token.is_none()) {
        return Some(batch);
    }

    let mut by_token: HashMap<String, EngineSubmission> = batch
        .into_iter()
        .filter_map(|s| s.token.clone().map(|t| (t, s)))
        .collect();
    tokens.iter().map(|t| by_token.remove(t)).collect()
}
