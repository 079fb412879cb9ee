use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::config::SweeperConfig;
use crate::lifecycle::SubmissionLifecycle;
use crate::store::{MemoryStore, StoreError};

/// Message stored on submissions the sweeper gives up on.
pub const INTERRUPTED_MESSAGE: &str = "Judging was interrupted before a verdict was recorded";

/// Run the stuck submission sweeper as a background task.
///
/// Catches records whose judging task died with the process; a live task
/// always finishes well within `stuck_after_secs`. Each scan also drops
/// finished runs older than `run_retention_secs` from `run_store`, even when
/// stuck sweeping is disabled.
pub async fn run_stuck_submission_sweeper(
    lifecycles: Vec<SubmissionLifecycle>,
    run_store: Arc<MemoryStore>,
    config: SweeperConfig,
) {
    let scan_interval = Duration::from_secs(config.scan_interval_secs.max(1));

    info!(
        enabled = config.enabled,
        stuck_after_secs = config.stuck_after_secs,
        scan_interval_secs = config.scan_interval_secs,
        run_retention_secs = config.run_retention_secs,
        "Starting stuck submission sweeper"
    );

    let mut interval = tokio::time::interval(scan_interval);

    loop {
        interval.tick().await;
        let now = Utc::now();

        if config.enabled {
            for lifecycle in &lifecycles {
                if let Err(e) = sweep(lifecycle, config.stuck_after_secs, now).await {
                    error!(error = %e, "Stuck submission sweep failed");
                }
            }
        }

        prune_runs(&run_store, config.run_retention_secs, now);
    }
}

/// Drop runs whose verdict is older than `retention_secs`.
pub fn prune_runs(run_store: &MemoryStore, retention_secs: u64, now: DateTime<Utc>) -> usize {
    let cutoff = now - chrono::Duration::seconds(retention_secs as i64);
    let removed = run_store.purge_terminal_before(cutoff);
    if removed > 0 {
        debug!(removed, "Pruned finished runs");
    }
    removed
}

/// Fail every non-terminal record older than `stuck_after_secs`. Returns how
/// many were moved.
pub async fn sweep(
    lifecycle: &SubmissionLifecycle,
    stuck_after_secs: u64,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let threshold = now - chrono::Duration::seconds(stuck_after_secs as i64);
    let stale = lifecycle.stale(threshold).await?;

    if stale.is_empty() {
        return Ok(0);
    }

    info!(count = stale.len(), "Found stuck submissions");

    let mut swept = 0;
    for (submission_id, status) in stale {
        match lifecycle.fail(submission_id, status, INTERRUPTED_MESSAGE).await {
            Ok(_) => swept += 1,
            // The judging task finished between the scan and the update.
            Err(StoreError::TransitionRejected { .. }) => {
                debug!(submission_id, "Submission moved on before the sweep, skipping");
            }
            Err(e) => error!(submission_id, error = %e, "Failed to sweep stuck submission"),
        }
    }

    Ok(swept)
}
