use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{SubmissionStatus, Verdict};
use tracing::{info, warn};

use crate::store::{NewSubmission, Result, StatusUpdate, Submission, SubmissionStore};

/// The only writer of submission records.
///
/// Every status change goes through [`SubmissionStore::transition`], so a
/// terminal state is never overwritten and concurrent readers only ever see
/// committed states.
#[derive(Clone)]
pub struct SubmissionLifecycle {
    store: Arc<dyn SubmissionStore>,
}

impl SubmissionLifecycle {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn SubmissionStore {
        self.store.as_ref()
    }

    /// Persist a new record in `pending`.
    pub async fn intake(&self, new: NewSubmission) -> Result<Submission> {
        let submission = self.store.create(new).await?;
        info!(
            submission_id = submission.id,
            problem_id = submission.problem_id,
            "Submission accepted for judging"
        );
        Ok(submission)
    }

    /// `pending -> judging`, right before dispatch.
    pub async fn begin_judging(&self, id: i32) -> Result<Submission> {
        self.store
            .transition(id, SubmissionStatus::Pending, StatusUpdate::judging())
            .await
    }

    /// `judging -> <verdict status>`, with score, means and per-test results.
    pub async fn record_verdict(&self, id: i32, verdict: Verdict) -> Result<Submission> {
        let status = verdict.status;
        let score = verdict.score;
        let submission = self
            .store
            .transition(
                id,
                SubmissionStatus::Judging,
                StatusUpdate::verdict(verdict, Utc::now()),
            )
            .await?;
        info!(submission_id = id, %status, score, "Verdict recorded");
        Ok(submission)
    }

    /// Force `from -> runtime_error` with `message` as the judge comment.
    pub async fn fail(
        &self,
        id: i32,
        from: SubmissionStatus,
        message: impl Into<String>,
    ) -> Result<Submission> {
        let message = message.into();
        warn!(submission_id = id, %from, reason = %message, "Marking submission as runtime error");
        self.store
            .transition(id, from, StatusUpdate::failure(message, Utc::now()))
            .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<Submission>> {
        self.store.find(id).await
    }

    /// Non-terminal records submitted before `before`.
    pub async fn stale(&self, before: DateTime<Utc>) -> Result<Vec<(i32, SubmissionStatus)>> {
        self.store.find_stale(before).await
    }
}
