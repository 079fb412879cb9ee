use std::sync::Arc;

use common::judge_job::JudgeJob;
use common::poll::PollPolicy;
use common::{SubmissionStatus, Verdict};
use engine::{EngineError, ExecutionClient, SandboxLimits, encode_batch};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::aggregator::aggregate;
use super::poller::{PollError, Poller};
use super::validator::validate_test_cases;
use crate::lifecycle::SubmissionLifecycle;
use crate::store::{NewSubmission, ProblemSpec, StoreError, Submission};

/// Infrastructure failures while judging. All of them end in `runtime_error`.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Dispatch to execution engine failed: {0}")]
    Dispatch(#[from] EngineError),

    #[error(transparent)]
    Poll(#[from] PollError),
}

/// Encodes, dispatches, polls and aggregates one submission at a time, each
/// on its own task.
pub struct JudgePipeline {
    client: Arc<dyn ExecutionClient>,
    policy: PollPolicy,
    sandbox: SandboxLimits,
}

impl JudgePipeline {
    pub fn new(client: Arc<dyn ExecutionClient>, policy: PollPolicy, sandbox: SandboxLimits) -> Self {
        Self {
            client,
            policy,
            sandbox,
        }
    }

    /// Persist `new` as `pending` and start judging it in the background.
    ///
    /// Malformed test cases end the record in `runtime_error` right away and
    /// nothing is dispatched. Either way the returned record is what the
    /// caller sees; the verdict is read later by id.
    pub async fn accept(
        self: &Arc<Self>,
        lifecycle: &SubmissionLifecycle,
        problem: &ProblemSpec,
        new: NewSubmission,
    ) -> Result<Submission, StoreError> {
        let submission = lifecycle.intake(new).await?;

        let test_cases = match validate_test_cases(&problem.test_cases) {
            Ok(test_cases) => test_cases,
            Err(e) => {
                return lifecycle
                    .fail(
                        submission.id,
                        SubmissionStatus::Pending,
                        format!("Configuration error: {e}"),
                    )
                    .await;
            }
        };

        let job = JudgeJob {
            submission_id: submission.id,
            source_code: submission.source_code.clone(),
            language_id: submission.language_id,
            time_limit_ms: problem.time_limit_ms,
            memory_limit_kb: problem.memory_limit_kb,
            points: problem.points,
            test_cases,
        };
        self.spawn(lifecycle.clone(), job);

        Ok(submission)
    }

    pub fn spawn(self: &Arc<Self>, lifecycle: SubmissionLifecycle, job: JudgeJob) -> JoinHandle<()> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.run(&lifecycle, job).await })
    }

    /// Drive one submission from `pending` to a terminal state.
    #[instrument(skip_all, fields(submission_id = job.submission_id))]
    pub async fn run(&self, lifecycle: &SubmissionLifecycle, job: JudgeJob) {
        let id = job.submission_id;

        if let Err(e) = lifecycle.begin_judging(id).await {
            warn!(error = %e, "Submission could not enter judging, skipping");
            return;
        }

        let written = match self.judge(&job).await {
            Ok(verdict) => lifecycle.record_verdict(id, verdict).await,
            Err(e) => lifecycle.fail(id, SubmissionStatus::Judging, e.to_string()).await,
        };

        match written {
            Ok(submission) => info!(status = %submission.status, "Judging finished"),
            Err(e) => error!(error = %e, "Failed to record judging outcome"),
        }
    }

    async fn judge(&self, job: &JudgeJob) -> Result<Verdict, JudgeError> {
        let batch = encode_batch(job, self.sandbox);
        let tokens = self.client.submit_batch(&batch).await?;
        info!(jobs = tokens.len(), "Batch dispatched");

        let results = Poller::new(self.client.as_ref(), self.policy)
            .wait(&tokens)
            .await?;
        Ok(aggregate(&results, job.points))
    }
}
