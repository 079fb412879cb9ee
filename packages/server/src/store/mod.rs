//! Persistence boundary of the judging core.
//!
//! [`SubmissionStore`] owns submission records and is the only way their
//! status changes; [`ProblemCatalog`] is the read-only view of problems and
//! contests maintained elsewhere.

pub mod database;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{SubmissionStatus, TestResult, Verdict};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

pub use database::DbStore;
pub use memory::{MemoryCatalog, MemoryStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Submission {0} not found")]
    NotFound(i32),

    /// The conditional update matched no row: the record was no longer in
    /// the expected state. Nothing was written.
    #[error("Submission {id} is {actual}, expected {expected}")]
    TransitionRejected {
        id: i32,
        expected: SubmissionStatus,
        actual: SubmissionStatus,
    },

    #[error("Transition {from} -> {to} is not allowed")]
    InvalidTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A submission record as readers see it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub id: i32,
    pub user_id: i32,
    pub problem_id: i32,
    pub contest_id: Option<i32>,
    pub source_code: String,
    pub language_id: i32,
    pub status: SubmissionStatus,
    pub score: Option<i32>,
    pub execution_time_ms: Option<i32>,
    pub memory_used_kb: Option<i32>,
    pub test_results: Vec<TestResult>,
    pub judge_comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub judged_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug)]
pub struct NewSubmission {
    pub user_id: i32,
    pub problem_id: i32,
    pub contest_id: Option<i32>,
    pub source_code: String,
    pub language_id: i32,
    pub submitted_at: DateTime<Utc>,
}

/// Everything a single status transition writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: SubmissionStatus,
    pub score: Option<i32>,
    pub execution_time_ms: Option<i32>,
    pub memory_used_kb: Option<i32>,
    pub test_results: Vec<TestResult>,
    pub judge_comment: Option<String>,
    pub judged_at: Option<DateTime<Utc>>,
}

impl StatusUpdate {
    pub fn judging() -> Self {
        Self {
            status: SubmissionStatus::Judging,
            score: None,
            execution_time_ms: None,
            memory_used_kb: None,
            test_results: Vec::new(),
            judge_comment: None,
            judged_at: None,
        }
    }

    pub fn verdict(verdict: Verdict, judged_at: DateTime<Utc>) -> Self {
        Self {
            status: verdict.status,
            score: Some(verdict.score),
            execution_time_ms: Some(verdict.execution_time_ms),
            memory_used_kb: Some(verdict.memory_used_kb),
            judge_comment: Some(verdict.summary()),
            test_results: verdict.test_results,
            judged_at: Some(judged_at),
        }
    }

    /// Infrastructure or configuration failure: `runtime_error` with no score.
    pub fn failure(message: impl Into<String>, judged_at: DateTime<Utc>) -> Self {
        Self {
            status: SubmissionStatus::RuntimeError,
            score: None,
            execution_time_ms: None,
            memory_used_kb: None,
            test_results: Vec::new(),
            judge_comment: Some(message.into()),
            judged_at: Some(judged_at),
        }
    }
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert a new record in `pending`.
    async fn create(&self, new: NewSubmission) -> Result<Submission>;

    async fn find(&self, id: i32) -> Result<Option<Submission>>;

    /// Apply `update` only if the record is currently `from`, as one atomic
    /// conditional write. Returns the record as written.
    async fn transition(&self, id: i32, from: SubmissionStatus, update: StatusUpdate)
    -> Result<Submission>;

    /// Number of submissions by `user_id` since `since`.
    async fn count_since(&self, user_id: i32, since: DateTime<Utc>) -> Result<u64>;

    /// Oldest submission time by `user_id` since `since`.
    async fn oldest_since(&self, user_id: i32, since: DateTime<Utc>)
    -> Result<Option<DateTime<Utc>>>;

    /// Non-terminal submissions created before `before`.
    async fn find_stale(&self, before: DateTime<Utc>) -> Result<Vec<(i32, SubmissionStatus)>>;
}

/// Test case as stored: either field may be missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTestCase {
    pub input: Option<String>,
    pub expected_output: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProblemSpec {
    pub id: i32,
    pub points: i32,
    pub time_limit_ms: i32,
    pub memory_limit_kb: i32,
    /// Ordered by position.
    pub test_cases: Vec<RawTestCase>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContestSpec {
    pub id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub requires_registration: bool,
}

impl ContestSpec {
    /// Inclusive on both ends.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now <= self.end_time
    }
}

#[async_trait]
pub trait ProblemCatalog: Send + Sync {
    async fn find_problem(&self, id: i32) -> Result<Option<ProblemSpec>>;

    async fn find_contest(&self, id: i32) -> Result<Option<ContestSpec>>;

    async fn is_registered(&self, contest_id: i32, user_id: i32) -> Result<bool>;

    async fn is_problem_in_contest(&self, contest_id: i32, problem_id: i32) -> Result<bool>;
}

/// Shared guard for both store implementations.
pub(crate) fn check_transition(from: SubmissionStatus, to: SubmissionStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(StoreError::InvalidTransition { from, to })
    }
}
