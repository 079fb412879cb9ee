use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::SubmissionStatus;
use dashmap::{DashMap, DashSet};

use super::{
    ContestSpec, NewSubmission, ProblemCatalog, ProblemSpec, Result, StatusUpdate, StoreError,
    Submission, SubmissionStore, check_transition,
};

/// Process-local submission store.
///
/// Backs ephemeral runs, which are judged like submissions but never
/// persisted. The per-key lock of the map makes each transition atomic.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<i32, Submission>,
    next_id: AtomicI32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop finished records judged before `before`. Records still `pending`
    /// or `judging` are kept whatever their age. Returns how many were removed.
    pub fn purge_terminal_before(&self, before: DateTime<Utc>) -> usize {
        let initial = self.records.len();
        self.records.retain(|_, r| {
            !(r.status.is_terminal() && r.judged_at.unwrap_or(r.submitted_at) < before)
        });
        initial.saturating_sub(self.records.len())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn create(&self, new: NewSubmission) -> Result<Submission> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let record = Submission {
            id,
            user_id: new.user_id,
            problem_id: new.problem_id,
            contest_id: new.contest_id,
            source_code: new.source_code,
            language_id: new.language_id,
            status: SubmissionStatus::Pending,
            score: None,
            execution_time_ms: None,
            memory_used_kb: None,
            test_results: Vec::new(),
            judge_comment: None,
            submitted_at: new.submitted_at,
            judged_at: None,
        };
        self.records.insert(id, record.clone());
        Ok(record)
    }

    async fn find(&self, id: i32) -> Result<Option<Submission>> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn transition(
        &self,
        id: i32,
        from: SubmissionStatus,
        update: StatusUpdate,
    ) -> Result<Submission> {
        check_transition(from, update.status)?;

        let mut record = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if record.status != from {
            return Err(StoreError::TransitionRejected {
                id,
                expected: from,
                actual: record.status,
            });
        }

        record.status = update.status;
        record.score = update.score;
        record.execution_time_ms = update.execution_time_ms;
        record.memory_used_kb = update.memory_used_kb;
        record.test_results = update.test_results;
        record.judge_comment = update.judge_comment;
        record.judged_at = update.judged_at;
        Ok(record.clone())
    }

    async fn count_since(&self, user_id: i32, since: DateTime<Utc>) -> Result<u64> {
        let count = self
            .records
            .iter()
            .filter(|r| r.user_id == user_id && r.submitted_at > since)
            .count();
        Ok(count as u64)
    }

    async fn oldest_since(
        &self,
        user_id: i32,
        since: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.user_id == user_id && r.submitted_at > since)
            .map(|r| r.submitted_at)
            .min())
    }

    async fn find_stale(&self, before: DateTime<Utc>) -> Result<Vec<(i32, SubmissionStatus)>> {
        Ok(self
            .records
            .iter()
            .filter(|r| !r.status.is_terminal() && r.submitted_at < before)
            .map(|r| (r.id, r.status))
            .collect())
    }
}

/// In-memory problem catalog, for tests and local runs without a database.
#[derive(Default)]
pub struct MemoryCatalog {
    problems: DashMap<i32, ProblemSpec>,
    contests: DashMap<i32, ContestSpec>,
    registrations: DashSet<(i32, i32)>,
    assignments: DashSet<(i32, i32)>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_problem(&self, problem: ProblemSpec) {
        self.problems.insert(problem.id, problem);
    }

    pub fn insert_contest(&self, contest: ContestSpec) {
        self.contests.insert(contest.id, contest);
    }

    pub fn register(&self, contest_id: i32, user_id: i32) {
        self.registrations.insert((contest_id, user_id));
    }

    pub fn assign(&self, contest_id: i32, problem_id: i32) {
        self.assignments.insert((contest_id, problem_id));
    }
}

#[async_trait]
impl ProblemCatalog for MemoryCatalog {
    async fn find_problem(&self, id: i32) -> Result<Option<ProblemSpec>> {
        Ok(self.problems.get(&id).map(|p| p.value().clone()))
    }

    async fn find_contest(&self, id: i32) -> Result<Option<ContestSpec>> {
        Ok(self.contests.get(&id).map(|c| c.value().clone()))
    }

    async fn is_registered(&self, contest_id: i32, user_id: i32) -> Result<bool> {
        Ok(self.registrations.contains(&(contest_id, user_id)))
    }

    async fn is_problem_in_contest(&self, contest_id: i32, problem_id: i32) -> Result<bool> {
        Ok(self.assignments.contains(&(contest_id, problem_id)))
    }
}
