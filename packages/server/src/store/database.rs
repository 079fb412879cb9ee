use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{SubmissionStatus, TestResult};
use sea_orm::sea_query::Expr;
use sea_orm::*;

use super::{
    ContestSpec, NewSubmission, ProblemCatalog, ProblemSpec, RawTestCase, Result, StatusUpdate,
    StoreError, Submission, SubmissionStore, check_transition,
};
use crate::entity::{contest, contest_problem, contest_user, problem, submission, test_case};

/// Submission store and problem catalog backed by the shared database.
#[derive(Clone)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl TryFrom<submission::Model> for Submission {
    type Error = StoreError;

    fn try_from(model: submission::Model) -> Result<Self> {
        let test_results: Vec<TestResult> = serde_json::from_value(model.test_results)
            .map_err(|e| StoreError::Corrupt(format!("submission {}: {e}", model.id)))?;
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            problem_id: model.problem_id,
            contest_id: model.contest_id,
            source_code: model.source_code,
            language_id: model.language_id,
            status: model.status,
            score: model.score,
            execution_time_ms: model.execution_time_ms,
            memory_used_kb: model.memory_used_kb,
            test_results,
            judge_comment: model.judge_comment,
            submitted_at: model.submitted_at,
            judged_at: model.judged_at,
        })
    }
}

#[async_trait]
impl SubmissionStore for DbStore {
    async fn create(&self, new: NewSubmission) -> Result<Submission> {
        let model = submission::ActiveModel {
            user_id: Set(new.user_id),
            problem_id: Set(new.problem_id),
            contest_id: Set(new.contest_id),
            source_code: Set(new.source_code),
            language_id: Set(new.language_id),
            status: Set(SubmissionStatus::Pending),
            score: Set(None),
            execution_time_ms: Set(None),
            memory_used_kb: Set(None),
            test_results: Set(serde_json::Value::Array(vec![])),
            judge_comment: Set(None),
            submitted_at: Set(new.submitted_at),
            judged_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Submission::try_from(model)
    }

    async fn find(&self, id: i32) -> Result<Option<Submission>> {
        submission::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Submission::try_from)
            .transpose()
    }

    async fn transition(
        &self,
        id: i32,
        from: SubmissionStatus,
        update: StatusUpdate,
    ) -> Result<Submission> {
        check_transition(from, update.status)?;

        let test_results = serde_json::to_value(&update.test_results)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let result = submission::Entity::update_many()
            .col_expr(submission::Column::Status, Expr::value(update.status))
            .col_expr(submission::Column::Score, Expr::value(update.score))
            .col_expr(
                submission::Column::ExecutionTimeMs,
                Expr::value(update.execution_time_ms),
            )
            .col_expr(
                submission::Column::MemoryUsedKb,
                Expr::value(update.memory_used_kb),
            )
            .col_expr(submission::Column::TestResults, Expr::value(test_results))
            .col_expr(
                submission::Column::JudgeComment,
                Expr::value(update.judge_comment),
            )
            .col_expr(submission::Column::JudgedAt, Expr::value(update.judged_at))
            .filter(submission::Column::Id.eq(id))
            .filter(submission::Column::Status.eq(from))
            .exec(&self.db)
            .await?;

        let current = self.find(id).await?.ok_or(StoreError::NotFound(id))?;
        if result.rows_affected == 0 {
            return Err(StoreError::TransitionRejected {
                id,
                expected: from,
                actual: current.status,
            });
        }
        Ok(current)
    }

    async fn count_since(&self, user_id: i32, since: DateTime<Utc>) -> Result<u64> {
        let count = submission::Entity::find()
            .filter(submission::Column::UserId.eq(user_id))
            .filter(submission::Column::SubmittedAt.gt(since))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn oldest_since(
        &self,
        user_id: i32,
        since: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        let oldest = submission::Entity::find()
            .filter(submission::Column::UserId.eq(user_id))
            .filter(submission::Column::SubmittedAt.gt(since))
            .order_by_asc(submission::Column::SubmittedAt)
            .one(&self.db)
            .await?;
        Ok(oldest.map(|s| s.submitted_at))
    }

    async fn find_stale(&self, before: DateTime<Utc>) -> Result<Vec<(i32, SubmissionStatus)>> {
        let stale = submission::Entity::find()
            .select_only()
            .column(submission::Column::Id)
            .column(submission::Column::Status)
            .filter(
                submission::Column::Status
                    .is_in([SubmissionStatus::Pending, SubmissionStatus::Judging]),
            )
            .filter(submission::Column::SubmittedAt.lt(before))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(stale)
    }
}

#[async_trait]
impl ProblemCatalog for DbStore {
    async fn find_problem(&self, id: i32) -> Result<Option<ProblemSpec>> {
        let Some(problem) = problem::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let test_cases = test_case::Entity::find()
            .filter(test_case::Column::ProblemId.eq(id))
            .order_by_asc(test_case::Column::Position)
            .order_by_asc(test_case::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|tc| RawTestCase {
                input: tc.input,
                expected_output: tc.expected_output,
            })
            .collect();

        Ok(Some(ProblemSpec {
            id: problem.id,
            points: problem.points,
            time_limit_ms: problem.time_limit,
            memory_limit_kb: problem.memory_limit,
            test_cases,
        }))
    }

    async fn find_contest(&self, id: i32) -> Result<Option<ContestSpec>> {
        let contest = contest::Entity::find_by_id(id).one(&self.db).await?;
        Ok(contest.map(|c| ContestSpec {
            id: c.id,
            start_time: c.start_time,
            end_time: c.end_time,
            requires_registration: c.requires_registration,
        }))
    }

    async fn is_registered(&self, contest_id: i32, user_id: i32) -> Result<bool> {
        let exists = contest_user::Entity::find_by_id((contest_id, user_id))
            .one(&self.db)
            .await?
            .is_some();
        Ok(exists)
    }

    async fn is_problem_in_contest(&self, contest_id: i32, problem_id: i32) -> Result<bool> {
        let exists = contest_problem::Entity::find_by_id((contest_id, problem_id))
            .one(&self.db)
            .await?
            .is_some();
        Ok(exists)
    }
}
