use chrono::{DateTime, Utc};
use common::{SubmissionStatus, TestResult};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extractors::caller::Caller;
use crate::store::Submission;

/// Request body for creating a submission or a run.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateSubmissionRequest {
    #[schema(example = 1)]
    pub problem_id: i32,
    /// Contest the submission counts towards. Omit for standalone practice.
    #[schema(example = 3)]
    pub contest_id: Option<i32>,
    #[schema(example = "print(sum(map(int, input().split())))")]
    pub source_code: String,
    /// Execution engine language identifier.
    #[schema(example = 71)]
    pub language_id: i32,
}

/// Returned as soon as the submission is recorded; judging continues in the
/// background.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateSubmissionResponse {
    #[schema(example = 1)]
    pub submission_id: i32,
    pub status: SubmissionStatus,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateRunResponse {
    #[schema(example = 1)]
    pub run_id: i32,
    pub status: SubmissionStatus,
}

/// Full submission details.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 7)]
    pub user_id: i32,
    #[schema(example = 1)]
    pub problem_id: i32,
    pub contest_id: Option<i32>,
    /// Only shown to the owner and admins.
    pub source_code: Option<String>,
    #[schema(example = 71)]
    pub language_id: i32,
    pub status: SubmissionStatus,
    /// Set once a verdict is recorded.
    #[schema(example = 67)]
    pub score: Option<i32>,
    /// Mean time across test cases in milliseconds.
    pub execution_time_ms: Option<i32>,
    /// Mean memory across test cases in kilobytes.
    pub memory_used_kb: Option<i32>,
    /// One entry per test case, in order.
    pub test_results: Vec<TestResult>,
    #[schema(example = "wrong_answer: 2/3 test cases passed")]
    pub judge_comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub judged_at: Option<DateTime<Utc>>,
}

impl SubmissionResponse {
    pub fn for_viewer(submission: Submission, viewer: &Caller) -> Self {
        let show_source = viewer.is_admin() || viewer.user_id == submission.user_id;
        Self {
            id: submission.id,
            user_id: submission.user_id,
            problem_id: submission.problem_id,
            contest_id: submission.contest_id,
            source_code: show_source.then_some(submission.source_code),
            language_id: submission.language_id,
            status: submission.status,
            score: submission.score,
            execution_time_ms: submission.execution_time_ms,
            memory_used_kb: submission.memory_used_kb,
            test_results: submission.test_results,
            judge_comment: submission.judge_comment,
            submitted_at: submission.submitted_at,
            judged_at: submission.judged_at,
        }
    }
}

pub fn validate_create_submission(
    req: &CreateSubmissionRequest,
    max_size: usize,
) -> Result<(), AppError> {
    if req.problem_id <= 0 {
        return Err(AppError::Validation("problem_id must be positive".into()));
    }

    if req.language_id <= 0 {
        return Err(AppError::Validation("language_id must be positive".into()));
    }

    if req.source_code.trim().is_empty() {
        return Err(AppError::Validation("Source code cannot be empty".into()));
    }

    if req.source_code.len() > max_size {
        return Err(AppError::Validation(format!(
            "Source code size ({} bytes) exceeds maximum ({} bytes)",
            req.source_code.len(),
            max_size
        )));
    }

    Ok(())
}
