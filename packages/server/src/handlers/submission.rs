use std::cmp;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::caller::Caller;
use crate::extractors::json::AppJson;
use crate::lifecycle::SubmissionLifecycle;
use crate::models::submission::*;
use crate::state::AppState;
use crate::store::{NewSubmission, Submission, SubmissionStore};
use crate::utils::eligibility::check_eligibility;

/// Check rate limit for a user.
///
/// Optimistic: two requests racing inside the same instant may both pass
/// before either record exists.
pub(crate) async fn check_rate_limit(
    store: &dyn SubmissionStore,
    user_id: i32,
    limit_per_minute: u32,
) -> Result<(), AppError> {
    if limit_per_minute == 0 {
        return Ok(()); // Rate limiting disabled
    }

    let now = Utc::now();
    let one_minute_ago = now - Duration::minutes(1);

    let count = store.count_since(user_id, one_minute_ago).await?;

    if count >= u64::from(limit_per_minute) {
        let retry_after = store
            .oldest_since(user_id, one_minute_ago)
            .await?
            .map(|oldest| {
                let expires = oldest + Duration::minutes(1);
                cmp::max((expires - now).num_seconds(), 1) as u64
            })
            .unwrap_or(60);

        return Err(AppError::RateLimited { retry_after });
    }

    Ok(())
}

/// Shared intake for submissions and runs: validate, gate, persist and start
/// judging. The returned record is `pending`, or `runtime_error` when the
/// problem's test cases are unusable.
#[instrument(skip_all, fields(user_id = caller.user_id, problem_id = payload.problem_id))]
pub(crate) async fn intake(
    state: &AppState,
    lifecycle: &SubmissionLifecycle,
    caller: &Caller,
    payload: CreateSubmissionRequest,
) -> Result<Submission, AppError> {
    validate_create_submission(&payload, state.config.submission.max_size)?;
    check_rate_limit(
        lifecycle.store(),
        caller.user_id,
        state.config.submission.rate_limit_per_minute,
    )
    .await?;

    let now = Utc::now();
    let problem = check_eligibility(
        state.catalog.as_ref(),
        caller,
        payload.problem_id,
        payload.contest_id,
        now,
    )
    .await?;

    let new_submission = NewSubmission {
        user_id: caller.user_id,
        problem_id: payload.problem_id,
        contest_id: payload.contest_id,
        source_code: payload.source_code,
        language_id: payload.language_id,
        submitted_at: now,
    };

    Ok(state
        .pipeline
        .accept(lifecycle, &problem, new_submission)
        .await?)
}

/// Create a submission.
#[utoipa::path(
    post,
    path = "/submissions",
    tag = "Submissions",
    operation_id = "createSubmission",
    summary = "Submit a solution to a problem",
    description = "Records the submission and starts judging it in the background. Poll `GET /submissions/{id}` for the verdict.",
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission recorded", body = CreateSubmissionResponse),
        (status = 400, description = "Invalid payload or contest not active (VALIDATION_ERROR, CONTEST_NOT_ACTIVE)", body = ErrorBody),
        (status = 401, description = "No caller identity (IDENTITY_MISSING)", body = ErrorBody),
        (status = 403, description = "Not registered for the contest (NOT_REGISTERED)", body = ErrorBody),
        (status = 404, description = "Problem, contest or contest problem not found (NOT_FOUND)", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded (RATE_LIMITED)", body = ErrorBody),
    ),
    params(
        ("X-User-Id" = i32, Header, description = "Caller user id, set by the gateway"),
        ("X-User-Role" = Option<String>, Header, description = "Caller role, set by the gateway"),
    ),
)]
pub async fn create_submission(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let submission = intake(&state, &state.submissions, &caller, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSubmissionResponse {
            submission_id: submission.id,
            status: submission.status,
        }),
    ))
}

/// Get a submission.
#[utoipa::path(
    get,
    path = "/submissions/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get a submission",
    description = "Returns the current state of a submission. Source code is only included for its owner and admins.",
    params(
        ("id" = i32, Path, description = "Submission ID"),
        ("X-User-Id" = i32, Header, description = "Caller user id, set by the gateway"),
    ),
    responses(
        (status = 200, description = "Submission details", body = SubmissionResponse),
        (status = 401, description = "No caller identity (IDENTITY_MISSING)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, caller), fields(submission_id = %id))]
pub async fn get_submission(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let submission = state
        .submissions
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))?;

    Ok(Json(SubmissionResponse::for_viewer(submission, &caller)))
}
