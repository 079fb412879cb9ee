use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::caller::Caller;
use crate::extractors::json::AppJson;
use crate::models::submission::*;
use crate::state::AppState;

use super::submission::intake;

/// Run code against a problem without recording a scored attempt.
#[utoipa::path(
    post,
    path = "/runs",
    tag = "Runs",
    operation_id = "createRun",
    summary = "Run a solution without submitting it",
    description = "Judged exactly like a submission, but kept only in server memory and never counted towards a contest.",
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Run recorded", body = CreateRunResponse),
        (status = 400, description = "Invalid payload or contest not active (VALIDATION_ERROR, CONTEST_NOT_ACTIVE)", body = ErrorBody),
        (status = 401, description = "No caller identity (IDENTITY_MISSING)", body = ErrorBody),
        (status = 403, description = "Not registered for the contest (NOT_REGISTERED)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded (RATE_LIMITED)", body = ErrorBody),
    ),
    params(
        ("X-User-Id" = i32, Header, description = "Caller user id, set by the gateway"),
    ),
)]
pub async fn create_run(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let run = intake(&state, &state.runs, &caller, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRunResponse {
            run_id: run.id,
            status: run.status,
        }),
    ))
}

/// Get a run.
#[utoipa::path(
    get,
    path = "/runs/{id}",
    tag = "Runs",
    operation_id = "getRun",
    summary = "Get a run",
    params(
        ("id" = i32, Path, description = "Run ID"),
        ("X-User-Id" = i32, Header, description = "Caller user id, set by the gateway"),
    ),
    responses(
        (status = 200, description = "Run details", body = SubmissionResponse),
        (status = 401, description = "No caller identity (IDENTITY_MISSING)", body = ErrorBody),
        (status = 404, description = "Run not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, caller), fields(run_id = %id))]
pub async fn get_run(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let run = state
        .runs
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Run not found".into()))?;

    Ok(Json(SubmissionResponse::for_viewer(run, &caller)))
}
