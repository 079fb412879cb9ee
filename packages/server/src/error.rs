use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::store::StoreError;
use crate::utils::eligibility::EligibilityError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `IDENTITY_MISSING`, `NOT_FOUND`, `NOT_REGISTERED`, `CONTEST_NOT_ACTIVE`,
    /// `RATE_LIMITED`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Source code cannot be empty")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    IdentityMissing,
    NotFound(String),
    NotRegistered,
    ContestNotActive(String),
    /// Rate limit exceeded. Contains seconds until retry is allowed.
    RateLimited {
        retry_after: u64,
    },
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::IdentityMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "IDENTITY_MISSING",
                    message: "Caller identity required".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::NotRegistered => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "NOT_REGISTERED",
                    message: "You are not registered for this contest".into(),
                },
            ),
            AppError::ContestNotActive(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "CONTEST_NOT_ACTIVE",
                    message: msg,
                },
            ),
            AppError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    code: "RATE_LIMITED",
                    message: format!("Rate limit exceeded. Try again in {} seconds", retry_after),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retry_after = if let AppError::RateLimited { retry_after } = &self {
            Some(*retry_after)
        } else {
            None
        };

        let (status, body) = self.status_and_body();

        if let Some(seconds) = retry_after {
            (status, [("Retry-After", seconds.to_string())], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound("Submission not found".into()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<EligibilityError> for AppError {
    fn from(err: EligibilityError) -> Self {
        match err {
            EligibilityError::ProblemNotFound(_) => AppError::NotFound("Problem not found".into()),
            EligibilityError::ContestNotFound(_) => AppError::NotFound("Contest not found".into()),
            EligibilityError::ProblemNotInContest { .. } => {
                AppError::NotFound("Contest problem not found".into())
            }
            EligibilityError::NotRegistered { .. } => AppError::NotRegistered,
            e @ (EligibilityError::NotStarted | EligibilityError::Ended) => {
                AppError::ContestNotActive(e.to_string())
            }
            EligibilityError::Store(e) => e.into(),
        }
    }
}
