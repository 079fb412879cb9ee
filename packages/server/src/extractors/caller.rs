use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Header carrying the authenticated user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Header carrying the caller's role, set by the upstream gateway.
pub const USER_ROLE_HEADER: &str = "X-User-Role";

const ADMIN_ROLE: &str = "admin";

/// Identity of the caller, as asserted by the gateway in front of this
/// service. Authentication happens upstream; these headers are trusted.
///
/// Add this as a handler parameter to require an identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub role: String,
}

impl Caller {
    pub fn new(user_id: i32, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }

    /// Admins bypass contest registration and time-window checks.
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::IdentityMissing)?
            .trim()
            .parse::<i32>()
            .map_err(|_| AppError::IdentityMissing)?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|r| r.trim().to_ascii_lowercase())
            .unwrap_or_else(|| "user".into());

        Ok(Caller { user_id, role })
    }
}
