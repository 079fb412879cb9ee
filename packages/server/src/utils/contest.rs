use chrono::{DateTime, Utc};

use crate::extractors::caller::Caller;
use crate::store::{ContestSpec, ProblemCatalog};

use super::eligibility::EligibilityError;

/// Verify the caller may submit to a contest that requires registration.
/// Admins bypass the check.
pub async fn check_contest_registration(
    catalog: &dyn ProblemCatalog,
    caller: &Caller,
    contest: &ContestSpec,
) -> Result<(), EligibilityError> {
    if caller.is_admin() || !contest.requires_registration {
        return Ok(());
    }
    if catalog.is_registered(contest.id, caller.user_id).await? {
        return Ok(());
    }
    Err(EligibilityError::NotRegistered {
        contest_id: contest.id,
    })
}

/// Check that `now` falls inside the contest window.
/// Admins bypass the check.
pub fn require_contest_active(
    caller: &Caller,
    contest: &ContestSpec,
    now: DateTime<Utc>,
) -> Result<(), EligibilityError> {
    if caller.is_admin() || contest.is_active_at(now) {
        return Ok(());
    }
    if now < contest.start_time {
        Err(EligibilityError::NotStarted)
    } else {
        Err(EligibilityError::Ended)
    }
}
