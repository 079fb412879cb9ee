use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::extractors::caller::Caller;
use crate::store::{ProblemCatalog, ProblemSpec, StoreError};

use super::contest::{check_contest_registration, require_contest_active};

#[derive(Debug, Error)]
pub enum EligibilityError {
    #[error("Problem {0} not found")]
    ProblemNotFound(i32),

    #[error("Contest {0} not found")]
    ContestNotFound(i32),

    #[error("Not registered for contest {contest_id}")]
    NotRegistered { contest_id: i32 },

    #[error("Contest has not started yet")]
    NotStarted,

    #[error("Contest has ended")]
    Ended,

    #[error("Problem {problem_id} is not part of contest {contest_id}")]
    ProblemNotInContest { contest_id: i32, problem_id: i32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Decide whether `caller` may submit to `problem_id` (optionally inside
/// `contest_id`) at `now`. Returns the problem on success.
///
/// Runs before any record exists; a rejection leaves nothing behind.
pub async fn check_eligibility(
    catalog: &dyn ProblemCatalog,
    caller: &Caller,
    problem_id: i32,
    contest_id: Option<i32>,
    now: DateTime<Utc>,
) -> Result<ProblemSpec, EligibilityError> {
    let problem = catalog
        .find_problem(problem_id)
        .await?
        .ok_or(EligibilityError::ProblemNotFound(problem_id))?;

    let Some(contest_id) = contest_id else {
        return Ok(problem);
    };

    let contest = catalog
        .find_contest(contest_id)
        .await?
        .ok_or(EligibilityError::ContestNotFound(contest_id))?;

    check_contest_registration(catalog, caller, &contest).await?;
    require_contest_active(caller, &contest, now)?;

    if !catalog.is_problem_in_contest(contest_id, problem_id).await? {
        return Err(EligibilityError::ProblemNotInContest {
            contest_id,
            problem_id,
        });
    }

    Ok(problem)
}
