#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a submission during the judging lifecycle.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Accepted at intake, not yet dispatched.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    /// Dispatched to the execution engine, waiting for results.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "judging"))]
    Judging,
    /// All test cases passed.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "accepted"))]
    Accepted,
    /// At least one test case produced the wrong output.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "wrong_answer"))]
    WrongAnswer,
    /// Exceeded time limit.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "time_limit_exceeded"))]
    TimeLimitExceeded,
    /// Exceeded memory limit.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "memory_limit_exceeded"))]
    MemoryLimitExceeded,
    /// Failed to compile.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "compilation_error"))]
    CompilationError,
    /// Program crashed, the engine failed internally, or judging could not finish.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "runtime_error"))]
    RuntimeError,
}

impl SubmissionStatus {
    /// Returns true if this is a final verdict (no automatic transition follows).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Judging)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// `Pending` may only fail straight to `RuntimeError` (misconfigured
    /// problem or an interrupted intake); every other verdict requires a
    /// dispatch first. Terminal states never move.
    pub fn can_transition_to(&self, next: SubmissionStatus) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Judging | Self::RuntimeError),
            Self::Judging => next.is_terminal(),
            _ => false,
        }
    }

    /// Returns the string representation (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Judging => "judging",
            Self::Accepted => "accepted",
            Self::WrongAnswer => "wrong_answer",
            Self::TimeLimitExceeded => "time_limit_exceeded",
            Self::MemoryLimitExceeded => "memory_limit_exceeded",
            Self::CompilationError => "compilation_error",
            Self::RuntimeError => "runtime_error",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
