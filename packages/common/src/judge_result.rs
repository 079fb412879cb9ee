use crate::SubmissionStatus;
use serde::{Deserialize, Serialize};

/// Engine status ids at or above this value are final.
pub const FINISHED_STATUS_ID: i32 = 3;

/// Per-test outcome reported by the execution engine, decoded once at the
/// client boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngineVerdict {
    InQueue,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    CompilationError,
    /// Signals, non-zero exit codes and other crashes of the program.
    RuntimeError,
    /// The engine itself failed while running the job.
    InternalError,
    ExecFormatError,
    /// A status id this service does not know about.
    Unknown,
}

impl EngineVerdict {
    /// Decode an engine `status.id` / `status.description` pair.
    ///
    /// Engines without a dedicated memory-limit id report it through the
    /// description, so that takes precedence over the id.
    pub fn from_engine(id: i32, description: &str) -> Self {
        if description.trim().eq_ignore_ascii_case("memory limit exceeded") {
            return Self::MemoryLimitExceeded;
        }
        match id {
            1 => Self::InQueue,
            2 => Self::Processing,
            3 => Self::Accepted,
            4 => Self::WrongAnswer,
            5 => Self::TimeLimitExceeded,
            6 => Self::CompilationError,
            7..=12 => Self::RuntimeError,
            13 => Self::InternalError,
            14 => Self::ExecFormatError,
            _ => Self::Unknown,
        }
    }

    /// Failures that make the whole submission a `runtime_error`.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RuntimeError | Self::InternalError | Self::ExecFormatError | Self::Unknown
        )
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Engine status as stored on a test result: the raw pair plus its decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TestStatus {
    /// Engine status id.
    #[schema(example = 3)]
    pub id: i32,
    /// Engine status description.
    #[schema(example = "Accepted")]
    pub description: String,
    pub verdict: EngineVerdict,
}

impl TestStatus {
    pub fn new(id: i32, description: impl Into<String>) -> Self {
        let description = description.into();
        let verdict = EngineVerdict::from_engine(id, &description);
        Self {
            id,
            description,
            verdict,
        }
    }
}

/// Result for a single test case. Stored in test-case order, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TestResult {
    pub passed: bool,
    pub status: TestStatus,
    /// Time used in milliseconds (0 when the engine reported none).
    #[schema(example = 12)]
    pub runtime_ms: i32,
    /// Memory used in kilobytes (0 when the engine reported none).
    #[schema(example = 3280)]
    pub memory_kb: i32,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    /// Engine message for failed runs (e.g. "Exited with error status 1").
    pub error: Option<String>,
}

/// Aggregated outcome of one judged batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Always a terminal status.
    pub status: SubmissionStatus,
    pub score: i32,
    pub passed_count: usize,
    pub total: usize,
    /// Mean time across test cases in milliseconds.
    pub execution_time_ms: i32,
    /// Mean memory across test cases in kilobytes.
    pub memory_used_kb: i32,
    pub test_results: Vec<TestResult>,
}

impl Verdict {
    /// Human-readable comment stored alongside the verdict.
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} test cases passed",
            self.status, self.passed_count, self.total
        )
    }
}
