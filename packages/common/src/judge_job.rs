use serde::{Deserialize, Serialize};

/// A validated test case. Both fields are present; either may be empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseData {
    /// Input data to feed to the program
    pub input: String,
    /// Expected output for comparison
    pub expected_output: String,
}

/// Everything the judging pipeline needs for one submission.
///
/// Built at intake from the submission record and its problem, then handed to
/// the background task. Test cases keep the problem's order; result `i`
/// always belongs to test case `i`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JudgeJob {
    /// ID of the submission being judged
    pub submission_id: i32,
    /// Source code as submitted
    pub source_code: String,
    /// Engine language identifier
    pub language_id: i32,
    /// Time limit in milliseconds
    pub time_limit_ms: i32,
    /// Memory limit in kilobytes
    pub memory_limit_kb: i32,
    /// Points awarded for a fully accepted submission
    pub points: i32,
    /// Test cases to run, in problem order
    pub test_cases: Vec<TestCaseData>,
}

impl JudgeJob {
    /// Time limit in seconds, as the engine expects it.
    pub fn time_limit_secs(&self) -> f64 {
        f64::from(self.time_limit_ms) / 1000.0
    }
}
