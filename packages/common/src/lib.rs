pub mod config;
pub mod judge_job;
pub mod judge_result;
pub mod poll;
pub mod submission_status;

pub use judge_result::{EngineVerdict, TestResult, TestStatus, Verdict};
pub use submission_status::SubmissionStatus;
