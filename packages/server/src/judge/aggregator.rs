use common::judge_result::{EngineVerdict, TestResult, TestStatus, Verdict};
use common::SubmissionStatus;
use engine::{EngineSubmission, decode_text};

/// Map per-test engine outcomes into one verdict.
///
/// `results` must be in test-case order. Deterministic for a given input.
pub fn aggregate(results: &[EngineSubmission], points: i32) -> Verdict {
    let test_results: Vec<TestResult> = results.iter().map(to_test_result).collect();
    let total = test_results.len();
    let passed_count = test_results.iter().filter(|r| r.passed).count();

    let verdicts: Vec<EngineVerdict> = test_results.iter().map(|r| r.status.verdict).collect();
    let status = overall_status(&verdicts);

    Verdict {
        status,
        score: score(passed_count, total, points),
        passed_count,
        total,
        execution_time_ms: mean(results.iter().map(EngineSubmission::runtime_ms)),
        memory_used_kb: mean(results.iter().map(EngineSubmission::memory_kb)),
        test_results,
    }
}

/// `round(passed / total * points)`, 0 for an empty batch.
pub fn score(passed: usize, total: usize, points: i32) -> i32 {
    if total == 0 {
        return 0;
    }
    (passed as f64 / total as f64 * f64::from(points)).round() as i32
}

/// First matching rule across the whole batch wins.
fn overall_status(verdicts: &[EngineVerdict]) -> SubmissionStatus {
    let any = |pred: fn(&EngineVerdict) -> bool| verdicts.iter().any(pred);

    if any(EngineVerdict::is_fatal) {
        SubmissionStatus::RuntimeError
    } else if any(|v| *v == EngineVerdict::CompilationError) {
        SubmissionStatus::CompilationError
    } else if any(|v| *v == EngineVerdict::TimeLimitExceeded) {
        SubmissionStatus::TimeLimitExceeded
    } else if any(|v| *v == EngineVerdict::MemoryLimitExceeded) {
        SubmissionStatus::MemoryLimitExceeded
    } else if !verdicts.is_empty() && verdicts.iter().all(EngineVerdict::is_accepted) {
        SubmissionStatus::Accepted
    } else {
        SubmissionStatus::WrongAnswer
    }
}

/// Mean of the reported values, ignoring jobs that reported none.
fn mean(values: impl Iterator<Item = Option<i32>>) -> i32 {
    let (sum, count) = values
        .flatten()
        .fold((0i64, 0i64), |(sum, count), v| (sum + i64::from(v), count + 1));
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as i32
}

fn to_test_result(job: &EngineSubmission) -> TestResult {
    let status = TestStatus::new(job.status.id, job.status.description.clone());
    let decode = |field: &Option<String>| field.as_deref().map(decode_text);

    TestResult {
        passed: status.verdict.is_accepted(),
        runtime_ms: job.runtime_ms().unwrap_or(0),
        memory_kb: job.memory_kb().unwrap_or(0),
        stdout: decode(&job.stdout),
        stderr: decode(&job.stderr),
        compile_output: decode(&job.compile_output),
        error: decode(&job.message),
        status,
    }
}
