//! Turns a judge job into the engine's batch wire format.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common::judge_job::JudgeJob;

use crate::models::BatchJob;

/// Wall-clock limit as a multiple of the CPU limit, so that programs blocked
/// on I/O are still stopped.
const WALL_TIME_FACTOR: f64 = 2.0;

/// Sandbox restrictions applied to every job in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxLimits {
    pub max_processes: u32,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self { max_processes: 60 }
    }
}

/// Base64 of the raw UTF-8 bytes, so control characters and multi-byte text
/// survive the JSON transport untouched.
pub fn encode_text(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode an engine text field. Returns the input unchanged when it is not
/// valid base64, since some deployments ignore `base64_encoded` for
/// diagnostic fields. Invalid UTF-8 in program output is replaced, not kept
/// encoded.
pub fn decode_text(encoded: &str) -> String {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    match STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => encoded.to_string(),
    }
}

fn format_seconds(secs: f64) -> String {
    format!("{secs}")
}

/// Build one job descriptor per test case, in test-case order.
pub fn encode_batch(job: &JudgeJob, sandbox: SandboxLimits) -> Vec<BatchJob> {
    let source_code = encode_text(&job.source_code);
    let cpu_secs = job.time_limit_secs();
    let cpu_time_limit = format_seconds(cpu_secs);
    let wall_time_limit = format_seconds(cpu_secs * WALL_TIME_FACTOR);
    let memory_limit = job.memory_limit_kb.to_string();

    job.test_cases
        .iter()
        .map(|tc| BatchJob {
            source_code: source_code.clone(),
            language_id: job.language_id,
            stdin: encode_text(&tc.input),
            expected_output: encode_text(&tc.expected_output),
            cpu_time_limit: cpu_time_limit.clone(),
            wall_time_limit: wall_time_limit.clone(),
            memory_limit: memory_limit.clone(),
            enable_network: false,
            max_processes_and_or_threads: sandbox.max_processes,
            enable_per_process_and_thread_time_limit: true,
            enable_per_process_and_thread_memory_limit: true,
        })
        .collect()
}
