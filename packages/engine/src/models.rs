use common::judge_result::FINISHED_STATUS_ID;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// One job descriptor in a batch submit request.
///
/// Text fields are base64-encoded; limits are strings because that is what
/// the engine's batch endpoint accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchJob {
    pub source_code: String,
    pub language_id: i32,
    pub stdin: String,
    pub expected_output: String,
    /// Seconds.
    pub cpu_time_limit: String,
    /// Seconds.
    pub wall_time_limit: String,
    /// Kilobytes.
    pub memory_limit: String,
    pub enable_network: bool,
    pub max_processes_and_or_threads: u32,
    pub enable_per_process_and_thread_time_limit: bool,
    pub enable_per_process_and_thread_memory_limit: bool,
}

/// Body of `POST /submissions/batch`.
#[derive(Debug, Serialize)]
pub struct SubmitBatchRequest<'a> {
    pub submissions: &'a [BatchJob],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineStatus {
    pub id: i32,
    pub description: String,
}

/// A numeric field that some deployments send as a string ("0.012").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Measurement {
    Number(f64),
    Text(String),
}

impl Measurement {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Measurement::Number(n) => *n,
            Measurement::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Status of one job as reported by `GET /submissions/batch`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineSubmission {
    #[serde(default)]
    pub token: Option<String>,
    pub status: EngineStatus,
    /// Seconds.
    #[serde(default)]
    pub time: Option<Measurement>,
    /// Kilobytes.
    #[serde(default)]
    pub memory: Option<Measurement>,
    /// Base64.
    #[serde(default)]
    pub stdout: Option<String>,
    /// Base64.
    #[serde(default)]
    pub stderr: Option<String>,
    /// Base64.
    #[serde(default)]
    pub compile_output: Option<String>,
    /// Base64.
    #[serde(default)]
    pub message: Option<String>,
}

impl EngineSubmission {
    /// The engine will not update this job any further.
    pub fn is_finished(&self) -> bool {
        self.status.id >= FINISHED_STATUS_ID
    }

    pub fn runtime_ms(&self) -> Option<i32> {
        self.time
            .as_ref()
            .and_then(Measurement::as_f64)
            .map(|secs| (secs * 1000.0).round() as i32)
    }

    pub fn memory_kb(&self) -> Option<i32> {
        self.memory
            .as_ref()
            .and_then(Measurement::as_f64)
            .map(|kb| kb.round() as i32)
    }
}

/// Batch status responses come in two shapes depending on the deployment.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BatchStatusResponse {
    Wrapped { submissions: Vec<EngineSubmission> },
    Bare(Vec<EngineSubmission>),
}

impl BatchStatusResponse {
    pub fn into_submissions(self) -> Vec<EngineSubmission> {
        match self {
            BatchStatusResponse::Wrapped { submissions } => submissions,
            BatchStatusResponse::Bare(submissions) => submissions,
        }
    }
}

/// Extract job tokens from a batch submit response.
///
/// The engine answers with one object per job; a job it rejected carries
/// validation errors instead of a `token`.
pub fn parse_tokens(body: serde_json::Value) -> Result<Vec<String>> {
    let serde_json::Value::Array(items) = body else {
        return Err(EngineError::MalformedResponse(
            "expected an array of job tokens".into(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            item.get("token")
                .and_then(|t| t.as_str())
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| {
                    EngineError::MalformedResponse(format!("job {index} has no token: {item}"))
                })
        })
        .collect()
}
