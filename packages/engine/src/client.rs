use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::{BatchJob, BatchStatusResponse, EngineSubmission, SubmitBatchRequest, parse_tokens};

/// Fields requested on every status poll.
const STATUS_FIELDS: &str = "token,status,time,memory,stdout,stderr,compile_output,message";

/// The two calls the judging pipeline makes against the execution engine.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Submit one job per test case; returns the engine tokens in job order.
    async fn submit_batch(&self, jobs: &[BatchJob]) -> Result<Vec<String>>;

    /// Fetch the current status of every token.
    async fn fetch_batch(&self, tokens: &[String]) -> Result<Vec<EngineSubmission>>;
}

/// HTTP client for a Judge0-compatible engine.
pub struct HttpExecutionClient {
    http: reqwest::Client,
    config: EngineConfig,
}

impl HttpExecutionClient {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { http, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.config.endpoint(path));
        match &self.config.auth_token {
            Some(token) => builder.header(self.config.auth_header.as_str(), token),
            None => builder,
        }
    }

    async fn read_json(response: Response) -> Result<serde_json::Value> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| EngineError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl ExecutionClient for HttpExecutionClient {
    #[instrument(skip(self, jobs), fields(jobs = jobs.len()))]
    async fn submit_batch(&self, jobs: &[BatchJob]) -> Result<Vec<String>> {
        let response = self
            .request(Method::POST, "/submissions/batch")
            .query(&[("base64_encoded", "true")])
            .json(&SubmitBatchRequest { submissions: jobs })
            .send()
            .await?;

        let tokens = parse_tokens(Self::read_json(response).await?)?;
        if tokens.len() != jobs.len() {
            return Err(EngineError::TokenCountMismatch {
                expected: jobs.len(),
                actual: tokens.len(),
            });
        }

        debug!(tokens = tokens.len(), "Batch accepted by engine");
        Ok(tokens)
    }

    #[instrument(skip(self, tokens), fields(tokens = tokens.len()))]
    async fn fetch_batch(&self, tokens: &[String]) -> Result<Vec<EngineSubmission>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let joined = tokens.join(",");
        let response = self
            .request(Method::GET, "/submissions/batch")
            .query(&[
                ("tokens", joined.as_str()),
                ("base64_encoded", "true"),
                ("fields", STATUS_FIELDS),
            ])
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        let statuses: BatchStatusResponse = serde_json::from_value(body)
            .map_err(|e| EngineError::MalformedResponse(e.to_string()))?;
        Ok(statuses.into_submissions())
    }
}
