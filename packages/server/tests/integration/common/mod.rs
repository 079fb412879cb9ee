use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Duration as ChronoDuration, Utc};
use common::config::JudgingConfig;
use dashmap::DashMap;
use engine::{EngineConfig, HttpExecutionClient, decode_text};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use server::config::{
    AppConfig, CorsConfig, DatabaseConfig, ServerConfig, SubmissionConfig, SweeperConfig,
};
use server::state::AppState;
use server::store::{ContestSpec, MemoryCatalog, MemoryStore, ProblemSpec, RawTestCase};

/// Seeded catalog ids.
pub mod seed {
    /// Three well-formed test cases, 100 points.
    pub const PROBLEM: i32 = 1;
    /// Second test case has no expected output.
    pub const BROKEN_PROBLEM: i32 = 2;
    /// Assigned to every seeded contest.
    pub const CONTEST_PROBLEM: i32 = 3;

    /// Running, requires registration; `REGISTERED_USER` is registered.
    pub const OPEN_CONTEST: i32 = 10;
    /// Running, no registration needed.
    pub const PUBLIC_CONTEST: i32 = 11;
    /// Finished yesterday.
    pub const ENDED_CONTEST: i32 = 12;
    /// Starts tomorrow.
    pub const UPCOMING_CONTEST: i32 = 13;

    pub const REGISTERED_USER: i32 = 7;

    pub const RATE_LIMIT: u32 = 3;
}

pub mod routes {
    pub const HEALTH: &str = "/api/v1/health";
    pub const SUBMISSIONS: &str = "/api/v1/submissions";
    pub const RUNS: &str = "/api/v1/runs";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn submission(id: i32) -> String {
        format!("/api/v1/submissions/{id}")
    }

    pub fn run(id: i32) -> String {
        format!("/api/v1/runs/{id}")
    }
}

/// Source markers understood by the fake engine.
pub mod programs {
    pub const ACCEPTED: &str = "print(input())";
    pub const WRONG: &str = "print('wrong')";
    pub const CRASH: &str = "raise crash";
    pub const HANG: &str = "while True: hang";
}

/// Judge0 stand-in: accepts batches and reports every job finished.
///
/// The verdict is picked from the decoded source code: `wrong` fails every
/// test, `crash` is a runtime error, `hang` stays in the queue forever and
/// anything else is accepted with stdout echoing stdin.
#[derive(Default)]
struct FakeEngine {
    jobs: DashMap<String, Value>,
    next_token: AtomicU32,
}

#[derive(Deserialize)]
struct BatchQuery {
    tokens: String,
}

async fn submit_batch(
    State(engine): State<Arc<FakeEngine>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let jobs = body["submissions"].as_array().cloned().unwrap_or_default();
    let tokens: Vec<Value> = jobs
        .into_iter()
        .map(|job| {
            let token = format!("tok-{}", engine.next_token.fetch_add(1, Ordering::SeqCst));
            engine.jobs.insert(token.clone(), job);
            json!({ "token": token })
        })
        .collect();
    (StatusCode::CREATED, Json(Value::Array(tokens)))
}

async fn fetch_batch(
    State(engine): State<Arc<FakeEngine>>,
    Query(query): Query<BatchQuery>,
) -> Json<Value> {
    let submissions: Vec<Value> = query
        .tokens
        .split(',')
        .map(|token| {
            let Some(job) = engine.jobs.get(token) else {
                return json!({ "token": token, "status": { "id": 2, "description": "Processing" } });
            };
            let source = decode_text(job["source_code"].as_str().unwrap_or_default());
            let (id, description) = if source.contains("hang") {
                (2, "Processing")
            } else if source.contains("wrong") {
                (4, "Wrong Answer")
            } else if source.contains("crash") {
                (11, "Runtime Error (NZEC)")
            } else {
                (3, "Accepted")
            };
            json!({
                "token": token,
                "status": { "id": id, "description": description },
                "time": "0.010",
                "memory": 2048,
                "stdout": job["stdin"],
                "stderr": null,
                "compile_output": null,
                "message": null,
            })
        })
        .collect();
    Json(json!({ "submissions": submissions }))
}

async fn spawn_engine() -> SocketAddr {
    let router = Router::new()
        .route("/submissions/batch", post(submit_batch).get(fetch_batch))
        .with_state(Arc::new(FakeEngine::default()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake engine");
    let addr = listener.local_addr().expect("Failed to get fake engine address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Fake engine failed");
    });
    addr
}

fn test_case(input: &str, expected: &str) -> RawTestCase {
    RawTestCase {
        input: Some(input.into()),
        expected_output: Some(expected.into()),
    }
}

fn seed_catalog() -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    catalog.insert_problem(ProblemSpec {
        id: seed::PROBLEM,
        points: 100,
        time_limit_ms: 1000,
        memory_limit_kb: 262_144,
        test_cases: vec![test_case("1", "1"), test_case("2", "2"), test_case("3", "3")],
    });
    catalog.insert_problem(ProblemSpec {
        id: seed::BROKEN_PROBLEM,
        points: 100,
        time_limit_ms: 1000,
        memory_limit_kb: 262_144,
        test_cases: vec![
            test_case("1", "1"),
            RawTestCase {
                input: Some("2".into()),
                expected_output: None,
            },
        ],
    });
    catalog.insert_problem(ProblemSpec {
        id: seed::CONTEST_PROBLEM,
        points: 50,
        time_limit_ms: 2000,
        memory_limit_kb: 131_072,
        test_cases: vec![test_case("a", "a")],
    });

    let now = Utc::now();
    let day = ChronoDuration::days(1);
    let contests = [
        (seed::OPEN_CONTEST, now - day, now + day, true),
        (seed::PUBLIC_CONTEST, now - day, now + day, false),
        (seed::ENDED_CONTEST, now - day * 2, now - day, false),
        (seed::UPCOMING_CONTEST, now + day, now + day * 2, false),
    ];
    for (id, start_time, end_time, requires_registration) in contests {
        catalog.insert_contest(ContestSpec {
            id,
            start_time,
            end_time,
            requires_registration,
        });
        catalog.assign(id, seed::CONTEST_PROBLEM);
    }
    catalog.register(seed::OPEN_CONTEST, seed::REGISTERED_USER);
    catalog
}

fn test_config(engine_addr: SocketAddr) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec!["http://localhost:3000".into()],
                max_age: 60,
            },
        },
        database: DatabaseConfig {
            url: "postgres://unused".into(),
        },
        engine: EngineConfig {
            base_url: format!("http://{engine_addr}"),
            request_timeout_ms: 2_000,
            ..EngineConfig::default()
        },
        judging: JudgingConfig {
            max_poll_attempts: 5,
            poll_interval_ms: 20,
        },
        submission: SubmissionConfig {
            max_size: 1024,
            rate_limit_per_minute: seed::RATE_LIMIT,
        },
        sweeper: SweeperConfig {
            enabled: false,
            ..SweeperConfig::default()
        },
    }
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
    pub retry_after: Option<String>,
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let retry_after = res
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            text,
            body,
            retry_after,
        }
    }

    pub fn submission_id(&self) -> i32 {
        self.body["submission_id"]
            .as_i64()
            .expect("response body should contain 'submission_id'") as i32
    }

    pub fn run_id(&self) -> i32 {
        self.body["run_id"]
            .as_i64()
            .expect("response body should contain 'run_id'") as i32
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    /// Spawn the server against an in-memory store, a seeded catalog and a
    /// fake engine, each on its own ephemeral port.
    pub async fn spawn() -> Self {
        let engine_addr = spawn_engine().await;
        let config = test_config(engine_addr);

        let client = HttpExecutionClient::new(config.engine.clone())
            .expect("Failed to build engine client");
        let state = AppState::new(
            config,
            Arc::new(seed_catalog()),
            Arc::new(MemoryStore::new()),
            Arc::new(client),
        );
        let router = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });

        Self {
            addr,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_as(&self, path: &str, body: &Value, user_id: i32) -> TestResponse {
        self.post_with_role(path, body, user_id, "user").await
    }

    pub async fn post_with_role(
        &self,
        path: &str,
        body: &Value,
        user_id: i32,
        role: &str,
    ) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("X-User-Id", user_id.to_string())
            .header("X-User-Role", role)
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn post_anonymous(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn get_as(&self, path: &str, user_id: i32) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("X-User-Id", user_id.to_string())
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn get_anonymous(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    /// Poll `path` until the record leaves `pending`/`judging`.
    pub async fn wait_for_verdict(&self, path: &str, user_id: i32) -> TestResponse {
        for _ in 0..250 {
            let res = self.get_as(path, user_id).await;
            assert_eq!(res.status, 200, "polling {path} failed: {}", res.text);
            match res.body["status"].as_str() {
                Some("pending") | Some("judging") => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                _ => return res,
            }
        }
        panic!("{path} never reached a terminal status");
    }

    /// Submit `source` for `problem_id` and return the new submission id.
    pub async fn submit(&self, user_id: i32, problem_id: i32, source: &str) -> i32 {
        let res = self
            .post_as(
                routes::SUBMISSIONS,
                &submission_body(problem_id, None, source),
                user_id,
            )
            .await;
        assert_eq!(res.status, 201, "submit failed: {}", res.text);
        res.submission_id()
    }
}

pub fn submission_body(problem_id: i32, contest_id: Option<i32>, source: &str) -> Value {
    json!({
        "problem_id": problem_id,
        "contest_id": contest_id,
        "source_code": source,
        "language_id": 71,
    })
}
