//! Scripted execution engine for pipeline tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use engine::error::Result;
use engine::models::{EngineStatus, Measurement};
use engine::{BatchJob, EngineError, EngineSubmission, ExecutionClient};

/// What one poll tick returns.
#[derive(Clone, Debug)]
pub enum Tick {
    /// Every job still queued.
    Running,
    /// The request fails.
    Fail,
    /// Jobs finished with these `(status id, description)` pairs, by position.
    Done(Vec<(i32, &'static str)>),
    /// Like `Done`, but the engine lists the jobs in reverse order.
    Reversed(Vec<(i32, &'static str)>),
}

pub struct FakeEngine {
    script: Mutex<VecDeque<Tick>>,
    last: Mutex<Tick>,
    reject_submit: bool,
    jobs: Mutex<Vec<BatchJob>>,
    pub submit_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl FakeEngine {
    /// Ticks are consumed in order; the last one repeats forever.
    pub fn new(script: Vec<Tick>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(Tick::Running),
            reject_submit: false,
            jobs: Mutex::new(Vec::new()),
            submit_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting_submissions() -> Self {
        Self {
            reject_submit: true,
            ..Self::new(vec![])
        }
    }

    pub fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn next_tick(&self) -> Tick {
        let mut last = self.last.lock().unwrap();
        if let Some(tick) = self.script.lock().unwrap().pop_front() {
            *last = tick;
        }
        last.clone()
    }

    fn finished(&self, tokens: &[String], statuses: &[(i32, &str)]) -> Vec<EngineSubmission> {
        let jobs = self.jobs.lock().unwrap();
        tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                let (id, description) = statuses.get(i).copied().unwrap_or((3, "Accepted"));
                EngineSubmission {
                    token: Some(token.clone()),
                    status: EngineStatus {
                        id,
                        description: description.into(),
                    },
                    time: Some(Measurement::Text("0.050".into())),
                    memory: Some(Measurement::Number(1000.0)),
                    // Echo the job's stdin so tests can check which result
                    // belongs to which test case.
                    stdout: jobs.get(i).map(|j| j.stdin.clone()),
                    stderr: None,
                    compile_output: None,
                    message: None,
                }
            })
            .collect()
    }
}

#[async_trait]
impl ExecutionClient for FakeEngine {
    async fn submit_batch(&self, jobs: &[BatchJob]) -> Result<Vec<String>> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_submit {
            return Err(EngineError::Status {
                status: 503,
                body: "engine unavailable".into(),
            });
        }
        *self.jobs.lock().unwrap() = jobs.to_vec();
        Ok((0..jobs.len()).map(|i| format!("tok-{i}")).collect())
    }

    async fn fetch_batch(&self, tokens: &[String]) -> Result<Vec<EngineSubmission>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match self.next_tick() {
            Tick::Running => Ok(tokens
                .iter()
                .map(|token| EngineSubmission {
                    token: Some(token.clone()),
                    status: EngineStatus {
                        id: 1,
                        description: "In Queue".into(),
                    },
                    time: None,
                    memory: None,
                    stdout: None,
                    stderr: None,
                    compile_output: None,
                    message: None,
                })
                .collect()),
            Tick::Fail => Err(EngineError::Status {
                status: 502,
                body: "bad gateway".into(),
            }),
            Tick::Done(statuses) => Ok(self.finished(tokens, &statuses)),
            Tick::Reversed(statuses) => {
                let mut results = self.finished(tokens, &statuses);
                results.reverse();
                Ok(results)
            }
        }
    }
}
