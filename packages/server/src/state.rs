use std::sync::Arc;

use engine::{ExecutionClient, SandboxLimits};

use crate::config::AppConfig;
use crate::judge::JudgePipeline;
use crate::lifecycle::SubmissionLifecycle;
use crate::store::{MemoryStore, ProblemCatalog, SubmissionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub catalog: Arc<dyn ProblemCatalog>,
    /// Scored submissions, persisted in the database.
    pub submissions: SubmissionLifecycle,
    /// Ephemeral runs, kept in process memory only.
    pub runs: SubmissionLifecycle,
    /// Backing store of `runs`, pruned by the sweeper.
    pub run_store: Arc<MemoryStore>,
    pub pipeline: Arc<JudgePipeline>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        catalog: Arc<dyn ProblemCatalog>,
        submission_store: Arc<dyn SubmissionStore>,
        client: Arc<dyn ExecutionClient>,
    ) -> Self {
        let pipeline = JudgePipeline::new(
            client,
            config.judging.poll_policy(),
            SandboxLimits {
                max_processes: config.engine.max_processes,
            },
        );

        let run_store = Arc::new(MemoryStore::new());

        Self {
            catalog,
            submissions: SubmissionLifecycle::new(submission_store),
            runs: SubmissionLifecycle::new(run_store.clone()),
            run_store,
            pipeline: Arc::new(pipeline),
            config,
        }
    }
}
