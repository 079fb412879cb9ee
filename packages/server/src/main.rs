use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use engine::HttpExecutionClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::state::AppState;
use server::store::DbStore;
use server::sweeper::run_stuck_submission_sweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    let store = Arc::new(DbStore::new(db));

    let client = HttpExecutionClient::new(config.engine.clone())
        .context("Failed to build execution engine client")?;
    info!(engine = %config.engine.base_url, "Execution engine configured");

    let state = AppState::new(config.clone(), store.clone(), store, Arc::new(client));

    let lifecycles = vec![state.submissions.clone(), state.runs.clone()];
    tokio::spawn(run_stuck_submission_sweeper(
        lifecycles,
        state.run_store.clone(),
        config.sweeper.clone(),
    ));

    let app = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
