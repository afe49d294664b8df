mod bookmarks;
mod cli;
mod config;
mod db;
mod errors;
mod gateway;
mod models;
mod state;
mod workflow;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bookmarks::kv::{KeyValueStore, MemoryStore};
use crate::bookmarks::BookmarkStore;
use crate::config::Config;
use crate::db::{create_pool, SqliteStore};
use crate::gateway::{HttpGateway, RemoteGateway};
use crate::state::AppState;
use crate::workflow::pipeline::AnalysisPipeline;
use crate::workflow::WorkflowOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting ApplyEdge client v{}", env!("CARGO_PKG_VERSION"));

    // Saved jobs: SQLite on disk, or memory only when asked for
    let kv: Arc<dyn KeyValueStore> = if config.is_ephemeral() {
        info!("Ephemeral mode: saved jobs will not outlive this process");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::new(create_pool(&config.database_url).await?))
    };
    let bookmarks = Arc::new(BookmarkStore::load(kv).await);

    // Remote analysis service
    let gateway: Arc<dyn RemoteGateway> = Arc::new(HttpGateway::new(&config.api_url)?);
    info!("Gateway initialized ({})", config.api_url);

    let pipeline = AnalysisPipeline::new(Arc::clone(&gateway), config.timing());
    let orchestrator = WorkflowOrchestrator::new(gateway, pipeline, bookmarks);

    let state = AppState {
        config,
        orchestrator,
    };

    cli::run(state).await
}
