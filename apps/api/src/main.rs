mod analysis;
mod config;
mod db;
mod errors;
mod feed;
mod llm_client;
mod models;
mod profiles;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::pipeline::Analyzer;
use crate::config::Config;
use crate::db::create_pool;
use crate::feed::ChangeFeed;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{PgJobStore, PgProfileStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let jobs = Arc::new(PgJobStore::new(db.clone()));
    let profiles = Arc::new(PgProfileStore::new(db));

    // Initialize inference client
    let inference = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_api_base.clone(),
        Duration::from_secs(config.inference_timeout_secs),
    )?);
    info!("Inference client initialized (model: {})", config.gemini_model);

    let feed = ChangeFeed::default();
    let analyzer = Analyzer::new(inference, jobs.clone(), feed.clone());

    let state = AppState {
        jobs,
        profiles,
        analyzer,
        feed,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
