mod auth;
mod config;
mod dispatch;
mod errors;
mod extract;
mod forms;
mod generation;
mod llm_client;
mod models;
mod prompt;
mod routes;
mod state;
mod store;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::extract::PdfTextExtractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgContentStore;

#[tokio::main]
async fn main() -> Result<()> {
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

    info!("Starting Chalk API v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(
        PgContentStore::connect(&config.database_url, config.database_max_connections).await?,
    );

    let llm = Arc::new(LlmClient::new(&config));
    info!("LLM client initialized (model: {})", llm.model());

    let (dispatcher, worker) = Dispatcher::spawn(
        store.clone(),
        llm.clone(),
        config.dispatch_queue_capacity,
        config.dispatch_concurrency,
    );
    info!(
        "Follow-up dispatcher started (queue: {}, concurrency: {})",
        config.dispatch_queue_capacity, config.dispatch_concurrency
    );

    let state = AppState {
        store,
        llm,
        dispatcher,
        extractor: Arc::new(PdfTextExtractor),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last dispatcher handle; the worker now drains what is queued.
    info!("Draining follow-up jobs");
    if let Err(e) = worker.await {
        warn!("Dispatcher worker ended abnormally: {e}");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
