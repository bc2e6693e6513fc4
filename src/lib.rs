pub mod api;
pub mod calendar;
pub mod config;
pub mod db;
pub mod errors;
pub mod journal;
pub mod lifecycle;
pub mod models;
pub mod registry;
pub mod rotation;
pub mod validators;
pub mod views;

use crate::config::AppConfig;
use crate::journal::JournalCore;
use axum::extract::Request;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<JournalCore>,
}

pub fn build_router(core: Arc<JournalCore>) -> Router {
    Router::new()
        .merge(api::routes())
        .merge(views::routes())
        .with_state(AppState { core })
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                request_id = %uuid::Uuid::new_v4(),
                method = %request.method(),
                path = %request.uri().path(),
            )
        }))
}

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.log_dir)?;

    let core = JournalCore::open(&config)?;
    tracing::info!(
        database = %config.database_path.display(),
        types = %config.types_path.display(),
        "journal opened"
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, build_router(core))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn init_tracing(log_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "journal.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| anyhow::anyhow!(error))
}
