mod config;
mod error;
mod logs;
mod metrics;
mod spip;
mod state;

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    config::{ConsoleConfig, LogFormat, LogOutput},
    spip::SpipConfig,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Phase 1: thread-local subscriber so config loading can log
    let _basic_tracing = init_tracing_basic();

    info!("Starting SPIP log console v{}", env!("CARGO_PKG_VERSION"));

    let config = ConsoleConfig::load()
        .context("Failed to load configuration")?;

    config.validate()
        .context("Configuration validation failed")?;

    // Phase 2: global subscriber from config
    drop(_basic_tracing);
    init_tracing_from_config(&config)?;

    info!("Configuration loaded successfully");

    // Missing log directories make every viewer request meaningless, fail now.
    let spip = SpipConfig::load(&config.spip.config_file)
        .with_context(|| format!("Failed to load SPIP config from {}", config.spip.config_file))?;

    let topology = spip.topology();
    info!(
        config_file = %config.spip.config_file,
        server_logs = topology.server_logs.len(),
        client_logs = topology.client_logs.len(),
        streams = topology.streams.len(),
        "SPIP configuration loaded"
    );

    let state = AppState::new(config.clone(), spip);
    let app = build_router(state);

    let addr: SocketAddr = config.server.bind_address
        .parse()
        .context("Invalid bind address")?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("  - Log selection: http://{}/logs", addr);
    info!("  - Log viewer: http://{}/logs/viewer", addr);
    info!("  - Health check: http://{}/health", addr);
    info!("Listening on: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

/// Build the application router
pub(crate) fn build_router(state: AppState) -> Router {
    let cors = if state.config.server.enable_cors {
        let origins = state.config.server.cors_origins
            .iter()
            .filter_map(|s| s.parse::<axum::http::HeaderValue>().ok())
            .collect::<Vec<_>>();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
    };

    // Bounds the time to the first byte; a viewer body ends on its own
    // once its round budget is spent.
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(logs::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
                // Only GETs are served
                .layer(DefaultBodyLimit::max(64 * 1024))
                .layer(cors)
        )
        .with_state(state)
}

/// Root handler - shows service info and the pipeline topology
async fn root_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "SPIP Log Console",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "logs": "/logs",
            "viewer": "/logs/viewer",
            "health": "/health",
            "metrics": "/metrics"
        },
        "topology": state.spip.topology()
    }))
}

/// Health check handler - the log directories must be reachable
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let server_dir = state.spip.server_log_dir();
    let client_dir = state.spip.client_log_dir();
    let server_ok = Path::new(server_dir).is_dir();
    let client_ok = Path::new(client_dir).is_dir();

    let is_healthy = server_ok && client_ok;
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(json!({
            "status": if is_healthy { "healthy" } else { "unhealthy" },
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "uptime_secs": state.started_at.elapsed().as_secs(),
            "log_dirs": {
                "server": { "path": server_dir, "ok": server_ok },
                "client": { "path": client_dir, "ok": client_ok }
            }
        })),
    )
}

/// Metrics endpoint
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = &state.metrics;

    Json(json!({
        "sessions": {
            "active": metrics.active_count(),
            "total": metrics.total_sessions(),
            "unavailable": metrics.unavailable_count(),
            "by_log": metrics.sessions_by_log()
        },
        "lines": {
            "emitted": metrics.total_lines()
        }
    }))
}

/// Phase 1: Basic tracing init so we can log during config loading.
/// Uses RUST_LOG env var or a sensible default.
fn init_tracing_basic() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,console=debug"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// Phase 2: Install the global subscriber described by the config.
fn init_tracing_from_config(config: &ConsoleConfig) -> Result<()> {
    use std::sync::Arc;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let file = match &config.logging.output {
        LogOutput::Stdout => None,
        LogOutput::File { path } => Some(Arc::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path))?,
        )),
    };

    match (&config.logging.format, file) {
        (LogFormat::Json, None) => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Json, Some(file)) => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(file);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Pretty, None) => {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Pretty, Some(file)) => {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(file);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
