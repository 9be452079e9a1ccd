//! HTTP surface over the catalog.
//!
//! Every handler receives the store through [`AppState`]; nothing is global.

pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use crate::config::ServerConfig;
use crate::db::DbPool;

/// Shared application state, cheap to clone into each handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    /// CSV source re-read by `POST /convert`.
    pub csv_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(pool: DbPool, config: ServerConfig, csv_path: PathBuf) -> Self {
        AppState {
            pool,
            config: Arc::new(config),
            csv_path: Arc::new(csv_path),
        }
    }
}

/// Build the full application [`Router`] with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/api", get(handlers::api_root))
        .route("/search", get(handlers::search))
        .route("/drama/{id}", get(handlers::get_drama))
        .route("/stats", get(handlers::stats))
        .route("/convert", post(handlers::convert))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CatchPanicLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind, serve until Ctrl-C, then close the pool.
pub async fn serve(state: AppState) -> Result<()> {
    let host = state.config.host.clone();
    let port = state.config.port;
    let pool = state.pool.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    let addr: SocketAddr = listener.local_addr()?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
