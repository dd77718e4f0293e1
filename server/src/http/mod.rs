//! HTTP surface of the service.

pub mod body;
pub mod errors;
pub mod files;

use axum::routing::get;
use axum::Router;
use dirstream_core::{DirectoryLister, ServerConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub lister: DirectoryLister,
    pub stream_buffer: usize,
    /// Parent of every listing's cancellation token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: &ServerConfig, shutdown: CancellationToken) -> Self {
        Self {
            lister: DirectoryLister::new(&config.root_dir),
            stream_buffer: config.stream_buffer,
            shutdown,
        }
    }
}

/// Build the API router. `/api/files/v1` is kept as an alias of
/// `/api/files` for older clients.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/files", get(files::list_files))
        .route("/api/files/v1", get(files::list_files))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until `shutdown` is cancelled.
pub async fn serve(config: &ServerConfig, shutdown: CancellationToken) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("API running on http://{}", listener.local_addr()?);
    info!("Root directory: {}", config.root_dir.display());

    let state = AppState::new(config, shutdown.clone());
    serve_on(listener, state).await
}

/// Serve the API on an already bound listener.
///
/// Cancelling the state's shutdown token stops accepting connections and
/// cancels every listing still in flight.
pub async fn serve_on(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let shutdown = state.shutdown.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("Server stopped");
    Ok(())
}
