//! HTTP server for the summary relay.
//!
//! Provides REST endpoints for:
//! - Summaries of a set of pages (`POST /api/query`)
//! - Follow-up summaries with previous context (`POST /api/query_next`)

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiJson};
pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Build the full application: routes plus panic, CORS and trace layers.
pub fn build_app(state: Arc<AppState>, config: &ServerConfig) -> Router {
    // Credentialed CORS forbids wildcards, so methods and headers are mirrored.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.allowed_origins.iter().cloned()))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    create_router(state)
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with graceful shutdown support.
///
/// The server will stop accepting new connections when `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if the server fails to start.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    config: &ServerConfig,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(state, config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Summary relay listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}
