//! # HTTP Front End
//!
//! Accepts print jobs over HTTP and queues them for the spooler thread.
//!
//! ## Routes
//!
//! | Method | Path | Body | |
//! |--------|------|------|-|
//! | GET | `/` | - | Liveness check, empty 200 |
//! | POST | `/print` | `{"format": "tag", "body": "..."}` | Text job |
//! | POST | `/print-image` | multipart, field `file` | Image upload |
//! | POST | `/print-image-url` | `{"url": "..."}` | Image fetched by the server |
//!
//! Every accepted job answers `OK`. Bad input is a 400; a full queue or a
//! stopped spooler is a 503. CORS is open so browser pages can post jobs.
//!
//! ## Usage
//!
//! ```bash
//! thermald serve --listen 0.0.0.0:8080 --device /dev/serial0
//! curl -X POST localhost:8080/print -H 'content-type: application/json' \
//!      -d '{"format": "markdown", "body": "# Hello"}'
//! ```

mod handlers;
mod state;

pub use state::{AppState, DEFAULT_LISTEN_ADDR, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::mpsc::SyncSender;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{Result, ThermalError};
use crate::spooler::Ticket;

/// Upload limit for `/print-image`.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Build the router around a job queue.
pub fn router(jobs: SyncSender<Ticket>) -> Router {
    let app_state = Arc::new(AppState::new(jobs));

    Router::new()
        .route("/", get(handlers::print::index))
        .route("/print", post(handlers::print::print))
        .route(
            "/print-image",
            post(handlers::photo::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/print-image-url", post(handlers::photo::from_url))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Serve until the listener fails.
///
/// ## Example
///
/// ```no_run
/// use std::sync::mpsc;
/// use thermald::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), thermald::ThermalError> {
/// let (jobs, _queue) = mpsc::sync_channel(thermald::spooler::QUEUE_CAPACITY);
/// serve(ServerConfig::default(), jobs).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, jobs: SyncSender<Ticket>) -> Result<()> {
    let app = router(jobs);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            ThermalError::Config(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;
    tracing::info!(listen_addr = %config.listen_addr, "HTTP server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
