//! Text printing handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::{HandlerError, enqueue};
use crate::markup::Markup;
use crate::server::state::AppState;
use crate::spooler::PrintJob;

fn default_format() -> String {
    Markup::default().name().to_string()
}

/// Body of `POST /print`.
#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    /// `plain`, `tag`, `markdown` or `bbcode`
    #[serde(default = "default_format")]
    pub format: String,
    pub body: String,
}

/// GET / - liveness check.
pub async fn index() -> &'static str {
    ""
}

/// POST /print - queue a text job.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PrintRequest>,
) -> Result<&'static str, HandlerError> {
    let format: Markup = request
        .format
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "Bad format".to_string()))?;
    enqueue(&state, PrintJob::text(format, request.body))
}
