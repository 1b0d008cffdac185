//! Image printing handlers.
//!
//! Images are decoded and dithered before they are queued, so a bad upload
//! is rejected with 400 instead of failing later on the spooler thread.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{HandlerError, enqueue};
use crate::render::Bitmap;
use crate::server::state::AppState;
use crate::spooler::PrintJob;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// Body of `POST /print-image-url`.
#[derive(Debug, Deserialize)]
pub struct ImageUrlRequest {
    pub url: String,
}

/// POST /print-image - queue an uploaded image.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<&'static str, HandlerError> {
    let mut image_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e)))?;
            image_data = Some(bytes.to_vec());
            break;
        }
    }

    let bytes = image_data.ok_or((StatusCode::BAD_REQUEST, "Missing `file`".to_string()))?;
    let bitmap = decode(bytes).await?;
    enqueue(&state, PrintJob::Bitmap(bitmap))
}

/// POST /print-image-url - fetch an image and queue it.
pub async fn from_url(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImageUrlRequest>,
) -> Result<&'static str, HandlerError> {
    tracing::debug!(url = %request.url, "fetching image");
    let response = state
        .http
        .get(&request.url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| (StatusCode::BAD_GATEWAY, format!("Failed to fetch image: {}", e)))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, format!("Failed to fetch image: {}", e)))?;

    let bitmap = decode(bytes.to_vec()).await?;
    enqueue(&state, PrintJob::Bitmap(bitmap))
}

/// Decode and dither off the async runtime.
async fn decode(bytes: Vec<u8>) -> Result<Bitmap, HandlerError> {
    let result = tokio::task::spawn_blocking(move || {
        let img = image::load_from_memory(&bytes)
            .map_err(|e| format!("Failed to decode image: {}", e))?;
        Bitmap::from_image(&img).map_err(|e| e.to_string())
    })
    .await;

    match result {
        Ok(Ok(bitmap)) => Ok(bitmap),
        Ok(Err(msg)) => Err((StatusCode::BAD_REQUEST, msg)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Task error: {}", e),
        )),
    }
}
