//! HTTP handlers for the server.

pub mod photo;
pub mod print;

use axum::http::StatusCode;
use std::sync::mpsc::TrySendError;

use super::state::AppState;
use crate::spooler::{PrintJob, Ticket};

/// Error half of every handler result.
pub type HandlerError = (StatusCode, String);

/// Hand a job to the spooler.
pub(crate) fn enqueue(state: &AppState, job: PrintJob) -> Result<&'static str, HandlerError> {
    let ticket = Ticket::new(job);
    let (id, kind) = (ticket.id, ticket.job.kind());
    state.jobs.try_send(ticket).map_err(|e| {
        let reason = match e {
            TrySendError::Full(_) => {
                tracing::warn!(job_id = %id, "print queue is full");
                "Print queue full"
            }
            TrySendError::Disconnected(_) => {
                tracing::error!(job_id = %id, "print queue is closed");
                "Print queue closed"
            }
        };
        (StatusCode::SERVICE_UNAVAILABLE, reason.to_string())
    })?;
    tracing::info!(job_id = %id, kind, "job queued");
    Ok("OK")
}
