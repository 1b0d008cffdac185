//! Server state and configuration.

use std::sync::mpsc::SyncSender;

use crate::spooler::Ticket;

/// Default address to listen on.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Sent with `/print-image-url` fetches.
const USER_AGENT: &str = concat!("thermald/", env!("CARGO_PKG_VERSION"));

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    /// Queue feeding the spooler thread
    pub jobs: SyncSender<Ticket>,
    /// Client for `/print-image-url` fetches
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(jobs: SyncSender<Ticket>) -> Self {
        Self {
            jobs,
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
        }
    }
}
