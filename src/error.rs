//! # Error Types
//!
//! This module defines error types used throughout the thermald library.
//!
//! Only transport failures are real faults. Out-of-range parameters are
//! clamped, unsupported barcode symbologies are skipped and characters that
//! have no code page representation are dropped, so none of those surface here.

use thiserror::Error;

/// Main error type for thermald operations
#[derive(Debug, Error)]
pub enum ThermalError {
    /// Transport-level errors (open, configure, write, read)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Bitmap buffer does not match its declared dimensions
    #[error("Bitmap error: {0}")]
    Bitmap(String),

    /// Image decoding or conversion error
    #[error("Image error: {0}")]
    Image(String),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ThermalError {
    /// Whether the error means the connection is unusable and the driver
    /// must be torn down and reconstructed.
    pub fn is_transport_fault(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Io(_))
    }
}

/// Result alias used by the driver and transports.
pub type Result<T> = std::result::Result<T, ThermalError>;
