//! # Standard Output Transport
//!
//! Writes raw printer bytes to stdout so they can be piped elsewhere:
//!
//! ```bash
//! thermald --stdout print "hello" | lp -o raw
//! ```
//!
//! Nothing downstream reports back, so this transport is unpaced and cannot
//! read status.

use std::io::{self, Write};

use super::Transport;
use crate::error::{Result, ThermalError};

/// Pass-through sink to standard output.
#[derive(Debug, Default)]
pub struct StdoutTransport;

impl StdoutTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for StdoutTransport {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(data)
            .and_then(|_| out.flush())
            .map_err(|e| ThermalError::Transport(format!("Write to stdout failed: {}", e)))
    }

    fn is_paced(&self) -> bool {
        false
    }
}
