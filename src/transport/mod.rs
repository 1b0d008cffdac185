//! # Printer Transport Layer
//!
//! This module provides the byte sinks the driver writes to.
//!
//! ## Available Transports
//!
//! - [`serial`]: Raw TTY serial port with a configured baud rate (Unix)
//! - [`stdout`]: Pass-through to standard output, e.g. piped into `lp -o raw`
//! - [`MemoryTransport`]: In-memory sink for tests and dry runs
//!
//! The link is unacknowledged: a transport only promises ordered delivery.
//! The one exception is [`Transport::read_byte`], which reads a single
//! status byte where the hardware supports it.

#[cfg(unix)]
pub mod serial;
pub mod stdout;

#[cfg(unix)]
pub use serial::SerialTransport;
pub use stdout::StdoutTransport;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{Result, ThermalError};

/// An ordered byte sink with an optional single-byte status read.
pub trait Transport: Send {
    /// Write all bytes, in order.
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Read one status byte from the printer.
    fn read_byte(&mut self) -> Result<u8> {
        Err(ThermalError::Transport(
            "transport cannot read printer status".to_string(),
        ))
    }

    /// Whether writes reach a real device that must be throttled.
    ///
    /// Pass-through sinks return `false`; the driver still tracks busy
    /// periods for them but never sleeps.
    fn is_paced(&self) -> bool {
        true
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_bytes(data)
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn is_paced(&self) -> bool {
        (**self).is_paced()
    }
}

/// # In-Memory Transport
///
/// Collects written bytes in a shared buffer and answers status reads from
/// a queue. Unpaced unless [`MemoryTransport::paced`] is set.
///
/// ```
/// use thermald::transport::{MemoryTransport, Transport};
///
/// let mut transport = MemoryTransport::new().with_status([0x00]);
/// transport.write_bytes(&[27, 64])?;
/// assert_eq!(transport.written(), vec![27, 64]);
/// assert_eq!(transport.read_byte()?, 0x00);
/// # Ok::<(), thermald::ThermalError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sink: Arc<Mutex<Vec<u8>>>,
    status: VecDeque<u8>,
    paced: bool,
    fail_after: Option<usize>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue status bytes returned by successive `read_byte` calls.
    pub fn with_status(mut self, bytes: impl IntoIterator<Item = u8>) -> Self {
        self.status.extend(bytes);
        self
    }

    /// Make the driver sleep through busy periods as it would on hardware.
    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Fail any write that would take the total past `limit` bytes.
    pub fn failing_after(mut self, limit: usize) -> Self {
        self.fail_after = Some(limit);
        self
    }

    /// Handle to the shared output buffer; stays valid after the transport
    /// is moved into a driver.
    pub fn sink(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.sink)
    }

    /// Copy of everything written so far.
    pub fn written(&self) -> Vec<u8> {
        self.sink.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Forget everything written so far.
    pub fn clear(&self) {
        self.sink.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Transport for MemoryTransport {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(limit) = self.fail_after
            && sink.len() + data.len() > limit
        {
            return Err(ThermalError::Transport(format!(
                "Write failed: device gone after {} bytes",
                sink.len()
            )));
        }
        sink.extend_from_slice(data);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.status
            .pop_front()
            .ok_or_else(|| ThermalError::Transport("Timed out waiting for status byte".into()))
    }

    fn is_paced(&self) -> bool {
        self.paced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_collects_in_order() {
        let mut transport = MemoryTransport::new();
        transport.write_bytes(&[1, 2]).unwrap();
        transport.write_bytes(&[3]).unwrap();
        assert_eq!(transport.written(), vec![1, 2, 3]);
    }

    #[test]
    fn test_memory_sink_survives_move() {
        let transport = MemoryTransport::new();
        let sink = transport.sink();
        let mut boxed: Box<dyn Transport> = Box::new(transport);
        boxed.write_bytes(b"hi").unwrap();
        assert_eq!(*sink.lock().unwrap(), b"hi".to_vec());
    }

    #[test]
    fn test_memory_status_queue() {
        let mut transport = MemoryTransport::new().with_status([4, 0]);
        assert_eq!(transport.read_byte().unwrap(), 4);
        assert_eq!(transport.read_byte().unwrap(), 0);
        assert!(transport.read_byte().is_err());
    }

    #[test]
    fn test_memory_failure() {
        let mut transport = MemoryTransport::new().failing_after(3);
        transport.write_bytes(&[1, 2, 3]).unwrap();
        let err = transport.write_bytes(&[4]).unwrap_err();
        assert!(err.is_transport_fault());
        assert_eq!(transport.written(), vec![1, 2, 3]);
    }

    #[test]
    fn test_pacing_flag() {
        assert!(!MemoryTransport::new().is_paced());
        assert!(MemoryTransport::new().paced(true).is_paced());
    }

    #[test]
    fn test_clear() {
        let mut transport = MemoryTransport::new();
        transport.write_bytes(&[9]).unwrap();
        transport.clear();
        assert!(transport.written().is_empty());
    }
}
