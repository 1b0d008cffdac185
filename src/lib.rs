//! # thermald - Serial Thermal Printer Driver
//!
//! thermald drives small serial thermal receipt printers (the 58mm,
//! 384-dot kind sold for hobby boards). Those printers have no usable flow
//! control, so the driver predicts how long each byte, line, barcode and
//! bitmap chunk takes to print and paces writes to match.
//!
//! It provides:
//!
//! - **Protocol**: ESC/POS-style command builders, branched on firmware version
//! - **Driver**: text state tracking, the timing model and the write gate
//! - **Markup**: tag, Markdown and BBCode front ends
//! - **Spooler**: a single-owner print queue that reconnects after faults
//! - **Server**: an HTTP front end feeding the spooler
//!
//! ## Quick Start
//!
//! ```no_run
//! use thermald::{
//!     printer::{PrinterConfig, ThermalPrinter},
//!     protocol::{barcode::Symbology, text::Size},
//!     transport::SerialTransport,
//! };
//!
//! let config = PrinterConfig::default();
//! let transport = SerialTransport::open("/dev/serial0", config.baud_rate)?;
//! let mut printer = ThermalPrinter::connect(transport, config)?;
//!
//! printer.set_size(Size::Large)?;
//! printer.println("Hello")?;
//! printer.set_size(Size::Small)?;
//! printer.print_barcode("123456789012", Symbology::UpcA)?;
//! printer.feed(3)?;
//!
//! # Ok::<(), thermald::ThermalError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Command byte builders |
//! | [`printer`] | Driver, timing model and text state |
//! | [`transport`] | Serial, stdout and in-memory byte sinks |
//! | [`render`] | Image dithering |
//! | [`markup`] | Text format front ends |
//! | [`spooler`] | Print queue |
//! | [`server`] | HTTP front end |
//! | [`error`] | Error types |

pub mod error;
pub mod markup;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod server;
pub mod spooler;
pub mod transport;

// Re-exports for convenience
pub use error::{Result, ThermalError};
pub use printer::{PrinterConfig, ThermalPrinter};
pub use protocol::Firmware;
