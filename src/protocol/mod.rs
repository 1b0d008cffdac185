//! # Thermal Printer Protocol Implementation
//!
//! This module provides low-level command builders for the serial thermal
//! printer. Builders are pure: they return bytes and never touch a transport
//! or printer state.
//!
//! ## Module Structure
//!
//! - [`commands`]: Control commands (init, heat, density, feed, sleep, status)
//! - [`text`]: Print mode, size, underline, justification, character sets
//! - [`barcode`]: 1D barcode tables and data framing
//! - [`graphics`]: Chunked bitmap transfer
//! - [`cp437`]: Text encoding
//! - [`firmware`]: Firmware version thresholds
//!
//! ## Usage Example
//!
//! ```
//! use thermald::protocol::{commands, text, Firmware};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::justify(text::Justify::Center));
//! data.extend(text::size(text::Size::Large));
//! data.extend(b"RECEIPT\n");
//! data.extend(commands::sleep_after(Firmware::DEFAULT, 60));
//! ```

pub mod barcode;
pub mod commands;
pub mod cp437;
pub mod firmware;
pub mod graphics;
pub mod text;

pub use firmware::{Firmware, FirmwareFamily};
