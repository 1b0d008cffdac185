//! # Printer Configuration
//!
//! Connection and print-quality settings for the thermal printer.
//!
//! ## Defaults
//!
//! | Setting | Default | Notes |
//! |---------|---------|-------|
//! | Baud rate | 19200 | Printed on the self-test page |
//! | Firmware | 2.68 | Also on the self-test page |
//! | Heat dots | 11 | Max heating dots, units of 8 |
//! | Heat time | 120 | Units of 10µs; darker but slower when higher |
//! | Heat interval | 40 | Units of 10µs |
//! | Density | 10 | 50% + 5% × n |
//! | Break time | 2 | n × 250µs |
//! | Dot print time | 30ms | |
//! | Dot feed time | 2.1ms | |
//! | Boot settle | 0.5s | Never less |
//!
//! ## Usage
//!
//! ```
//! use thermald::printer::PrinterConfig;
//! use thermald::protocol::Firmware;
//!
//! let config = PrinterConfig::default()
//!     .with_firmware(Firmware(264))
//!     .with_heat_time(150);
//! assert_eq!(config.baud_rate, 19200);
//! ```

use std::time::Duration;

use super::timing::{DEFAULT_DOT_FEED_TIME, DEFAULT_DOT_PRINT_TIME, TimingModel};
use crate::protocol::Firmware;

pub const DEFAULT_BAUD_RATE: u32 = 19200;
pub const DEFAULT_HEAT_DOTS: u8 = 11;
pub const DEFAULT_HEAT_TIME: u8 = 120;
pub const DEFAULT_HEAT_INTERVAL: u8 = 40;
pub const DEFAULT_DENSITY: u8 = 10;
pub const DEFAULT_BREAK_TIME: u8 = 2;

/// The printer cannot take data until it has been powered for this long.
pub const MIN_BOOT_SETTLE: Duration = Duration::from_millis(500);

/// Settings fixed at driver construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
    pub baud_rate: u32,
    pub firmware: Firmware,
    pub heat_dots: u8,
    pub heat_time: u8,
    pub heat_interval: u8,
    pub density: u8,
    pub break_time: u8,
    pub dot_print_time: Duration,
    pub dot_feed_time: Duration,
    /// Delay before the first byte after connecting
    pub boot_settle: Duration,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            firmware: Firmware::DEFAULT,
            heat_dots: DEFAULT_HEAT_DOTS,
            heat_time: DEFAULT_HEAT_TIME,
            heat_interval: DEFAULT_HEAT_INTERVAL,
            density: DEFAULT_DENSITY,
            break_time: DEFAULT_BREAK_TIME,
            dot_print_time: DEFAULT_DOT_PRINT_TIME,
            dot_feed_time: DEFAULT_DOT_FEED_TIME,
            boot_settle: MIN_BOOT_SETTLE,
        }
    }
}

impl PrinterConfig {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_firmware(mut self, firmware: Firmware) -> Self {
        self.firmware = firmware;
        self
    }

    pub fn with_heat_time(mut self, heat_time: u8) -> Self {
        self.heat_time = heat_time;
        self
    }

    pub fn with_density(mut self, density: u8, break_time: u8) -> Self {
        self.density = density;
        self.break_time = break_time;
        self
    }

    pub fn with_dot_times(mut self, print: Duration, feed: Duration) -> Self {
        self.dot_print_time = print;
        self.dot_feed_time = feed;
        self
    }

    /// Set the boot settle delay. Values under half a second are raised.
    pub fn with_boot_settle(mut self, settle: Duration) -> Self {
        self.boot_settle = settle.max(MIN_BOOT_SETTLE);
        self
    }

    /// Boot settle delay actually applied, never below the minimum.
    pub fn effective_boot_settle(&self) -> Duration {
        self.boot_settle.max(MIN_BOOT_SETTLE)
    }

    /// Timing model for this link and these dot times.
    pub fn timing(&self) -> TimingModel {
        TimingModel {
            dot_print_time: self.dot_print_time,
            dot_feed_time: self.dot_feed_time,
            ..TimingModel::new(self.baud_rate)
        }
    }
}
