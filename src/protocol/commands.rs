//! # Printer Control Commands
//!
//! This module implements the control commands of the serial thermal printer
//! (the common 58mm "mini thermal" mechanism with a 384-dot head).
//!
//! ## Protocol Overview
//!
//! The printer speaks an ESC/POS-like protocol where commands are short byte
//! sequences starting with a prefix byte:
//!
//! - **ESC** (27): general commands (init, feed, sleep, print mode)
//! - **GS** (29): extended commands (size, inverse, barcodes)
//! - **DC2** (18): hardware commands (density, bitmap, self test)
//!
//! Every builder here returns the exact bytes of one command. Gating and
//! state tracking live in [`crate::printer`]; nothing in this module touches
//! the transport.
//!
//! ## Firmware Variants
//!
//! A handful of commands changed shape between firmware releases. Builders
//! for those take a [`Firmware`] and pick the right encoding.
//!
//! ## Byte Order
//!
//! Multi-byte integers (only the sleep timeout) are **little-endian**.

use super::firmware::Firmware;

// ============================================================================
// PREFIX AND CONTROL BYTES
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
pub const GS: u8 = 0x1D;

/// DC2 (Device Control 2) - Hardware command prefix
pub const DC2: u8 = 0x12;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

/// FF (Form Feed)
pub const FF: u8 = 0x0C;

/// HT (Horizontal Tab) - Advance to the next tab stop
pub const HT: u8 = 0x09;

/// DC3 (XOFF) - Never transmitted as text; the write pipeline filters it.
pub const DC3: u8 = 0x13;

/// Wake-up byte. Any byte wakes the printer; 0xFF is ignored once awake.
pub const WAKE: u8 = 0xFF;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and restores power-on defaults for print mode,
/// line spacing and alignment.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Decimal | 27 64 |
///
/// ## Example
///
/// ```
/// use thermald::protocol::commands;
///
/// assert_eq!(commands::init(), vec![27, 64]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Set Tab Stops (ESC D n1...nk NUL)
///
/// Configures a tab stop every 4 columns. Only firmware 2.64 and later
/// accepts this; it is sent as three separate commands, the last carrying
/// the NUL terminator.
pub fn tab_stops() -> [Vec<u8>; 3] {
    [vec![ESC, b'D'], vec![4, 8, 12, 16], vec![20, 24, 28, 0]]
}

/// # Heating Parameters (ESC 7 n1 n2 n3)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC 7 n1 n2 n3 |
/// | Decimal | 27 55 n1 n2 n3 |
///
/// ## Parameters
///
/// - `max_dots` (n1): max heating dots in units of 8 dots, 0-255
/// - `heat_time` (n2): heating time in units of 10µs, 3-255
/// - `heat_interval` (n3): heating interval in units of 10µs, 0-255
///
/// More heating dots print faster but draw more peak current. Longer heat
/// time prints darker but slower; too short a heat time prints blank paper.
///
/// `heat_time` below 3 is clamped to 3.
pub fn heat_config(max_dots: u8, heat_time: u8, heat_interval: u8) -> Vec<u8> {
    vec![ESC, b'7', max_dots, heat_time.max(3), heat_interval]
}

/// # Print Density (DC2 # n)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | DC2 # n |
/// | Decimal | 18 35 n |
///
/// - bits 0-4: density, 50% + 5% × n (clamped to 31)
/// - bits 5-7: break time, n × 250µs (clamped to 7)
pub fn density(density: u8, break_time: u8) -> Vec<u8> {
    vec![DC2, b'#', (break_time.min(7) << 5) | density.min(31)]
}

// ============================================================================
// PAPER MOVEMENT
// ============================================================================

/// # Feed Lines (ESC d n)
///
/// Prints the buffer and feeds `n` lines. Firmware before 2.64 advertises
/// this command but feeds far more than asked, so the driver emits literal
/// newlines there instead.
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

/// # Feed Dot Rows (ESC J n)
///
/// Feeds paper by `n` vertical dots (0.125mm each).
#[inline]
pub fn feed_rows(n: u8) -> Vec<u8> {
    vec![ESC, b'J', n]
}

/// Form feed (FF).
#[inline]
pub fn form_feed() -> Vec<u8> {
    vec![FF]
}

/// Horizontal tab (HT).
#[inline]
pub fn tab() -> Vec<u8> {
    vec![HT]
}

// ============================================================================
// POWER AND STATUS
// ============================================================================

/// # Sleep After Timeout (ESC 8 n)
///
/// Puts the printer into low-power sleep after `seconds` of idle time.
/// Zero disables sleep.
///
/// | Firmware | Bytes |
/// |----------|-------|
/// | ≥ 2.64   | 27 56 nL nH (16-bit, little-endian) |
/// | < 2.64   | 27 56 n (8-bit, clamped to 255) |
///
/// ## Example
///
/// ```
/// use thermald::protocol::{commands, Firmware};
///
/// assert_eq!(commands::sleep_after(Firmware(268), 300), vec![27, 56, 0x2C, 0x01]);
/// assert_eq!(commands::sleep_after(Firmware(250), 300), vec![27, 56, 255]);
/// ```
pub fn sleep_after(firmware: Firmware, seconds: u16) -> Vec<u8> {
    if firmware.is_modern() {
        let [lo, hi] = seconds.to_le_bytes();
        vec![ESC, b'8', lo, hi]
    } else {
        vec![ESC, b'8', seconds.min(255) as u8]
    }
}

/// Wake-up byte, sent before the firmware-specific wake sequence.
#[inline]
pub fn wake() -> Vec<u8> {
    vec![WAKE]
}

/// # Sleep Off (ESC v 0)
///
/// Sent after the wake byte on firmware 2.64 and later; without it the
/// printer drops back to sleep.
#[inline]
pub fn sleep_off() -> Vec<u8> {
    vec![ESC, b'v', 0]
}

/// Lone ESC used as a keep-awake nudge by firmware before 2.64.
#[inline]
pub fn wake_nudge() -> Vec<u8> {
    vec![ESC]
}

/// # Select Printer Online/Offline (ESC = n)
///
/// While offline the printer ignores everything except this command.
#[inline]
pub fn online(enabled: bool) -> Vec<u8> {
    vec![ESC, b'=', enabled as u8]
}

/// # Paper Status Query
///
/// The printer answers with one status byte; bit 2 set means out of paper.
/// The datasheet's `GS r 0` only works on firmware before 2.64; later
/// firmware answers `ESC v 0` instead.
pub fn status_query(firmware: Firmware) -> Vec<u8> {
    if firmware.is_modern() {
        vec![ESC, b'v', 0]
    } else {
        vec![GS, b'r', 0]
    }
}

/// Status bit that is set when paper is out.
pub const STATUS_NO_PAPER: u8 = 0b0000_0100;

/// # Print Self-Test Page (DC2 T)
#[inline]
pub fn test_page() -> Vec<u8> {
    vec![DC2, b'T']
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![27, 64]);
    }

    #[test]
    fn test_tab_stops() {
        let [select, first, last] = tab_stops();
        assert_eq!(select, vec![27, 68]);
        assert_eq!(first, vec![4, 8, 12, 16]);
        assert_eq!(last, vec![20, 24, 28, 0]);
    }

    #[test]
    fn test_heat_config() {
        assert_eq!(heat_config(11, 120, 40), vec![27, 55, 11, 120, 40]);
        // Heat time below the documented minimum is clamped
        assert_eq!(heat_config(11, 0, 40), vec![27, 55, 11, 3, 40]);
    }

    #[test]
    fn test_density() {
        // 100% density, 500µs break time
        assert_eq!(density(10, 2), vec![18, 35, (2 << 5) | 10]);
        assert_eq!(density(255, 255), vec![18, 35, (7 << 5) | 31]);
    }

    #[test]
    fn test_feed() {
        assert_eq!(feed_lines(3), vec![27, 100, 3]);
        assert_eq!(feed_rows(12), vec![27, 74, 12]);
    }

    #[test]
    fn test_sleep_after() {
        assert_eq!(sleep_after(Firmware(264), 1), vec![27, 56, 1, 0]);
        assert_eq!(sleep_after(Firmware(268), 0x0102), vec![27, 56, 2, 1]);
        assert_eq!(sleep_after(Firmware(263), 30), vec![27, 56, 30]);
    }

    #[test]
    fn test_online() {
        assert_eq!(online(false), vec![27, 61, 0]);
        assert_eq!(online(true), vec![27, 61, 1]);
    }

    #[test]
    fn test_status_query() {
        assert_eq!(status_query(Firmware(268)), vec![27, 118, 0]);
        assert_eq!(status_query(Firmware(200)), vec![29, 114, 0]);
    }

    #[test]
    fn test_single_byte_commands() {
        assert_eq!(wake(), vec![255]);
        assert_eq!(sleep_off(), vec![27, 118, 0]);
        assert_eq!(wake_nudge(), vec![27]);
        assert_eq!(test_page(), vec![18, 84]);
        assert_eq!(form_feed(), vec![12]);
        assert_eq!(tab(), vec![9]);
    }
}
