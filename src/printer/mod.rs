//! # Thermal Printer Driver
//!
//! [`ThermalPrinter`] owns a transport, the host-side copy of the printer's
//! state, and the timing gate that keeps writes from overrunning the
//! printer's input buffer.
//!
//! ## Write Path
//!
//! Every operation follows the same steps:
//!
//! ```text
//! operation ──► encode bytes ──► gate.wait() ──► transport write
//!                                                      │
//!               state update ◄── gate.schedule(busy) ◄─┘
//! ```
//!
//! Command sequences go out as one gated unit. Text goes out byte by byte
//! so each line boundary can be charged its print or feed time.
//!
//! ## Modules
//!
//! - [`config`]: Construction-time settings
//! - [`state`]: Cursor, mode and size tracking
//! - [`timing`]: Busy-period model and gate
//!
//! ## Example
//!
//! ```
//! use thermald::printer::{PrinterConfig, ThermalPrinter};
//! use thermald::protocol::barcode::Symbology;
//! use thermald::protocol::text::Size;
//! use thermald::transport::MemoryTransport;
//!
//! let transport = MemoryTransport::new();
//! let mut printer = ThermalPrinter::connect(transport, PrinterConfig::default())?;
//!
//! printer.set_size(Size::Large)?;
//! printer.println("RECEIPT")?;
//! printer.set_size(Size::Small)?;
//! printer.bold_on()?;
//! printer.println("Total: 4.20")?;
//! printer.bold_off()?;
//! printer.print_barcode("123456789012", Symbology::UpcA)?;
//! printer.feed(3)?;
//! # Ok::<(), thermald::ThermalError>(())
//! ```

pub mod config;
pub mod state;
pub mod timing;

pub use config::PrinterConfig;
pub use state::{LineKind, PrinterState};
pub use timing::{Gate, TimingModel};

use std::fmt::Display;
use std::time::{Duration, Instant};

use image::DynamicImage;

use crate::error::Result;
use crate::protocol::barcode::{self, Symbology};
use crate::protocol::commands::{self, DC3, LF, STATUS_NO_PAPER};
use crate::protocol::graphics::BitmapLayout;
use crate::protocol::text::{self, Justify, MIN_LINE_HEIGHT, PrintMode, Size};
use crate::protocol::{Firmware, cp437};
use crate::render::dither::Bitmap;
use crate::transport::Transport;

/// Pause between the wake byte and `ESC v 0` on firmware 2.64+.
const WAKE_SETTLE: Duration = Duration::from_millis(50);

/// Pause after each keep-awake ESC on older firmware.
const WAKE_NUDGE_PAUSE: Duration = Duration::from_millis(100);

/// Keep-awake ESC bytes sent on older firmware.
const WAKE_NUDGES: usize = 10;

/// Line height restored by [`ThermalPrinter::set_default`].
const DEFAULT_LINE_HEIGHT: u8 = 30;

/// # Thermal Printer
///
/// One instance per connection. Every operation takes `&mut self`; the
/// driver is `Send` when its transport is, but never shared between threads.
#[derive(Debug)]
pub struct ThermalPrinter<T: Transport> {
    transport: T,
    config: PrinterConfig,
    timing: TimingModel,
    gate: Gate,
    state: PrinterState,
}

impl<T: Transport> ThermalPrinter<T> {
    /// Wrap a transport without sending anything.
    ///
    /// The state starts at its reset defaults; use [`ThermalPrinter::connect`]
    /// to bring up real hardware.
    pub fn new(transport: T, config: PrinterConfig) -> Self {
        let gate = Gate::new(transport.is_paced());
        Self {
            transport,
            timing: config.timing(),
            config,
            gate,
            state: PrinterState::default(),
        }
    }

    /// Bring up the printer: let it boot, wake it, reset it, then send the
    /// heating and density settings.
    pub fn connect(transport: T, config: PrinterConfig) -> Result<Self> {
        let mut printer = Self::new(transport, config);
        printer.gate.schedule(config.effective_boot_settle());

        printer.wake()?;
        printer.reset()?;
        printer.begin(config.heat_time)?;
        printer.write_unit(&commands::density(config.density, config.break_time))?;

        tracing::info!(
            firmware = %config.firmware,
            baud_rate = config.baud_rate,
            paced = printer.gate.is_paced(),
            "printer ready"
        );
        Ok(printer)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn state(&self) -> &PrinterState {
        &self.state
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn timing(&self) -> &TimingModel {
        &self.timing
    }

    pub fn firmware(&self) -> Firmware {
        self.config.firmware
    }

    /// Instant before which the next write will be held back.
    pub fn resume_at(&self) -> Instant {
        self.gate.resume_at()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    // ========================================================================
    // WRITE PIPELINE
    // ========================================================================

    /// Send a command sequence as one gated unit.
    fn write_unit(&mut self, bytes: &[u8]) -> Result<()> {
        self.gate.wait();
        self.transport.write_bytes(bytes)?;
        self.gate.schedule(self.timing.bytes(bytes.len()));
        Ok(())
    }

    /// Send one text byte and charge its line time if it ends a line.
    fn write_text_byte(&mut self, byte: u8) -> Result<()> {
        self.gate.wait();
        self.transport.write_bytes(&[byte])?;

        let (char_height, line_spacing) = (self.state.char_height, self.state.line_spacing);
        let busy = match self.state.advance(byte) {
            Some(LineKind::Text) => self.timing.text_line(char_height, line_spacing),
            Some(LineKind::Blank) => self.timing.blank_line(char_height, line_spacing),
            None => self.timing.byte_time,
        };
        self.gate.schedule(busy);
        Ok(())
    }

    /// Print text. Characters outside code page 437 are dropped, as is
    /// 0x13 (XOFF), which would stall the printer.
    pub fn write(&mut self, text: &str) -> Result<()> {
        for byte in cp437::encode(text) {
            if byte == DC3 {
                continue;
            }
            self.write_text_byte(byte)?;
        }
        Ok(())
    }

    /// Print any displayable value.
    pub fn print(&mut self, value: impl Display) -> Result<()> {
        self.write(&value.to_string())
    }

    /// Print a value followed by a newline.
    pub fn println(&mut self, value: impl Display) -> Result<()> {
        self.print(value)?;
        self.write("\n")
    }

    // ========================================================================
    // PRINT MODE
    // ========================================================================

    fn set_mode(&mut self, flag: PrintMode, enabled: bool) -> Result<()> {
        if enabled {
            self.state.mode.insert(flag);
        } else {
            self.state.mode.remove(flag);
        }
        self.state.apply_mode();
        self.write_unit(&text::print_mode(self.state.mode))
    }

    pub fn bold_on(&mut self) -> Result<()> {
        self.set_mode(PrintMode::BOLD, true)
    }

    pub fn bold_off(&mut self) -> Result<()> {
        self.set_mode(PrintMode::BOLD, false)
    }

    pub fn strike_on(&mut self) -> Result<()> {
        self.set_mode(PrintMode::STRIKE, true)
    }

    pub fn strike_off(&mut self) -> Result<()> {
        self.set_mode(PrintMode::STRIKE, false)
    }

    pub fn upside_down_on(&mut self) -> Result<()> {
        self.set_mode(PrintMode::UPSIDE_DOWN, true)
    }

    pub fn upside_down_off(&mut self) -> Result<()> {
        self.set_mode(PrintMode::UPSIDE_DOWN, false)
    }

    pub fn double_height_on(&mut self) -> Result<()> {
        self.set_mode(PrintMode::DOUBLE_HEIGHT, true)
    }

    pub fn double_height_off(&mut self) -> Result<()> {
        self.set_mode(PrintMode::DOUBLE_HEIGHT, false)
    }

    pub fn double_width_on(&mut self) -> Result<()> {
        self.set_mode(PrintMode::DOUBLE_WIDTH, true)
    }

    pub fn double_width_off(&mut self) -> Result<()> {
        self.set_mode(PrintMode::DOUBLE_WIDTH, false)
    }

    /// Inverse (white on black). Firmware 2.68+ has a dedicated command;
    /// older firmware uses the print-mode bit.
    pub fn inverse_on(&mut self) -> Result<()> {
        self.set_inverse(true)
    }

    pub fn inverse_off(&mut self) -> Result<()> {
        self.set_inverse(false)
    }

    fn set_inverse(&mut self, enabled: bool) -> Result<()> {
        match text::inverse(self.config.firmware, enabled) {
            Some(cmd) => self.write_unit(&cmd),
            None => self.set_mode(PrintMode::INVERSE, enabled),
        }
    }

    /// Clear every print-mode flag.
    pub fn normal(&mut self) -> Result<()> {
        self.state.mode = PrintMode::empty();
        self.state.apply_mode();
        self.write_unit(&text::print_mode(self.state.mode))
    }

    /// Select a character size. Overrides the double height/width geometry
    /// until the next mode change.
    pub fn set_size(&mut self, size: Size) -> Result<()> {
        self.write_unit(&text::size(size))?;
        self.state.apply_size(size);
        Ok(())
    }

    pub fn underline_on(&mut self, weight: u8) -> Result<()> {
        self.write_unit(&text::underline(weight))
    }

    pub fn underline_off(&mut self) -> Result<()> {
        self.write_unit(&text::underline(0))
    }

    /// Restore text formatting defaults without a full reset.
    pub fn set_default(&mut self) -> Result<()> {
        self.online()?;
        self.justify(Justify::Left)?;
        self.inverse_off()?;
        self.double_height_off()?;
        self.set_line_height(DEFAULT_LINE_HEIGHT)?;
        self.bold_off()?;
        self.underline_off()?;
        self.set_barcode_height(state::DEFAULT_BARCODE_HEIGHT)?;
        self.set_size(Size::Small)?;
        self.set_charset(0)?;
        self.set_code_page(0)
    }

    // ========================================================================
    // LAYOUT
    // ========================================================================

    pub fn justify(&mut self, justify: Justify) -> Result<()> {
        self.write_unit(&text::justify(justify))
    }

    /// Feed `lines` lines. Firmware before 2.64 overfeeds on `ESC d`, so
    /// newlines are printed instead.
    pub fn feed(&mut self, lines: u8) -> Result<()> {
        if self.config.firmware.is_modern() {
            self.write_unit(&commands::feed_lines(lines))?;
            self.gate
                .schedule(self.timing.feed_lines(self.state.char_height));
            self.state.line_done();
            Ok(())
        } else {
            for _ in 0..lines {
                self.write("\n")?;
            }
            Ok(())
        }
    }

    /// Feed `rows` dot rows.
    pub fn feed_rows(&mut self, rows: u8) -> Result<()> {
        self.write_unit(&commands::feed_rows(rows))?;
        self.gate.schedule(self.timing.feed_rows(rows));
        self.state.line_done();
        Ok(())
    }

    /// Form feed.
    pub fn flush(&mut self) -> Result<()> {
        self.write_unit(&commands::form_feed())
    }

    /// Set the line pitch in dots (glyph height plus spacing, at least 24).
    pub fn set_line_height(&mut self, val: u8) -> Result<()> {
        let val = val.max(MIN_LINE_HEIGHT);
        self.state.line_spacing = val - MIN_LINE_HEIGHT;
        self.write_unit(&text::line_height(val))
    }

    pub fn set_barcode_height(&mut self, val: u8) -> Result<()> {
        let val = val.max(1);
        self.state.barcode_height = val;
        self.write_unit(&barcode::height(val))
    }

    pub fn set_charset(&mut self, val: u8) -> Result<()> {
        self.write_unit(&text::charset(val))
    }

    pub fn set_code_page(&mut self, val: u8) -> Result<()> {
        self.write_unit(&text::code_page(val))
    }

    pub fn tab(&mut self) -> Result<()> {
        self.write_unit(&commands::tab())?;
        self.state.tab();
        Ok(())
    }

    pub fn set_char_spacing(&mut self, spacing: u8) -> Result<()> {
        self.write_unit(&text::char_spacing(spacing))
    }

    // ========================================================================
    // BARCODES AND BITMAPS
    // ========================================================================

    /// Print a barcode with its label underneath.
    ///
    /// Symbologies the firmware does not know are skipped without error.
    pub fn print_barcode(&mut self, data: &str, symbology: Symbology) -> Result<()> {
        let firmware = self.config.firmware;
        let Some(code) = symbology.code(firmware.family()) else {
            tracing::debug!(
                symbology = symbology.name(),
                %firmware,
                "barcode type not supported by firmware, skipping"
            );
            return Ok(());
        };

        self.feed(1)?;
        self.write_unit(&barcode::header(code))?;
        self.gate.wait();
        self.gate
            .schedule(self.timing.barcode(self.state.barcode_height));
        self.transport
            .write_bytes(&barcode::payload(firmware, data))?;
        self.state.prev_byte = LF;
        Ok(())
    }

    /// Print a packed 1-bit bitmap (MSB = leftmost dot, 1 = black).
    ///
    /// Rows wider than 384 dots are clipped. The buffer must hold at least
    /// `ceil(width / 8) × height` bytes.
    pub fn print_bitmap(
        &mut self,
        width: u16,
        height: u16,
        bitmap: &[u8],
        line_at_a_time: bool,
    ) -> Result<()> {
        let layout = BitmapLayout::new(width, height, line_at_a_time);
        layout.validate(bitmap)?;

        for chunk in layout.chunks() {
            self.write_unit(&layout.chunk_header(&chunk))?;
            self.transport
                .write_bytes(&layout.chunk_data(bitmap, &chunk))?;
            self.gate.schedule(self.timing.bitmap_chunk(chunk.rows));
        }

        self.state.prev_byte = LF;
        Ok(())
    }

    /// Dither and print a decoded image.
    pub fn print_image(&mut self, image: &DynamicImage, line_at_a_time: bool) -> Result<()> {
        let bitmap = Bitmap::from_image(image)?;
        self.print_packed(&bitmap, line_at_a_time)
    }

    /// Print an already dithered bitmap.
    pub fn print_packed(&mut self, bitmap: &Bitmap, line_at_a_time: bool) -> Result<()> {
        self.print_bitmap(bitmap.width, bitmap.height, &bitmap.data, line_at_a_time)
    }

    // ========================================================================
    // POWER, STATUS, SETUP
    // ========================================================================

    /// Sleep as soon as possible. Zero would mean "never", so this is one
    /// second.
    pub fn sleep(&mut self) -> Result<()> {
        self.sleep_after(1)
    }

    pub fn sleep_after(&mut self, seconds: u16) -> Result<()> {
        self.write_unit(&commands::sleep_after(self.config.firmware, seconds))
    }

    pub fn wake(&mut self) -> Result<()> {
        self.write_unit(&commands::wake())?;
        if self.config.firmware.is_modern() {
            self.gate.schedule(WAKE_SETTLE);
            self.write_unit(&commands::sleep_off())
        } else {
            for _ in 0..WAKE_NUDGES {
                self.write_unit(&commands::wake_nudge())?;
                self.gate.schedule(WAKE_NUDGE_PAUSE);
            }
            Ok(())
        }
    }

    pub fn online(&mut self) -> Result<()> {
        self.write_unit(&commands::online(true))
    }

    /// Ignore everything but [`ThermalPrinter::online`] until further notice.
    pub fn offline(&mut self) -> Result<()> {
        self.write_unit(&commands::online(false))
    }

    /// `ESC @`, then reset the tracked state. Firmware 2.64+ also gets tab
    /// stops every 4 columns.
    pub fn reset(&mut self) -> Result<()> {
        self.write_unit(&commands::init())?;
        self.state.reset();
        if self.config.firmware.is_modern() {
            for unit in commands::tab_stops() {
                self.write_unit(&unit)?;
            }
        }
        Ok(())
    }

    /// Query the paper sensor. Needs a transport that can read.
    pub fn has_paper(&mut self) -> Result<bool> {
        self.write_unit(&commands::status_query(self.config.firmware))?;
        let status = self.transport.read_byte()?;
        tracing::debug!(status = format_args!("{:#010b}", status), "printer status");
        Ok(status & STATUS_NO_PAPER == 0)
    }

    /// Send heating parameters.
    pub fn begin(&mut self, heat_time: u8) -> Result<()> {
        self.write_unit(&commands::heat_config(
            self.config.heat_dots,
            heat_time,
            self.config.heat_interval,
        ))
    }

    /// Retune dot print and feed times, in microseconds.
    pub fn set_times(&mut self, print_us: u64, feed_us: u64) {
        self.timing.set_times(print_us, feed_us);
    }

    pub fn test(&mut self) -> Result<()> {
        self.write("Hello world!")?;
        self.feed(2)
    }

    /// Print the printer's built-in self-test page.
    pub fn test_page(&mut self) -> Result<()> {
        self.write_unit(&commands::test_page())?;
        self.gate.schedule(self.timing.test_page());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn printer(firmware: u16) -> (ThermalPrinter<MemoryTransport>, MemoryTransport) {
        let transport = MemoryTransport::new();
        let handle = transport.clone();
        let config = PrinterConfig::default().with_firmware(Firmware(firmware));
        (ThermalPrinter::new(transport, config), handle)
    }

    #[test]
    fn test_write_drops_xoff() {
        let (mut p, out) = printer(268);
        p.write("a\u{13}b").unwrap();
        assert_eq!(out.written(), b"ab".to_vec());
    }

    #[test]
    fn test_mode_bytes_accumulate() {
        let (mut p, out) = printer(268);
        p.bold_on().unwrap();
        p.double_width_on().unwrap();
        p.bold_off().unwrap();
        assert_eq!(
            out.written(),
            vec![27, 33, 8, 27, 33, 40, 27, 33, 32]
        );
        assert_eq!(p.state().max_column, 16);
    }

    #[test]
    fn test_inverse_by_firmware() {
        let (mut p, out) = printer(268);
        p.inverse_on().unwrap();
        assert_eq!(out.written(), vec![29, 66, 1]);
        assert_eq!(p.state().mode, PrintMode::empty());

        let (mut p, out) = printer(264);
        p.inverse_on().unwrap();
        assert_eq!(out.written(), vec![27, 33, 2]);
        assert!(p.state().mode.contains(PrintMode::INVERSE));
    }

    #[test]
    fn test_feed_by_firmware() {
        let (mut p, out) = printer(268);
        p.feed(3).unwrap();
        assert_eq!(out.written(), vec![27, 100, 3]);

        let (mut p, out) = printer(250);
        p.feed(3).unwrap();
        assert_eq!(out.written(), b"\n\n\n".to_vec());
    }

    #[test]
    fn test_line_height_sets_spacing() {
        let (mut p, out) = printer(268);
        p.set_line_height(10).unwrap();
        assert_eq!(p.state().line_spacing, 0);
        p.set_line_height(32).unwrap();
        assert_eq!(p.state().line_spacing, 8);
        assert_eq!(out.written(), vec![27, 51, 24, 27, 51, 32]);
    }

    #[test]
    fn test_reset_restores_state() {
        let (mut p, out) = printer(268);
        p.bold_on().unwrap();
        p.set_size(Size::Large).unwrap();
        p.write("abc").unwrap();
        out.clear();

        p.reset().unwrap();
        assert_eq!(*p.state(), PrinterState::default());
        assert_eq!(
            out.written(),
            vec![27, 64, 27, 68, 4, 8, 12, 16, 20, 24, 28, 0]
        );
    }

    #[test]
    fn test_reset_legacy_has_no_tab_stops() {
        let (mut p, out) = printer(250);
        p.reset().unwrap();
        assert_eq!(out.written(), vec![27, 64]);
    }

    #[test]
    fn test_tab_advances_column() {
        let (mut p, out) = printer(268);
        p.write("ab").unwrap();
        p.tab().unwrap();
        assert_eq!(p.state().column, 4);
        assert_eq!(out.written(), vec![b'a', b'b', 9]);
    }

    #[test]
    fn test_wake_modern() {
        let (mut p, out) = printer(268);
        p.wake().unwrap();
        assert_eq!(out.written(), vec![255, 27, 118, 0]);
    }

    #[test]
    fn test_wake_legacy() {
        let (mut p, out) = printer(250);
        p.wake().unwrap();
        let mut expected = vec![255];
        expected.extend([27; 10]);
        assert_eq!(out.written(), expected);
    }

    #[test]
    fn test_sleep_is_one_second() {
        let (mut p, out) = printer(268);
        p.sleep().unwrap();
        assert_eq!(out.written(), vec![27, 56, 1, 0]);
    }

    #[test]
    fn test_set_default_sequence_ends_small() {
        let (mut p, out) = printer(268);
        p.set_size(Size::Large).unwrap();
        p.set_default().unwrap();
        assert_eq!(p.state().size, Size::Small);
        assert_eq!(p.state().line_spacing, 6);
        assert_eq!(&out.written()[..3], &[29, 33, 0x11]);
    }

    #[test]
    fn test_test_page_schedules_long_busy_period() {
        let (mut p, out) = printer(268);
        p.test_page().unwrap();
        assert_eq!(out.written(), vec![18, 84]);
        assert!(p.resume_at() > Instant::now() + Duration::from_secs(15));
    }

    #[test]
    fn test_set_times_changes_model() {
        let (mut p, _) = printer(268);
        p.set_times(1000, 500);
        assert_eq!(p.timing().dot_print_time, Duration::from_millis(1));
        assert_eq!(p.timing().dot_feed_time, Duration::from_micros(500));
    }
}
