//! Printer state mirrored on the host side.
//!
//! The printer never reports its cursor or mode, so the driver keeps its own
//! copy and uses it to predict line timing.

use crate::protocol::commands::LF;
use crate::protocol::text::{CHAR_HEIGHT, MAX_COLUMN, PrintMode, Size};

/// Default inter-line spacing after reset, in dots.
pub const DEFAULT_LINE_SPACING: u8 = 6;

/// Default barcode height after reset, in dots.
pub const DEFAULT_BARCODE_HEIGHT: u8 = 50;

/// How a line boundary should be timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// The line carried glyphs: it has to be printed.
    Text,
    /// Nothing since the last boundary: the paper only feeds.
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterState {
    /// Active print-mode flags
    pub mode: PrintMode,
    /// Last size selected with `GS !`
    pub size: Size,
    /// Glyph height in dots (24 or 48)
    pub char_height: u8,
    /// Glyphs per line (16 or 32)
    pub max_column: u8,
    /// Glyphs written since the last line boundary
    pub column: u8,
    /// Dots between lines on top of the glyph height
    pub line_spacing: u8,
    pub barcode_height: u8,
    /// Last logical byte written; a newline means the next boundary is blank
    pub prev_byte: u8,
}

impl Default for PrinterState {
    fn default() -> Self {
        Self {
            mode: PrintMode::empty(),
            size: Size::Small,
            char_height: CHAR_HEIGHT,
            max_column: MAX_COLUMN,
            column: 0,
            line_spacing: DEFAULT_LINE_SPACING,
            barcode_height: DEFAULT_BARCODE_HEIGHT,
            prev_byte: LF,
        }
    }
}

impl PrinterState {
    /// Restore power-on defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Re-derive glyph geometry after the mode mask changed.
    pub fn apply_mode(&mut self) {
        (self.char_height, self.max_column) = self.mode.dimensions();
    }

    /// Record a size change. The printer feeds a line when the size changes.
    pub fn apply_size(&mut self, size: Size) {
        self.size = size;
        (self.char_height, self.max_column) = size.dimensions();
        self.line_done();
    }

    /// Mark the cursor as sitting at the start of a fresh line.
    pub fn line_done(&mut self) {
        self.column = 0;
        self.prev_byte = LF;
    }

    /// Track one text byte. Returns the kind of line it closed, if any.
    ///
    /// A newline closes a line; so does the glyph that fills the last column.
    pub fn advance(&mut self, byte: u8) -> Option<LineKind> {
        let boundary = if byte == LF {
            true
        } else {
            self.column = self.column.saturating_add(1);
            self.column >= self.max_column
        };

        if !boundary {
            self.prev_byte = byte;
            return None;
        }

        let kind = if self.prev_byte == LF {
            LineKind::Blank
        } else {
            LineKind::Text
        };
        self.line_done();
        Some(kind)
    }

    /// Move to the next tab stop (every 4 columns).
    pub fn tab(&mut self) {
        self.column = self.column.saturating_add(4) & !3;
    }
}
