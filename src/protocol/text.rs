//! # Text Styling Commands
//!
//! This module implements text formatting commands and the print-mode mask.
//!
//! ## Text Styling Overview
//!
//! | Style | Command | Effect |
//! |-------|---------|--------|
//! | Print mode | ESC ! n | Bold, double width/height, upside down, strike, inverse (old firmware) |
//! | Inverse | GS B n | White on black (firmware ≥ 2.68) |
//! | Size | GS ! n | Small / medium / large glyphs |
//! | Underline | ESC - n | None, thin or thick underline |
//! | Justify | ESC a n | Left / center / right |
//!
//! ## Glyph Geometry
//!
//! The standard font is 12×24 dots, giving 32 columns on the 384-dot head.
//!
//! ```text
//! Normal         24 dots tall, 32 columns
//! Double height  48 dots tall, 32 columns
//! Double width   24 dots tall, 16 columns
//! Large          48 dots tall, 16 columns
//! ```

use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use super::commands::{ESC, GS};
use super::firmware::Firmware;

/// Glyph height of the standard font, in dots.
pub const CHAR_HEIGHT: u8 = 24;

/// Columns per line with the standard font.
pub const MAX_COLUMN: u8 = 32;

/// Smallest `ESC 3` line height; anything above it is inter-line spacing.
pub const MIN_LINE_HEIGHT: u8 = 24;

/// Highest character set index accepted by `ESC R`.
pub const MAX_CHARSET: u8 = 15;

/// Highest code page index accepted by `ESC t`.
pub const MAX_CODE_PAGE: u8 = 47;

// ============================================================================
// PRINT MODE MASK
// ============================================================================

/// Set of text decorations sent together with `ESC ! n`.
///
/// Bits persist until cleared and are independent of [`Size`].
///
/// ```
/// use thermald::protocol::text::PrintMode;
///
/// let mode = PrintMode::BOLD | PrintMode::DOUBLE_WIDTH;
/// assert_eq!(mode.bits(), 0b0010_1000);
/// assert_eq!(mode.dimensions(), (24, 16));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PrintMode(u8);

impl PrintMode {
    /// White on black. Ignored by firmware 2.68, which uses `GS B`.
    pub const INVERSE: Self = Self(1 << 1);
    /// Rotate 180°.
    pub const UPSIDE_DOWN: Self = Self(1 << 2);
    pub const BOLD: Self = Self(1 << 3);
    pub const DOUBLE_HEIGHT: Self = Self(1 << 4);
    pub const DOUBLE_WIDTH: Self = Self(1 << 5);
    pub const STRIKE: Self = Self(1 << 6);

    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// `(char_height, max_column)` implied by the double height/width bits.
    pub fn dimensions(self) -> (u8, u8) {
        let height = if self.contains(Self::DOUBLE_HEIGHT) {
            CHAR_HEIGHT * 2
        } else {
            CHAR_HEIGHT
        };
        let columns = if self.contains(Self::DOUBLE_WIDTH) {
            MAX_COLUMN / 2
        } else {
            MAX_COLUMN
        };
        (height, columns)
    }
}

impl BitOr for PrintMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PrintMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

/// # Select Print Mode (ESC ! n)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC ! n |
/// | Decimal | 27 33 n |
///
/// The whole mask is sent every time, so the printer always mirrors the
/// driver's view of the active decorations.
#[inline]
pub fn print_mode(mode: PrintMode) -> Vec<u8> {
    vec![ESC, b'!', mode.bits()]
}

/// # Inverse Printing (GS B n)
///
/// Only firmware 2.68 and later; older firmware folds inverse into the
/// print-mode mask. Returns `None` when the firmware has no such command.
pub fn inverse(firmware: Firmware, enabled: bool) -> Option<Vec<u8>> {
    firmware
        .has_inverse_command()
        .then(|| vec![GS, b'B', enabled as u8])
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// Character size presets for `GS ! n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Size {
    /// Standard width and height
    #[default]
    Small,
    /// Double height
    Medium,
    /// Double width and height
    Large,
}

impl Size {
    /// The `GS !` parameter byte.
    pub fn code(self) -> u8 {
        match self {
            Self::Small => 0x00,
            Self::Medium => 0x01,
            Self::Large => 0x11,
        }
    }

    /// `(char_height, max_column)` implied by this size.
    pub fn dimensions(self) -> (u8, u8) {
        match self {
            Self::Small => (CHAR_HEIGHT, MAX_COLUMN),
            Self::Medium => (CHAR_HEIGHT * 2, MAX_COLUMN),
            Self::Large => (CHAR_HEIGHT * 2, MAX_COLUMN / 2),
        }
    }
}

/// `"L"` and `"M"` (any case) select large and medium; anything else is small.
impl FromStr for Size {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LARGE" => Self::Large,
            "M" | "MEDIUM" => Self::Medium,
            _ => Self::Small,
        })
    }
}

/// # Select Character Size (GS ! n)
///
/// | Size | n |
/// |------|------|
/// | Small | 0x00 |
/// | Medium | 0x01 |
/// | Large | 0x11 |
///
/// The printer emits a line feed when the size changes.
#[inline]
pub fn size(size: Size) -> Vec<u8> {
    vec![GS, b'!', size.code()]
}

// ============================================================================
// UNDERLINE, JUSTIFICATION, SPACING
// ============================================================================

/// # Underline (ESC - n)
///
/// - `0`: off
/// - `1`: thin underline
/// - `2`: thick underline
///
/// Weights above 2 are clamped to 2.
#[inline]
pub fn underline(weight: u8) -> Vec<u8> {
    vec![ESC, b'-', weight.min(2)]
}

/// Text justification options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Justify {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// `"C"` and `"R"` (any case) select center and right; anything else is left.
impl FromStr for Justify {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "C" | "CENTER" => Self::Center,
            "R" | "RIGHT" => Self::Right,
            _ => Self::Left,
        })
    }
}

/// # Justification (ESC a n)
///
/// Takes effect at the start of the next line.
#[inline]
pub fn justify(justify: Justify) -> Vec<u8> {
    vec![ESC, b'a', justify as u8]
}

/// # Line Height (ESC 3 n)
///
/// The printer does not account for the glyph height, so this is really
/// inter-line spacing plus 24. Values below 24 are raised to 24. The
/// default of 32 means 24-dot glyphs with 8 dots of spacing.
#[inline]
pub fn line_height(val: u8) -> Vec<u8> {
    vec![ESC, b'3', val.max(MIN_LINE_HEIGHT)]
}

/// # Character Spacing (ESC SP n)
#[inline]
pub fn char_spacing(spacing: u8) -> Vec<u8> {
    vec![ESC, b' ', spacing]
}

// ============================================================================
// CHARACTER SETS
// ============================================================================

/// # International Character Set (ESC R n)
///
/// Swaps a handful of glyphs in the 0x23-0x7E range (USA = 0, France = 1,
/// Germany = 2, UK = 3, ... China = 15). Clamped to 15.
#[inline]
pub fn charset(val: u8) -> Vec<u8> {
    vec![ESC, b'R', val.min(MAX_CHARSET)]
}

/// # Code Page (ESC t n)
///
/// Selects glyphs for bytes 0x80-0xFF (CP437 = 0, CP850 = 2, WCP1252 = 16,
/// ... CP874 = 47). Clamped to 47.
#[inline]
pub fn code_page(val: u8) -> Vec<u8> {
    vec![ESC, b't', val.min(MAX_CODE_PAGE)]
}
