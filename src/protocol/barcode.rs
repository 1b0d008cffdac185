//! # 1D Barcode Commands
//!
//! This module implements barcode printing for the serial thermal printer.
//!
//! ## Print Sequence
//!
//! ```text
//! GS H 2        HRI label below the barcode
//! GS w 3        module width 3
//! GS k n        barcode type n
//! data...       firmware-specific framing (see below)
//! ```
//!
//! ## Firmware Families
//!
//! The two firmware families number symbologies differently and support
//! different subsets. Each family has its own immutable table; a symbology
//! missing from the active table is skipped without error.
//!
//! | Symbology | ≥ 2.64 | < 2.64 |
//! |-----------|--------|--------|
//! | UPC-A | 65 | 0 |
//! | UPC-E | 66 | 1 |
//! | EAN13 | 67 | 2 |
//! | EAN8 | 68 | 3 |
//! | CODE39 | 69 | 4 |
//! | ITF | 70 | - |
//! | CODABAR | 71 | - |
//! | CODE93 | 72 | 7 |
//! | CODE128 | 73 | 8 |
//! | I25 | - | 5 |
//! | CODEBAR | - | 6 |
//! | CODE11 | - | 9 |
//! | MSI | - | 10 |
//!
//! ## Data Framing
//!
//! - **≥ 2.64**: one length byte, then the data (at most 255 bytes, no terminator)
//! - **< 2.64**: the data with non-ASCII bytes removed, then NUL

use std::str::FromStr;

use super::commands::GS;
use super::firmware::{Firmware, FirmwareFamily};
use crate::error::ThermalError;

/// Barcode symbologies known to either firmware family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    /// UPC-A (11-12 digits)
    UpcA,
    /// UPC-E (6-8 digits)
    UpcE,
    /// EAN-13 / JAN-13
    Ean13,
    /// EAN-8 / JAN-8
    Ean8,
    /// Code 39 (A-Z, 0-9, space, -.$/%+)
    Code39,
    /// Interleaved 2 of 5 as numbered by firmware 2.64+
    Itf,
    /// Codabar / NW-7 as numbered by firmware 2.64+
    Codabar,
    /// Code 93
    Code93,
    /// Code 128 (full ASCII)
    Code128,
    /// Code 11 (legacy firmware only)
    Code11,
    /// MSI Plessey (legacy firmware only)
    Msi,
    /// Interleaved 2 of 5 as numbered by legacy firmware
    I25,
    /// Codabar as numbered by legacy firmware
    Codebar,
}

/// Type codes for firmware 2.64 and later.
const MODERN_CODES: &[(Symbology, u8)] = &[
    (Symbology::UpcA, 65),
    (Symbology::UpcE, 66),
    (Symbology::Ean13, 67),
    (Symbology::Ean8, 68),
    (Symbology::Code39, 69),
    (Symbology::Itf, 70),
    (Symbology::Codabar, 71),
    (Symbology::Code93, 72),
    (Symbology::Code128, 73),
];

/// Type codes for firmware before 2.64.
const LEGACY_CODES: &[(Symbology, u8)] = &[
    (Symbology::UpcA, 0),
    (Symbology::UpcE, 1),
    (Symbology::Ean13, 2),
    (Symbology::Ean8, 3),
    (Symbology::Code39, 4),
    (Symbology::I25, 5),
    (Symbology::Codebar, 6),
    (Symbology::Code93, 7),
    (Symbology::Code128, 8),
    (Symbology::Code11, 9),
    (Symbology::Msi, 10),
];

impl Symbology {
    /// All symbologies, in table order.
    pub const ALL: [Self; 13] = [
        Self::UpcA,
        Self::UpcE,
        Self::Ean13,
        Self::Ean8,
        Self::Code39,
        Self::Itf,
        Self::Codabar,
        Self::Code93,
        Self::Code128,
        Self::Code11,
        Self::Msi,
        Self::I25,
        Self::Codebar,
    ];

    /// Type code for `GS k` in the given family, or `None` if unsupported.
    pub fn code(self, family: FirmwareFamily) -> Option<u8> {
        let table = match family {
            FirmwareFamily::Modern => MODERN_CODES,
            FirmwareFamily::Legacy => LEGACY_CODES,
        };
        table
            .iter()
            .find(|(symbology, _)| *symbology == self)
            .map(|(_, code)| *code)
    }

    /// Lowercase name used on the command line and in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::UpcA => "upc-a",
            Self::UpcE => "upc-e",
            Self::Ean13 => "ean13",
            Self::Ean8 => "ean8",
            Self::Code39 => "code39",
            Self::Itf => "itf",
            Self::Codabar => "codabar",
            Self::Code93 => "code93",
            Self::Code128 => "code128",
            Self::Code11 => "code11",
            Self::Msi => "msi",
            Self::I25 => "i25",
            Self::Codebar => "codebar",
        }
    }
}

impl FromStr for Symbology {
    type Err = ThermalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|sym| sym.name() == wanted || sym.name().replace('-', "") == wanted)
            .ok_or_else(|| ThermalError::Config(format!("Unknown barcode type '{}'", s)))
    }
}

/// # Barcode Height (GS h n)
///
/// Height in dots, 1-255. Zero is raised to 1.
#[inline]
pub fn height(val: u8) -> Vec<u8> {
    vec![GS, b'h', val.max(1)]
}

/// # Barcode Header (GS H 2, GS w 3, GS k n)
///
/// Label below, module width 3, then the type code. Sent as one unit.
///
/// ```
/// use thermald::protocol::barcode;
///
/// assert_eq!(barcode::header(73), vec![29, 72, 2, 29, 119, 3, 29, 107, 73]);
/// ```
pub fn header(type_code: u8) -> Vec<u8> {
    vec![GS, b'H', 2, GS, b'w', 3, GS, b'k', type_code]
}

/// Frame barcode data for the given firmware.
///
/// ```
/// use thermald::protocol::{barcode, Firmware};
///
/// assert_eq!(barcode::payload(Firmware(268), "123"), vec![3, b'1', b'2', b'3']);
/// assert_eq!(barcode::payload(Firmware(250), "123"), vec![b'1', b'2', b'3', 0]);
/// ```
pub fn payload(firmware: Firmware, text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    if firmware.is_modern() {
        let len = bytes.len().min(255);
        let mut out = Vec::with_capacity(len + 1);
        out.push(len as u8);
        out.extend_from_slice(&bytes[..len]);
        out
    } else {
        let mut out: Vec<u8> = bytes.iter().copied().filter(u8::is_ascii).collect();
        out.push(0);
        out
    }
}
