//! # Firmware Versions
//!
//! The printer's command set changed twice over its firmware history. The
//! driver is told which firmware it is talking to at construction time and
//! never probes for it.
//!
//! | Threshold | Changes |
//! |-----------|---------|
//! | ≥ 2.64 | `ESC d` feed works, new barcode numbering with length-prefixed data, 16-bit sleep timeout, tab stops, `ESC v` status |
//! | ≥ 2.68 | dedicated `GS B` inverse command (the INVERSE print-mode bit is ignored) |
//!
//! Versions are written as `major * 100 + minor`, so firmware 2.68 is `268`.

use std::fmt;
use std::str::FromStr;

use crate::error::ThermalError;

/// Firmware version as `major * 100 + minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Firmware(pub u16);

/// Protocol family selected by the ≥ 2.64 threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FirmwareFamily {
    /// Firmware before 2.64
    Legacy,
    /// Firmware 2.64 and later
    Modern,
}

impl Firmware {
    /// Firmware 2.68, the assumed default.
    pub const DEFAULT: Self = Self(268);

    /// First version with the modern command set.
    pub const MODERN: u16 = 264;

    /// First version with the dedicated inverse command.
    pub const INVERSE_COMMAND: u16 = 268;

    /// Whether the modern (≥ 2.64) command set is available.
    #[inline]
    pub fn is_modern(self) -> bool {
        self.0 >= Self::MODERN
    }

    /// Whether inverse printing uses `GS B n` rather than the mode mask.
    #[inline]
    pub fn has_inverse_command(self) -> bool {
        self.0 >= Self::INVERSE_COMMAND
    }

    /// The protocol family for table lookups.
    pub fn family(self) -> FirmwareFamily {
        if self.is_modern() {
            FirmwareFamily::Modern
        } else {
            FirmwareFamily::Legacy
        }
    }
}

impl Default for Firmware {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Firmware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Accepts either the packed form (`"268"`) or a dotted version (`"2.68"`,
/// `"2.5"`).
impl FromStr for Firmware {
    type Err = ThermalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ThermalError::Config(format!("Invalid firmware version: {}", s));

        if let Some((major, minor)) = s.split_once('.') {
            let major: u16 = major.parse().map_err(|_| invalid())?;
            // A one-digit minor is tenths, as on the label: "2.5" is 2.50.
            let minor: u16 = match minor.len() {
                _ if !minor.bytes().all(|b| b.is_ascii_digit()) => return Err(invalid()),
                1 => minor.parse::<u16>().map_err(|_| invalid())? * 10,
                2 => minor.parse().map_err(|_| invalid())?,
                _ => return Err(invalid()),
            };
            major
                .checked_mul(100)
                .and_then(|m| m.checked_add(minor))
                .map(Self)
                .ok_or_else(invalid)
        } else {
            s.parse().map(Self).map_err(|_| invalid())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert!(!Firmware(263).is_modern());
        assert!(Firmware(264).is_modern());
        assert!(!Firmware(267).has_inverse_command());
        assert!(Firmware(268).has_inverse_command());
    }

    #[test]
    fn test_family() {
        assert_eq!(Firmware(250).family(), FirmwareFamily::Legacy);
        assert_eq!(Firmware(264).family(), FirmwareFamily::Modern);
        assert_eq!(Firmware::default().family(), FirmwareFamily::Modern);
    }

    #[test]
    fn test_parse() {
        assert_eq!("268".parse::<Firmware>().unwrap(), Firmware(268));
        assert_eq!("2.64".parse::<Firmware>().unwrap(), Firmware(264));
        assert!("two".parse::<Firmware>().is_err());
        assert!("2.640".parse::<Firmware>().is_err());
        assert!("2.".parse::<Firmware>().is_err());
        assert!("2.+5".parse::<Firmware>().is_err());
    }

    #[test]
    fn test_parse_one_digit_minor_is_tenths() {
        assert_eq!(" 2.5 ".parse::<Firmware>().unwrap(), Firmware(250));
        assert_eq!("2.05".parse::<Firmware>().unwrap(), Firmware(205));
        assert!(!"2.6".parse::<Firmware>().unwrap().is_modern());
        assert!("2.7".parse::<Firmware>().unwrap().has_inverse_command());
    }

    #[test]
    fn test_display() {
        assert_eq!(Firmware(268).to_string(), "2.68");
        assert_eq!(Firmware(205).to_string(), "2.05");
    }
}
