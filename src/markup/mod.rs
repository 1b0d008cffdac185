//! # Markup Adapters
//!
//! Lightweight markup languages rendered straight onto a [`ThermalPrinter`].
//! Each adapter turns its input into the same formatting calls a caller
//! would make by hand: size changes, bold, inverse, strike and text.
//!
//! ## Formats
//!
//! | Format | Syntax | Module |
//! |--------|--------|--------|
//! | `plain` | Text as is | - |
//! | `tag` | `[m]`, `[l]`, `[b]`, `[i]` line prefixes | [`tag`] |
//! | `markdown` | `#`/`##` headings, `*emphasis*` | [`markdown`] |
//! | `bbcode` | `[b]..[/b]`, `[s]`, `[m]`, `[l]` | [`bbcode`] |
//!
//! ## Example
//!
//! ```
//! use thermald::markup::Markup;
//! use thermald::printer::{PrinterConfig, ThermalPrinter};
//! use thermald::transport::MemoryTransport;
//!
//! let mut printer = ThermalPrinter::new(MemoryTransport::new(), PrinterConfig::default());
//! let markup: Markup = "tag".parse()?;
//! markup.render(&mut printer, "[l] Hello\nworld")?;
//! # Ok::<(), thermald::ThermalError>(())
//! ```

pub mod bbcode;
pub mod markdown;
pub mod tag;

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ThermalError};
use crate::printer::ThermalPrinter;
use crate::transport::Transport;

/// Input format of a text job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Markup {
    Plain,
    #[default]
    Tag,
    Markdown,
    BBCode,
}

impl Markup {
    pub const ALL: [Self; 4] = [Self::Plain, Self::Tag, Self::Markdown, Self::BBCode];

    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Tag => "tag",
            Self::Markdown => "markdown",
            Self::BBCode => "bbcode",
        }
    }

    /// Print `body` in this format.
    pub fn render<T: Transport>(self, printer: &mut ThermalPrinter<T>, body: &str) -> Result<()> {
        match self {
            Self::Plain => printer.write(body),
            Self::Tag => tag::render(printer, body),
            Self::Markdown => markdown::render(printer, body),
            Self::BBCode => bbcode::render(printer, body),
        }
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Markup {
    type Err = ThermalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| ThermalError::Config(format!("Bad format '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::PrinterConfig;
    use crate::transport::MemoryTransport;

    #[test]
    fn test_parse_formats() {
        assert_eq!("plain".parse::<Markup>().unwrap(), Markup::Plain);
        assert_eq!("TAG".parse::<Markup>().unwrap(), Markup::Tag);
        assert_eq!("markdown".parse::<Markup>().unwrap(), Markup::Markdown);
        assert_eq!("bbcode".parse::<Markup>().unwrap(), Markup::BBCode);
        assert!("html".parse::<Markup>().is_err());
    }

    #[test]
    fn test_default_is_tag() {
        assert_eq!(Markup::default(), Markup::Tag);
    }

    #[test]
    fn test_plain_is_verbatim() {
        let out = MemoryTransport::new();
        let mut printer = ThermalPrinter::new(out.clone(), PrinterConfig::default());
        Markup::Plain.render(&mut printer, "[b] not bold").unwrap();
        assert_eq!(out.written(), b"[b] not bold".to_vec());
    }
}
