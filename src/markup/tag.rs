//! Line-prefix tags.
//!
//! A line starting with `[m]`, `[l]`, `[b]` or `[i]` is printed medium,
//! large, bold or inverse. Whitespace after the tag is skipped, and the
//! style is switched off again at the end of the line. Any other line is
//! printed as is.
//!
//! ```text
//! [l] BIG TITLE
//! [b]bold line
//! plain line
//! ```

use crate::error::Result;
use crate::printer::ThermalPrinter;
use crate::protocol::text::Size;
use crate::transport::Transport;

/// Line styles, checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    Medium,
    Large,
    Bold,
    Inverse,
}

impl LineTag {
    const ALL: [Self; 4] = [Self::Medium, Self::Large, Self::Bold, Self::Inverse];

    fn marker(self) -> &'static str {
        match self {
            Self::Medium => "[m]",
            Self::Large => "[l]",
            Self::Bold => "[b]",
            Self::Inverse => "[i]",
        }
    }

    fn open<T: Transport>(self, printer: &mut ThermalPrinter<T>) -> Result<()> {
        match self {
            Self::Medium => printer.set_size(Size::Medium),
            Self::Large => printer.set_size(Size::Large),
            Self::Bold => printer.bold_on(),
            Self::Inverse => printer.inverse_on(),
        }
    }

    fn close<T: Transport>(self, printer: &mut ThermalPrinter<T>) -> Result<()> {
        match self {
            Self::Medium | Self::Large => printer.set_size(Size::Small),
            Self::Bold => printer.bold_off(),
            Self::Inverse => printer.inverse_off(),
        }
    }
}

/// Split a line into its tag and body, if it starts with a tag.
pub fn parse_line(line: &str) -> Option<(LineTag, &str)> {
    LineTag::ALL.into_iter().find_map(|tag| {
        line.strip_prefix(tag.marker())
            .map(|body| (tag, body.trim_start()))
    })
}

pub fn render<T: Transport>(printer: &mut ThermalPrinter<T>, body: &str) -> Result<()> {
    for line in body.lines() {
        match parse_line(line) {
            Some((tag, text)) => {
                tag.open(printer)?;
                printer.write(text)?;
                printer.write("\n")?;
                tag.close(printer)?;
            }
            None => {
                printer.write(line)?;
                printer.write("\n")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::PrinterConfig;
    use crate::transport::MemoryTransport;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("[m] hi"), Some((LineTag::Medium, "hi")));
        assert_eq!(parse_line("[l]hi"), Some((LineTag::Large, "hi")));
        assert_eq!(parse_line("[b]   x y"), Some((LineTag::Bold, "x y")));
        assert_eq!(parse_line("[i]"), Some((LineTag::Inverse, "")));
        assert_eq!(parse_line(" [b] indented"), None);
        assert_eq!(parse_line("[x] unknown"), None);
    }

    #[test]
    fn test_render_bytes() {
        let out = MemoryTransport::new();
        let mut printer = ThermalPrinter::new(out.clone(), PrinterConfig::default());
        render(&mut printer, "[b] hi\nyo").unwrap();

        let mut expected = vec![27, 33, 8];
        expected.extend(b"hi\n");
        expected.extend([27, 33, 0]);
        expected.extend(b"yo\n");
        assert_eq!(out.written(), expected);
    }

    #[test]
    fn test_large_line_returns_to_small() {
        let out = MemoryTransport::new();
        let mut printer = ThermalPrinter::new(out.clone(), PrinterConfig::default());
        render(&mut printer, "[l] TITLE").unwrap();

        let mut expected = vec![29, 33, 0x11];
        expected.extend(b"TITLE\n");
        expected.extend([29, 33, 0]);
        assert_eq!(out.written(), expected);
        assert_eq!(printer.state().max_column, 32);
    }
}
