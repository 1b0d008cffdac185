//! Markdown rendered through `pulldown-cmark`.
//!
//! Only a small subset maps onto the printer:
//!
//! | Markdown | Printer |
//! |----------|---------|
//! | `# Heading` | Large |
//! | `## Heading` and deeper | Medium |
//! | `*emphasis*`, `**strong**` | Bold |
//! | List item | `- ` prefix |
//! | `---` | Dashed rule across the line |
//!
//! Text is reduced to ASCII. Every source line ends with a newline on paper.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

use crate::error::Result;
use crate::printer::ThermalPrinter;
use crate::protocol::commands::LF;
use crate::protocol::text::Size;
use crate::transport::Transport;

fn heading_size(level: HeadingLevel) -> Size {
    match level {
        HeadingLevel::H1 => Size::Large,
        _ => Size::Medium,
    }
}

fn ascii(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

/// Print a newline unless the cursor already sits at the start of a line.
fn end_line<T: Transport>(printer: &mut ThermalPrinter<T>) -> Result<()> {
    if printer.state().prev_byte != LF {
        printer.write("\n")?;
    }
    Ok(())
}

pub fn render<T: Transport>(printer: &mut ThermalPrinter<T>, body: &str) -> Result<()> {
    // Emphasis can nest inside strong; bold stays on until the outermost closes.
    let mut bold_depth = 0usize;

    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => printer.set_size(heading_size(level))?,
            Event::End(TagEnd::Heading(_)) => {
                printer.write("\n")?;
                printer.set_size(Size::Small)?;
            }
            Event::Start(Tag::Strong | Tag::Emphasis) => {
                if bold_depth == 0 {
                    printer.bold_on()?;
                }
                bold_depth += 1;
            }
            Event::End(TagEnd::Strong | TagEnd::Emphasis) => {
                bold_depth = bold_depth.saturating_sub(1);
                if bold_depth == 0 {
                    printer.bold_off()?;
                }
            }
            Event::Start(Tag::Item) => printer.write("- ")?,
            Event::End(TagEnd::Paragraph) => printer.write("\n")?,
            Event::End(TagEnd::Item | TagEnd::CodeBlock) => end_line(printer)?,
            Event::Text(text) | Event::Code(text) => printer.write(&ascii(&text))?,
            Event::SoftBreak | Event::HardBreak => printer.write("\n")?,
            Event::Rule => {
                let rule = "-".repeat(printer.state().max_column as usize);
                printer.write(&rule)?;
                end_line(printer)?;
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::PrinterConfig;
    use crate::transport::MemoryTransport;
    use pretty_assertions::assert_eq;

    fn rendered(body: &str) -> Vec<u8> {
        let out = MemoryTransport::new();
        let mut printer = ThermalPrinter::new(out.clone(), PrinterConfig::default());
        render(&mut printer, body).unwrap();
        out.written()
    }

    #[test]
    fn test_h1_is_large() {
        let mut expected = vec![29, 33, 0x11];
        expected.extend(b"Title\n");
        expected.extend([29, 33, 0]);
        assert_eq!(rendered("# Title"), expected);
    }

    #[test]
    fn test_h2_is_medium() {
        let mut expected = vec![29, 33, 0x01];
        expected.extend(b"Sub\n");
        expected.extend([29, 33, 0]);
        assert_eq!(rendered("## Sub"), expected);
    }

    #[test]
    fn test_emphasis_is_bold() {
        let mut expected = vec![27, 33, 8];
        expected.extend(b"loud");
        expected.extend([27, 33, 0]);
        expected.extend(b"\n");
        assert_eq!(rendered("*loud*"), expected);
    }

    #[test]
    fn test_nested_emphasis_toggles_once() {
        let bytes = rendered("***both***");
        let toggles = bytes.windows(2).filter(|w| w == &[27, 33]).count();
        assert_eq!(toggles, 2);
    }

    #[test]
    fn test_each_line_ends_with_newline() {
        assert_eq!(rendered("one\ntwo"), b"one\ntwo\n".to_vec());
    }

    #[test]
    fn test_non_ascii_dropped() {
        assert_eq!(rendered("naïve"), b"nave\n".to_vec());
    }

    #[test]
    fn test_list_items() {
        assert_eq!(rendered("- a\n- b"), b"- a\n- b\n".to_vec());
    }
}
