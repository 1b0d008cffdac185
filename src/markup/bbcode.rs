//! BBCode rendering.
//!
//! Supported tags, case-insensitive:
//!
//! | Tag | Open | Close |
//! |-----|------|-------|
//! | `[b]` | bold on | bold off |
//! | `[s]` | strike on | strike off |
//! | `[m]` | medium size | small size |
//! | `[l]` | large size | small size |
//!
//! Anything in brackets that is not one of these is printed literally, and
//! unbalanced tags are simply applied in order.

use crate::error::Result;
use crate::printer::ThermalPrinter;
use crate::protocol::text::Size;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Bold,
    Strike,
    Medium,
    Large,
}

impl Style {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "b" => Some(Self::Bold),
            "s" => Some(Self::Strike),
            "m" => Some(Self::Medium),
            "l" => Some(Self::Large),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Open(Style),
    Close(Style),
    Newline,
    Text(&'a str),
}

/// Split input into tags, newlines and text runs.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let next = rest.find(['[', '\n', '\r']).unwrap_or(rest.len());
        if next > 0 {
            tokens.push(Token::Text(&rest[..next]));
            rest = &rest[next..];
            continue;
        }

        if let Some(after) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
            tokens.push(Token::Newline);
            rest = after;
            continue;
        }
        if let Some(after) = rest.strip_prefix('\r') {
            tokens.push(Token::Newline);
            rest = after;
            continue;
        }

        // `rest` starts with '['
        match parse_tag(rest) {
            Some((token, len)) => {
                tokens.push(token);
                rest = &rest[len..];
            }
            None => {
                tokens.push(Token::Text(&rest[..1]));
                rest = &rest[1..];
            }
        }
    }

    tokens
}

/// Parse a known tag at the start of `s`, returning it and its length.
fn parse_tag(s: &str) -> Option<(Token<'static>, usize)> {
    let end = s.find(']')?;
    let inner = &s[1..end];
    if inner.contains('[') {
        return None;
    }
    let (closing, name) = match inner.strip_prefix('/') {
        Some(name) => (true, name),
        None => (false, inner),
    };
    let style = Style::from_name(name.trim())?;
    let token = if closing {
        Token::Close(style)
    } else {
        Token::Open(style)
    };
    Some((token, end + 1))
}

fn apply<T: Transport>(printer: &mut ThermalPrinter<T>, style: Style, open: bool) -> Result<()> {
    match (style, open) {
        (Style::Bold, true) => printer.bold_on(),
        (Style::Bold, false) => printer.bold_off(),
        (Style::Strike, true) => printer.strike_on(),
        (Style::Strike, false) => printer.strike_off(),
        (Style::Medium, true) => printer.set_size(Size::Medium),
        (Style::Large, true) => printer.set_size(Size::Large),
        (Style::Medium | Style::Large, false) => printer.set_size(Size::Small),
    }
}

pub fn render<T: Transport>(printer: &mut ThermalPrinter<T>, body: &str) -> Result<()> {
    for token in tokenize(body) {
        match token {
            Token::Open(style) => apply(printer, style, true)?,
            Token::Close(style) => apply(printer, style, false)?,
            Token::Newline => printer.write("\n")?,
            Token::Text(text) => printer.write(text)?,
        }
    }
    Ok(())
}
