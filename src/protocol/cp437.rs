//! # Code Page 437 Encoding
//!
//! Converts Unicode text to the printer's default code page (CP437, selected
//! with `ESC t 0`). ASCII passes through unchanged. Characters with no CP437
//! representation are dropped, never substituted.

/// Unicode characters for CP437 bytes 0x80-0xFF, in byte order.
const UPPER_HALF: [char; 128] = [
    // 0x80
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    // 0xA0
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    // 0xC0
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    // 0xD0
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    // 0xE0
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    // 0xF0
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

/// Encode a Unicode string as CP437 bytes, dropping unmappable characters.
///
/// ```
/// use thermald::protocol::cp437;
///
/// assert_eq!(cp437::encode("Café"), vec![b'C', b'a', b'f', 0x82]);
/// assert_eq!(cp437::encode("a★b"), vec![b'a', b'b']);
/// ```
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        match encode_char(ch) {
            Some(byte) => out.push(byte),
            None => tracing::debug!(
                "cp437: dropping unmapped character '{}' (U+{:04X})",
                ch,
                ch as u32
            ),
        }
    }
    out
}

/// Map one character to its CP437 byte.
pub fn encode_char(ch: char) -> Option<u8> {
    if ch.is_ascii() {
        return Some(ch as u8);
    }
    UPPER_HALF
        .iter()
        .position(|&c| c == ch)
        .map(|i| 0x80 + i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode("Hello, world!\n"), b"Hello, world!\n");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(encode(""), b"");
    }

    #[test]
    fn test_accented_latin() {
        assert_eq!(encode("ñ"), vec![0xA4]);
        assert_eq!(encode("é"), vec![0x82]);
        assert_eq!(encode("ü"), vec![0x81]);
        assert_eq!(encode("Ç"), vec![0x80]);
    }

    #[test]
    fn test_box_drawing() {
        assert_eq!(encode("┌──┐"), vec![0xDA, 0xC4, 0xC4, 0xBF]);
        assert_eq!(encode("╔═╗"), vec![0xC9, 0xCD, 0xBB]);
    }

    #[test]
    fn test_last_entries() {
        assert_eq!(encode("°"), vec![0xF8]);
        assert_eq!(encode("■"), vec![0xFE]);
        assert_eq!(encode("\u{00A0}"), vec![0xFF]);
    }

    #[test]
    fn test_unmapped_chars_dropped() {
        assert_eq!(encode("★"), Vec::<u8>::new());
        assert_eq!(encode("日本x"), vec![b'x']);
    }

    #[test]
    fn test_table_has_no_duplicates() {
        for (i, a) in UPPER_HALF.iter().enumerate() {
            assert!(!UPPER_HALF[i + 1..].contains(a), "duplicate {}", a);
        }
    }
}
