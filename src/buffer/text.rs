//! Text decoding and codepoint classification for [`Buffer::print`].
//!
//! [`Buffer::print`]: super::Buffer::print

use std::str::Chars;
use unicode_width::UnicodeWidthChar;

/// How a decoded codepoint lands in the grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Glyph {
    /// Occupies `width` (1 or 2) cells.
    Base(char, u8),
    /// Zero-width mark attached to the previous base cell.
    Mark(char),
    /// Control or format character; consumes no cell.
    Skip,
}

/// Classify a codepoint for grid layout.
pub(crate) fn classify(c: char) -> Glyph {
    match c.width() {
        None => Glyph::Skip,
        Some(0) if is_format(c) => Glyph::Skip,
        Some(0) => Glyph::Mark(c),
        Some(2) => Glyph::Base(c, 2),
        Some(_) => Glyph::Base(c, 1),
    }
}

/// Zero-width format characters that must not attach to a glyph.
const fn is_format(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{2028}'..='\u{202E}'
            | '\u{2060}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
    )
}

/// Lossy UTF-8 decoder.
///
/// Each invalid sequence yields a single U+FFFD and consumes only the bytes
/// that cannot start a valid sequence, so decoding resynchronizes on the
/// next valid character.
pub(crate) struct Decoder<'a> {
    valid: Chars<'a>,
    rest: &'a [u8],
    replacement: bool,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            valid: "".chars(),
            rest: bytes,
            replacement: false,
        }
    }
}

impl Iterator for Decoder<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(c) = self.valid.next() {
                return Some(c);
            }
            if self.replacement {
                self.replacement = false;
                return Some(char::REPLACEMENT_CHARACTER);
            }
            if self.rest.is_empty() {
                return None;
            }
            match std::str::from_utf8(self.rest) {
                Ok(s) => {
                    self.valid = s.chars();
                    self.rest = &[];
                }
                Err(err) => {
                    let (valid, invalid) = self.rest.split_at(err.valid_up_to());
                    self.valid = std::str::from_utf8(valid).unwrap_or_default().chars();
                    let skip = err.error_len().unwrap_or(invalid.len());
                    self.rest = &invalid[skip..];
                    self.replacement = true;
                }
            }
        }
    }
}
