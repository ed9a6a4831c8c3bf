//! `OutputBuffer`: Single-write output buffer for ANSI sequences.

use crate::buffer::{Attrs, Color};
use std::io::Write;

/// SGR parameter for each attribute, in emission order.
const ATTR_CODES: [(Attrs, &[u8]); 7] = [
    (Attrs::BOLD, b"1"),
    (Attrs::DIM, b"2"),
    (Attrs::ITALIC, b"3"),
    (Attrs::UNDERLINE, b"4"),
    (Attrs::BLINK, b"5"),
    (Attrs::REVERSE, b"7"),
    (Attrs::STRIKETHROUGH, b"9"),
];

/// Which side of the cell a color applies to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Layer {
    Fg,
    Bg,
}

impl Layer {
    /// SGR base for the basic colors 0..=7.
    const fn normal(self) -> u8 {
        match self {
            Self::Fg => 30,
            Self::Bg => 40,
        }
    }

    /// SGR base for the bright colors 8..=15.
    const fn bright(self) -> u8 {
        match self {
            Self::Fg => 90,
            Self::Bg => 100,
        }
    }

    /// SGR selector for extended colors.
    const fn extended(self) -> u8 {
        match self {
            Self::Fg => 38,
            Self::Bg => 48,
        }
    }
}

/// Pre-allocated buffer for building a frame of ANSI escape sequences.
///
/// A whole frame is accumulated here, then handed to the writer with a
/// single `write_all` so the terminal never sees half a frame.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse, keeping its allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a character as UTF-8.
    #[inline]
    pub fn write_char(&mut self, ch: char) {
        let mut utf8 = [0u8; 4];
        self.data.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    }

    /// Move cursor to (x, y), 0-indexed (`ESC[row;colH`, 1-indexed).
    #[inline]
    pub fn cursor_move(&mut self, x: u16, y: u16) {
        let _ = write!(self.data, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1);
    }

    /// Hide cursor.
    #[inline]
    pub fn cursor_hide(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25l");
    }

    /// Show cursor.
    #[inline]
    pub fn cursor_show(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25h");
    }

    /// Reset all attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
    }

    /// Erase the screen and home the cursor.
    #[inline]
    pub fn clear_screen(&mut self) {
        self.data.extend_from_slice(b"\x1b[2J\x1b[H");
    }

    /// Set each attribute in `attrs`, one SGR sequence per attribute.
    ///
    /// Attributes are only ever added; clearing them takes a reset.
    pub fn set_attrs(&mut self, attrs: Attrs) {
        for (flag, code) in ATTR_CODES {
            if attrs.contains(flag) {
                self.data.extend_from_slice(b"\x1b[");
                self.data.extend_from_slice(code);
                self.data.push(b'm');
            }
        }
    }

    /// Set the foreground color. `Color::Default` emits nothing.
    #[inline]
    pub fn set_fg(&mut self, color: Color) {
        self.set_color(color, Layer::Fg);
    }

    /// Set the background color. `Color::Default` emits nothing.
    #[inline]
    pub fn set_bg(&mut self, color: Color) {
        self.set_color(color, Layer::Bg);
    }

    fn set_color(&mut self, color: Color, layer: Layer) {
        match color {
            Color::Default => {}
            Color::Indexed(n) if n < 8 => {
                let _ = write!(self.data, "\x1b[{}m", layer.normal() + n);
            }
            Color::Indexed(n) if n < 16 => {
                let _ = write!(self.data, "\x1b[{}m", layer.bright() + n - 8);
            }
            Color::Indexed(n) => {
                let _ = write!(self.data, "\x1b[{};5;{n}m", layer.extended());
            }
            Color::Rgb(r, g, b) => {
                let _ = write!(self.data, "\x1b[{};2;{r};{g};{b}m", layer.extended());
            }
        }
    }

    /// Write the buffered frame in one `write_all`, then flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
