//! Cell: The atomic unit of terminal display.
//!
//! A cell holds one base codepoint, up to two combining marks, a foreground
//! and background [`Color`], and a set of [`Attrs`].
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Cell                                                        │
//! ├──────────┬───────────────┬──────────┬──────────┬─────────────┤
//! │  ch      │  combining    │  fg      │  bg      │  attrs      │
//! │  char    │  [char; 2]    │  Color   │  Color   │  u8 flags   │
//! └──────────┴───────────────┴──────────┴──────────┴─────────────┘
//! ```
//!
//! # Wide glyphs
//!
//! A double-width glyph occupies two cells: the base cell holding the glyph,
//! and a continuation cell (`ch == '\0'`) immediately to its right. A
//! continuation cell never carries a glyph or combining marks of its own.

use super::color::Color;
use bitflags::bitflags;
use unicode_width::UnicodeWidthChar;

/// Marker stored in `ch` for the second half of a wide glyph, and in empty
/// combining slots.
const NUL: char = '\0';

bitflags! {
    /// Text style attributes.
    ///
    /// These can be combined using bitwise OR.
    ///
    /// # Example
    /// ```
    /// use stratum::Attrs;
    /// let style = Attrs::BOLD | Attrs::ITALIC;
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrs: u8 {
        /// Bold text
        const BOLD = 0b0000_0001;
        /// Dim/faint text
        const DIM = 0b0000_0010;
        /// Italic text
        const ITALIC = 0b0000_0100;
        /// Underlined text
        const UNDERLINE = 0b0000_1000;
        /// Blinking text
        const BLINK = 0b0001_0000;
        /// Reversed colors (fg/bg swapped)
        const REVERSE = 0b0010_0000;
        /// Strikethrough text
        const STRIKETHROUGH = 0b0100_0000;
    }
}

impl std::fmt::Debug for Attrs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A single terminal cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Base codepoint, or `'\0'` for a wide-glyph continuation.
    ch: char,
    /// Combining marks attached to `ch`; `'\0'` marks an empty slot.
    combining: [char; 2],
    /// Foreground color.
    fg: Color,
    /// Background color.
    bg: Color,
    /// Style attributes.
    attrs: Attrs,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// An empty cell (space character with default colors).
    ///
    /// This is also the transparent cell: compositing skips it.
    pub const EMPTY: Self = Self {
        ch: ' ',
        combining: [NUL; 2],
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attrs::empty(),
    };

    /// Create a cell holding `ch` with default colors.
    #[inline]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            combining: [NUL; 2],
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attrs::empty(),
        }
    }

    /// Create a styled cell.
    #[inline]
    pub const fn styled(ch: char, fg: Color, bg: Color, attrs: Attrs) -> Self {
        Self {
            ch,
            combining: [NUL; 2],
            fg,
            bg,
            attrs,
        }
    }

    /// Create a wide-character continuation cell.
    ///
    /// This is placed after a wide CJK character that takes 2 columns.
    #[inline]
    pub const fn continuation() -> Self {
        Self::new(NUL)
    }

    /// Continuation cell for `base`, carrying the base's colors and attributes.
    #[inline]
    pub const fn continuation_of(base: &Self) -> Self {
        Self::styled(NUL, base.fg, base.bg, base.attrs)
    }

    /// Check if this is a wide-character continuation.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.ch == NUL
    }

    /// The base codepoint (`'\0'` for a continuation cell).
    #[inline]
    pub const fn ch(&self) -> char {
        self.ch
    }

    /// Display width in columns: 0 for a continuation, 2 for wide glyphs,
    /// otherwise 1 (control and zero-width characters included, they render
    /// as a blank).
    #[inline]
    pub fn width(&self) -> u8 {
        if self.is_continuation() {
            return 0;
        }
        match self.ch.width() {
            Some(2) => 2,
            _ => 1,
        }
    }

    /// Check if this is the base cell of a double-width glyph.
    #[inline]
    pub fn is_wide(&self) -> bool {
        self.width() == 2
    }

    /// Attach a combining mark.
    ///
    /// The mark goes into the first free slot. When both slots are taken it
    /// is dropped silently. Continuation cells never take marks.
    pub fn add_combining(&mut self, mark: char) {
        if self.is_continuation() || mark == NUL {
            return;
        }
        if let Some(slot) = self.combining.iter_mut().find(|slot| **slot == NUL) {
            *slot = mark;
        }
    }

    /// Iterate over the attached combining marks.
    #[inline]
    pub fn combining(&self) -> impl Iterator<Item = char> + '_ {
        self.combining.iter().copied().filter(|&c| c != NUL)
    }

    /// Check if any combining mark is attached.
    #[inline]
    pub const fn has_combining(&self) -> bool {
        self.combining[0] != NUL || self.combining[1] != NUL
    }

    /// Check if compositing may skip this cell.
    ///
    /// Transparent means: a space, default colors, no attributes and no
    /// combining marks. A continuation cell is never transparent.
    #[inline]
    pub fn is_transparent(&self) -> bool {
        *self == Self::EMPTY
    }

    /// A space carrying this cell's colors and attributes.
    ///
    /// Used wherever half of a wide glyph has to be dropped.
    #[inline]
    #[must_use]
    pub const fn blanked(&self) -> Self {
        Self::styled(' ', self.fg, self.bg, self.attrs)
    }

    /// Get the foreground color.
    #[inline]
    pub const fn fg(&self) -> Color {
        self.fg
    }

    /// Get the background color.
    #[inline]
    pub const fn bg(&self) -> Color {
        self.bg
    }

    /// Get the attributes.
    #[inline]
    pub const fn attrs(&self) -> Attrs {
        self.attrs
    }

    /// Set the foreground color.
    #[inline]
    pub const fn set_fg(&mut self, fg: Color) -> &mut Self {
        self.fg = fg;
        self
    }

    /// Set the background color.
    #[inline]
    pub const fn set_bg(&mut self, bg: Color) -> &mut Self {
        self.bg = bg;
        self
    }

    /// Set the attributes.
    #[inline]
    pub const fn set_attrs(&mut self, attrs: Attrs) -> &mut Self {
        self.attrs = attrs;
        self
    }

    /// Set the foreground color (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    /// Set the background color (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// Set the attributes (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Attach a combining mark (builder pattern).
    #[inline]
    #[must_use]
    pub fn with_combining(mut self, mark: char) -> Self {
        self.add_combining(mark);
        self
    }

    /// Reset the cell to empty (space with default colors).
    #[inline]
    pub const fn reset(&mut self) {
        *self = Self::EMPTY;
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("Cell");
        if self.is_continuation() {
            dbg.field("ch", &"<cont>");
        } else {
            dbg.field("ch", &self.ch);
        }
        if self.has_combining() {
            dbg.field("combining", &self.combining().collect::<String>());
        }
        dbg.field("fg", &self.fg)
            .field("bg", &self.bg)
            .field("attrs", &self.attrs)
            .finish()
    }
}
