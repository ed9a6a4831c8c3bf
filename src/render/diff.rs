//! Diffing Engine: Generate minimal ANSI sequences from buffer changes.
//!
//! This module implements the core anti-flicker logic:
//! 1. Compare the front (on screen) and back (desired) buffers
//! 2. Emit glyphs only for cells that changed
//! 3. Skip cursor moves when the next cell follows the last one written
//! 4. Track the emitted style to avoid redundant SGR sequences
//!
//! Continuation cells are never emitted on their own: the terminal fills
//! them when their base glyph is written.

use super::output::OutputBuffer;
use crate::buffer::{Attrs, Buffer, Cell, Color, ColorDepth};
use unicode_width::UnicodeWidthChar;

/// Style as it reaches the terminal, after color downgrade.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Style {
    fg: Color,
    bg: Color,
    attrs: Attrs,
}

impl Style {
    const fn of(cell: &Cell, depth: ColorDepth) -> Self {
        Self {
            fg: cell.fg().downgrade(depth),
            bg: cell.bg().downgrade(depth),
            attrs: cell.attrs(),
        }
    }
}

/// Terminal state as known while building one frame.
///
/// Tracks where the cursor is and which style is active, so sequences are
/// only emitted when something actually changes.
#[derive(Debug, Clone)]
pub struct DiffState {
    /// Color depth colors are downgraded to before emission.
    depth: ColorDepth,
    /// Cursor position, `None` when unknown.
    cursor: Option<(u16, u16)>,
    /// Last emitted style, `None` when unknown.
    style: Option<Style>,
}

impl DiffState {
    /// Create a diff state with unknown cursor and style.
    pub const fn new(depth: ColorDepth) -> Self {
        Self {
            depth,
            cursor: None,
            style: None,
        }
    }

    /// Forget the cursor position and style (e.g. after a screen clear).
    pub const fn reset(&mut self) {
        self.cursor = None;
        self.style = None;
    }
}

/// Statistics about one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Glyphs written (a wide glyph counts once).
    pub cells_emitted: usize,
    /// Cursor position sequences emitted for cell content.
    pub cursor_moves: usize,
    /// Style changes (reset plus reapply) emitted.
    pub sgr_changes: usize,
    /// Total bytes handed to the writer.
    pub bytes: usize,
}

/// Erase the screen and draw every cell of `buffer`.
///
/// Each row starts with an explicit cursor move, so the result does not
/// depend on how the terminal wraps lines.
pub fn render_full(buffer: &Buffer, output: &mut OutputBuffer, state: &mut DiffState, stats: &mut FlushStats) {
    output.clear_screen();
    state.reset();
    state.cursor = Some((0, 0));

    for (y, row) in (0..buffer.height()).zip(buffer.rows()) {
        for (x, cell) in (0..buffer.width()).zip(row) {
            if cell.is_continuation() {
                continue;
            }
            emit_cell(output, state, stats, x, y, cell, x == 0);
        }
    }
}

/// Draw the cells of `back` that differ from `front`.
///
/// A wide glyph is re-emitted when either of its halves changed: the
/// terminal only repaints the continuation column by writing the base.
/// Both buffers must have the same dimensions; use [`render_full`]
/// otherwise.
pub fn render_diff(
    front: &Buffer,
    back: &Buffer,
    output: &mut OutputBuffer,
    state: &mut DiffState,
    stats: &mut FlushStats,
) {
    debug_assert_eq!(front.size(), back.size());

    for (y, (old_row, new_row)) in (0..back.height()).zip(front.rows().zip(back.rows())) {
        for (x, new) in (0..back.width()).zip(new_row) {
            if new.is_continuation() {
                continue;
            }
            let i = usize::from(x);
            let changed = old_row.get(i) != Some(new)
                || (new.is_wide() && old_row.get(i + 1) != new_row.get(i + 1));
            if changed {
                emit_cell(output, state, stats, x, y, new, false);
            }
        }
    }
}

/// Emit one cell at (x, y), moving the cursor and switching style as needed.
fn emit_cell(
    output: &mut OutputBuffer,
    state: &mut DiffState,
    stats: &mut FlushStats,
    x: u16,
    y: u16,
    cell: &Cell,
    force_move: bool,
) {
    if force_move || state.cursor != Some((x, y)) {
        output.cursor_move(x, y);
        stats.cursor_moves += 1;
    }

    let style = Style::of(cell, state.depth);
    if state.style != Some(style) {
        output.reset_attrs();
        output.set_attrs(style.attrs);
        output.set_fg(style.fg);
        output.set_bg(style.bg);
        state.style = Some(style);
        stats.sgr_changes += 1;
    }

    emit_glyph(output, cell);
    stats.cells_emitted += 1;

    // Past the right edge the terminal's cursor position is not portable.
    state.cursor = x
        .checked_add(u16::from(cell.width()))
        .map(|next| (next, y));
}

/// Emit the glyph and its combining marks. A base that would not advance
/// the terminal by one or two columns (controls, marks, format characters)
/// becomes a space.
#[inline]
fn emit_glyph(output: &mut OutputBuffer, cell: &Cell) {
    let ch = cell.ch();
    if !matches!(ch.width(), Some(1 | 2)) {
        output.write_raw(b" ");
        return;
    }
    output.write_char(ch);
    for mark in cell.combining() {
        output.write_char(mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;

    fn diff(front: &Buffer, back: &Buffer) -> (String, FlushStats) {
        let mut output = OutputBuffer::new();
        let mut state = DiffState::new(ColorDepth::TrueColor);
        let mut stats = FlushStats::default();
        render_diff(front, back, &mut output, &mut state, &mut stats);
        (String::from_utf8(output.as_bytes().to_vec()).unwrap(), stats)
    }

    #[test]
    fn test_diff_identical_buffers() {
        let a = Buffer::new(10, 5).unwrap();
        let b = Buffer::new(10, 5).unwrap();
        let (out, stats) = diff(&a, &b);
        assert_eq!(stats.cells_emitted, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_diff_single_cell_change() {
        let a = Buffer::new(10, 5).unwrap();
        let mut b = Buffer::new(10, 5).unwrap();
        b.set(5, 2, Cell::new('X'));

        let (out, stats) = diff(&a, &b);
        assert_eq!(stats.cells_emitted, 1);
        assert_eq!(stats.cursor_moves, 1);
        assert_eq!(out, "\x1b[3;6H\x1b[0mX");
    }

    #[test]
    fn test_diff_adjacent_cells_share_cursor_move() {
        let a = Buffer::new(10, 5).unwrap();
        let mut b = Buffer::new(10, 5).unwrap();
        b.set(0, 1, Cell::new('A'));
        b.set(1, 1, Cell::new('B'));
        b.set(2, 1, Cell::new('C'));

        let (out, stats) = diff(&a, &b);
        assert_eq!(stats.cells_emitted, 3);
        assert_eq!(stats.cursor_moves, 1);
        assert!(out.ends_with("ABC"));
    }

    #[test]
    fn test_diff_gap_needs_cursor_move() {
        let a = Buffer::new(10, 1).unwrap();
        let mut b = Buffer::new(10, 1).unwrap();
        b.set(0, 0, Cell::new('A'));
        b.set(5, 0, Cell::new('B'));

        let (_, stats) = diff(&a, &b);
        assert_eq!(stats.cursor_moves, 2);
    }

    #[test]
    fn test_diff_style_tracking() {
        let a = Buffer::new(10, 1).unwrap();
        let mut b = Buffer::new(10, 1).unwrap();
        let red = Color::rgb(255, 0, 0);
        b.set(0, 0, Cell::new('A').with_fg(red));
        b.set(1, 0, Cell::new('B').with_fg(red));
        b.set(2, 0, Cell::new('C').with_attrs(Attrs::BOLD));

        let (out, stats) = diff(&a, &b);
        assert_eq!(stats.sgr_changes, 2);
        assert_eq!(out, "\x1b[1;1H\x1b[0m\x1b[38;2;255;0;0mAB\x1b[0m\x1b[1mC");
    }

    #[test]
    fn test_diff_downgrades_colors() {
        let a = Buffer::new(2, 1).unwrap();
        let mut b = Buffer::new(2, 1).unwrap();
        b.set(0, 0, Cell::new('A').with_fg(Color::rgb(255, 0, 0)));

        let mut output = OutputBuffer::new();
        let mut state = DiffState::new(ColorDepth::Basic);
        let mut stats = FlushStats::default();
        render_diff(&a, &b, &mut output, &mut state, &mut stats);
        assert_eq!(output.as_bytes(), b"\x1b[1;1H\x1b[0m\x1b[91mA");
    }

    #[test]
    fn test_diff_wide_glyph_emitted_once() {
        let a = Buffer::new(6, 1).unwrap();
        let mut b = Buffer::new(6, 1).unwrap();
        b.print(0, 0, "日x", Color::Default, Color::Default, Attrs::empty());

        let (out, stats) = diff(&a, &b);
        assert_eq!(stats.cells_emitted, 2);
        assert_eq!(stats.cursor_moves, 1);
        assert_eq!(out, "\x1b[1;1H\x1b[0m日x");
    }

    #[test]
    fn test_diff_reemits_base_when_continuation_changed() {
        let mut back = Buffer::new(4, 1).unwrap();
        assert!(back.set_wide(0, 0, Cell::new('日')));
        // Same base glyph, but the terminal shows a different second half.
        let mut front = back.clone();
        front.put(1, 0, Cell::continuation().with_bg(Color::RED));

        let (out, stats) = diff(&front, &back);
        assert_eq!(stats.cells_emitted, 1);
        assert_eq!(out, "\x1b[1;1H\x1b[0m日");
    }

    #[test]
    fn test_diff_control_char_emitted_as_space() {
        let a = Buffer::new(2, 1).unwrap();
        let mut b = Buffer::new(2, 1).unwrap();
        b.set(0, 0, Cell::new('\x07'));
        let (out, _) = diff(&a, &b);
        assert_eq!(out, "\x1b[1;1H\x1b[0m ");
    }

    #[test]
    fn test_diff_zero_width_base_emitted_as_space() {
        let a = Buffer::new(4, 1).unwrap();
        let mut b = Buffer::new(4, 1).unwrap();
        b.set(1, 0, Cell::new('a'));
        b.set(2, 0, Cell::new('\u{200B}'));
        b.set(3, 0, Cell::new('\u{301}'));
        let (out, stats) = diff(&a, &b);
        assert_eq!(stats.cells_emitted, 3);
        assert_eq!(out, "\x1b[1;2H\x1b[0ma  ");
    }

    #[test]
    fn test_diff_combining_marks_follow_base() {
        let a = Buffer::new(2, 1).unwrap();
        let mut b = Buffer::new(2, 1).unwrap();
        b.print(0, 0, "e\u{301}", Color::Default, Color::Default, Attrs::empty());
        let (out, stats) = diff(&a, &b);
        assert_eq!(stats.cells_emitted, 1);
        assert!(out.ends_with("e\u{301}"));
    }

    #[test]
    fn test_render_full() {
        let mut buffer = Buffer::new(3, 2).unwrap();
        buffer.set(0, 0, Cell::new('A'));
        buffer.set(1, 0, Cell::new('B'));
        buffer.set(2, 0, Cell::new('C'));

        let mut output = OutputBuffer::new();
        let mut state = DiffState::new(ColorDepth::TrueColor);
        let mut stats = FlushStats::default();
        render_full(&buffer, &mut output, &mut state, &mut stats);

        let out = String::from_utf8(output.as_bytes().to_vec()).unwrap();
        assert_eq!(out, "\x1b[2J\x1b[H\x1b[1;1H\x1b[0mABC\x1b[2;1H   ");
        assert_eq!(stats.cells_emitted, 6);
        assert_eq!(stats.cursor_moves, 2);
    }

    #[test]
    fn test_render_full_skips_continuations() {
        let mut buffer = Buffer::new(4, 1).unwrap();
        buffer.print(0, 0, "日本", Color::Default, Color::Default, Attrs::empty());
        let mut output = OutputBuffer::new();
        let mut state = DiffState::new(ColorDepth::TrueColor);
        let mut stats = FlushStats::default();
        render_full(&buffer, &mut output, &mut state, &mut stats);
        assert_eq!(stats.cells_emitted, 2);
        assert!(output.as_bytes().ends_with("日本".as_bytes()));
    }

    #[test]
    fn test_diff_whole_rows() {
        let a = Buffer::new(4, 3).unwrap();
        let mut b = Buffer::new(4, 3).unwrap();
        b.fill(Rect::new(0, 1, 4, 2), Cell::new('#'));
        let (_, stats) = diff(&a, &b);
        assert_eq!(stats.cells_emitted, 8);
        // No implicit wrap: each row starts with a move.
        assert_eq!(stats.cursor_moves, 2);
    }
}
