//! Renderer: Front/back buffer pair and frame output.
//!
//! Callers draw into the back buffer (usually by composing into it). Each
//! [`Renderer::flush`] sends the difference between back and front to a
//! writer, after which front mirrors what the terminal shows.

use super::diff::{render_diff, render_full, DiffState, FlushStats};
use super::output::OutputBuffer;
use crate::buffer::{Buffer, ColorDepth};
use crate::error::Result;
use crate::layout::Size;
use std::io::{self, Write};
use tracing::{debug_span, trace};

/// Renderer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    /// Color depth of the terminal; colors are downgraded to it.
    pub color_depth: ColorDepth,
    /// Initial capacity of the frame output buffer in bytes.
    pub output_capacity: usize,
    /// Whether the terminal cursor is shown after each frame.
    pub cursor_visible: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            color_depth: ColorDepth::TrueColor,
            output_capacity: 64 * 1024,
            cursor_visible: false,
        }
    }
}

impl RendererConfig {
    /// Set the color depth.
    #[must_use]
    pub const fn with_color_depth(mut self, depth: ColorDepth) -> Self {
        self.color_depth = depth;
        self
    }

    /// Set the output buffer capacity.
    #[must_use]
    pub const fn with_output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity;
        self
    }

    /// Set the initial cursor visibility.
    #[must_use]
    pub const fn with_cursor_visible(mut self, visible: bool) -> Self {
        self.cursor_visible = visible;
        self
    }
}

/// Double-buffered diff renderer.
///
/// The renderer is either waiting for a full redraw (after creation,
/// [`resize`](Self::resize), [`invalidate`](Self::invalidate), a color depth
/// change, or a failed write) or in steady state, where only changed cells
/// are sent.
#[derive(Debug)]
pub struct Renderer {
    /// What the terminal currently shows.
    front: Buffer,
    /// What the next frame should show.
    back: Buffer,
    /// Reused frame output buffer.
    output: OutputBuffer,
    color_depth: ColorDepth,
    /// Cursor position (0-indexed screen cell).
    cursor: (u16, u16),
    cursor_visible: bool,
    /// Cursor state changed since the last flush.
    cursor_dirty: bool,
    needs_full_redraw: bool,
}

impl Renderer {
    /// Create a renderer for a terminal of `size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`](crate::Error::OutOfMemory) if the
    /// buffers cannot be allocated.
    pub fn new(size: Size, config: RendererConfig) -> Result<Self> {
        Ok(Self {
            front: Buffer::new(size.width, size.height)?,
            back: Buffer::new(size.width, size.height)?,
            output: OutputBuffer::with_capacity(config.output_capacity),
            color_depth: config.color_depth,
            cursor: (0, 0),
            cursor_visible: config.cursor_visible,
            cursor_dirty: true,
            needs_full_redraw: true,
        })
    }

    /// Terminal size.
    #[inline]
    pub const fn size(&self) -> Size {
        self.back.size()
    }

    /// The buffer the next frame is drawn from.
    #[inline]
    pub const fn back(&self) -> &Buffer {
        &self.back
    }

    /// Mutable access to the back buffer, e.g. as a compositor target.
    #[inline]
    pub fn back_mut(&mut self) -> &mut Buffer {
        &mut self.back
    }

    /// The terminal's last known content.
    #[inline]
    pub const fn front(&self) -> &Buffer {
        &self.front
    }

    /// Current color depth.
    #[inline]
    pub const fn color_depth(&self) -> ColorDepth {
        self.color_depth
    }

    /// Whether the next flush redraws the whole screen.
    #[inline]
    pub const fn needs_full_redraw(&self) -> bool {
        self.needs_full_redraw
    }

    /// Resize both buffers, clearing their content.
    ///
    /// The next flush is a full redraw.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`](crate::Error::OutOfMemory) if the new
    /// buffers cannot be allocated; the renderer is left unchanged.
    pub fn resize(&mut self, size: Size) -> Result<()> {
        let front = Buffer::new(size.width, size.height)?;
        let back = Buffer::new(size.width, size.height)?;
        self.front = front;
        self.back = back;
        self.needs_full_redraw = true;
        self.cursor_dirty = true;
        trace!(?size, "renderer resized");
        Ok(())
    }

    /// Force a full redraw on the next flush.
    pub fn invalidate(&mut self) {
        self.needs_full_redraw = true;
        self.cursor_dirty = true;
    }

    /// Move the terminal cursor after the next frame.
    pub fn set_cursor(&mut self, x: u16, y: u16) {
        if self.cursor != (x, y) {
            self.cursor = (x, y);
            self.cursor_dirty = true;
        }
    }

    /// Show or hide the terminal cursor after the next frame.
    pub fn show_cursor(&mut self, visible: bool) {
        if self.cursor_visible != visible {
            self.cursor_visible = visible;
            self.cursor_dirty = true;
        }
    }

    /// Change the color depth. Every cell is re-sent on the next flush.
    pub fn set_color_depth(&mut self, depth: ColorDepth) {
        if self.color_depth != depth {
            self.color_depth = depth;
            self.invalidate();
        }
    }

    /// Send the frame to `writer`.
    ///
    /// The frame is built in memory and written with one `write_all`
    /// followed by `flush`. On success the front buffer takes the back
    /// buffer's content. Nothing is written when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns the writer's error unchanged. The front buffer is left as it
    /// was and the next flush is a full redraw, since the terminal may have
    /// received part of the frame.
    pub fn flush<W: Write + ?Sized>(&mut self, writer: &mut W) -> io::Result<FlushStats> {
        let full = self.needs_full_redraw || self.front.size() != self.back.size();
        let _span = debug_span!("flush", full).entered();

        self.output.clear();
        let mut state = DiffState::new(self.color_depth);
        let mut stats = FlushStats::default();

        if full {
            render_full(&self.back, &mut self.output, &mut state, &mut stats);
        } else {
            render_diff(&self.front, &self.back, &mut self.output, &mut state, &mut stats);
        }
        if stats.cells_emitted > 0 {
            self.output.reset_attrs();
        }

        // Drawing moves the real cursor, so a visible cursor is put back.
        if full || self.cursor_dirty || (self.cursor_visible && stats.cells_emitted > 0) {
            self.emit_cursor();
        }

        stats.bytes = self.output.len();
        if !self.output.is_empty() {
            if let Err(err) = self.output.flush_to(writer) {
                self.needs_full_redraw = true;
                self.cursor_dirty = true;
                return Err(err);
            }
        }

        self.front.copy_from(&self.back);
        self.needs_full_redraw = false;
        self.cursor_dirty = false;
        trace!(
            cells = stats.cells_emitted,
            moves = stats.cursor_moves,
            bytes = stats.bytes,
            "frame flushed"
        );
        Ok(stats)
    }

    fn emit_cursor(&mut self) {
        if self.cursor_visible {
            let (x, y) = self.cursor;
            self.output.cursor_move(x, y);
            self.output.cursor_show();
        } else {
            self.output.cursor_hide();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Attrs, Cell, Color};

    fn renderer(width: u16, height: u16) -> Renderer {
        Renderer::new(Size::new(width, height), RendererConfig::default()).unwrap()
    }

    fn flush(renderer: &mut Renderer) -> (String, FlushStats) {
        let mut out = Vec::new();
        let stats = renderer.flush(&mut out).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    /// Writer that fails every write.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_config_builders() {
        let config = RendererConfig::default()
            .with_color_depth(ColorDepth::Color256)
            .with_output_capacity(128)
            .with_cursor_visible(true);
        assert_eq!(config.color_depth, ColorDepth::Color256);
        assert_eq!(config.output_capacity, 128);
        assert!(config.cursor_visible);
    }

    #[test]
    fn test_first_flush_is_full() {
        let mut r = renderer(3, 2);
        assert!(r.needs_full_redraw());
        let (out, stats) = flush(&mut r);
        assert!(out.starts_with("\x1b[2J\x1b[H"));
        assert!(out.ends_with("\x1b[0m\x1b[?25l"));
        assert_eq!(stats.cells_emitted, 6);
        assert_eq!(stats.bytes, out.len());
        assert!(!r.needs_full_redraw());
    }

    #[test]
    fn test_idle_flush_writes_nothing() {
        let mut r = renderer(3, 2);
        flush(&mut r);
        let (out, stats) = flush(&mut r);
        assert!(out.is_empty());
        assert_eq!(stats, FlushStats::default());
    }

    #[test]
    fn test_single_cell_change_is_minimal() {
        let mut r = renderer(10, 4);
        flush(&mut r);

        r.back_mut().set(4, 2, Cell::new('Z'));
        let (out, stats) = flush(&mut r);
        assert_eq!(out, "\x1b[3;5H\x1b[0mZ\x1b[0m");
        assert_eq!(stats.cursor_moves, 1);
        assert_eq!(stats.cells_emitted, 1);
        assert_eq!(r.front().get(4, 2).ch(), 'Z');
    }

    #[test]
    fn test_resize_forces_full_redraw() {
        let mut r = renderer(4, 2);
        flush(&mut r);
        r.resize(Size::new(6, 3)).unwrap();
        assert_eq!(r.size(), Size::new(6, 3));
        assert!(r.needs_full_redraw());

        let (out, stats) = flush(&mut r);
        assert!(out.starts_with("\x1b[2J\x1b[H"));
        assert_eq!(stats.cells_emitted, 18);
        assert_eq!(r.front().size(), Size::new(6, 3));
    }

    #[test]
    fn test_back_resized_directly_falls_back_to_full() {
        let mut r = renderer(4, 2);
        flush(&mut r);
        r.back_mut().resize(Size::new(2, 2)).unwrap();
        let (out, _) = flush(&mut r);
        assert!(out.starts_with("\x1b[2J\x1b[H"));
        assert_eq!(r.front().size(), Size::new(2, 2));
    }

    #[test]
    fn test_writer_error_propagates_and_resyncs() {
        let mut r = renderer(4, 1);
        flush(&mut r);

        r.back_mut().set(0, 0, Cell::new('x'));
        let err = r.flush(&mut Broken).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(r.front().get(0, 0), Cell::EMPTY);
        assert!(r.needs_full_redraw());

        let (out, _) = flush(&mut r);
        assert!(out.starts_with("\x1b[2J\x1b[H"));
        assert_eq!(r.front().get(0, 0).ch(), 'x');
    }

    #[test]
    fn test_cursor_flushed_separately() {
        let mut r = renderer(10, 4);
        flush(&mut r);

        r.show_cursor(true);
        r.set_cursor(3, 1);
        let (out, stats) = flush(&mut r);
        assert_eq!(out, "\x1b[2;4H\x1b[?25h");
        assert_eq!(stats.cells_emitted, 0);

        r.show_cursor(false);
        let (out, _) = flush(&mut r);
        assert_eq!(out, "\x1b[?25l");
    }

    #[test]
    fn test_visible_cursor_restored_after_drawing() {
        let config = RendererConfig::default().with_cursor_visible(true);
        let mut r = Renderer::new(Size::new(10, 2), config).unwrap();
        r.set_cursor(9, 1);
        flush(&mut r);

        r.back_mut().set(0, 0, Cell::new('a'));
        let (out, _) = flush(&mut r);
        assert!(out.ends_with("\x1b[0m\x1b[2;10H\x1b[?25h"));
    }

    #[test]
    fn test_color_depth_change_redraws() {
        let mut r = renderer(2, 1);
        r.back_mut()
            .set(0, 0, Cell::styled('a', Color::rgb(0, 0, 255), Color::Default, Attrs::empty()));
        let (out, _) = flush(&mut r);
        assert!(out.contains("\x1b[38;2;0;0;255m"));

        r.set_color_depth(ColorDepth::Color256);
        assert_eq!(r.color_depth(), ColorDepth::Color256);
        assert!(r.needs_full_redraw());
        let (out, _) = flush(&mut r);
        assert!(out.contains("\x1b[38;5;21m"));

        r.set_color_depth(ColorDepth::Mono);
        let (out, _) = flush(&mut r);
        assert!(!out.contains("38;"));
    }
}
