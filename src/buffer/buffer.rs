//! Buffer: A grid of cells.
//!
//! The buffer uses one contiguous allocation for cache efficiency.
//! Cells are stored in row-major order.
//!
//! Every public mutation keeps the wide-glyph invariant: a width-2 base cell
//! is always followed by a continuation cell on the same row, and every
//! continuation cell is preceded by a width-2 base. Writes that would break
//! a glyph in half blank the surviving half instead.

use super::cell::{Attrs, Cell};
use super::color::Color;
use super::text::{classify, Decoder, Glyph};
use crate::error::{try_alloc, Result};
use crate::layout::{Rect, Size};

/// A grid of cells.
///
/// Access is in row-major order: `index = y * width + x`. Out-of-range reads
/// return [`Cell::EMPTY`] and out-of-range writes do nothing.
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer {
    /// Contiguous cell storage (row-major order).
    cells: Vec<Cell>,
    /// Width in columns.
    width: u16,
    /// Height in rows.
    height: u16,
}

impl Buffer {
    /// Create a new buffer with the given dimensions.
    ///
    /// All cells are initialized to empty (space with default colors).
    /// Zero-sized buffers are allowed; every access is then out of range.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let size = Size::new(width, height);
        Ok(Self {
            cells: try_alloc(size.area(), Cell::EMPTY)?,
            width,
            height,
        })
    }

    /// Get the buffer width.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the buffer height.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Get the buffer dimensions.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The whole buffer as a rectangle at the origin.
    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Get the total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the buffer has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get a reference to the underlying cell slice.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Convert (x, y) coordinates to a linear index.
    ///
    /// Returns `None` if coordinates are out of bounds.
    #[inline]
    pub fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Get the cell at (x, y), or the default cell when out of range.
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Cell {
        self.get_ref(x, y).copied().unwrap_or_default()
    }

    /// Get a reference to the cell at (x, y).
    ///
    /// Returns `None` if coordinates are out of bounds.
    #[inline]
    pub fn get_ref(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Get one row of cells.
    #[inline]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize) * (self.width as usize);
        Some(&self.cells[start..start + self.width as usize])
    }

    /// Get an iterator over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Set a cell at (x, y).
    ///
    /// Returns `false` (and changes nothing) if coordinates are out of bounds.
    ///
    /// The wide-glyph invariant is maintained around the write:
    /// - overwriting either half of a wide glyph blanks the other half;
    /// - a wide glyph also writes its continuation at `x + 1`, or is stored
    ///   as a styled blank when it does not fit before the right edge;
    /// - a continuation cell is only stored right after a wide glyph,
    ///   otherwise it becomes a styled blank.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        let Some(idx) = self.index_of(x, y) else {
            return false;
        };

        if cell.is_continuation() {
            if x > 0 && self.cells[idx - 1].is_wide() {
                self.cells[idx] = cell;
            } else {
                self.detach(x, y);
                self.cells[idx] = cell.blanked();
            }
        } else if cell.is_wide() {
            if x + 1 < self.width {
                self.write_wide(x, y, idx, cell);
            } else {
                self.detach(x, y);
                self.cells[idx] = cell.blanked();
            }
        } else {
            self.detach(x, y);
            self.cells[idx] = cell;
        }
        true
    }

    /// Write a wide glyph at `x` and its continuation at `x + 1`.
    ///
    /// Returns `false` with no mutation if `x + 1` is out of range or the
    /// cell is not a width-2 glyph.
    pub fn set_wide(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !cell.is_wide() || u32::from(x) + 1 >= u32::from(self.width) {
            return false;
        }
        let Some(idx) = self.index_of(x, y) else {
            return false;
        };
        self.write_wide(x, y, idx, cell);
        true
    }

    fn write_wide(&mut self, x: u16, y: u16, idx: usize, cell: Cell) {
        self.detach(x, y);
        self.detach(x + 1, y);
        self.cells[idx] = cell;
        self.cells[idx + 1] = Cell::continuation_of(&cell);
    }

    /// Prepare (x, y) for an overwrite by blanking the other half of any
    /// wide glyph the cell currently belongs to.
    fn detach(&mut self, x: u16, y: u16) {
        let Some(idx) = self.index_of(x, y) else {
            return;
        };
        let current = self.cells[idx];
        if current.is_continuation() {
            if x > 0 && self.cells[idx - 1].is_wide() {
                self.cells[idx - 1] = self.cells[idx - 1].blanked();
            }
        } else if current.is_wide()
            && x + 1 < self.width
            && self.cells[idx + 1].is_continuation()
        {
            self.cells[idx + 1] = self.cells[idx + 1].blanked();
        }
    }

    /// Store a cell without touching its neighbors.
    ///
    /// Callers must restore the wide-glyph invariant afterwards with
    /// [`Buffer::repair_wide`].
    #[inline]
    pub(crate) fn put(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(idx) = self.index_of(x, y) {
            self.cells[idx] = cell;
        }
    }

    /// Print text starting at (x, y) and return the column after the last
    /// cell written.
    ///
    /// Text is decoded as UTF-8; invalid sequences become U+FFFD. Control and
    /// format characters take no cell, combining marks attach to the
    /// preceding glyph, and wide glyphs take two cells. A wide glyph that
    /// would be split by the right edge is printed as a single space. Output
    /// stops at the right edge; there is no wrapping.
    pub fn print(
        &mut self,
        x: u16,
        y: u16,
        text: impl AsRef<[u8]>,
        fg: Color,
        bg: Color,
        attrs: Attrs,
    ) -> u16 {
        if y >= self.height {
            return x;
        }

        let mut col = x;
        let mut last_base = self.base_left_of(x, y);

        for c in Decoder::new(text.as_ref()) {
            match classify(c) {
                Glyph::Skip => {}
                Glyph::Mark(mark) => {
                    if let Some(idx) = last_base {
                        self.cells[idx].add_combining(mark);
                    }
                }
                Glyph::Base(ch, width) => {
                    if col >= self.width {
                        break;
                    }
                    let cell = Cell::styled(ch, fg, bg, attrs);
                    let idx = (y as usize) * (self.width as usize) + (col as usize);
                    if width == 2 && col + 1 >= self.width {
                        self.set(col, y, cell.blanked());
                        last_base = None;
                        col += 1;
                    } else {
                        self.set(col, y, cell);
                        last_base = Some(idx);
                        col += u16::from(width);
                    }
                }
            }
        }
        col
    }

    /// Index of the glyph ending just left of (x, y), for leading marks.
    fn base_left_of(&self, x: u16, y: u16) -> Option<usize> {
        let left = self.index_of(x.checked_sub(1)?, y)?;
        if self.cells[left].is_continuation() {
            left.checked_sub(1)
        } else {
            Some(left)
        }
    }

    /// Fill a rectangular region with a cell.
    ///
    /// Wide glyphs are laid out every other column; a column left over at
    /// the right edge of the region gets a styled blank.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let Some(rect) = rect.intersection(&self.area()) else {
            return;
        };
        let cell = if cell.is_continuation() { cell.blanked() } else { cell };
        let step = u16::from(cell.width());

        for row in rect.y..rect.bottom() {
            let mut col = rect.x;
            while col < rect.right() {
                if step == 2 && col + 1 >= rect.right() {
                    self.set(col, row, cell.blanked());
                } else {
                    self.set(col, row, cell);
                }
                col += step;
            }
        }
    }

    /// Clear the entire buffer (fill with empty cells).
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Clear a rectangular region.
    pub fn clear_rect(&mut self, rect: Rect) {
        self.fill(rect, Cell::EMPTY);
    }

    /// Resize the buffer, discarding its content.
    ///
    /// The new storage is allocated before the old one is released, so on
    /// failure the buffer is unchanged.
    pub fn resize(&mut self, size: Size) -> Result<()> {
        self.resize_with(size, |len| try_alloc(len, Cell::EMPTY))
    }

    fn resize_with(&mut self, size: Size, alloc: impl FnOnce(usize) -> Result<Vec<Cell>>) -> Result<()> {
        let cells = alloc(size.area())?;
        self.cells = cells;
        self.width = size.width;
        self.height = size.height;
        Ok(())
    }

    /// Resize the buffer, preserving the overlapping region.
    ///
    /// Resizing to the current size is a no-op that keeps the allocation.
    /// When shrinking the width cuts a wide glyph in half, the glyph left in
    /// the new last column becomes a space with the same style.
    pub fn resize_preserving(&mut self, size: Size) -> Result<()> {
        self.resize_preserving_with(size, |len| try_alloc(len, Cell::EMPTY))
    }

    fn resize_preserving_with(
        &mut self,
        size: Size,
        alloc: impl FnOnce(usize) -> Result<Vec<Cell>>,
    ) -> Result<()> {
        if size == self.size() {
            return Ok(());
        }

        let mut cells = alloc(size.area())?;

        let copy_width = self.width.min(size.width) as usize;
        let copy_height = self.height.min(size.height) as usize;
        let old_stride = self.width as usize;
        let new_stride = size.width as usize;

        for y in 0..copy_height {
            let old_start = y * old_stride;
            let new_start = y * new_stride;
            let row = &mut cells[new_start..new_start + copy_width];
            row.copy_from_slice(&self.cells[old_start..old_start + copy_width]);

            if size.width < self.width {
                if let Some(last) = row.last_mut() {
                    if last.is_wide() {
                        *last = last.blanked();
                    }
                }
            }
        }

        self.cells = cells;
        self.width = size.width;
        self.height = size.height;
        Ok(())
    }

    /// Copy content from another buffer.
    ///
    /// The buffers should have the same dimensions; if not, this one takes
    /// on the other's dimensions.
    pub fn copy_from(&mut self, other: &Self) {
        self.cells.clone_from(&other.cells);
        self.width = other.width;
        self.height = other.height;
    }

    /// Swap the contents of two buffers.
    ///
    /// This is O(1) - just pointer swaps.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Blank any half wide glyph along the rows of `rect`, looking one column
    /// beyond each side.
    ///
    /// Used after raw writes: a continuation whose base is gone, or a wide
    /// base whose continuation was overwritten, becomes a styled blank.
    pub(crate) fn repair_wide(&mut self, rect: Rect) {
        let Some(rect) = rect.intersection(&self.area()) else {
            return;
        };
        let start = rect.x.saturating_sub(1);
        let end = rect.right().min(self.width - 1);

        for y in rect.y..rect.bottom() {
            let row = (y as usize) * (self.width as usize);
            for x in start..=end {
                let idx = row + x as usize;
                let cell = self.cells[idx];
                if cell.is_continuation() {
                    if x == 0 || !self.cells[idx - 1].is_wide() {
                        self.cells[idx] = cell.blanked();
                    }
                } else if cell.is_wide()
                    && (x + 1 >= self.width || !self.cells[idx + 1].is_continuation())
                {
                    self.cells[idx] = cell.blanked();
                }
            }
        }
    }

    /// Find the first cell that breaks the wide-glyph invariant.
    pub fn check_wide_invariant(&self) -> Option<(u16, u16)> {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.get(x, y);
                let broken = if cell.is_continuation() {
                    x == 0 || !self.get(x - 1, y).is_wide()
                } else {
                    cell.is_wide() && !self.get_ref(x + 1, y).is_some_and(Cell::is_continuation)
                };
                if broken {
                    return Some((x, y));
                }
            }
        }
        None
    }

    /// Render a row as plain text (continuations skipped), mainly for tests
    /// and debugging.
    pub fn row_text(&self, y: u16) -> String {
        let mut text = String::new();
        for cell in self.row(y).unwrap_or_default() {
            if cell.is_continuation() {
                continue;
            }
            text.push(cell.ch());
            text.extend(cell.combining());
        }
        text
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
