//! Plane: A positioned drawing surface in the scene tree.

use super::PlaneId;
use crate::buffer::{Attrs, Buffer, Cell, Color};
use crate::error::Result;
use crate::layout::{Position, Rect, Size};

/// A rectangular drawing surface owned by a [`PlaneTree`].
///
/// Drawing calls write through to the plane's [`Buffer`] and grow the
/// plane's dirty rectangle to the bounding box of everything touched since
/// the compositor last collected it. The bounding box is an approximation:
/// two small edits in opposite corners dirty the whole plane.
///
/// Structure (position, parent, children, visibility) is managed through
/// the tree, since changing it affects other planes.
///
/// [`PlaneTree`]: super::PlaneTree
pub struct Plane {
    /// Cell content in plane-local coordinates.
    buffer: Buffer,
    /// Offset of the top-left corner from the parent's top-left corner.
    position: Position,
    /// Back-reference to the owning parent (`None` for a root).
    parent: Option<PlaneId>,
    /// Children in z-order, index 0 at the back.
    children: Vec<PlaneId>,
    /// The plane's own visibility flag (ancestors may still hide it).
    visible: bool,
    /// Bounding box of changes since the last collection, plane-local.
    dirty: Option<Rect>,
}

impl Plane {
    pub(super) fn new(parent: Option<PlaneId>, position: Position, size: Size) -> Result<Self> {
        Ok(Self {
            buffer: Buffer::new(size.width, size.height)?,
            position,
            parent,
            children: Vec::new(),
            visible: true,
            dirty: None,
        })
    }

    /// Plane dimensions.
    #[inline]
    pub const fn size(&self) -> Size {
        self.buffer.size()
    }

    /// Plane width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.buffer.width()
    }

    /// Plane height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.buffer.height()
    }

    /// Offset from the parent's origin (from the screen origin for a root).
    #[inline]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// The parent plane, if any.
    #[inline]
    pub const fn parent(&self) -> Option<PlaneId> {
        self.parent
    }

    /// Children in z-order (index 0 is at the back).
    #[inline]
    pub fn children(&self) -> &[PlaneId] {
        &self.children
    }

    /// The plane's own visibility flag, ignoring ancestors.
    #[inline]
    pub const fn is_shown(&self) -> bool {
        self.visible
    }

    /// Read-only access to the cell content.
    #[inline]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Get the cell at a local position (default cell when out of range).
    #[inline]
    pub fn get_cell(&self, x: u16, y: u16) -> Cell {
        self.buffer.get(x, y)
    }

    /// Set the cell at a local position.
    ///
    /// Returns `false` if out of range. Neighbors blanked to keep a wide
    /// glyph whole are included in the dirty area.
    pub fn set_cell(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.buffer.set(x, y, cell) {
            return false;
        }
        // A wide glyph also detaches whatever overlapped its second column.
        let reach = if cell.is_wide() { 3 } else { 2 };
        let left = x.saturating_sub(1);
        self.mark_dirty(Rect::new(left, y, x - left + reach, 1));
        true
    }

    /// Print text at a local position; see [`Buffer::print`].
    ///
    /// Returns the column after the last cell written.
    pub fn print(
        &mut self,
        x: u16,
        y: u16,
        text: impl AsRef<[u8]>,
        fg: Color,
        bg: Color,
        attrs: Attrs,
    ) -> u16 {
        let end = self.buffer.print(x, y, text, fg, bg, attrs);
        if y < self.height() {
            // Leading marks can land on a wide glyph two columns back; the
            // column after the text may lose half a glyph.
            let left = x.saturating_sub(2);
            let right = end.saturating_add(1);
            if right > left {
                self.mark_dirty(Rect::new(left, y, right - left, 1));
            }
        }
        end
    }

    /// Fill the whole plane with a cell.
    pub fn fill(&mut self, cell: Cell) {
        let area = self.buffer.area();
        self.fill_rect(area, cell);
    }

    /// Fill a local rectangle with a cell.
    pub fn fill_rect(&mut self, rect: Rect, cell: Cell) {
        self.buffer.fill(rect, cell);
        if !rect.is_empty() {
            let widened = Rect::new(
                rect.x.saturating_sub(1),
                rect.y,
                rect.width.saturating_add(2),
                rect.height,
            );
            self.mark_dirty(widened);
        }
    }

    /// Reset every cell to the default (transparent) cell.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.mark_all_dirty();
    }

    /// Grow the dirty rectangle to include `rect` (clipped to the plane).
    pub fn mark_dirty(&mut self, rect: Rect) {
        let Some(rect) = rect.intersection(&self.buffer.area()) else {
            return;
        };
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union(&rect),
            None => rect,
        });
    }

    /// Mark the whole plane dirty.
    pub fn mark_all_dirty(&mut self) {
        self.mark_dirty(self.buffer.area());
    }

    /// Local bounding box of changes since the last collection.
    #[inline]
    pub const fn dirty_rect(&self) -> Option<Rect> {
        self.dirty
    }

    /// Return and clear the local dirty rectangle.
    #[inline]
    pub fn take_dirty_rect(&mut self) -> Option<Rect> {
        self.dirty.take()
    }

    // Structural accessors for the tree.

    pub(super) fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    pub(super) const fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(super) const fn set_shown(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(super) fn children_mut(&mut self) -> &mut Vec<PlaneId> {
        &mut self.children
    }
}

impl std::fmt::Debug for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plane")
            .field("position", &self.position)
            .field("size", &self.size())
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .field("visible", &self.visible)
            .field("dirty", &self.dirty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(width: u16, height: u16) -> Plane {
        Plane::new(None, Position::ORIGIN, Size::new(width, height)).unwrap()
    }

    #[test]
    fn test_new_plane_is_clean() {
        let plane = plane(10, 4);
        assert_eq!(plane.dirty_rect(), None);
        assert!(plane.is_shown());
        assert_eq!(plane.size(), Size::new(10, 4));
    }

    #[test]
    fn test_set_cell_marks_dirty() {
        let mut plane = plane(10, 4);
        assert!(plane.set_cell(5, 2, Cell::new('x')));
        let dirty = plane.dirty_rect().unwrap();
        assert!(dirty.contains(5, 2));
        assert!(!plane.set_cell(10, 0, Cell::new('x')));
    }

    #[test]
    fn test_dirty_grows_to_bounding_box() {
        let mut plane = plane(20, 10);
        plane.set_cell(1, 1, Cell::new('a'));
        plane.set_cell(15, 8, Cell::new('b'));
        let dirty = plane.dirty_rect().unwrap();
        assert!(dirty.contains(1, 1));
        assert!(dirty.contains(15, 8));
        assert!(dirty.contains(8, 5));
    }

    #[test]
    fn test_print_marks_row_span() {
        let mut plane = plane(20, 3);
        let end = plane.print(4, 1, "hello", Color::Default, Color::Default, Attrs::empty());
        assert_eq!(end, 9);
        let dirty = plane.dirty_rect().unwrap();
        assert_eq!(dirty.y, 1);
        assert_eq!(dirty.height, 1);
        assert!(dirty.x <= 4 && dirty.right() >= 9);
    }

    #[test]
    fn test_print_outside_rows_stays_clean() {
        let mut plane = plane(5, 2);
        plane.print(0, 5, "x", Color::Default, Color::Default, Attrs::empty());
        assert_eq!(plane.dirty_rect(), None);
    }

    #[test]
    fn test_mark_dirty_clips() {
        let mut plane = plane(5, 5);
        plane.mark_dirty(Rect::new(3, 3, 10, 10));
        assert_eq!(plane.dirty_rect(), Some(Rect::new(3, 3, 2, 2)));
        plane.mark_dirty(Rect::new(9, 9, 1, 1));
        assert_eq!(plane.dirty_rect(), Some(Rect::new(3, 3, 2, 2)));
    }

    #[test]
    fn test_take_dirty_clears() {
        let mut plane = plane(5, 5);
        plane.clear();
        assert_eq!(plane.take_dirty_rect(), Some(Rect::new(0, 0, 5, 5)));
        assert_eq!(plane.dirty_rect(), None);
    }

    #[test]
    fn test_fill() {
        let mut plane = plane(4, 2);
        plane.fill(Cell::new('#'));
        assert_eq!(plane.get_cell(3, 1).ch(), '#');
        assert_eq!(plane.dirty_rect(), Some(Rect::new(0, 0, 4, 2)));
    }
}
