//! `PlaneTree`: Arena that owns every plane and their hierarchy.
//!
//! Planes refer to each other by [`PlaneId`] handles. A parent lists its
//! children in z-order; a child keeps a non-owning handle to its parent.
//! Destroying a plane destroys its whole subtree.

use super::plane::Plane;
use super::PlaneId;
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::layout::{Bounds, Position, Rect, Size};
use slotmap::SlotMap;
use tracing::trace;

/// A plane as seen from the screen during one traversal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Layer {
    /// The plane.
    pub id: PlaneId,
    /// Screen position of the plane's top-left cell (may be negative).
    pub origin: Position,
    /// Visible screen area after clipping against every ancestor, or
    /// `None` if the plane is hidden (itself or through an ancestor) or
    /// clipped away entirely.
    pub clip: Option<Rect>,
}

impl Layer {
    /// Convert a plane-local rectangle to screen space, clipped to the
    /// visible area.
    pub fn to_screen(&self, local: Rect) -> Option<Rect> {
        let clip = self.clip?;
        let origin = self
            .origin
            .offset(Position::new(i32::from(local.x), i32::from(local.y)));
        Bounds::at(origin, local.size())
            .clip(&Bounds::from(clip))
            .to_rect()
    }
}

/// Owner of a forest of planes.
#[derive(Default)]
pub struct PlaneTree {
    planes: SlotMap<PlaneId, Plane>,
}

impl PlaneTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live planes.
    #[inline]
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// Check if the tree holds no planes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Check if a handle refers to a live plane.
    #[inline]
    pub fn contains(&self, id: PlaneId) -> bool {
        self.planes.contains_key(id)
    }

    /// Get a plane.
    #[inline]
    pub fn get(&self, id: PlaneId) -> Option<&Plane> {
        self.planes.get(id)
    }

    /// Get a plane for drawing.
    #[inline]
    pub fn get_mut(&mut self, id: PlaneId) -> Option<&mut Plane> {
        self.planes.get_mut(id)
    }

    fn plane(&self, id: PlaneId) -> Result<&Plane> {
        self.planes.get(id).ok_or(Error::PlaneNotFound(id))
    }

    fn plane_mut(&mut self, id: PlaneId) -> Result<&mut Plane> {
        self.planes.get_mut(id).ok_or(Error::PlaneNotFound(id))
    }

    /// Parent of a plane (`None` for roots and unknown handles).
    #[inline]
    pub fn parent(&self, id: PlaneId) -> Option<PlaneId> {
        self.planes.get(id)?.parent()
    }

    /// Children of a plane in z-order, back first.
    #[inline]
    pub fn children(&self, id: PlaneId) -> &[PlaneId] {
        self.planes.get(id).map_or(&[][..], |plane| plane.children())
    }

    /// All planes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = PlaneId> + '_ {
        self.planes
            .iter()
            .filter(|(_, plane)| plane.parent().is_none())
            .map(|(id, _)| id)
    }

    // ========================================================================
    // Creation and destruction
    // ========================================================================

    /// Create a root plane positioned relative to the screen origin.
    pub fn create_root(&mut self, position: Position, size: Size) -> Result<PlaneId> {
        let plane = Plane::new(None, position, size)?;
        let id = self.planes.insert(plane);
        trace!(?id, ?position, ?size, "root plane created");
        Ok(id)
    }

    /// Create a child plane on top of its siblings.
    pub fn create_child(&mut self, parent: PlaneId, position: Position, size: Size) -> Result<PlaneId> {
        let plane = Plane::new(Some(parent), position, size)?;
        let siblings = self.plane_mut(parent)?.children_mut();
        siblings
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory { cells: siblings.len() + 1 })?;

        let id = self.planes.insert(plane);
        self.plane_mut(parent)?.children_mut().push(id);
        trace!(?id, ?parent, ?position, ?size, "child plane created");
        Ok(id)
    }

    /// Destroy a plane and its whole subtree.
    ///
    /// Descendants are removed first, then the plane is unlinked from its
    /// parent, whose area under the plane is marked dirty.
    pub fn destroy(&mut self, id: PlaneId) -> Result<()> {
        let plane = self.plane(id)?;
        let parent = plane.parent();
        let bounds = Bounds::at(plane.position(), plane.size());

        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push(next);
            stack.extend_from_slice(self.children(next));
        }
        // Pre-order reversed: every child is removed before its parent.
        for victim in order.iter().rev() {
            self.planes.remove(*victim);
        }

        if let Some(parent) = parent {
            if let Some(parent) = self.planes.get_mut(parent) {
                parent.children_mut().retain(|&child| child != id);
                mark_parent(parent, bounds);
            }
        }
        trace!(?id, removed = order.len(), "plane destroyed");
        Ok(())
    }

    // ========================================================================
    // Z-order
    // ========================================================================

    fn siblings_mut(&mut self, id: PlaneId) -> Result<&mut Vec<PlaneId>> {
        let parent = self.plane(id)?.parent().ok_or(Error::RootPlane(id))?;
        Ok(self.plane_mut(parent)?.children_mut())
    }

    /// Move a plane to the top of its siblings.
    pub fn raise(&mut self, id: PlaneId) -> Result<()> {
        let siblings = self.siblings_mut(id)?;
        let Some(at) = siblings.iter().position(|&s| s == id) else {
            return Ok(());
        };
        if at + 1 != siblings.len() {
            siblings.remove(at);
            siblings.push(id);
            self.restack_dirty(id);
        }
        Ok(())
    }

    /// Move a plane to the bottom of its siblings.
    pub fn lower(&mut self, id: PlaneId) -> Result<()> {
        let siblings = self.siblings_mut(id)?;
        let Some(at) = siblings.iter().position(|&s| s == id) else {
            return Ok(());
        };
        if at != 0 {
            siblings.remove(at);
            siblings.insert(0, id);
            self.restack_dirty(id);
        }
        Ok(())
    }

    /// Place a plane directly above `sibling`.
    pub fn raise_above(&mut self, id: PlaneId, sibling: PlaneId) -> Result<()> {
        self.restack(id, sibling, 1)
    }

    /// Place a plane directly below `sibling`.
    pub fn lower_below(&mut self, id: PlaneId, sibling: PlaneId) -> Result<()> {
        self.restack(id, sibling, 0)
    }

    fn restack(&mut self, id: PlaneId, sibling: PlaneId, offset: usize) -> Result<()> {
        let not_siblings = Error::NotSiblings { plane: id, sibling };
        if id == sibling {
            return Err(not_siblings);
        }
        let parent = self.plane(id)?.parent();
        if self.plane(sibling)?.parent() != parent {
            return Err(not_siblings);
        }
        let siblings = self.siblings_mut(id)?;
        let before = siblings.clone();

        siblings.retain(|&s| s != id);
        let Some(anchor) = siblings.iter().position(|&s| s == sibling) else {
            *siblings = before;
            return Err(not_siblings);
        };
        siblings.insert(anchor + offset, id);

        if *siblings != before {
            self.restack_dirty(id);
        }
        Ok(())
    }

    /// Index of a plane among its siblings (0 is the back); `None` for roots.
    pub fn z_index(&self, id: PlaneId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&s| s == id)
    }

    fn restack_dirty(&mut self, id: PlaneId) {
        if let Some(plane) = self.planes.get(id) {
            let bounds = Bounds::at(plane.position(), plane.size());
            self.mark_parent_dirty(id, bounds);
        }
    }

    fn mark_parent_dirty(&mut self, id: PlaneId, bounds: Bounds) {
        if let Some(parent) = self.parent(id).and_then(|p| self.planes.get_mut(p)) {
            mark_parent(parent, bounds);
        }
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Offset of a plane from its parent's origin.
    pub fn position(&self, id: PlaneId) -> Option<Position> {
        Some(self.planes.get(id)?.position())
    }

    /// Move a plane relative to its parent.
    ///
    /// The parent is marked dirty where the plane was and where it now is.
    /// Moving a root changes nothing inside the tree; invalidate the
    /// compositor for it.
    pub fn move_to(&mut self, id: PlaneId, position: Position) -> Result<()> {
        let plane = self.plane_mut(id)?;
        let old = plane.position();
        if old == position {
            return Ok(());
        }
        plane.set_position(position);
        let size = plane.size();
        self.mark_parent_dirty(id, Bounds::at(old, size));
        self.mark_parent_dirty(id, Bounds::at(position, size));
        Ok(())
    }

    /// Screen position of a plane's top-left cell.
    pub fn screen_origin(&self, id: PlaneId) -> Option<Position> {
        let mut origin = Position::ORIGIN;
        let mut current = Some(id);
        while let Some(cur) = current {
            let plane = self.planes.get(cur)?;
            origin = origin.offset(plane.position());
            current = plane.parent();
        }
        Some(origin)
    }

    /// Convert plane-local coordinates to (signed) screen coordinates.
    pub fn local_to_screen(&self, id: PlaneId, local: Position) -> Option<Position> {
        Some(self.screen_origin(id)?.offset(local))
    }

    /// Convert plane-local coordinates to unsigned screen coordinates.
    ///
    /// Negative results are clamped to 0, so this is lossy for planes that
    /// hang off the top or left of the screen; prefer
    /// [`PlaneTree::local_to_screen`] for anything but cursor placement.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn local_to_screen_clamped(&self, id: PlaneId, x: u16, y: u16) -> Option<(u16, u16)> {
        let screen = self.local_to_screen(id, Position::new(i32::from(x), i32::from(y)))?;
        let clamp = |v: i32| v.clamp(0, i32::from(u16::MAX)) as u16;
        Some((clamp(screen.x), clamp(screen.y)))
    }

    /// Convert screen coordinates to plane-local coordinates.
    pub fn screen_to_local(&self, id: PlaneId, screen: Position) -> Option<Position> {
        Some(screen.minus(self.screen_origin(id)?))
    }

    /// Unclipped screen bounds of a plane.
    pub fn screen_bounds(&self, id: PlaneId) -> Option<Bounds> {
        Some(Bounds::at(self.screen_origin(id)?, self.planes.get(id)?.size()))
    }

    /// Screen area where a plane can actually show.
    ///
    /// Intersects the plane's screen rectangle with every ancestor's while
    /// walking to the root. Returns `None` if the plane or any ancestor is
    /// hidden, or if the intersection becomes empty.
    pub fn clipped_bounds(&self, id: PlaneId) -> Option<Rect> {
        let mut origin = self.screen_origin(id)?;
        let mut current = self.planes.get(id)?;
        let mut bounds = Bounds::at(origin, current.size());

        loop {
            if !current.is_shown() || bounds.is_empty() {
                return None;
            }
            let Some(parent) = current.parent() else {
                break;
            };
            origin = origin.minus(current.position());
            current = self.planes.get(parent)?;
            bounds = bounds.clip(&Bounds::at(origin, current.size()));
        }
        bounds.to_rect()
    }

    /// Check effective visibility: the plane and every ancestor are shown.
    pub fn is_visible(&self, id: PlaneId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.planes.get(cur) {
                Some(plane) if plane.is_shown() => current = plane.parent(),
                _ => return false,
            }
        }
        true
    }

    /// Show or hide a plane and, with it, its whole subtree.
    ///
    /// Descendants keep their own flags. The parent is marked dirty under
    /// the plane; a root that becomes visible marks itself dirty.
    pub fn set_visible(&mut self, id: PlaneId, visible: bool) -> Result<()> {
        let plane = self.plane_mut(id)?;
        if plane.is_shown() == visible {
            return Ok(());
        }
        plane.set_shown(visible);
        if plane.parent().is_none() {
            if visible {
                plane.mark_all_dirty();
            }
            return Ok(());
        }
        self.restack_dirty(id);
        Ok(())
    }

    // ========================================================================
    // Resizing
    // ========================================================================

    /// Resize a plane, discarding its content.
    ///
    /// The plane becomes fully dirty and its parent is marked dirty where
    /// the plane used to be, so shrinking leaves nothing stale behind.
    pub fn resize(&mut self, id: PlaneId, size: Size) -> Result<()> {
        self.resize_with(id, size, Buffer::resize)
    }

    /// Resize a plane, keeping the overlapping content.
    pub fn resize_preserving(&mut self, id: PlaneId, size: Size) -> Result<()> {
        self.resize_with(id, size, Buffer::resize_preserving)
    }

    fn resize_with(
        &mut self,
        id: PlaneId,
        size: Size,
        resize: impl FnOnce(&mut Buffer, Size) -> Result<()>,
    ) -> Result<()> {
        let plane = self.plane_mut(id)?;
        let old = Bounds::at(plane.position(), plane.size());
        resize(plane.buffer_mut(), size)?;
        plane.mark_all_dirty();
        self.mark_parent_dirty(id, old);
        trace!(?id, ?size, "plane resized");
        Ok(())
    }

    // ========================================================================
    // Dirty tracking
    // ========================================================================

    /// Screen-space dirty area of a plane, clipped to where it can show.
    ///
    /// Returns `None` if the plane is clean, hidden or clipped away. The
    /// dirty state is left in place; see [`PlaneTree::take_dirty_rect`].
    pub fn dirty_screen_rect(&self, id: PlaneId) -> Option<Rect> {
        let dirty = self.planes.get(id)?.dirty_rect()?;
        let layer = Layer {
            id,
            origin: self.screen_origin(id)?,
            clip: self.clipped_bounds(id),
        };
        layer.to_screen(dirty)
    }

    /// Return and clear a plane's local dirty rectangle.
    pub fn take_dirty_rect(&mut self, id: PlaneId) -> Option<Rect> {
        self.planes.get_mut(id)?.take_dirty_rect()
    }

    /// All planes under `root` in painting order (back to front: a parent
    /// before its children, children in z-order), with their screen origin
    /// and visible area.
    ///
    /// Hidden planes are listed with `clip: None`.
    pub fn layers(&self, root: PlaneId) -> Vec<Layer> {
        let mut layers = Vec::with_capacity(self.len());
        let Some(plane) = self.planes.get(root) else {
            return layers;
        };

        let origin = plane.position();
        let start = Some(Bounds::at(origin, plane.size())).filter(|_| plane.is_shown());
        let mut stack = vec![(root, origin, start)];

        while let Some((id, origin, bounds)) = stack.pop() {
            let Some(plane) = self.planes.get(id) else {
                continue;
            };
            layers.push(Layer {
                id,
                origin,
                clip: bounds.and_then(|b| b.to_rect()),
            });
            // Reverse so the back-most child is popped first.
            for &child_id in plane.children().iter().rev() {
                let Some(child) = self.planes.get(child_id) else {
                    continue;
                };
                let child_origin = origin.offset(child.position());
                let child_bounds = bounds
                    .filter(|_| child.is_shown())
                    .map(|b| b.clip(&Bounds::at(child_origin, child.size())))
                    .filter(|b| !b.is_empty());
                stack.push((child_id, child_origin, child_bounds));
            }
        }
        layers
    }
}

/// Mark `bounds` (parent-local, possibly negative) dirty on a parent.
fn mark_parent(parent: &mut Plane, bounds: Bounds) {
    if let Some(rect) = bounds.to_rect() {
        parent.mark_dirty(rect);
    }
}

impl std::fmt::Debug for PlaneTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaneTree")
            .field("planes", &self.planes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Attrs, Cell, Color};

    fn tree_with_root(width: u16, height: u16) -> (PlaneTree, PlaneId) {
        let mut tree = PlaneTree::new();
        let root = tree.create_root(Position::ORIGIN, Size::new(width, height)).unwrap();
        (tree, root)
    }

    fn child(tree: &mut PlaneTree, parent: PlaneId, x: i32, y: i32, w: u16, h: u16) -> PlaneId {
        tree.create_child(parent, Position::new(x, y), Size::new(w, h)).unwrap()
    }

    #[test]
    fn test_create_child_appends_on_top() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 0, 0, 5, 5);
        let b = child(&mut tree, root, 0, 0, 5, 5);
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.z_index(a), Some(0));
        assert_eq!(tree.z_index(b), Some(1));
        assert_eq!(tree.z_index(root), None);
    }

    #[test]
    fn test_create_child_unknown_parent() {
        let (mut tree, root) = tree_with_root(4, 4);
        tree.destroy(root).unwrap();
        let err = tree.create_child(root, Position::ORIGIN, Size::new(1, 1)).unwrap_err();
        assert_eq!(err, Error::PlaneNotFound(root));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_destroy_removes_subtree() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 0, 0, 5, 5);
        let a1 = child(&mut tree, a, 1, 1, 2, 2);
        let b = child(&mut tree, root, 0, 0, 5, 5);

        tree.destroy(a).unwrap();

        assert!(!tree.contains(a));
        assert!(!tree.contains(a1));
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.destroy(a), Err(Error::PlaneNotFound(a)));
    }

    #[test]
    fn test_destroy_marks_parent_dirty() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 3, 2, 4, 4);
        tree.take_dirty_rect(root);
        tree.destroy(a).unwrap();
        assert_eq!(tree.get(root).unwrap().dirty_rect(), Some(Rect::new(3, 2, 4, 4)));
    }

    #[test]
    fn test_raise_and_lower() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 0, 0, 5, 5);
        let b = child(&mut tree, root, 0, 0, 5, 5);
        let c = child(&mut tree, root, 0, 0, 5, 5);

        tree.raise(a).unwrap();
        assert_eq!(tree.children(root), &[b, c, a]);

        tree.lower(c).unwrap();
        assert_eq!(tree.children(root), &[c, b, a]);

        assert_eq!(tree.raise(root), Err(Error::RootPlane(root)));
    }

    #[test]
    fn test_raise_above_and_lower_below() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 0, 0, 5, 5);
        let b = child(&mut tree, root, 0, 0, 5, 5);
        let c = child(&mut tree, root, 0, 0, 5, 5);

        tree.raise_above(a, b).unwrap();
        assert_eq!(tree.children(root), &[b, a, c]);

        tree.lower_below(c, b).unwrap();
        assert_eq!(tree.children(root), &[c, b, a]);

        tree.raise_above(a, c).unwrap();
        assert_eq!(tree.children(root), &[c, a, b]);
    }

    #[test]
    fn test_restack_rejects_non_siblings() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 0, 0, 5, 5);
        let nested = child(&mut tree, a, 0, 0, 2, 2);

        let expected = Error::NotSiblings { plane: nested, sibling: a };
        assert_eq!(tree.raise_above(nested, a), Err(expected));
        assert_eq!(
            tree.lower_below(a, a),
            Err(Error::NotSiblings { plane: a, sibling: a })
        );
        assert_eq!(tree.children(root), &[a]);
    }

    #[test]
    fn test_raise_marks_parent_dirty() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 2, 1, 3, 3);
        let _b = child(&mut tree, root, 0, 0, 5, 5);
        tree.raise(a).unwrap();
        assert_eq!(tree.get(root).unwrap().dirty_rect(), Some(Rect::new(2, 1, 3, 3)));
    }

    #[test]
    fn test_coordinate_transforms() {
        let mut tree = PlaneTree::new();
        let root = tree.create_root(Position::new(2, 1), Size::new(40, 20)).unwrap();
        let a = child(&mut tree, root, 5, 3, 10, 10);
        let b = child(&mut tree, a, -4, 2, 3, 3);

        assert_eq!(tree.screen_origin(b), Some(Position::new(3, 6)));
        assert_eq!(tree.local_to_screen(b, Position::new(1, 1)), Some(Position::new(4, 7)));
        assert_eq!(tree.screen_to_local(b, Position::new(4, 7)), Some(Position::new(1, 1)));

        let c = child(&mut tree, root, -10, -5, 3, 3);
        assert_eq!(tree.local_to_screen(c, Position::ORIGIN), Some(Position::new(-8, -4)));
        assert_eq!(tree.local_to_screen_clamped(c, 0, 0), Some((0, 0)));
        assert_eq!(tree.local_to_screen_clamped(c, 9, 5), Some((1, 1)));
    }

    #[test]
    fn test_clipped_bounds() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 15, 8, 10, 10);
        assert_eq!(tree.clipped_bounds(a), Some(Rect::new(15, 8, 5, 2)));

        let nested = child(&mut tree, a, 3, 0, 4, 4);
        assert_eq!(tree.clipped_bounds(nested), Some(Rect::new(18, 8, 2, 2)));

        let outside = child(&mut tree, a, 20, 0, 4, 4);
        assert_eq!(tree.clipped_bounds(outside), None);

        let negative = child(&mut tree, root, -2, -2, 4, 4);
        assert_eq!(tree.clipped_bounds(negative), Some(Rect::new(0, 0, 2, 2)));
    }

    #[test]
    fn test_visibility_is_inherited() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 0, 0, 5, 5);
        let a1 = child(&mut tree, a, 0, 0, 2, 2);

        tree.set_visible(a, false).unwrap();
        assert!(!tree.is_visible(a1));
        assert!(tree.get(a1).unwrap().is_shown());
        assert_eq!(tree.clipped_bounds(a1), None);

        tree.set_visible(a, true).unwrap();
        assert!(tree.is_visible(a1));
        assert!(tree.clipped_bounds(a1).is_some());
    }

    #[test]
    fn test_move_marks_old_and_new() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 0, 0, 2, 2);
        tree.move_to(a, Position::new(10, 5)).unwrap();
        assert_eq!(tree.position(a), Some(Position::new(10, 5)));
        let dirty = tree.get(root).unwrap().dirty_rect().unwrap();
        assert!(dirty.contains(0, 0));
        assert!(dirty.contains(11, 6));
    }

    #[test]
    fn test_resize_marks_self_and_parent() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 4, 4, 8, 4);
        tree.resize(a, Size::new(2, 2)).unwrap();

        assert_eq!(tree.get(a).unwrap().size(), Size::new(2, 2));
        assert_eq!(tree.get(a).unwrap().dirty_rect(), Some(Rect::new(0, 0, 2, 2)));
        assert_eq!(tree.get(root).unwrap().dirty_rect(), Some(Rect::new(4, 4, 8, 4)));
    }

    #[test]
    fn test_resize_parent_mark_is_clipped() {
        let (mut tree, root) = tree_with_root(10, 10);
        let a = child(&mut tree, root, 8, -2, 5, 5);
        tree.resize(a, Size::new(1, 1)).unwrap();
        assert_eq!(tree.get(root).unwrap().dirty_rect(), Some(Rect::new(8, 0, 2, 3)));
    }

    #[test]
    fn test_resize_preserving_plane() {
        let (mut tree, root) = tree_with_root(10, 10);
        let a = child(&mut tree, root, 0, 0, 6, 1);
        tree.get_mut(a)
            .unwrap()
            .print(4, 0, "日", Color::RED, Color::Default, Attrs::BOLD);
        tree.resize_preserving(a, Size::new(5, 1)).unwrap();

        let cell = tree.get(a).unwrap().get_cell(4, 0);
        assert_eq!(cell, Cell::styled(' ', Color::RED, Color::Default, Attrs::BOLD));
    }

    #[test]
    fn test_dirty_screen_rect() {
        let mut tree = PlaneTree::new();
        let root = tree.create_root(Position::ORIGIN, Size::new(20, 10)).unwrap();
        let a = child(&mut tree, root, 15, 2, 10, 4);

        assert_eq!(tree.dirty_screen_rect(a), None);

        tree.get_mut(a).unwrap().mark_dirty(Rect::new(2, 1, 6, 1));
        assert_eq!(tree.dirty_screen_rect(a), Some(Rect::new(17, 3, 3, 1)));
        // Not consumed
        assert!(tree.get(a).unwrap().dirty_rect().is_some());

        tree.set_visible(a, false).unwrap();
        assert_eq!(tree.dirty_screen_rect(a), None);

        assert_eq!(tree.take_dirty_rect(a), Some(Rect::new(2, 1, 6, 1)));
        assert_eq!(tree.get(a).unwrap().dirty_rect(), None);
    }

    #[test]
    fn test_layers_paint_order() {
        let (mut tree, root) = tree_with_root(20, 10);
        let a = child(&mut tree, root, 0, 0, 5, 5);
        let a1 = child(&mut tree, a, 1, 1, 2, 2);
        let b = child(&mut tree, root, 3, 3, 5, 5);

        let order: Vec<_> = tree.layers(root).iter().map(|l| l.id).collect();
        assert_eq!(order, vec![root, a, a1, b]);

        tree.set_visible(a, false).unwrap();
        let layers = tree.layers(root);
        assert_eq!(layers[1].clip, None);
        assert_eq!(layers[2].clip, None);
        assert_eq!(layers[3].clip, Some(Rect::new(3, 3, 5, 5)));
        assert_eq!(layers[2].origin, Position::new(1, 1));
    }
}
