//! Compositor: Merges a plane tree into one flat buffer.
//!
//! Each frame the compositor:
//! 1. Collects dirty rectangles (explicit invalidations plus every visible
//!    plane's dirty area, clearing the planes' flags as it goes)
//! 2. Widens each by a column on both sides and coalesces them until no
//!    two touch
//! 3. For each rectangle, paints the default cell and then copies every
//!    visible plane back to front, skipping transparent cells
//!
//! A cell's final value depends on its horizontal neighbors (a wide glyph
//! needs both halves), which is why rectangles are widened: a glyph cut by
//! the edge of a change is then recomposed whole.

use super::dirty::coalesce;
use crate::buffer::{Buffer, Cell};
use crate::error::Result;
use crate::layout::{Rect, Size};
use crate::plane::{Layer, Plane, PlaneId, PlaneTree};
use tracing::{debug_span, trace, warn};

/// Frame compositor for a [`PlaneTree`].
#[derive(Debug)]
pub struct Compositor {
    /// Size of the target the compositor expects.
    size: Size,
    /// Screen-space rectangles invalidated since the last frame.
    pending: Vec<Rect>,
    /// Whether the next frame recomposes the whole target.
    needs_full_redraw: bool,
}

impl Compositor {
    /// Create a compositor for a target of `size`.
    ///
    /// The first frame is always a full redraw.
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            pending: Vec::new(),
            needs_full_redraw: true,
        }
    }

    /// Size of the target.
    #[inline]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Whether the next frame recomposes everything.
    #[inline]
    pub const fn needs_full_redraw(&self) -> bool {
        self.needs_full_redraw
    }

    /// Screen rectangles waiting for the next frame.
    #[inline]
    pub fn pending(&self) -> &[Rect] {
        &self.pending
    }

    /// Mark a screen rectangle for recomposition.
    ///
    /// Use this for changes the planes cannot report themselves, such as
    /// moving or hiding a root plane. If the pending list cannot grow, the
    /// next frame becomes a full redraw instead.
    pub fn invalidate(&mut self, rect: Rect) {
        if self.needs_full_redraw {
            return;
        }
        let Some(rect) = rect.intersection(&Rect::from_size(self.size)) else {
            return;
        };
        if self.pending.try_reserve(1).is_err() {
            warn!(?rect, "dirty list allocation failed, falling back to full redraw");
            self.invalidate_all();
            return;
        }
        self.pending.push(rect);
    }

    /// Recompose the whole target on the next frame.
    pub fn invalidate_all(&mut self) {
        self.needs_full_redraw = true;
        self.pending = Vec::new();
    }

    /// Change the target size. The next frame is a full redraw.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.invalidate_all();
    }

    /// Compose the tree under `root` into `target`.
    ///
    /// Returns the screen rectangles that were recomposed. A target whose
    /// size differs from the compositor's is treated like a resize.
    pub fn compose(&mut self, tree: &mut PlaneTree, root: PlaneId, target: &mut Buffer) -> Result<Vec<Rect>> {
        let _span = debug_span!("compose", width = target.width(), height = target.height()).entered();

        if target.size() != self.size {
            self.resize(target.size());
        }

        let layers = tree.layers(root);
        let rects = if self.needs_full_redraw {
            for layer in &layers {
                tree.take_dirty_rect(layer.id);
            }
            self.needs_full_redraw = false;
            self.pending.clear();
            let area = target.area();
            if area.is_empty() {
                Vec::new()
            } else {
                vec![area]
            }
        } else {
            let collected = self.collect(tree, &layers, target.area());
            let count = collected.len();
            let rects = coalesce(collected);
            trace!(collected = count, coalesced = rects.len(), "dirty rects");
            rects
        };

        for rect in &rects {
            paint(tree, &layers, *rect, target);
        }
        Ok(rects)
    }

    /// Drain explicit invalidations and every plane's dirty area.
    fn collect(&mut self, tree: &mut PlaneTree, layers: &[Layer], area: Rect) -> Vec<Rect> {
        let mut rects = std::mem::take(&mut self.pending);
        for rect in &mut rects {
            *rect = widen(*rect, area);
        }
        let mut overflow = false;

        for layer in layers {
            let Some(local) = tree.take_dirty_rect(layer.id) else {
                continue;
            };
            let Some(rect) = layer.to_screen(local).map(|r| widen(r, area)) else {
                continue;
            };
            if overflow {
                continue;
            }
            if rects.try_reserve(1).is_err() {
                warn!("dirty list allocation failed, recomposing the whole target");
                overflow = true;
                continue;
            }
            rects.push(rect);
        }

        if overflow {
            vec![area]
        } else {
            rects
        }
    }
}

/// Grow a rectangle by one column on each side, within `area`.
fn widen(rect: Rect, area: Rect) -> Rect {
    let left = rect.x.saturating_sub(1);
    let right = rect.right().saturating_add(1).min(area.right());
    Rect::new(left, rect.y, right.saturating_sub(left), rect.height)
        .intersection(&area)
        .unwrap_or(Rect::ZERO)
}

/// Recompose one screen rectangle.
fn paint(tree: &PlaneTree, layers: &[Layer], rect: Rect, target: &mut Buffer) {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            target.put(x, y, Cell::EMPTY);
        }
    }

    for layer in layers {
        let Some(clip) = layer.clip else {
            continue;
        };
        let Some(region) = clip.intersection(&rect) else {
            continue;
        };
        let Some(plane) = tree.get(layer.id) else {
            continue;
        };
        blit(plane, layer, clip, region, target);
    }

    target.repair_wide(rect);
}

/// Copy the opaque cells of `plane` inside `region` (screen space).
///
/// A wide glyph cut by the plane's visible area is drawn as a styled blank:
/// a continuation at the left edge whose base is clipped, missing or not
/// wide, and a base at the right edge whose continuation is clipped.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blit(plane: &Plane, layer: &Layer, clip: Rect, region: Rect, target: &mut Buffer) {
    let buffer = plane.buffer();
    // Clipping guarantees every covered screen cell maps to a valid local cell.
    let local = |screen: u16, origin: i32| (i32::from(screen) - origin) as u16;

    for sy in region.y..region.bottom() {
        let ly = local(sy, layer.origin.y);
        for sx in region.x..region.right() {
            let lx = local(sx, layer.origin.x);
            let cell = buffer.get(lx, ly);
            if cell.is_transparent() {
                continue;
            }

            let cell = if cell.is_continuation() && sx == region.x {
                let base_shown = sx > clip.x && lx > 0;
                let base = buffer.get(lx.wrapping_sub(1), ly);
                if base_shown && !base.is_continuation() && base.is_wide() {
                    cell
                } else {
                    cell.blanked()
                }
            } else if cell.is_wide() && sx + 1 >= clip.right() {
                cell.blanked()
            } else {
                cell
            };
            target.put(sx, sy, cell);
        }
    }
}
