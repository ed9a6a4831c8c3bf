//! Geometry primitives.
//!
//! Screen space is unsigned 16-bit ([`Rect`]). Plane placement relative to a
//! parent is signed 32-bit ([`Position`], [`Bounds`]) so planes can sit
//! partly or wholly off screen.

/// A rectangle in screen (or plane-local) cell coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate (column) of the top-left corner.
    pub x: u16,
    /// Y coordinate (row) of the top-left corner.
    pub y: u16,
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle covering a whole surface of `size`.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Zero-sized rectangle.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Get the area (number of cells).
    #[inline]
    pub const fn area(&self) -> u32 {
        (self.width as u32) * (self.height as u32)
    }

    /// Check if the rectangle is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Get the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Size of the rectangle.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if this rectangle intersects with another.
    #[inline]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// The overlapping area, or `None` when the rectangles are disjoint.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > x && bottom > y).then(|| Self::new(x, y, right - x, bottom - y))
    }

    /// Smallest rectangle containing both. Empty inputs are ignored.
    #[inline]
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right - x, bottom - y)
    }

    /// Grow the rectangle by `margin` on all sides, saturating at the edges
    /// of the coordinate space.
    #[inline]
    #[must_use]
    pub const fn expand(&self, margin: u16) -> Self {
        let x = self.x.saturating_sub(margin);
        let y = self.y.saturating_sub(margin);
        let right = self.right().saturating_add(margin);
        let bottom = self.bottom().saturating_add(margin);
        Self::new(x, y, right - x, bottom - y)
    }

    /// Check if the rectangles overlap or share an edge or corner.
    #[inline]
    pub const fn touches(&self, other: &Self) -> bool {
        !self.is_empty() && !other.is_empty() && self.expand(1).intersects(other)
    }
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rect({}, {} {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// Width and height of a surface, in cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Size {
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Number of cells.
    #[inline]
    pub const fn area(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Check if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A signed cell position (plane offsets, off-screen coordinates).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Create a new position.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise sum, saturating.
    #[inline]
    #[must_use]
    pub const fn offset(self, by: Self) -> Self {
        Self::new(self.x.saturating_add(by.x), self.y.saturating_add(by.y))
    }

    /// Component-wise difference, saturating.
    #[inline]
    #[must_use]
    pub const fn minus(self, by: Self) -> Self {
        Self::new(self.x.saturating_sub(by.x), self.y.saturating_sub(by.y))
    }
}

/// A half-open rectangle in signed coordinates, stored as edges.
///
/// Used while clipping planes against their ancestors, before the result is
/// known to be on screen.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Bounds {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl Bounds {
    /// Everything a [`Rect`] can address.
    pub const SCREEN: Self = Self {
        left: 0,
        top: 0,
        right: u16::MAX as i32,
        bottom: u16::MAX as i32,
    };

    /// Bounds of a `size`-sized surface whose top-left corner is at `origin`.
    #[inline]
    pub const fn at(origin: Position, size: Size) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x.saturating_add(size.width as i32),
            bottom: origin.y.saturating_add(size.height as i32),
        }
    }

    /// Check if no cell is covered.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Narrow to the overlap with `other` (max of left/top, min of
    /// right/bottom). The result may be empty.
    #[inline]
    #[must_use]
    pub fn clip(&self, other: &Self) -> Self {
        Self {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }

    /// Convert to a screen rectangle, or `None` if nothing of it is on screen.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn to_rect(&self) -> Option<Rect> {
        let clipped = self.clip(&Self::SCREEN);
        if clipped.is_empty() {
            return None;
        }
        Some(Rect::new(
            clipped.left as u16,
            clipped.top as u16,
            (clipped.right - clipped.left) as u16,
            (clipped.bottom - clipped.top) as u16,
        ))
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self {
            left: i32::from(rect.x),
            top: i32::from(rect.y),
            right: i32::from(rect.right()),
            bottom: i32::from(rect.bottom()),
        }
    }
}
