//! Layout module: Geometry shared by buffers, planes and the compositor.
//!
//! Screen coordinates are unsigned; plane offsets are signed so a plane can
//! be placed partly off screen and clipped.

mod rect;

pub use rect::{Bounds, Position, Rect, Size};
