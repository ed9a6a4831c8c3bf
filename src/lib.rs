//! # Stratum
//!
//! A layered cell-grid compositor for terminal user interfaces.
//!
//! Stratum draws overlapping text surfaces (dialogs, popups, status lines)
//! into one frame and sends the terminal only the cells that changed.
//!
//! ## Core Concepts
//!
//! - **Planes**: Positioned surfaces in a tree, clipped by their ancestors
//!   and stacked in z-order
//! - **Dirty rectangles**: Drawing marks areas dirty; only those are
//!   recomposed
//! - **Transparency**: A default cell lets the planes beneath show through
//! - **Double-buffered rendering**: Front and back buffers with a
//!   cell-level diff, written in one call
//!
//! ## Example
//!
//! ```rust
//! use stratum::{Color, Attrs, Compositor, PlaneTree, Position, Renderer, RendererConfig, Size};
//!
//! let size = Size::new(20, 5);
//! let mut tree = PlaneTree::new();
//! let root = tree.create_root(Position::ORIGIN, size)?;
//! let popup = tree.create_child(root, Position::new(2, 1), Size::new(8, 1))?;
//! if let Some(plane) = tree.get_mut(popup) {
//!     plane.print(0, 0, "hello", Color::YELLOW, Color::Default, Attrs::BOLD);
//! }
//!
//! let mut compositor = Compositor::new(size);
//! let mut renderer = Renderer::new(size, RendererConfig::default())?;
//! compositor.compose(&mut tree, root, renderer.back_mut())?;
//!
//! let mut out = Vec::new();
//! renderer.flush(&mut out)?;
//! assert!(!out.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod buffer;
pub mod compositor;
pub mod error;
pub mod layout;
pub mod plane;
pub mod render;

// Re-exports for convenience
pub use buffer::{Attrs, Buffer, Cell, Color, ColorDepth};
pub use compositor::Compositor;
pub use error::{Error, Result};
pub use layout::{Bounds, Position, Rect, Size};
pub use plane::{Layer, Plane, PlaneId, PlaneTree};
pub use render::{FlushStats, Renderer, RendererConfig};
