//! Buffer module: Core data structures for the cell grid.
//!
//! This module contains:
//! - [`Cell`]: The atomic unit of display
//! - [`Color`] and [`ColorDepth`]: Color representation and downgrade
//! - [`Attrs`]: Text style bitflags
//! - [`Buffer`]: A flat grid of cells with UTF-8 aware printing

mod cell;
mod color;
mod text;
#[allow(clippy::module_inception)]
mod buffer;

pub use buffer::Buffer;
pub use cell::{Attrs, Cell};
pub use color::{index_to_rgb, rgb_to_16, rgb_to_256, Color, ColorDepth};
