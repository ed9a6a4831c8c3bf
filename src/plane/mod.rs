//! Plane module: The scene graph of positioned, z-ordered surfaces.
//!
//! - [`PlaneTree`]: arena owning every plane and the parent/child links
//! - [`Plane`]: a drawing surface with its own buffer and dirty rectangle
//! - [`Layer`]: a plane's screen placement during one traversal

#[allow(clippy::module_inception)]
mod plane;
mod tree;

pub use plane::Plane;
pub use tree::{Layer, PlaneTree};

slotmap::new_key_type! {
    /// Stable handle to a plane in a [`PlaneTree`].
    ///
    /// Handles of destroyed planes are never reused for new planes.
    pub struct PlaneId;
}
