//! Compositor module: Flattening the plane tree into one buffer.
//!
//! - [`Compositor`]: Per-frame dirty collection and back-to-front blitting
//! - [`coalesce`]: Dirty rectangle merging

#[allow(clippy::module_inception)]
mod compositor;
mod dirty;

pub use compositor::Compositor;
pub use dirty::coalesce;
