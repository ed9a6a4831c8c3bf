//! Error types for the compositor core.

use crate::plane::PlaneId;
use thiserror::Error;

/// Errors that can occur while building or mutating the scene.
///
/// Out-of-bounds cell access and malformed UTF-8 are deliberately absent:
/// those are handled in place and never surface as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A cell grid or dirty list could not be allocated.
    #[error("out of memory allocating {cells} cells")]
    OutOfMemory {
        /// Number of elements that were requested.
        cells: usize,
    },

    /// The handle refers to a plane that no longer exists.
    #[error("plane not found: {0:?}")]
    PlaneNotFound(PlaneId),

    /// A z-order operation named a plane that is not a sibling.
    #[error("{plane:?} and {sibling:?} are not siblings")]
    NotSiblings {
        /// The plane being moved.
        plane: PlaneId,
        /// The reference plane.
        sibling: PlaneId,
    },

    /// The operation needs a parent but the plane is a root.
    #[error("{0:?} is a root plane")]
    RootPlane(PlaneId),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Allocate a `Vec` holding exactly `len` copies of `value`.
///
/// Allocation failure is reported as [`Error::OutOfMemory`] instead of
/// aborting, so callers can leave their previous state untouched.
pub(crate) fn try_alloc<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory { cells: len })?;
    vec.resize(len, value);
    Ok(vec)
}
