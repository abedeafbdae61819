#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Linear transforms held as a 4x4 matrix.
pub mod affine;

/// Error types for the transform module.
pub mod error;

/// Reference grids mapping array indices to physical space.
pub mod grid;

/// The identity transform.
pub mod identity;

/// Loading transforms back from file.
pub mod load;

/// The transform abstraction, resampling and persistence.
pub mod transform;

pub use crate::affine::AffineTransform;
pub use crate::error::{GridError, TransformError};
pub use crate::grid::{GridSpace, EQUALITY_TOL};
pub use crate::identity::IdentityTransform;
pub use crate::load::load_transform;
pub use crate::transform::{resample, Transform, TransformBase, TransformFormat};
