#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// 4x4 homogeneous affine operations.
pub mod affine;

/// Error types for the linear algebra module.
pub mod error;

pub use crate::affine::{
    allclose, invert, matmul, transform_point, transform_points, Affine4, IDENTITY,
};
pub use crate::error::LinalgError;
