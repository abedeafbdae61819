#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Voxel element types and typed storage.
pub mod dtype;

/// Error types for the image module.
pub mod error;

/// Image header metadata.
pub mod header;

/// image representation for gridded volumes.
pub mod image;

pub use crate::dtype::{DataType, Voxel, VoxelBuffer};
pub use crate::error::ImageError;
pub use crate::header::ImageHeader;
pub use crate::image::{Grid, SpatialImage, Volume};
pub use voxform_linalg::Affine4;
