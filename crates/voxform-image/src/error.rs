use crate::dtype::DataType;

/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the voxel buffer length does not match the shape.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidDataLength(usize, usize),

    /// Error when a shape has a zero extent or too many voxels.
    #[error("Invalid shape {0:?}: extents must be positive and fit in memory")]
    InvalidShape(Vec<usize>),

    /// Error when the voxel data cannot be materialized.
    #[error("Failed to read voxel data: {0}")]
    DataUnavailable(String),

    /// Error when a buffer of one type was expected to be another.
    #[error("Expected voxel type {expected:?}, got {actual:?}")]
    DtypeMismatch {
        /// The requested type.
        expected: DataType,
        /// The stored type.
        actual: DataType,
    },
}
