use voxform_image::ImageError;
use voxform_interp::InterpolationError;
use voxform_io::X5Error;
use voxform_linalg::LinalgError;

/// An error type for the grid module.
#[derive(thiserror::Error, Debug)]
pub enum GridError {
    /// The grid is neither two nor three dimensional.
    #[error("Only 2D and 3D images are supported, got {0} dimensions")]
    InvalidDimensionality(usize),

    /// The index-to-physical affine cannot be inverted.
    #[error(transparent)]
    Linalg(#[from] LinalgError),

    /// Error reading or writing the grid record.
    #[error(transparent)]
    X5(#[from] X5Error),

    /// The voxel count of the grid does not fit in memory addressing.
    #[error("Grid shape {0:?} has too many voxels")]
    TooLarge(Vec<usize>),

    /// A stored grid record is inconsistent.
    #[error("Invalid grid record: {0}")]
    InvalidRecord(String),
}

/// An error type for the transform module.
#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    /// The transform has no reference grid yet.
    #[error("Reference space not set")]
    ReferenceNotSet,

    /// The capability is not provided by this transform.
    #[error("{0} is not implemented for this transform")]
    NotImplemented(&'static str),

    /// Error building a grid.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Error reading or building an image.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error interpolating the moving data.
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    /// Error reading or writing the transform file.
    #[error(transparent)]
    X5(#[from] X5Error),

    /// The stored transform type is not known.
    #[error("Unknown transform type: {0}")]
    UnknownTransformType(String),
}
