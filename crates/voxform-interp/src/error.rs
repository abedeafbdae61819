/// An error type for the interpolation module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum InterpolationError {
    /// The spline order is outside `0..=5`.
    #[error("Spline order {0} is not supported, expected 0..=5")]
    InvalidOrder(usize),

    /// The array rank is outside `1..=3`.
    #[error("Arrays of rank {0} are not supported, expected 1..=3")]
    InvalidRank(usize),

    /// The data length does not match the declared shape.
    #[error("Data length ({0}) does not match the shape size ({1})")]
    ShapeMismatch(usize, usize),

    /// The boundary mode name is unknown.
    #[error("Unknown boundary mode: {0}")]
    InvalidMode(String),
}
