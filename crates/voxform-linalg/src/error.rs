/// An error type for the linear algebra module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LinalgError {
    /// The matrix has no inverse.
    #[error("Singular matrix: pivot {pivot:e} in column {column}")]
    SingularMatrix {
        /// Column where elimination failed.
        column: usize,
        /// Magnitude of the best available pivot.
        pivot: f64,
    },

    /// The matrix contains NaN or infinite entries.
    #[error("Matrix contains non-finite entries")]
    NonFinite,
}
