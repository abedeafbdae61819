/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum X5Error {
    /// Error to open, write or read the file.
    #[error("Failed to manipulate the file. {0}")]
    Io(#[from] std::io::Error),

    /// Error to encode or decode the container.
    #[error("Failed to encode or decode the X5 container. {0}")]
    Json(#[from] serde_json::Error),

    /// A required attribute is absent.
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    /// A required dataset is absent.
    #[error("Missing dataset: {0}")]
    MissingDataset(String),

    /// A required group is absent.
    #[error("Missing group: {0}")]
    MissingGroup(String),

    /// An attribute or dataset holds a different type than requested.
    #[error("Member {name} has type {actual}, expected {expected}")]
    WrongType {
        /// Name of the member.
        name: String,
        /// Requested type.
        expected: &'static str,
        /// Stored type.
        actual: &'static str,
    },

    /// A group or dataset already exists under the name.
    #[error("Member already exists: {0}")]
    MemberExists(String),

    /// The group path is empty or malformed.
    #[error("Invalid group path: {0:?}")]
    InvalidPath(String),

    /// The dataset shape does not match its data.
    #[error("Dataset shape {shape:?} does not match {len} elements")]
    InvalidDataset {
        /// Declared shape.
        shape: Vec<usize>,
        /// Number of stored elements.
        len: usize,
    },

    /// The file is not an X5 container of a supported version.
    #[error("Unsupported container: format {format:?}, version {version}")]
    UnsupportedFormat {
        /// The `Format` attribute found.
        format: String,
        /// The `Version` attribute found.
        version: u16,
    },
}
