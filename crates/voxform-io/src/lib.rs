#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the io module.
pub mod error;

/// In-memory groups, attributes and datasets.
pub mod group;

/// Reading and writing X5 files.
pub mod functional;

pub use crate::error::X5Error;
pub use crate::functional::{read_x5, write_x5};
pub use crate::group::{AttrValue, Dataset, DatasetData, X5File, X5Group};

/// Value of the root `Format` attribute.
pub const X5_FORMAT: &str = "X5";

/// Value of the root `Version` attribute.
pub const X5_VERSION: u16 = 1;
