#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Boundary extension modes.
mod boundary;

/// Error types for the interpolation module.
pub mod error;

/// Resampling options.
pub mod options;

/// Sampling of volumes at fractional coordinates.
pub mod sample;

/// B-spline basis functions and the spline prefilter.
pub mod spline;

pub use crate::error::InterpolationError;
pub use crate::options::{BoundaryMode, ResampleOptions};
pub use crate::sample::{geometric_transform, map_coordinates};
pub use crate::spline::spline_filter;

/// Highest supported spline order.
pub const MAX_ORDER: usize = 5;

/// Highest supported array rank.
pub const MAX_RANK: usize = 3;
