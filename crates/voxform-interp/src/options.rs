use std::str::FromStr;

use serde::{Deserialize, Serialize};
use voxform_image::DataType;

use crate::error::InterpolationError;

/// How the input is extended when a sample falls outside its borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// `k k k k | a b c d | k k k k`: points outside the input take `cval`.
    #[default]
    Constant,
    /// `a a a a | a b c d | d d d d`: the edge value is repeated.
    Nearest,
    /// `d c b a | a b c d | d c b a`: half-sample symmetric extension.
    Reflect,
    /// `d c b | a b c d | c b a`: whole-sample symmetric extension.
    Mirror,
    /// `a b c d | a b c d | a b c d`: periodic extension.
    Wrap,
}

impl FromStr for BoundaryMode {
    type Err = InterpolationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(BoundaryMode::Constant),
            "nearest" => Ok(BoundaryMode::Nearest),
            "reflect" => Ok(BoundaryMode::Reflect),
            "mirror" => Ok(BoundaryMode::Mirror),
            "wrap" => Ok(BoundaryMode::Wrap),
            _ => Err(InterpolationError::InvalidMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            BoundaryMode::Constant => "constant",
            BoundaryMode::Nearest => "nearest",
            BoundaryMode::Reflect => "reflect",
            BoundaryMode::Mirror => "mirror",
            BoundaryMode::Wrap => "wrap",
        };
        write!(f, "{name}")
    }
}

/// Options controlling a resampling operation.
///
/// # Examples
///
/// ```
/// use voxform_interp::{BoundaryMode, ResampleOptions};
///
/// let options = ResampleOptions::default()
///     .with_order(1)
///     .with_mode(BoundaryMode::Nearest);
///
/// assert_eq!(options.order, 1);
/// assert_eq!(options.cval, 0.0);
/// assert!(options.prefilter);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResampleOptions {
    /// Order of the spline interpolation, in `0..=5`.
    pub order: usize,
    /// Boundary extension mode.
    pub mode: BoundaryMode,
    /// Fill value for [`BoundaryMode::Constant`].
    pub cval: f64,
    /// Whether to run the spline prefilter before interpolating when `order > 1`.
    pub prefilter: bool,
    /// Element type of the output; `None` keeps the input type.
    pub output_dtype: Option<DataType>,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            order: 3,
            mode: BoundaryMode::Constant,
            cval: 0.0,
            prefilter: true,
            output_dtype: None,
        }
    }
}

impl ResampleOptions {
    /// Set the spline order.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Set the boundary mode.
    pub fn with_mode(mut self, mode: BoundaryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the constant fill value.
    pub fn with_cval(mut self, cval: f64) -> Self {
        self.cval = cval;
        self
    }

    /// Enable or disable the spline prefilter.
    pub fn with_prefilter(mut self, prefilter: bool) -> Self {
        self.prefilter = prefilter;
        self
    }

    /// Set the output element type.
    pub fn with_output_dtype(mut self, dtype: DataType) -> Self {
        self.output_dtype = Some(dtype);
        self
    }

    /// Check the options against the supported ranges.
    pub fn validate(&self) -> Result<(), InterpolationError> {
        if self.order > crate::MAX_ORDER {
            return Err(InterpolationError::InvalidOrder(self.order));
        }
        Ok(())
    }
}
