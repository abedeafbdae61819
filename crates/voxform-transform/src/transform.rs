use std::path::{Path, PathBuf};

use voxform_image::{Grid, SpatialImage, VoxelBuffer};
use voxform_interp::{map_coordinates, ResampleOptions};
use voxform_io::{write_x5, X5Error, X5File, X5Group};
use voxform_linalg::{allclose, Affine4};

use crate::{
    error::TransformError,
    grid::{GridSpace, EQUALITY_TOL},
};

/// File formats a transform can be written to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransformFormat {
    /// The hierarchical X5 container.
    #[default]
    X5,
}

impl std::fmt::Display for TransformFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformFormat::X5 => write!(f, "X5"),
        }
    }
}

/// State shared by every transform: the reference grid it resamples onto.
///
/// A transform starts without a reference and gains one through
/// [`Transform::set_reference`]; later assignments replace it.
#[derive(Clone, Debug, Default)]
pub struct TransformBase {
    reference: Option<GridSpace>,
}

impl TransformBase {
    /// Create a base without a reference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a base bound to a reference grid.
    pub fn with_reference(reference: GridSpace) -> Self {
        Self {
            reference: Some(reference),
        }
    }

    /// The reference grid, if one was assigned.
    pub fn grid(&self) -> Option<&GridSpace> {
        self.reference.as_ref()
    }

    /// Write the reference record into a `reference` subgroup, if bound.
    pub fn write_reference(&self, group: &mut X5Group) -> Result<(), TransformError> {
        if let Some(reference) = &self.reference {
            reference.to_x5(group.create_group("reference")?)?;
        }
        Ok(())
    }

    /// Restore a base from the `reference` subgroup written by [`Self::write_reference`].
    pub fn read_reference(group: &X5Group) -> Result<Self, TransformError> {
        match group.group("reference") {
            Ok(record) => Ok(Self::with_reference(GridSpace::from_x5(record)?)),
            Err(X5Error::MissingGroup(_)) => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A mapping of physical coordinates, `y = f(x)`, bound to a reference grid.
///
/// Implementors provide access to their [`TransformBase`] and override the
/// capabilities they support, at least [`Transform::map`] and [`Transform::to_x5`].
/// Resampling and persistence are shared by every transform.
pub trait Transform: Send + Sync {
    /// The shared transform state.
    fn base(&self) -> &TransformBase;

    /// Mutable access to the shared transform state.
    fn base_mut(&mut self) -> &mut TransformBase;

    /// The reference grid the transform resamples onto.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ReferenceNotSet`] if no reference was assigned.
    fn reference(&self) -> Result<&GridSpace, TransformError> {
        self.base().grid().ok_or(TransformError::ReferenceNotSet)
    }

    /// Assign the reference grid from the geometry of an image, replacing any
    /// previous one.
    fn set_reference(&mut self, image: &dyn Grid) -> Result<(), TransformError> {
        let reference = GridSpace::new(image)?;
        log::debug!("binding reference grid {:?} to transform", reference.shape());
        self.base_mut().reference = Some(reference);
        Ok(())
    }

    /// Dimensionality of the reference grid.
    fn ndim(&self) -> Result<usize, TransformError> {
        Ok(self.reference()?.ndim())
    }

    /// Map a batch of physical points forward through the transform.
    fn map(&self, _points: &[[f64; 3]]) -> Result<Vec<[f64; 3]>, TransformError> {
        Err(TransformError::NotImplemented("map"))
    }

    /// Shorthand for [`Transform::map`].
    fn call(&self, points: &[[f64; 3]]) -> Result<Vec<[f64; 3]>, TransformError> {
        self.map(points)
    }

    /// The 4x4 forward matrix of linear transforms.
    fn matrix(&self) -> Option<&Affine4> {
        None
    }

    /// Write the transform record into an X5 group.
    fn to_x5(&self, _group: &mut X5Group) -> Result<(), TransformError> {
        Err(TransformError::NotImplemented("to_x5"))
    }

    /// Resample a moving image onto the reference grid.
    ///
    /// See [`resample`].
    fn resample<I: SpatialImage>(
        &self,
        moving: &I,
        options: &ResampleOptions,
    ) -> Result<I, TransformError>
    where
        Self: Sized,
    {
        resample(self, moving, options)
    }

    /// Write the transform to a file.
    ///
    /// The file holds the root attributes `Format = "X5"` and `Version = 1`, and the
    /// transform record under the group `/0`.
    ///
    /// # Returns
    ///
    /// The path written to.
    fn to_filename<P: AsRef<Path>>(
        &self,
        path: P,
        format: TransformFormat,
    ) -> Result<PathBuf, TransformError>
    where
        Self: Sized,
    {
        let path = path.as_ref().to_path_buf();
        match format {
            TransformFormat::X5 => {
                let mut file = X5File::new();
                self.to_x5(file.create_group("/0")?)?;
                write_x5(&path, &file)?;
            }
        }
        Ok(path)
    }

    /// Whether both transforms share the reference grid and have matrices within
    /// [`EQUALITY_TOL`].
    ///
    /// Two unbound transforms have equal references, and two transforms without a
    /// matrix compare on their references alone.
    fn equals(&self, other: &dyn Transform) -> bool {
        let same_reference = match (self.base().grid(), other.base().grid()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.equals(b),
            _ => false,
        };
        let same_matrix = match (self.matrix(), other.matrix()) {
            (None, None) => true,
            (Some(a), Some(b)) => allclose(a, b, EQUALITY_TOL, EQUALITY_TOL),
            _ => false,
        };
        same_reference && same_matrix
    }
}

impl Transform for TransformBase {
    fn base(&self) -> &TransformBase {
        self
    }

    fn base_mut(&mut self) -> &mut TransformBase {
        self
    }
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn base(&self) -> &TransformBase {
        (**self).base()
    }

    fn base_mut(&mut self) -> &mut TransformBase {
        (**self).base_mut()
    }

    fn map(&self, points: &[[f64; 3]]) -> Result<Vec<[f64; 3]>, TransformError> {
        (**self).map(points)
    }

    fn matrix(&self) -> Option<&Affine4> {
        (**self).matrix()
    }

    fn to_x5(&self, group: &mut X5Group) -> Result<(), TransformError> {
        (**self).to_x5(group)
    }
}

/// Resample a moving image onto the reference grid of a transform.
///
/// Every reference voxel is taken to physical space through the reference affine,
/// mapped through the transform, and brought into the moving image's index space
/// through the inverse of the moving affine. The moving data is interpolated there.
///
/// # Arguments
///
/// * `transform` - The transform, bound to a reference grid.
/// * `moving` - The image to resample.
/// * `options` - Spline order, boundary mode, fill value, prefilter switch and
///   output data type (defaults to the moving data type).
///
/// # Returns
///
/// A new image of the moving image's type, with the reference shape and affine and a
/// copy of the moving header declaring the output data type.
///
/// # Errors
///
/// Fails if the transform is unbound, cannot map points, or the order is outside
/// `0..=5`, and with any error reading the moving image or building the result.
///
/// Example:
///
/// ```
/// use voxform_image::{DataType, SpatialImage, Volume, VoxelBuffer};
/// use voxform_interp::ResampleOptions;
/// use voxform_linalg::IDENTITY;
/// use voxform_transform::{IdentityTransform, Transform};
///
/// let data = VoxelBuffer::from(vec![1u8, 2, 3, 4, 5, 6]);
/// let moving = Volume::new(vec![2, 3], data, IDENTITY).unwrap();
///
/// let mut xfm = IdentityTransform::new();
/// xfm.set_reference(&moving).unwrap();
///
/// let options = ResampleOptions::default().with_order(0).with_output_dtype(DataType::F32);
/// let resampled = xfm.resample(&moving, &options).unwrap();
///
/// assert_eq!(resampled.buffer().as_slice::<f32>().unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// assert_eq!(resampled.header().data_dtype(), DataType::F32);
/// ```
pub fn resample<T, I>(
    transform: &T,
    moving: &I,
    options: &ResampleOptions,
) -> Result<I, TransformError>
where
    T: Transform + ?Sized,
    I: SpatialImage,
{
    let reference = transform.reference()?;
    options.validate()?;

    let data = moving.data()?;
    let output_dtype = options.output_dtype.unwrap_or_else(|| data.dtype());
    let moving_grid = GridSpace::new(moving)?;

    log::debug!(
        "resampling {:?} onto {:?}, order {}, mode {}, output {}",
        moving_grid.shape(),
        reference.shape(),
        options.order,
        options.mode,
        output_dtype
    );

    // reference index -> physical -> mapped physical -> moving index
    let mapped = transform.map(reference.ndcoords())?;
    let coordinates = moving_grid.index(&mapped);

    // a 2-D moving image is a single slice, so out-of-plane points follow the boundary mode
    let mut sampling_shape = moving_grid.shape().to_vec();
    sampling_shape.resize(3, 1);

    if outside_grid(&coordinates, &sampling_shape) {
        log::warn!(
            "all {} resampled points fall outside the moving grid {:?}",
            coordinates.len(),
            moving_grid.shape()
        );
    }

    let values = map_coordinates(&data.to_f64(), &sampling_shape, &coordinates, options)?;

    let mut header = moving.header().clone();
    header.set_data_dtype(output_dtype);

    let resampled = I::from_parts(
        VoxelBuffer::from_f64(output_dtype, &values),
        reference.shape().to_vec(),
        *reference.affine(),
        header,
    )?;

    log::debug!("resampled {} voxels", values.len());

    Ok(resampled)
}

/// Whether no coordinate lands within half a voxel of the grid.
fn outside_grid(coordinates: &[[f64; 3]], shape: &[usize]) -> bool {
    !coordinates.is_empty()
        && coordinates.iter().all(|c| {
            shape
                .iter()
                .zip(c)
                .any(|(&len, &x)| x < -0.5 || x > len as f64 - 0.5)
        })
}
