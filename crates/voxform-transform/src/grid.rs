use std::sync::OnceLock;

use voxform_image::Grid;
use voxform_io::{Dataset, X5Group};
use voxform_linalg::{allclose, invert, transform_point, transform_points, Affine4};

use crate::error::GridError;

/// Absolute and relative tolerance used whenever affines are compared.
pub const EQUALITY_TOL: f64 = 1e-5;

/// A rectangular sampling grid embedded in physical space.
///
/// The grid maps integer array indices to physical (RAS) coordinates through a 4x4
/// homogeneous affine, and back through its inverse. Two dimensional grids are
/// handled as a single slice: their index points carry a zero third component.
///
/// The full set of grid indices and their physical coordinates are computed on
/// first access and cached for the lifetime of the grid.
///
/// # Examples
///
/// ```
/// use voxform_image::{Volume, VoxelBuffer};
/// use voxform_transform::GridSpace;
/// use voxform_linalg::IDENTITY;
///
/// let volume = Volume::new(vec![2, 3, 4], VoxelBuffer::from(vec![0f32; 24]), IDENTITY).unwrap();
/// let grid = GridSpace::new(&volume).unwrap();
///
/// assert_eq!(grid.ndim(), 3);
/// assert_eq!(grid.nvox(), 24);
/// assert_eq!(grid.ndcoords()[5], [0.0, 1.0, 1.0]);
/// ```
#[derive(Clone, Debug)]
pub struct GridSpace {
    affine: Affine4,
    inverse: Affine4,
    shape: Vec<usize>,
    nvox: usize,
    ndindex: OnceLock<Vec<[usize; 3]>>,
    ndcoords: OnceLock<Vec<[f64; 3]>>,
}

impl GridSpace {
    /// Create a grid from the geometry of an image.
    ///
    /// Only the affine and the shape are read; the voxel data is never touched.
    ///
    /// # Arguments
    ///
    /// * `image` - Anything exposing an index-to-physical affine and a shape.
    ///
    /// # Errors
    ///
    /// Fails with [`GridError::InvalidDimensionality`] unless the shape has two or
    /// three axes, and with [`GridError::Linalg`] if the affine is singular.
    pub fn new<G: Grid + ?Sized>(image: &G) -> Result<Self, GridError> {
        Self::from_affine(*image.affine(), image.shape().to_vec())
    }

    /// Create a grid from an affine and a shape.
    pub fn from_affine(affine: Affine4, shape: Vec<usize>) -> Result<Self, GridError> {
        if !(2..=3).contains(&shape.len()) {
            return Err(GridError::InvalidDimensionality(shape.len()));
        }

        let Some(nvox) = shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n)) else {
            return Err(GridError::TooLarge(shape));
        };
        let inverse = invert(&affine)?;

        Ok(Self {
            affine,
            inverse,
            shape,
            nvox,
            ndindex: OnceLock::new(),
            ndcoords: OnceLock::new(),
        })
    }

    /// The index-to-physical affine.
    pub fn affine(&self) -> &Affine4 {
        &self.affine
    }

    /// The physical-to-index affine.
    pub fn inverse(&self) -> &Affine4 {
        &self.inverse
    }

    /// The size of each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The number of axes, 2 or 3.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// The number of voxels.
    pub fn nvox(&self) -> usize {
        self.nvox
    }

    /// Every grid index, first axis slowest.
    ///
    /// Indices of two dimensional grids are padded with a zero third component.
    pub fn ndindex(&self) -> &[[usize; 3]] {
        self.ndindex.get_or_init(|| {
            log::debug!("caching {} grid indices for shape {:?}", self.nvox, self.shape);
            (0..self.nvox)
                .map(|flat| {
                    let mut index = [0; 3];
                    let mut rem = flat;
                    for (axis, &len) in self.shape.iter().enumerate().rev() {
                        index[axis] = rem % len;
                        rem /= len;
                    }
                    index
                })
                .collect()
        })
    }

    /// The physical coordinates of every grid index, in [`Self::ndindex`] order.
    pub fn ndcoords(&self) -> &[[f64; 3]] {
        self.ndcoords.get_or_init(|| {
            log::debug!("caching {} grid coordinates for shape {:?}", self.nvox, self.shape);
            self.ndindex()
                .iter()
                .map(|i| transform_point(&self.affine, &[i[0] as f64, i[1] as f64, i[2] as f64]))
                .collect()
        })
    }

    /// Map physical coordinates into this grid's (fractional) index space.
    ///
    /// Example:
    ///
    /// ```
    /// use voxform_transform::GridSpace;
    ///
    /// let affine = [
    ///     [2.0, 0.0, 0.0, -10.0],
    ///     [0.0, 2.0, 0.0, 0.0],
    ///     [0.0, 0.0, 1.0, 0.0],
    ///     [0.0, 0.0, 0.0, 1.0],
    /// ];
    /// let grid = GridSpace::from_affine(affine, vec![10, 10]).unwrap();
    /// assert_eq!(grid.index(&[[-6.0, 3.0, 0.0]]), vec![[2.0, 1.5, 0.0]]);
    /// ```
    pub fn index(&self, coordinates: &[[f64; 3]]) -> Vec<[f64; 3]> {
        transform_points(&self.inverse, coordinates)
    }

    /// Whether both grids share the shape and have affines within [`EQUALITY_TOL`].
    pub fn equals(&self, other: &GridSpace) -> bool {
        self.shape == other.shape
            && allclose(&self.affine, &other.affine, EQUALITY_TOL, EQUALITY_TOL)
    }

    /// Write the grid record into an X5 group.
    ///
    /// The group receives the attributes `Type = "image"` and `ndim`, and the
    /// datasets `affine` (4x4) and `shape`.
    pub fn to_x5(&self, group: &mut X5Group) -> Result<(), GridError> {
        let shape: Vec<u64> = self.shape.iter().map(|&s| s as u64).collect();
        group.set_attr("Type", "image");
        group.set_attr("ndim", self.ndim() as i64);
        group.create_dataset("affine", Dataset::from_matrix(&self.affine))?;
        group.create_dataset("shape", Dataset::from_u64s(&shape))?;
        Ok(())
    }

    /// Read a grid record written by [`Self::to_x5`].
    pub fn from_x5(group: &X5Group) -> Result<Self, GridError> {
        let kind = group.attr_str("Type")?;
        if kind != "image" {
            return Err(GridError::InvalidRecord(format!(
                "expected Type \"image\", found {kind:?}"
            )));
        }

        let ndim = group.attr_i64("ndim")?;
        let affine = group.dataset("affine")?.to_matrix("affine")?;
        let shape = group
            .dataset("shape")?
            .to_u64s("shape")?
            .into_iter()
            .map(|s| {
                usize::try_from(s)
                    .map_err(|_| GridError::InvalidRecord(format!("axis extent {s} out of range")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if ndim != shape.len() as i64 {
            return Err(GridError::InvalidRecord(format!(
                "ndim {ndim} disagrees with shape {shape:?}"
            )));
        }

        Self::from_affine(affine, shape)
    }
}

impl PartialEq for GridSpace {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Grid for GridSpace {
    fn affine(&self) -> &Affine4 {
        &self.affine
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}
