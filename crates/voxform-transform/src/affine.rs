use voxform_io::{Dataset, X5Group};
use voxform_linalg::{invert, matmul, transform_points, Affine4, IDENTITY};

use crate::{
    error::{GridError, TransformError},
    transform::{Transform, TransformBase},
};

/// A linear transform of physical space held as a 4x4 homogeneous matrix.
///
/// The matrix maps reference-space points onto moving-space points, so resampling a
/// moving image through it pulls data from `matrix · x`.
///
/// # Examples
///
/// ```
/// use voxform_transform::{AffineTransform, Transform};
///
/// let shift = [
///     [1.0, 0.0, 0.0, 2.0],
///     [0.0, 1.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0, -1.0],
///     [0.0, 0.0, 0.0, 1.0],
/// ];
/// let xfm = AffineTransform::new(shift);
/// assert_eq!(xfm.map(&[[1.0, 1.0, 1.0]]).unwrap(), vec![[3.0, 1.0, 0.0]]);
/// ```
#[derive(Clone, Debug)]
pub struct AffineTransform {
    base: TransformBase,
    matrix: Affine4,
}

impl AffineTransform {
    /// Create an unbound affine transform from its forward matrix.
    pub fn new(matrix: Affine4) -> Self {
        Self {
            base: TransformBase::new(),
            matrix,
        }
    }

    /// The inverse transform, bound to the same reference.
    ///
    /// # Errors
    ///
    /// Fails if the matrix is singular.
    pub fn inverse(&self) -> Result<Self, TransformError> {
        let matrix = invert(&self.matrix).map_err(GridError::Linalg)?;
        Ok(Self {
            base: self.base.clone(),
            matrix,
        })
    }

    /// Chain another affine after this one, `other · self`, keeping this reference.
    pub fn then(&self, other: &AffineTransform) -> Self {
        Self {
            base: self.base.clone(),
            matrix: matmul(&other.matrix, &self.matrix),
        }
    }

    /// Read an affine record written by [`Transform::to_x5`].
    pub fn from_x5(group: &X5Group) -> Result<Self, TransformError> {
        let kind = group.attr_str("Type")?;
        if kind != "affine" {
            return Err(TransformError::UnknownTransformType(kind.to_string()));
        }
        Ok(Self {
            base: TransformBase::read_reference(group)?,
            matrix: group.dataset("matrix")?.to_matrix("matrix")?,
        })
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::new(IDENTITY)
    }
}

impl Transform for AffineTransform {
    fn base(&self) -> &TransformBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TransformBase {
        &mut self.base
    }

    fn map(&self, points: &[[f64; 3]]) -> Result<Vec<[f64; 3]>, TransformError> {
        Ok(transform_points(&self.matrix, points))
    }

    fn matrix(&self) -> Option<&Affine4> {
        Some(&self.matrix)
    }

    fn to_x5(&self, group: &mut X5Group) -> Result<(), TransformError> {
        group.set_attr("Type", "affine");
        group.create_dataset("matrix", Dataset::from_matrix(&self.matrix))?;
        self.base.write_reference(group)
    }
}
