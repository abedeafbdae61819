use voxform_io::X5Group;

use crate::{
    error::TransformError,
    transform::{Transform, TransformBase},
};

/// The transform mapping every point onto itself.
///
/// Resampling through it moves data between grids without changing its physical
/// placement.
#[derive(Clone, Debug, Default)]
pub struct IdentityTransform {
    base: TransformBase,
}

impl IdentityTransform {
    /// Create an unbound identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an identity record written by [`Transform::to_x5`].
    pub fn from_x5(group: &X5Group) -> Result<Self, TransformError> {
        let kind = group.attr_str("Type")?;
        if kind != "identity" {
            return Err(TransformError::UnknownTransformType(kind.to_string()));
        }
        Ok(Self {
            base: TransformBase::read_reference(group)?,
        })
    }
}

impl Transform for IdentityTransform {
    fn base(&self) -> &TransformBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TransformBase {
        &mut self.base
    }

    fn map(&self, points: &[[f64; 3]]) -> Result<Vec<[f64; 3]>, TransformError> {
        Ok(points.to_vec())
    }

    fn to_x5(&self, group: &mut X5Group) -> Result<(), TransformError> {
        group.set_attr("Type", "identity");
        self.base.write_reference(group)
    }
}
