use std::path::Path;

use voxform_io::read_x5;

use crate::{
    affine::AffineTransform, error::TransformError, identity::IdentityTransform,
    transform::Transform,
};

/// Load a transform written by [`Transform::to_filename`].
///
/// The container must declare `Format = "X5"` and `Version = 1`; the record under
/// `/0` decides the concrete transform, and its reference grid is restored when
/// present.
///
/// # Arguments
///
/// * `path` - The file to read.
///
/// # Errors
///
/// Fails if the file cannot be read, is not a supported container, or holds a
/// transform type that cannot be loaded.
///
/// Example:
///
/// ```no_run
/// use voxform_transform::{load_transform, Transform};
///
/// let xfm = load_transform("transform.x5").unwrap();
/// println!("{:?}", xfm.matrix());
/// ```
pub fn load_transform(path: impl AsRef<Path>) -> Result<Box<dyn Transform>, TransformError> {
    let file = read_x5(path)?;
    let group = file.group("0")?;
    let kind = group.attr_str("Type")?;
    log::debug!("loading {kind} transform");

    let transform: Box<dyn Transform> = match kind {
        "identity" => Box::new(IdentityTransform::from_x5(group)?),
        "affine" => Box::new(AffineTransform::from_x5(group)?),
        other => return Err(TransformError::UnknownTransformType(other.to_string())),
    };
    Ok(transform)
}
