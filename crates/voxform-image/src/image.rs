use std::borrow::Cow;

use voxform_linalg::Affine4;

use crate::{dtype::VoxelBuffer, error::ImageError, header::ImageHeader};

/// Geometry of a gridded volume: the index-to-physical affine and the per-axis extents.
///
/// Implementors must answer both queries from metadata alone, without touching the
/// voxel array.
pub trait Grid {
    /// The 4x4 index-to-physical (RAS) affine.
    fn affine(&self) -> &Affine4;

    /// The size of each axis.
    fn shape(&self) -> &[usize];
}

/// An image with voxel data living on a [`Grid`].
pub trait SpatialImage: Grid + Sized {
    /// Materialize the voxel array in C order (last axis fastest).
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::DataUnavailable`] when a lazily backed image cannot
    /// produce its data.
    fn data(&self) -> Result<Cow<'_, VoxelBuffer>, ImageError>;

    /// The image header.
    fn header(&self) -> &ImageHeader;

    /// Mutable access to the image header.
    fn header_mut(&mut self) -> &mut ImageHeader;

    /// Build a new image of the same concrete type.
    fn from_parts(
        data: VoxelBuffer,
        shape: Vec<usize>,
        affine: Affine4,
        header: ImageHeader,
    ) -> Result<Self, ImageError>;
}

/// An in-memory volume.
///
/// # Examples
///
/// ```
/// use voxform_image::{Grid, Volume, VoxelBuffer};
/// use voxform_linalg::IDENTITY;
///
/// let volume = Volume::new(vec![2, 3], VoxelBuffer::from(vec![0u8; 6]), IDENTITY).unwrap();
/// assert_eq!(volume.shape(), &[2, 3]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    shape: Vec<usize>,
    affine: Affine4,
    data: VoxelBuffer,
    header: ImageHeader,
}

impl Volume {
    /// Create a new volume; the header declares the buffer's data type.
    ///
    /// # Errors
    ///
    /// If the buffer length does not match the product of the shape, or the shape
    /// has a zero extent or overflows, an error is returned.
    pub fn new(shape: Vec<usize>, data: VoxelBuffer, affine: Affine4) -> Result<Self, ImageError> {
        let header = ImageHeader::new(data.dtype());
        Self::with_header(shape, data, affine, header)
    }

    /// Create a new volume with an explicit header.
    pub fn with_header(
        shape: Vec<usize>,
        data: VoxelBuffer,
        affine: Affine4,
        header: ImageHeader,
    ) -> Result<Self, ImageError> {
        if shape.iter().any(|&s| s == 0) {
            return Err(ImageError::InvalidShape(shape));
        }

        let Some(nvox) = shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n)) else {
            return Err(ImageError::InvalidShape(shape));
        };
        if data.len() != nvox {
            return Err(ImageError::InvalidDataLength(data.len(), nvox));
        }

        Ok(Self {
            shape,
            affine,
            data,
            header,
        })
    }

    /// Borrow the voxel buffer.
    pub fn buffer(&self) -> &VoxelBuffer {
        &self.data
    }

    /// Consume the volume and return its voxel buffer.
    pub fn into_buffer(self) -> VoxelBuffer {
        self.data
    }
}

impl Grid for Volume {
    fn affine(&self) -> &Affine4 {
        &self.affine
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}

impl SpatialImage for Volume {
    fn data(&self) -> Result<Cow<'_, VoxelBuffer>, ImageError> {
        Ok(Cow::Borrowed(&self.data))
    }

    fn header(&self) -> &ImageHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ImageHeader {
        &mut self.header
    }

    fn from_parts(
        data: VoxelBuffer,
        shape: Vec<usize>,
        affine: Affine4,
        header: ImageHeader,
    ) -> Result<Self, ImageError> {
        Self::with_header(shape, data, affine, header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DataType;
    use voxform_linalg::IDENTITY;

    #[test]
    fn test_volume_new() -> Result<(), ImageError> {
        let volume = Volume::new(
            vec![2, 3, 4],
            VoxelBuffer::from((0..24).map(|x| x as i16).collect::<Vec<_>>()),
            IDENTITY,
        )?;
        assert_eq!(volume.shape(), &[2, 3, 4]);
        assert_eq!(volume.affine(), &IDENTITY);
        assert_eq!(volume.header().data_dtype(), DataType::I16);
        assert_eq!(volume.data()?.len(), 24);
        Ok(())
    }

    #[test]
    fn test_volume_invalid_length() {
        let result = Volume::new(vec![2, 2], VoxelBuffer::from(vec![0f32; 3]), IDENTITY);
        assert_eq!(result, Err(ImageError::InvalidDataLength(3, 4)));
    }

    #[test]
    fn test_volume_zero_extent() {
        let result = Volume::new(vec![2, 0], VoxelBuffer::from(Vec::<f32>::new()), IDENTITY);
        assert_eq!(result, Err(ImageError::InvalidShape(vec![2, 0])));

        let result = Volume::new(vec![usize::MAX, 3], VoxelBuffer::from(vec![0f32]), IDENTITY);
        assert_eq!(result, Err(ImageError::InvalidShape(vec![usize::MAX, 3])));
    }

    #[test]
    fn test_into_buffer() -> Result<(), ImageError> {
        let data = VoxelBuffer::from(vec![1.5f32, -2.0, 0.25, 8.0]);
        let volume = Volume::new(vec![2, 2], data.clone(), IDENTITY)?;
        assert_eq!(volume.into_buffer(), data);
        Ok(())
    }

    #[test]
    fn test_from_parts_keeps_header() -> Result<(), ImageError> {
        let mut header = ImageHeader::new(DataType::U8);
        header.descrip = "t1w".to_string();
        let volume = Volume::from_parts(
            VoxelBuffer::from(vec![1u8, 2, 3, 4]),
            vec![2, 2],
            IDENTITY,
            header.clone(),
        )?;
        assert_eq!(volume.header(), &header);
        Ok(())
    }
}
