use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// Element type of the voxels stored in an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// unsigned 8-bit integer
    U8,
    /// signed 8-bit integer
    I8,
    /// unsigned 16-bit integer
    U16,
    /// signed 16-bit integer
    I16,
    /// unsigned 32-bit integer
    U32,
    /// signed 32-bit integer
    I32,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl DataType {
    /// Whether the type holds floating point values.
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }

    /// Size of one element in bytes.
    pub fn size_of(&self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::F64 => 8,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            DataType::U8 => "uint8",
            DataType::I8 => "int8",
            DataType::U16 => "uint16",
            DataType::I16 => "int16",
            DataType::U32 => "uint32",
            DataType::I32 => "int32",
            DataType::F32 => "float32",
            DataType::F64 => "float64",
        };
        write!(f, "{name}")
    }
}

/// Trait for voxel element types.
///
/// Send and Sync are required to share voxel slices across rayon workers.
pub trait Voxel: Copy + Default + Send + Sync + AsPrimitive<f64> + 'static {
    /// The runtime tag of this type.
    const DTYPE: DataType;

    /// Convert a f64 value to the voxel type.
    ///
    /// Integer types round half away from zero and saturate at the type bounds;
    /// NaN maps to zero.
    fn from_f64(x: f64) -> Self;

    /// Borrow the buffer contents if it stores this type.
    fn slice_of(buffer: &VoxelBuffer) -> Option<&[Self]>;

    /// Wrap a vector into a typed buffer.
    fn into_buffer(data: Vec<Self>) -> VoxelBuffer;
}

macro_rules! impl_voxel {
    (@impl $ty:ty, $variant:ident, $x:ident => $conv:expr) => {
        impl Voxel for $ty {
            const DTYPE: DataType = DataType::$variant;

            fn from_f64($x: f64) -> Self {
                $conv
            }

            fn slice_of(buffer: &VoxelBuffer) -> Option<&[Self]> {
                match buffer {
                    VoxelBuffer::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            fn into_buffer(data: Vec<Self>) -> VoxelBuffer {
                VoxelBuffer::$variant(data)
            }
        }

        impl From<Vec<$ty>> for VoxelBuffer {
            fn from(data: Vec<$ty>) -> Self {
                VoxelBuffer::$variant(data)
            }
        }
    };
    ($ty:ty, $variant:ident, int) => {
        impl_voxel!(@impl $ty, $variant, x => x.round().as_());
    };
    ($ty:ty, $variant:ident, float) => {
        impl_voxel!(@impl $ty, $variant, x => x.as_());
    };
}

impl_voxel!(u8, U8, int);
impl_voxel!(i8, I8, int);
impl_voxel!(u16, U16, int);
impl_voxel!(i16, I16, int);
impl_voxel!(u32, U32, int);
impl_voxel!(i32, I32, int);
impl_voxel!(f32, F32, float);
impl_voxel!(f64, F64, float);

/// Typed, contiguous voxel storage in C order (last axis fastest).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum VoxelBuffer {
    /// uint8 voxels
    U8(Vec<u8>),
    /// int8 voxels
    I8(Vec<i8>),
    /// uint16 voxels
    U16(Vec<u16>),
    /// int16 voxels
    I16(Vec<i16>),
    /// uint32 voxels
    U32(Vec<u32>),
    /// int32 voxels
    I32(Vec<i32>),
    /// float32 voxels
    F32(Vec<f32>),
    /// float64 voxels
    F64(Vec<f64>),
}

// expands `$body` once per variant with `$v` bound to the inner vector
macro_rules! dispatch {
    ($buffer:expr, $v:ident => $body:expr) => {
        match $buffer {
            VoxelBuffer::U8($v) => $body,
            VoxelBuffer::I8($v) => $body,
            VoxelBuffer::U16($v) => $body,
            VoxelBuffer::I16($v) => $body,
            VoxelBuffer::U32($v) => $body,
            VoxelBuffer::I32($v) => $body,
            VoxelBuffer::F32($v) => $body,
            VoxelBuffer::F64($v) => $body,
        }
    };
}

fn convert<T: Voxel>(values: &[f64]) -> VoxelBuffer {
    T::into_buffer(values.iter().map(|&x| T::from_f64(x)).collect())
}

impl VoxelBuffer {
    /// Allocate a zero-filled buffer of the given type.
    pub fn zeros(dtype: DataType, len: usize) -> Self {
        Self::from_f64(dtype, &vec![0.0; len])
    }

    /// Build a buffer of type `dtype` from f64 values.
    ///
    /// Example:
    ///
    /// ```
    /// use voxform_image::{DataType, VoxelBuffer};
    ///
    /// let buffer = VoxelBuffer::from_f64(DataType::U8, &[-3.0, 1.5, 300.0]);
    /// assert_eq!(buffer, VoxelBuffer::U8(vec![0, 2, 255]));
    /// ```
    pub fn from_f64(dtype: DataType, values: &[f64]) -> Self {
        match dtype {
            DataType::U8 => convert::<u8>(values),
            DataType::I8 => convert::<i8>(values),
            DataType::U16 => convert::<u16>(values),
            DataType::I16 => convert::<i16>(values),
            DataType::U32 => convert::<u32>(values),
            DataType::I32 => convert::<i32>(values),
            DataType::F32 => convert::<f32>(values),
            DataType::F64 => convert::<f64>(values),
        }
    }

    /// The element type of the buffer.
    pub fn dtype(&self) -> DataType {
        match self {
            VoxelBuffer::U8(_) => DataType::U8,
            VoxelBuffer::I8(_) => DataType::I8,
            VoxelBuffer::U16(_) => DataType::U16,
            VoxelBuffer::I16(_) => DataType::I16,
            VoxelBuffer::U32(_) => DataType::U32,
            VoxelBuffer::I32(_) => DataType::I32,
            VoxelBuffer::F32(_) => DataType::F32,
            VoxelBuffer::F64(_) => DataType::F64,
        }
    }

    /// Number of voxels in the buffer.
    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    /// Whether the buffer holds no voxels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen every voxel to f64.
    pub fn to_f64(&self) -> Vec<f64> {
        dispatch!(self, v => v.iter().map(|&x| AsPrimitive::<f64>::as_(x)).collect())
    }

    /// Convert the buffer to another element type.
    pub fn cast(&self, dtype: DataType) -> Self {
        if dtype == self.dtype() {
            return self.clone();
        }
        Self::from_f64(dtype, &self.to_f64())
    }

    /// Borrow the voxels as a typed slice.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::DtypeMismatch`] if the buffer does not store `T`.
    pub fn as_slice<T: Voxel>(&self) -> Result<&[T], ImageError> {
        T::slice_of(self).ok_or(ImageError::DtypeMismatch {
            expected: T::DTYPE,
            actual: self.dtype(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f64_rounding() {
        let values = [-1.5, -0.5, 0.4, 0.5, 2.5];
        assert_eq!(
            VoxelBuffer::from_f64(DataType::I16, &values),
            VoxelBuffer::I16(vec![-2, -1, 0, 1, 3])
        );
    }

    #[test]
    fn test_from_f64_saturates() {
        let values = [f64::NAN, -1e9, 1e9];
        assert_eq!(
            VoxelBuffer::from_f64(DataType::U16, &values),
            VoxelBuffer::U16(vec![0, 0, u16::MAX])
        );
        assert_eq!(
            VoxelBuffer::from_f64(DataType::I8, &values),
            VoxelBuffer::I8(vec![0, i8::MIN, i8::MAX])
        );
    }

    #[test]
    fn test_zeros() {
        let buffer = VoxelBuffer::zeros(DataType::I32, 4);
        assert_eq!(buffer, <i32 as Voxel>::into_buffer(vec![0; 4]));
        assert_eq!(buffer.dtype(), DataType::I32);
        assert!(VoxelBuffer::zeros(DataType::F32, 0).is_empty());
    }

    #[test]
    fn test_cast_and_slice() -> Result<(), ImageError> {
        let buffer = VoxelBuffer::from(vec![1u8, 2, 3]);
        assert_eq!(buffer.dtype(), DataType::U8);
        assert_eq!(buffer.len(), 3);

        let cast = buffer.cast(DataType::F32);
        assert_eq!(cast.as_slice::<f32>()?, &[1.0, 2.0, 3.0]);
        assert_eq!(
            cast.as_slice::<u8>(),
            Err(ImageError::DtypeMismatch {
                expected: DataType::U8,
                actual: DataType::F32
            })
        );
        Ok(())
    }

    #[test]
    fn test_dtype_names() -> Result<(), serde_json::Error> {
        assert_eq!(DataType::F32.to_string(), "float32");
        assert_eq!(serde_json::to_string(&DataType::I16)?, "\"i16\"");
        assert!(DataType::F64.is_float());
        assert!(!DataType::U32.is_float());
        assert_eq!(DataType::I16.size_of(), 2);
        Ok(())
    }
}
