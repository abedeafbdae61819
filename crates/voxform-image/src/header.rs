use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dtype::DataType;

/// Metadata attached to an image, carried through resampling untouched except for
/// the declared data type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageHeader {
    data_dtype: DataType,
    /// Free-form description of the image.
    pub descrip: String,
    /// Extra key/value metadata.
    pub extensions: BTreeMap<String, String>,
}

impl ImageHeader {
    /// Create a header declaring the given on-disk data type.
    pub fn new(data_dtype: DataType) -> Self {
        Self {
            data_dtype,
            descrip: String::new(),
            extensions: BTreeMap::new(),
        }
    }

    /// The declared data type of the image voxels.
    pub fn data_dtype(&self) -> DataType {
        self.data_dtype
    }

    /// Set the declared data type of the image voxels.
    pub fn set_data_dtype(&mut self, dtype: DataType) {
        self.data_dtype = dtype;
    }
}

impl Default for ImageHeader {
    fn default() -> Self {
        Self::new(DataType::F32)
    }
}
