use std::collections::BTreeMap;
use std::ops;

use serde::{Deserialize, Serialize};

use crate::{error::X5Error, X5_FORMAT, X5_VERSION};

/// A typed scalar attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AttrValue {
    /// UTF-8 string
    Str(String),
    /// unsigned 16-bit integer
    U16(u16),
    /// signed 64-bit integer
    I64(i64),
    /// 64-bit float
    F64(f64),
}

impl AttrValue {
    /// Name of the stored type.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Str(_) => "str",
            AttrValue::U16(_) => "u16",
            AttrValue::I64(_) => "i64",
            AttrValue::F64(_) => "f64",
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<u16> for AttrValue {
    fn from(value: u16) -> Self {
        AttrValue::U16(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::I64(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::F64(value)
    }
}

/// The flat, C-order payload of a dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "values", rename_all = "lowercase")]
pub enum DatasetData {
    /// 64-bit floats
    F64(Vec<f64>),
    /// unsigned 64-bit integers
    U64(Vec<u64>),
    /// signed 64-bit integers
    I64(Vec<i64>),
}

impl DatasetData {
    fn len(&self) -> usize {
        match self {
            DatasetData::F64(v) => v.len(),
            DatasetData::U64(v) => v.len(),
            DatasetData::I64(v) => v.len(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            DatasetData::F64(_) => "f64",
            DatasetData::U64(_) => "u64",
            DatasetData::I64(_) => "i64",
        }
    }
}

/// A multi-dimensional numeric array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    shape: Vec<usize>,
    data: DatasetData,
}

/// A dataset as stored on disk, before its shape is checked.
#[derive(Deserialize)]
struct RawDataset {
    shape: Vec<usize>,
    data: DatasetData,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = X5Error;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Dataset::new(raw.shape, raw.data)
    }
}

impl Dataset {
    /// Create a dataset, checking that the shape covers the data.
    pub fn new(shape: Vec<usize>, data: DatasetData) -> Result<Self, X5Error> {
        let len = data.len();
        let size = shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n));
        if size != Some(len) {
            return Err(X5Error::InvalidDataset { shape, len });
        }
        Ok(Self { shape, data })
    }

    /// A `4x4` float dataset from a row-major matrix.
    pub fn from_matrix(matrix: &[[f64; 4]; 4]) -> Self {
        Self {
            shape: vec![4, 4],
            data: DatasetData::F64(matrix.iter().flatten().copied().collect()),
        }
    }

    /// A one-dimensional unsigned dataset.
    pub fn from_u64s(values: &[u64]) -> Self {
        Self {
            shape: vec![values.len()],
            data: DatasetData::U64(values.to_vec()),
        }
    }

    /// The dataset shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The dataset payload.
    pub fn data(&self) -> &DatasetData {
        &self.data
    }

    /// Read the dataset back as a row-major `4x4` matrix.
    pub fn to_matrix(&self, name: &str) -> Result<[[f64; 4]; 4], X5Error> {
        let values = match &self.data {
            DatasetData::F64(v) if self.shape == [4, 4] => v,
            other => {
                return Err(X5Error::WrongType {
                    name: name.to_string(),
                    expected: "f64 4x4",
                    actual: other.type_name(),
                })
            }
        };
        if values.len() != 16 {
            return Err(X5Error::InvalidDataset {
                shape: self.shape.clone(),
                len: values.len(),
            });
        }
        let mut matrix = [[0.0; 4]; 4];
        for (row, chunk) in matrix.iter_mut().zip(values.chunks_exact(4)) {
            row.copy_from_slice(chunk);
        }
        Ok(matrix)
    }

    /// Read the dataset back as unsigned integers.
    pub fn to_u64s(&self, name: &str) -> Result<Vec<u64>, X5Error> {
        match &self.data {
            DatasetData::U64(v) => Ok(v.clone()),
            other => Err(X5Error::WrongType {
                name: name.to_string(),
                expected: "u64",
                actual: other.type_name(),
            }),
        }
    }
}

/// A named node holding attributes, datasets and child groups.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct X5Group {
    #[serde(default)]
    attrs: BTreeMap<String, AttrValue>,
    #[serde(default)]
    datasets: BTreeMap<String, Dataset>,
    #[serde(default)]
    groups: BTreeMap<String, X5Group>,
}

fn split_path(path: &str) -> Result<Vec<&str>, X5Error> {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return Err(X5Error::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

impl X5Group {
    /// Set an attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.attrs.insert(name.to_string(), value.into());
    }

    /// Look up an attribute.
    pub fn attr(&self, name: &str) -> Result<&AttrValue, X5Error> {
        self.attrs
            .get(name)
            .ok_or_else(|| X5Error::MissingAttribute(name.to_string()))
    }

    /// Iterate over the attributes in name order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn wrong_type(name: &str, expected: &'static str, value: &AttrValue) -> X5Error {
        X5Error::WrongType {
            name: name.to_string(),
            expected,
            actual: value.type_name(),
        }
    }

    /// Read a string attribute.
    pub fn attr_str(&self, name: &str) -> Result<&str, X5Error> {
        match self.attr(name)? {
            AttrValue::Str(s) => Ok(s),
            other => Err(Self::wrong_type(name, "str", other)),
        }
    }

    /// Read an unsigned 16-bit attribute.
    pub fn attr_u16(&self, name: &str) -> Result<u16, X5Error> {
        match self.attr(name)? {
            AttrValue::U16(v) => Ok(*v),
            other => Err(Self::wrong_type(name, "u16", other)),
        }
    }

    /// Read a signed integer attribute.
    pub fn attr_i64(&self, name: &str) -> Result<i64, X5Error> {
        match self.attr(name)? {
            AttrValue::I64(v) => Ok(*v),
            other => Err(Self::wrong_type(name, "i64", other)),
        }
    }

    /// Add a dataset; fails if the name is taken.
    pub fn create_dataset(&mut self, name: &str, dataset: Dataset) -> Result<(), X5Error> {
        if self.datasets.contains_key(name) || self.groups.contains_key(name) {
            return Err(X5Error::MemberExists(name.to_string()));
        }
        self.datasets.insert(name.to_string(), dataset);
        Ok(())
    }

    /// Look up a dataset.
    pub fn dataset(&self, name: &str) -> Result<&Dataset, X5Error> {
        self.datasets
            .get(name)
            .ok_or_else(|| X5Error::MissingDataset(name.to_string()))
    }

    /// Create a group at a `/`-separated path relative to this group.
    ///
    /// Intermediate groups are created as needed; the last component must not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use voxform_io::X5Group;
    ///
    /// let mut root = X5Group::default();
    /// root.create_group("/0").unwrap().set_attr("Type", "affine");
    /// assert_eq!(root.group("0").unwrap().attr_str("Type").unwrap(), "affine");
    /// assert!(root.create_group("/0").is_err());
    /// ```
    pub fn create_group(&mut self, path: &str) -> Result<&mut X5Group, X5Error> {
        let parts = split_path(path)?;
        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| X5Error::InvalidPath(path.to_string()))?;

        let mut node = self;
        for part in parents {
            if node.datasets.contains_key(*part) {
                return Err(X5Error::MemberExists(part.to_string()));
            }
            node = node.groups.entry(part.to_string()).or_default();
        }

        if node.groups.contains_key(*last) || node.datasets.contains_key(*last) {
            return Err(X5Error::MemberExists(path.to_string()));
        }
        Ok(node.groups.entry(last.to_string()).or_default())
    }

    /// Look up a group at a `/`-separated path relative to this group.
    pub fn group(&self, path: &str) -> Result<&X5Group, X5Error> {
        let mut node = self;
        for part in split_path(path)? {
            node = node
                .groups
                .get(part)
                .ok_or_else(|| X5Error::MissingGroup(path.to_string()))?;
        }
        Ok(node)
    }

    /// Iterate over the direct child groups in name order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &X5Group)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An X5 container: a root group carrying the `Format` and `Version` attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct X5File(pub X5Group);

impl X5File {
    /// Create a container whose root declares `Format = "X5"` and `Version = 1`.
    pub fn new() -> Self {
        let mut root = X5Group::default();
        root.set_attr("Format", X5_FORMAT);
        root.set_attr("Version", X5_VERSION);
        Self(root)
    }

    /// Check the root attributes against the supported format and version.
    pub fn check_format(&self) -> Result<(), X5Error> {
        let format = self.attr_str("Format")?;
        let version = self.attr_u16("Version")?;
        if format != X5_FORMAT || version != X5_VERSION {
            return Err(X5Error::UnsupportedFormat {
                format: format.to_string(),
                version,
            });
        }
        Ok(())
    }
}

impl Default for X5File {
    fn default() -> Self {
        Self::new()
    }
}

/// helper to deference the root group
impl ops::Deref for X5File {
    type Target = X5Group;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// helper to deference the root group
impl ops::DerefMut for X5File {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_groups() -> Result<(), X5Error> {
        let mut root = X5Group::default();
        root.create_group("a/b/c")?.set_attr("depth", 3i64);
        assert_eq!(root.group("/a/b/c")?.attr_i64("depth")?, 3);
        assert_eq!(root.groups().count(), 1);

        // intermediate groups are reused
        root.create_group("a/d")?;
        assert_eq!(root.group("a")?.groups().count(), 2);

        assert!(matches!(root.create_group("a/b"), Err(X5Error::MemberExists(_))));
        assert!(matches!(root.create_group("//"), Err(X5Error::InvalidPath(_))));
        assert!(matches!(root.group("a/x"), Err(X5Error::MissingGroup(_))));
        Ok(())
    }

    #[test]
    fn test_attr_types() {
        let mut group = X5Group::default();
        group.set_attr("Version", 1u16);
        group.set_attr("Type", "image");
        assert_eq!(group.attr_u16("Version").ok(), Some(1));
        assert!(matches!(
            group.attr_str("Version"),
            Err(X5Error::WrongType {
                expected: "str",
                actual: "u16",
                ..
            })
        ));
        assert!(matches!(group.attr_i64("ndim"), Err(X5Error::MissingAttribute(_))));

        let names: Vec<&str> = group.attrs().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Type", "Version"]);
    }

    #[test]
    fn test_dataset_shape_checked_on_read() {
        let truncated = r#"{"shape": [4, 4], "data": {"dtype": "f64", "values": [1, 2, 3]}}"#;
        assert!(serde_json::from_str::<Dataset>(truncated).is_err());

        let overflowing = format!(
            r#"{{"shape": [{}, 4], "data": {{"dtype": "u64", "values": [1]}}}}"#,
            usize::MAX
        );
        assert!(serde_json::from_str::<Dataset>(&overflowing).is_err());

        let valid = r#"{"shape": [3], "data": {"dtype": "u64", "values": [4, 5, 6]}}"#;
        assert_eq!(
            serde_json::from_str::<Dataset>(valid).ok(),
            Some(Dataset::from_u64s(&[4, 5, 6]))
        );
    }

    #[test]
    fn test_datasets() -> Result<(), X5Error> {
        let mut matrix = [[0.0; 4]; 4];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = (i + 1) as f64;
        }
        let mut group = X5Group::default();
        group.create_dataset("affine", Dataset::from_matrix(&matrix))?;
        group.create_dataset("shape", Dataset::from_u64s(&[10, 20, 30]))?;

        assert_eq!(group.dataset("affine")?.shape(), &[4, 4]);
        assert_eq!(group.dataset("affine")?.to_matrix("affine")?, matrix);
        assert_eq!(group.dataset("shape")?.to_u64s("shape")?, vec![10, 20, 30]);
        assert!(group.dataset("shape")?.to_matrix("shape").is_err());
        assert!(matches!(
            group.create_dataset("shape", Dataset::from_u64s(&[1])),
            Err(X5Error::MemberExists(_))
        ));
        assert!(matches!(
            Dataset::new(vec![2, 2], DatasetData::I64(vec![1, 2, 3])),
            Err(X5Error::InvalidDataset { len: 3, .. })
        ));
        assert!(matches!(
            Dataset::new(vec![usize::MAX, 2], DatasetData::F64(vec![0.0])),
            Err(X5Error::InvalidDataset { len: 1, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_file_format() -> Result<(), X5Error> {
        let file = X5File::new();
        file.check_format()?;

        let mut other = X5File::new();
        other.set_attr("Version", 2u16);
        assert!(matches!(
            other.check_format(),
            Err(X5Error::UnsupportedFormat { version: 2, .. })
        ));
        Ok(())
    }
}
