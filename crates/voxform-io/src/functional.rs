use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::{error::X5Error, group::X5File};

/// Writes an X5 container to the given file path.
///
/// The file is created or truncated. The handle is scoped to this call and
/// released on every exit path; after an error the file content is unspecified.
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `file` - The container to persist.
///
/// # Example
///
/// ```no_run
/// use voxform_io::{write_x5, X5File};
///
/// let mut file = X5File::new();
/// file.create_group("/0").unwrap().set_attr("Type", "identity");
/// write_x5("transform.x5", &file).unwrap();
/// ```
pub fn write_x5(file_path: impl AsRef<Path>, file: &X5File) -> Result<(), X5Error> {
    let file_path = file_path.as_ref();
    log::debug!("writing X5 container to {}", file_path.display());

    let mut writer = BufWriter::new(std::fs::File::create(file_path)?);
    serde_json::to_writer_pretty(&mut writer, file)?;
    writer.flush()?;

    Ok(())
}

/// Reads an X5 container from the given file path.
///
/// # Errors
///
/// Fails if the file cannot be read, is not a container, or does not declare
/// `Format = "X5"` and `Version = 1` at its root.
pub fn read_x5(file_path: impl AsRef<Path>) -> Result<X5File, X5Error> {
    let file_path = file_path.as_ref();
    log::debug!("reading X5 container from {}", file_path.display());

    let reader = BufReader::new(std::fs::File::open(file_path)?);
    let file: X5File = serde_json::from_reader(reader)?;
    file.check_format()?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Dataset;

    #[test]
    fn test_write_read_x5() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("xfm.x5");

        let mut file = X5File::new();
        let group = file.create_group("/0")?;
        group.set_attr("Type", "image");
        group.set_attr("ndim", 3i64);
        group.create_dataset("shape", Dataset::from_u64s(&[4, 5, 6]))?;
        write_x5(&file_path, &file)?;

        let read_back = read_x5(&file_path)?;
        assert_eq!(read_back, file);
        assert_eq!(read_back.attr_str("Format")?, "X5");
        assert_eq!(read_back.attr_u16("Version")?, 1);
        assert_eq!(read_back.group("0")?.attr_i64("ndim")?, 3);
        Ok(())
    }

    #[test]
    fn test_read_rejects_other_formats() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("other.x5");

        let mut file = X5File::new();
        file.set_attr("Format", "ITK");
        write_x5(&file_path, &file)?;
        assert!(matches!(
            read_x5(&file_path),
            Err(X5Error::UnsupportedFormat { .. })
        ));

        std::fs::write(&file_path, b"not a container")?;
        assert!(matches!(read_x5(&file_path), Err(X5Error::Json(_))));
        Ok(())
    }

    #[test]
    fn test_write_missing_directory() {
        let result = write_x5("/nonexistent/dir/xfm.x5", &X5File::new());
        assert!(matches!(result, Err(X5Error::Io(_))));
    }
}
