//! Raw array files.
//!
//! Arrays are stored as bare little-endian element sequences with no header;
//! the element type is implied by the file's role (`.f64`, `.i32`, `.u32`).

use anyhow::{bail, Context, Result};
use bytemuck::Pod;
use std::fs;
use std::path::Path;

#[cfg(not(target_endian = "little"))]
compile_error!("raw array files are read and written in host byte order, which must be little-endian");

/// Read a raw array of `T`.
pub fn read_array<T: Pod>(path: &Path) -> Result<Vec<T>> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read: {:?}", path))?;
    let size = std::mem::size_of::<T>();
    if bytes.len() % size != 0 {
        bail!(
            "{:?} holds {} bytes, not a whole number of {}-byte elements",
            path,
            bytes.len(),
            size
        );
    }

    // Copy into a correctly aligned buffer.
    let mut values = vec![<T as bytemuck::Zeroable>::zeroed(); bytes.len() / size];
    bytemuck::cast_slice_mut::<T, u8>(&mut values).copy_from_slice(&bytes);
    Ok(values)
}

/// Read a raw `f64` array.
pub fn read_f64(path: &Path) -> Result<Vec<f64>> {
    read_array(path)
}

/// Read a raw `f64` array and check its length.
pub fn read_f64_exact(path: &Path, expected: usize) -> Result<Vec<f64>> {
    let values = read_f64(path)?;
    if values.len() != expected {
        bail!(
            "{:?}: expected {} elements, found {}",
            path,
            expected,
            values.len()
        );
    }
    Ok(values)
}

/// Write a raw array.
pub fn write_array<T: Pod>(path: &Path, values: &[T]) -> Result<()> {
    fs::write(path, bytemuck::cast_slice::<T, u8>(values))
        .with_context(|| format!("Failed to write: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f64_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.f64");
        write_array(&path, &[1.5f64, -999.0]).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..8], &1.5f64.to_le_bytes());
        assert_eq!(read_f64(&path).unwrap(), vec![1.5, -999.0]);
    }

    #[test]
    fn test_i32_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("correspondence.i32");
        write_array(&path, &[-1i32, 7]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), [[0xff; 4], 7i32.to_le_bytes()].concat());
    }

    #[test]
    fn test_partial_element_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.f64");
        fs::write(&path, [0u8; 12]).unwrap();
        assert!(read_f64(&path).is_err());
    }

    #[test]
    fn test_exact_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.f64");
        write_array(&path, &[1.0f64, 2.0, 3.0]).unwrap();
        assert!(read_f64_exact(&path, 3).is_ok());
        assert!(read_f64_exact(&path, 4).is_err());
    }
}
