//! File helpers shared by the registry, placement and rules loaders.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Describes why a data file could not be loaded or written.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Toml { path: PathBuf, message: String },
    /// The file was read but its content does not describe valid data.
    Invalid { path: PathBuf, line: usize, message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to access {}: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid JSON in {}: {source}", path.display())
            }
            Self::Toml { path, message } => {
                write!(f, "invalid TOML in {}: {message}", path.display())
            }
            Self::Invalid { path, line, message } => {
                write!(f, "{}:{line}: {message}", path.display())
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Toml { .. } | Self::Invalid { .. } => None,
        }
    }
}

pub(crate) fn read_text(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .map_err(|source| LoadError::Json { path: path.to_path_buf(), source })
}

pub(crate) fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = read_text(path)?;
    toml::from_str(&text)
        .map_err(|e| LoadError::Toml { path: path.to_path_buf(), message: e.to_string() })
}

/// Writes pretty JSON through a temporary sibling file so readers never see
/// a half-written file.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), LoadError> {
    let io_error = |source| LoadError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|source| LoadError::Json { path: path.to_path_buf(), source })?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(io_error)?;
    fs::rename(&tmp_path, path).map_err(io_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn json_write_then_read() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("values.json");
        write_json(&path, &vec![1, 2, 3]).expect("write");
        let values: Vec<i32> = read_json(&path).expect("read");
        assert_eq!(values, vec![1, 2, 3]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("absent.json");
        let error = read_json::<Vec<i32>>(&path).expect_err("missing file");
        assert!(matches!(error, LoadError::Io { .. }));
        assert!(error.to_string().contains("absent.json"));
    }
}
