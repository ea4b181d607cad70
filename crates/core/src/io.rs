//! Font file I/O.

use std::{
    fs::{create_dir_all, read, write},
    io,
    path::PathBuf,
};

use crate::error::{ConvertError, Result};

/// A font file handle for I/O operations.
#[derive(Debug, Clone)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        read(&self.path).map_err(|e| self.io_error(e))
    }

    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        write(&self.path, data).map_err(|e| self.io_error(e))
    }

    /// Create parent directory if it doesn't exist.
    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)
                .map_err(|source| ConvertError::Io { path: parent.to_path_buf(), source })?;
        }
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> ConvertError {
        ConvertError::Io { path: self.path.clone(), source }
    }
}
