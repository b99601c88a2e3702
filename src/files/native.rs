//! File collaborator backed by the local filesystem.

use super::FileCollaborator;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use std::fs;
use std::path::Path;

/// Reads and writes through `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFiles;

impl NativeFiles {
    pub fn new() -> Self {
        Self
    }
}

fn read_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    }
}

impl FileCollaborator for NativeFiles {
    fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(read_error(path))?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).map_err(write_error(path))?;
        debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    fn read_binary_as_base64(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(read_error(path))?;
        Ok(STANDARD.encode(bytes))
    }

    fn write_binary(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes).map_err(write_error(path))?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
