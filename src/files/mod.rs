//! File operations module for Downedit
//!
//! The core never touches the filesystem directly. It goes through two
//! collaborators:
//!
//! - `FileCollaborator` - read/write text and binary content
//! - `dialogs::DialogCollaborator` - open/save pickers and discard prompts
//!
//! `native::NativeFiles` implements the former on `std::fs`.

pub mod dialogs;
pub mod native;

pub use dialogs::{DialogCollaborator, FileFilter, PresetDialogs};
pub use native::NativeFiles;

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

/// Text and binary file access.
pub trait FileCollaborator {
    fn read_text(&self, path: &Path) -> Result<String>;

    fn write_text(&self, path: &Path, content: &str) -> Result<()>;

    /// Read a file's bytes, base64-encoded.
    fn read_binary_as_base64(&self, path: &Path) -> Result<String>;

    fn write_binary(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Raw bytes of a file, decoded from [`Self::read_binary_as_base64`].
    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        let encoded = self.read_binary_as_base64(path)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| Error::FileRead {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })
    }

    /// Display name for a path: its final component.
    fn file_name_of(&self, path: &Path) -> String {
        file_name_of(path)
    }
}

/// Final component of `path`, or the whole path when it has none.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
