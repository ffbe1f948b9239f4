#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the engine. None of these are fatal; the browser
/// stays usable after reporting any of them.
#[derive(Debug, Error)]
pub enum FmError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("access denied: {0}")]
    AccessDenied(PathBuf),

    #[error("already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("rename failed: {source}")]
    RenameFailed {
        #[source]
        source: io::Error,
    },

    #[error("archive write failed: {source}")]
    ArchiveWriteFailed {
        #[source]
        source: io::Error,
    },

    #[error("archive read failed: {source}")]
    ArchiveReadFailed {
        #[source]
        source: io::Error,
    },

    #[error("not a zip archive: {0}")]
    NotAnArchive(PathBuf),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl FmError {
    /// Maps an open/stat failure on `path` to the taxonomy, keeping the
    /// offending path in the message.
    pub fn from_io(err: io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FmError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => FmError::AccessDenied(path.to_path_buf()),
            _ => FmError::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, FmError>;
