//! File I/O primitives for the journal tree: day paths, directory
//! resolution and atomic writes.

use crate::domain::DateKey;
use chrono::{DateTime, Utc};
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use super::capability::RootCapability;

/// File name of the note document inside a day directory.
pub const NOTE_FILE_NAME: &str = "index.html";

/// Errors during file system operations on the journal tree.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("atomic write failed for {path}: {source}")]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("invalid UTF-8 in {path}")]
    InvalidEncoding { path: PathBuf },
}

impl FsError {
    /// Creates an appropriate FsError from an io::Error.
    pub(crate) fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path: path.into() },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path: path.into() },
            _ => FsError::Io {
                path: path.into(),
                source: error,
            },
        }
    }

    /// Returns the path the failed operation was acting on.
    pub fn path(&self) -> &Path {
        match self {
            FsError::NotFound { path }
            | FsError::PermissionDenied { path }
            | FsError::Io { path, .. }
            | FsError::AtomicWrite { path, .. }
            | FsError::NotADirectory { path }
            | FsError::InvalidEncoding { path } => path,
        }
    }
}

/// Returns the directory segments for a day: `[year, month (1-based), day]`.
///
/// Plain decimal, no zero padding. Pure function of the key's fields.
///
/// # Examples
///
/// ```
/// use chronicle::domain::DateKey;
/// use chronicle::infra::path_for;
///
/// let key = DateKey::new(2024, 2, 5).unwrap();
/// assert_eq!(path_for(&key), ["2024", "3", "5"]);
/// ```
pub fn path_for(key: &DateKey) -> [String; 3] {
    [
        key.year().to_string(),
        key.month_number().to_string(),
        key.day().to_string(),
    ]
}

/// Walks (and optionally creates) `segments` beneath the capability root.
///
/// Returns `Ok(None)` when no capability is available.
///
/// # Errors
///
/// Returns `FsError::NotFound` if a segment is missing and `create` is false.
/// Returns `FsError::NotADirectory` if a segment exists as a file.
pub fn resolve_directory<S: AsRef<str>>(
    capability: Option<&RootCapability>,
    segments: &[S],
    create: bool,
) -> Result<Option<PathBuf>, FsError> {
    let Some(capability) = capability else {
        return Ok(None);
    };

    let mut current = capability.root().to_path_buf();
    for segment in segments {
        current.push(segment.as_ref());
        match std::fs::metadata(&current) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(FsError::NotADirectory { path: current }),
            Err(e) if e.kind() == io::ErrorKind::NotFound && create => {
                std::fs::create_dir(&current).or_else(|e| {
                    // Lost a race with another creator; fine if it is a directory now.
                    if e.kind() == io::ErrorKind::AlreadyExists && current.is_dir() {
                        Ok(())
                    } else {
                        Err(FsError::from_io(&current, e))
                    }
                })?;
            }
            Err(e) => return Err(FsError::from_io(&current, e)),
        }
    }
    Ok(Some(current))
}

/// Reads a UTF-8 text file together with its last-modified time.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the file doesn't exist.
/// Returns `FsError::InvalidEncoding` if the content is not UTF-8.
pub fn read_text(path: &Path) -> Result<(String, DateTime<Utc>), FsError> {
    let bytes = std::fs::read(path).map_err(|e| FsError::from_io(path, e))?;
    let modified = modified_time(path)?;
    let text = String::from_utf8(bytes).map_err(|_| FsError::InvalidEncoding { path: path.into() })?;
    // Strip UTF-8 BOM if present
    let text = match text.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    };
    Ok((text, modified))
}

/// Returns a file's last-modified time.
pub fn modified_time(path: &Path) -> Result<DateTime<Utc>, FsError> {
    let meta = std::fs::metadata(path).map_err(|e| FsError::from_io(path, e))?;
    let modified = meta.modified().map_err(|e| FsError::from_io(path, e))?;
    Ok(DateTime::<Utc>::from(modified))
}

/// Writes bytes to a file path atomically.
///
/// Uses a temporary file in the same directory and an atomic rename, so the
/// target holds either the old or the new content, never a torn mix. Any
/// existing file is replaced.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the parent directory doesn't exist.
/// Returns `FsError::AtomicWrite` if the rename fails.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FsError> {
    let parent = path
        .parent()
        .ok_or_else(|| FsError::NotFound { path: path.into() })?;

    if !parent.is_dir() {
        return Err(FsError::NotFound {
            path: parent.into(),
        });
    }

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| FsError::from_io(path, e))?;

    temp.write_all(bytes).map_err(|e| FsError::Io {
        path: path.into(),
        source: e,
    })?;
    temp.as_file().sync_all().map_err(|e| FsError::Io {
        path: path.into(),
        source: e,
    })?;

    temp.persist(path).map_err(|e| FsError::AtomicWrite {
        path: path.into(),
        source: e.error,
    })?;

    Ok(())
}
