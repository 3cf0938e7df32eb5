use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type representing the failures that can occur while scanning a tree.
///
/// Only [`SearchError::NotADirectory`] and [`SearchError::Io`] are fatal for a run.
/// Permission and stat failures are recoverable: they are reported once through
/// [`crate::walker::Warnings`] and the affected entity contributes nothing further.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A directory could not be listed because access was denied.
    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// A file was discovered but its size could not be read, e.g. it vanished
    /// between enumeration and the stat call.
    #[error("unable to read the size of {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other OS-level failure while listing a directory.
    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The root of a scan must be a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Represents underlying I/O errors from the standard library that are not
    /// tied to a scanned path, such as failing to resolve the working directory.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SearchError {
    /// Classifies an I/O error raised while listing `path`.
    ///
    /// # Examples
    /// ```
    /// use std::io;
    /// use std::path::Path;
    /// use biggest::errors::SearchError;
    ///
    /// let err = io::Error::from(io::ErrorKind::PermissionDenied);
    /// let err = SearchError::from_io(Path::new("/root"), err);
    /// assert!(matches!(err, SearchError::PermissionDenied { .. }));
    /// assert_eq!(err.to_string(), "permission denied: /root");
    /// ```
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => SearchError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => SearchError::Read {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The scanned path this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchError::PermissionDenied { path }
            | SearchError::Stat { path, .. }
            | SearchError::Read { path, .. } => Some(path),
            SearchError::NotADirectory(path) => Some(path),
            SearchError::Io(_) => None,
        }
    }
}

/// Returned by [`crate::heap::MutableHeap`] when asked for the minimum of a heap
/// with no live entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the heap is empty")]
pub struct EmptyError;
