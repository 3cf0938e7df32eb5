use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use filesize::PathExt;

use crate::errors::SearchError;

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Children of a directory, yielded until the first failure.
pub type Listing<'a> = Box<dyn Iterator<Item = Result<ChildEntry, SearchError>> + 'a>;

/// The raw filesystem primitive the tree is built on.
///
/// Symbolic links must be reported as files and never followed.
pub trait Walker {
    /// Lists the immediate children of the directory at `path`.
    ///
    /// Failing to open the directory is reported through the outer `Result`;
    /// a failure part way through is reported as an `Err` item, after which the
    /// caller stops consuming the listing.
    fn list_children(&self, path: &Path) -> Result<Listing<'_>, SearchError>;

    /// Size in bytes of the file at `path`.
    fn file_size(&self, path: &Path) -> Result<u64, SearchError>;
}

/// [`Walker`] over the local filesystem.
///
/// # Fields
///
/// * `disk_usage` - report the space a file occupies on disk rather than its length
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWalker {
    pub disk_usage: bool,
}

impl FsWalker {
    pub fn new(disk_usage: bool) -> Self {
        Self { disk_usage }
    }
}

impl Walker for FsWalker {
    fn list_children(&self, path: &Path) -> Result<Listing<'_>, SearchError> {
        let dir = path.to_path_buf();
        let read_dir = fs::read_dir(path).map_err(|e| SearchError::from_io(path, e))?;

        Ok(Box::new(read_dir.map(move |entry| -> Result<ChildEntry, SearchError> {
            let entry = entry.map_err(|e| SearchError::from_io(&dir, e))?;
            let child = entry.path();
            // DirEntry::file_type does not traverse symlinks
            let file_type = entry
                .file_type()
                .map_err(|e| SearchError::from_io(&child, e))?;

            Ok(ChildEntry {
                is_dir: file_type.is_dir(),
                path: child,
            })
        })))
    }

    fn file_size(&self, path: &Path) -> Result<u64, SearchError> {
        let stat_error = |source: std::io::Error| SearchError::Stat {
            path: path.to_path_buf(),
            source,
        };

        let metadata = path.symlink_metadata().map_err(stat_error)?;
        if self.disk_usage {
            path.size_on_disk_fast(&metadata).map_err(stat_error)
        } else {
            Ok(metadata.len())
        }
    }
}

/// Per-run record of the problems already reported to the user.
///
/// Each distinct path is warned about at most once, no matter how many times
/// the scan runs into it.
#[derive(Debug, Default)]
pub struct Warnings {
    reported: HashSet<PathBuf>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `err` unless its path has been reported before.
    ///
    /// Returns whether a warning was emitted.
    pub fn report(&mut self, err: &SearchError) -> bool {
        let Some(path) = err.path() else {
            log::warn!("{}", err);
            return true;
        };

        if !self.reported.insert(path.to_path_buf()) {
            log::trace!("Suppressing repeated warning for {}", path.display());
            return false;
        }

        match err {
            SearchError::Stat { .. } => log::warn!("{}; counting it as 0 bytes", err),
            _ => log::warn!("{}; skipping the rest of this directory", err),
        }
        true
    }

    /// Number of distinct paths that have been warned about.
    pub fn len(&self) -> usize {
        self.reported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.reported.contains(path)
    }
}
