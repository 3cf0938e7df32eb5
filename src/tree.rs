//! Arena-backed model of a scanned directory tree.
//!
//! Every [`Entry`] lives in the [`Tree`]'s arena and is addressed by an
//! [`EntryId`]; parent and child edges are plain ids. Directories are discovered
//! lazily: nothing below a directory exists until the first access to its size,
//! recursive size or children triggers [`Tree::enumerate`].

use std::cmp::{Ordering, Reverse};
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;

use crate::errors::SearchError;
use crate::walker::{ChildEntry, Walker, Warnings};

/// Stable handle to an entry of a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(usize);

/// Ordering shared by every ranking of entries: larger sizes first, ties broken
/// by the ascending byte string of the path.
///
/// Smaller keys rank higher, so a min-heap of keys yields the biggest entry first.
/// Paths compare as plain strings, not component by component, so `r/a-b` sorts
/// before `r/a/b`.
#[derive(Debug, Clone)]
pub struct RankKey {
    size: Reverse<u64>,
    path: PathBuf,
}

impl RankKey {
    pub fn new(size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            size: Reverse(size),
            path: path.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.size.0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_bytes(&self) -> &[u8] {
        self.path.as_os_str().as_encoded_bytes()
    }
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.size
            .cmp(&other.size)
            .then_with(|| self.path_bytes().cmp(other.path_bytes()))
    }
}

/// What a directory has learned about its immediate children.
#[derive(Debug, Clone, Default)]
pub struct Contents {
    pub files: Vec<EntryId>,
    pub subdirectories: Vec<EntryId>,
    /// Bytes held by `files`.
    pub size: u64,
    /// Bytes held by the whole subtree.
    pub total_size: u64,
}

#[derive(Debug)]
enum DirectoryState {
    Unenumerated,
    Enumerated(Contents),
}

#[derive(Debug)]
struct FileNode {
    size: Option<u64>,
}

#[derive(Debug)]
struct DirectoryNode {
    state: DirectoryState,
    /// Children whose `has_selected` is set.
    tracked: Vec<EntryId>,
}

#[derive(Debug)]
enum Node {
    File(FileNode),
    Directory(DirectoryNode),
}

/// A file or directory of the scanned tree.
///
/// Two entries are the same entity exactly when their paths are equal.
#[derive(Debug)]
pub struct Entry {
    path: PathBuf,
    name: String,
    parent: Option<EntryId>,
    node: Node,
    selected: bool,
    has_selected: bool,
}

impl Entry {
    fn new(path: PathBuf, parent: Option<EntryId>, is_dir: bool) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let node = if is_dir {
            Node::Directory(DirectoryNode {
                state: DirectoryState::Unenumerated,
                tracked: Vec::new(),
            })
        } else {
            Node::File(FileNode { size: None })
        };

        Self {
            path,
            name,
            parent,
            node,
            selected: false,
            has_selected: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final segment of the path.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.node, Node::Directory(_))
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    /// True when this entry or any entry below it is selected.
    pub fn has_selected(&self) -> bool {
        self.has_selected
    }

    /// Contents of an enumerated directory; `None` for files and for
    /// directories that have not been enumerated yet.
    pub fn contents(&self) -> Option<&Contents> {
        match &self.node {
            Node::Directory(DirectoryNode {
                state: DirectoryState::Enumerated(contents),
                ..
            }) => Some(contents),
            _ => None,
        }
    }
}

// Log lines would otherwise be drawn over by the spinner.
fn warn(progress: &ProgressBar, warnings: &mut Warnings, err: &SearchError) {
    progress.suspend(|| warnings.report(err));
}

/// The scanned tree rooted at a single directory.
pub struct Tree<W> {
    walker: W,
    entries: Vec<Entry>,
    warnings: Warnings,
    progress: ProgressBar,
    selection_in_use: bool,
}

impl<W: Walker> Tree<W> {
    /// Creates a tree holding only its root directory; nothing is read yet.
    pub fn new(walker: W, root: impl Into<PathBuf>) -> Self {
        Self {
            walker,
            entries: vec![Entry::new(root.into(), None, true)],
            warnings: Warnings::new(),
            progress: ProgressBar::hidden(),
            selection_in_use: false,
        }
    }

    /// Reports each directory read on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn root(&self) -> EntryId {
        EntryId(0)
    }

    pub fn entry(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    pub fn path(&self, id: EntryId) -> &Path {
        &self.entries[id.0].path
    }

    /// Number of entries discovered so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    pub fn walker(&self) -> &W {
        &self.walker
    }

    /// Every entry discovered so far, in discovery order.
    pub fn ids(&self) -> impl Iterator<Item = EntryId> {
        (0..self.entries.len()).map(EntryId)
    }

    /// Looks up an already discovered entry by path.
    pub fn find(&self, path: impl AsRef<Path>) -> Option<EntryId> {
        let path = path.as_ref();
        self.entries
            .iter()
            .position(|entry| entry.path == path)
            .map(EntryId)
    }

    /// Reads the immediate children of directory `id`, and recursively of every
    /// subdirectory, fixing `size` and `total_size` along the way.
    ///
    /// Only the first call touches the filesystem. A listing that fails part way
    /// keeps whatever children were read before the failure. Returns `None`
    /// when `id` is a file.
    pub fn enumerate(&mut self, id: EntryId) -> Option<&Contents> {
        let unenumerated = matches!(
            self.entries[id.0].node,
            Node::Directory(DirectoryNode {
                state: DirectoryState::Unenumerated,
                ..
            })
        );
        if unenumerated {
            let contents = self.scan_directory(id);
            if let Node::Directory(dir) = &mut self.entries[id.0].node {
                dir.state = DirectoryState::Enumerated(contents);
            }
        }
        self.entries[id.0].contents()
    }

    fn scan_directory(&mut self, id: EntryId) -> Contents {
        let path = self.entries[id.0].path.clone();
        self.progress
            .suspend(|| log::debug!("Enumerating {}", path.display()));
        self.progress.set_message(path.display().to_string());
        self.progress.inc(1);

        let mut discovered: Vec<ChildEntry> = Vec::new();
        match self.walker.list_children(&path) {
            Ok(listing) => {
                for child in listing {
                    match child {
                        Ok(child) => discovered.push(child),
                        Err(err) => {
                            warn(&self.progress, &mut self.warnings, &err);
                            break;
                        }
                    }
                }
            }
            Err(err) => {
                warn(&self.progress, &mut self.warnings, &err);
            }
        }

        let mut contents = Contents::default();
        for child in discovered {
            let child_id = EntryId(self.entries.len());
            self.entries.push(Entry::new(child.path, Some(id), child.is_dir));
            if child.is_dir {
                contents.subdirectories.push(child_id);
            } else {
                contents.files.push(child_id);
            }
        }

        contents.size = contents.files.iter().map(|&file| self.size(file)).sum();
        contents.total_size = contents.size
            + contents
                .subdirectories
                .iter()
                .map(|&dir| self.total_size(dir))
                .sum::<u64>();

        log::trace!(
            "{}: {} files, {} directories, {} bytes directly, {} bytes in total",
            path.display(),
            contents.files.len(),
            contents.subdirectories.len(),
            contents.size,
            contents.total_size
        );
        contents
    }

    /// Bytes of a file, or of the files directly inside a directory.
    ///
    /// A file that cannot be stat'ed is reported once and counts as 0 bytes.
    pub fn size(&mut self, id: EntryId) -> u64 {
        if self.entries[id.0].is_dir() {
            return self.enumerate(id).map_or(0, |contents| contents.size);
        }
        if let Some(size) = self.cached_size(id) {
            return size;
        }

        let size = match self.walker.file_size(&self.entries[id.0].path) {
            Ok(size) => size,
            Err(err) => {
                warn(&self.progress, &mut self.warnings, &err);
                0
            }
        };
        if let Node::File(file) = &mut self.entries[id.0].node {
            file.size = Some(size);
        }
        size
    }

    /// Bytes of a file, or of everything below a directory.
    pub fn total_size(&mut self, id: EntryId) -> u64 {
        if self.entries[id.0].is_dir() {
            self.enumerate(id).map_or(0, |contents| contents.total_size)
        } else {
            self.size(id)
        }
    }

    /// Size known without touching the filesystem; `None` until it has been read.
    pub fn cached_size(&self, id: EntryId) -> Option<u64> {
        match &self.entries[id.0].node {
            Node::File(file) => file.size,
            Node::Directory(_) => self.entries[id.0].contents().map(|c| c.size),
        }
    }

    /// Recursive size known without touching the filesystem.
    pub fn cached_total_size(&self, id: EntryId) -> Option<u64> {
        match &self.entries[id.0].node {
            Node::File(file) => file.size,
            Node::Directory(_) => self.entries[id.0].contents().map(|c| c.total_size),
        }
    }

    /// Ranking key of `id` by its own (non-recursive) size.
    pub fn rank_key(&mut self, id: EntryId) -> RankKey {
        let size = self.size(id);
        RankKey::new(size, self.entries[id.0].path.clone())
    }

    /// Children to show for `id`, biggest subtree first.
    ///
    /// Until something in the tree is selected these are all of the directory's
    /// children; afterwards only the children leading to a selected entry.
    pub fn children(&mut self, id: EntryId) -> Vec<EntryId> {
        let mut children = if self.selection_in_use {
            match &self.entries[id.0].node {
                Node::Directory(dir) => dir.tracked.clone(),
                Node::File(_) => Vec::new(),
            }
        } else {
            self.enumerate(id)
                .map(|contents| {
                    contents
                        .files
                        .iter()
                        .chain(&contents.subdirectories)
                        .copied()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };

        children.sort_by_cached_key(|&child| {
            RankKey::new(self.total_size(child), self.entries[child.0].path.clone())
        });
        children
    }

    /// Sets the selected flag of `id` and updates `has_selected` up the tree.
    pub fn set_selected(&mut self, id: EntryId, value: bool) {
        log::debug!(
            "{} {}",
            if value { "Selecting" } else { "Deselecting" },
            self.entries[id.0].path.display()
        );
        if value {
            self.selection_in_use = true;
        }
        self.entries[id.0].selected = value;
        self.propagate(id);

        debug_assert!(
            self.ancestors_consistent(id),
            "has_selected of {} is not reflected by its ancestors",
            self.entries[id.0].path.display()
        );
    }

    fn propagate(&mut self, id: EntryId) {
        let mut current = id;
        loop {
            let tracked: Vec<EntryId> = match &self.entries[current.0].node {
                Node::Directory(dir) => dir
                    .tracked
                    .iter()
                    .copied()
                    .filter(|child| self.entries[child.0].has_selected)
                    .collect(),
                Node::File(_) => Vec::new(),
            };
            let has_selected = self.entries[current.0].selected || !tracked.is_empty();

            let entry = &mut self.entries[current.0];
            if let Node::Directory(dir) = &mut entry.node {
                dir.tracked = tracked;
            }
            let had_selected = entry.has_selected;
            entry.has_selected = has_selected;

            let Some(parent) = entry.parent else {
                break;
            };

            if has_selected {
                self.track(parent, current);
                if self.entries[parent.0].has_selected {
                    break;
                }
            } else {
                if !had_selected {
                    break;
                }
                self.untrack(parent, current);
            }
            current = parent;
        }
    }

    fn track(&mut self, parent: EntryId, child: EntryId) {
        if let Node::Directory(dir) = &mut self.entries[parent.0].node {
            if !dir.tracked.contains(&child) {
                dir.tracked.push(child);
            }
        }
    }

    fn untrack(&mut self, parent: EntryId, child: EntryId) {
        if let Node::Directory(dir) = &mut self.entries[parent.0].node {
            dir.tracked.retain(|&tracked| tracked != child);
        }
    }

    fn ancestors_consistent(&self, id: EntryId) -> bool {
        let mut current = id;
        while let Some(parent) = self.entries[current.0].parent {
            if self.entries[current.0].has_selected && !self.entries[parent.0].has_selected {
                return false;
            }
            current = parent;
        }
        true
    }

    /// Verifies the selection bookkeeping of every entry.
    ///
    /// Returns the first entry whose `has_selected` disagrees with its own flag
    /// and its tracked children, or whose parent does not reflect it.
    pub fn check_invariants(&self) -> Result<(), EntryId> {
        for (index, entry) in self.entries.iter().enumerate() {
            let id = EntryId(index);

            let tracked_selected = match &entry.node {
                Node::Directory(dir) => dir
                    .tracked
                    .iter()
                    .all(|child| self.entries[child.0].has_selected),
                Node::File(_) => true,
            };
            let derived = entry.selected
                || match &entry.node {
                    Node::Directory(dir) => !dir.tracked.is_empty(),
                    Node::File(_) => false,
                };
            if !tracked_selected || derived != entry.has_selected {
                return Err(id);
            }

            if let Some(parent) = entry.parent {
                if entry.has_selected && !self.entries[parent.0].has_selected {
                    return Err(id);
                }
            }
        }
        Ok(())
    }
}
