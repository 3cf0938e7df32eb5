//! Top-K selection of the biggest files and directories of a tree.
//!
//! A directory is ranked by its own size, the bytes of the files directly inside
//! it, so every byte belongs to exactly one rankable entity. When a file is
//! reported on its own, the bytes it takes out of its parent are subtracted from
//! the parent's reported size, which keeps the result free of double counting.

use crate::errors::EmptyError;
use crate::heap::MutableHeap;
use crate::tree::{EntryId, RankKey, Tree};
use crate::walker::Walker;

/// One entry of a ranking, with the bytes it accounts for.
///
/// For a directory `size` excludes the files that appear in the same ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    pub entry: EntryId,
    pub size: u64,
}

/// Candidates a subtree offers to the ranking of its ancestors.
struct Candidates {
    /// Up to `n` biggest files of the subtree, biggest first.
    files: Vec<EntryId>,
    /// Directories of the subtree big enough to still matter.
    directories: Vec<EntryId>,
}

/// Returns the `n` biggest entities below directory `dir`, biggest first.
///
/// Files and directories compete on the same ordering (size descending, then
/// path ascending); `dir` itself is never part of its own ranking. With
/// `include_directories` unset only files are ranked.
///
/// The result holds fewer than `n` entries when the candidates run out, and
/// also when a file's bytes are already represented by its parent in the result.
pub fn biggest<W: Walker>(
    tree: &mut Tree<W>,
    dir: EntryId,
    n: usize,
    include_directories: bool,
) -> Vec<Ranked> {
    if n == 0 {
        return Vec::new();
    }

    let Candidates { files, directories } = candidates(tree, dir, n, include_directories);
    log::debug!(
        "Merging {} files and {} directories below {}",
        files.len(),
        directories.len(),
        tree.path(dir).display()
    );

    let mut remaining: MutableHeap<EntryId, RankKey> = directories
        .into_iter()
        .map(|directory| (directory, tree.rank_key(directory)))
        .collect();
    let mut files = files.into_iter().peekable();
    let mut result: Vec<Ranked> = Vec::with_capacity(n);

    while result.len() < n {
        let next_file = files.peek().map(|&file| tree.rank_key(file));
        let next_directory = remaining.peek_key().ok().cloned();

        let take_file = match (&next_file, &next_directory) {
            (None, None) => break,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(file), Some(directory)) => file < directory,
        };

        if take_file {
            if let Some(file) = files.next() {
                emit_file(tree, file, &mut remaining, &mut result);
            }
        } else {
            match remaining.pop_with_key() {
                Ok((directory, key)) => result.push(Ranked {
                    entry: directory,
                    size: key.size(),
                }),
                Err(EmptyError) => unreachable!("a directory was peeked but none could be popped"),
            }
        }
    }

    result.sort_by_cached_key(|ranked| RankKey::new(ranked.size, tree.path(ranked.entry)));
    result
}

// Reports `file`, taking its bytes out of its parent directory's share.
fn emit_file<W: Walker>(
    tree: &mut Tree<W>,
    file: EntryId,
    remaining: &mut MutableHeap<EntryId, RankKey>,
    result: &mut Vec<Ranked>,
) {
    let size = tree.size(file);
    let ranked = Ranked { entry: file, size };

    let Some(parent) = tree.entry(file).parent() else {
        result.push(ranked);
        return;
    };

    if let Some(current) = remaining.current_key(&parent).map(RankKey::size) {
        let key = RankKey::new(current.saturating_sub(size), tree.path(parent));
        remaining.update_key(parent, key);
        result.push(ranked);
        return;
    }

    let Some(position) = result.iter().position(|ranked| ranked.entry == parent) else {
        result.push(ranked);
        return;
    };

    let current = result[position].size;
    if size >= current {
        // The parent already stands for exactly these bytes.
        log::trace!(
            "{} is already accounted for by {}",
            tree.path(file).display(),
            tree.path(parent).display()
        );
        return;
    }

    log::trace!(
        "Retracting {} to report {} separately",
        tree.path(parent).display(),
        tree.path(file).display()
    );
    result.remove(position);
    remaining.push(parent, RankKey::new(current - size, tree.path(parent)));
    result.push(ranked);
}

fn candidates<W: Walker>(
    tree: &mut Tree<W>,
    dir: EntryId,
    n: usize,
    include_directories: bool,
) -> Candidates {
    let (own_files, subdirectories) = match tree.enumerate(dir) {
        Some(contents) => (contents.files.clone(), contents.subdirectories.clone()),
        None => (Vec::new(), Vec::new()),
    };

    let mut files: MutableHeap<EntryId, RankKey> = MutableHeap::new();
    let mut directories = Vec::new();

    for subdirectory in subdirectories {
        let nested = candidates(tree, subdirectory, n, include_directories);
        for file in nested.files {
            files.push(file, tree.rank_key(file));
        }
        if include_directories {
            directories.push(subdirectory);
            directories.extend(nested.directories);
        }
    }
    for file in own_files {
        files.push(file, tree.rank_key(file));
    }

    let mut top = Vec::with_capacity(n.min(files.len()));
    while top.len() < n {
        match files.pop() {
            Ok(file) => top.push(file),
            Err(EmptyError) => break,
        }
    }

    // A directory smaller than the n-th biggest file can never make the cut.
    let cut = match top.last() {
        Some(&smallest) if top.len() == n => tree.size(smallest),
        _ => 0,
    };
    directories.retain(|&directory| tree.size(directory) >= cut);

    Candidates {
        files: top,
        directories,
    }
}

impl<W: Walker> Tree<W> {
    /// The `n` biggest entities below the root. See [`biggest`].
    pub fn biggest(&mut self, n: usize, include_directories: bool) -> Vec<Ranked> {
        let root = self.root();
        biggest(self, root, n, include_directories)
    }
}
