#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Set of currently selected paths. Pure set operations; nothing here
/// touches the file system. Stale members (paths deleted externally) are
/// tolerated until the next navigation clears the store.
#[derive(Debug, Default)]
pub struct SelectionStore {
    paths: HashSet<PathBuf>,
}

impl SelectionStore {
    pub fn toggle(&mut self, path: &Path) {
        if !self.paths.remove(path) {
            self.paths.insert(path.to_path_buf());
        }
    }

    pub fn select_all<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.paths = paths.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }

    /// Snapshot for handing to a batch operation.
    pub fn to_vec(&self) -> Vec<PathBuf> {
        self.paths.iter().cloned().collect()
    }

    /// The single selected path, if exactly one item is selected.
    pub fn single(&self) -> Option<&PathBuf> {
        if self.paths.len() == 1 {
            self.paths.iter().next()
        } else {
            None
        }
    }

    pub fn replace_with(&mut self, path: PathBuf) {
        self.paths.clear();
        self.paths.insert(path);
    }
}

/// Whether staged paths are pasted as a copy or relocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMode {
    Copy,
    Cut,
}

/// Paths staged for a later paste. Independent of the selection store and
/// kept across navigation.
#[derive(Debug, Default)]
pub struct ClipboardStore {
    paths: Vec<PathBuf>,
    mode: Option<ClipboardMode>,
}

impl ClipboardStore {
    /// Replaces the staged contents. Staging an empty set is a no-op that
    /// leaves prior contents untouched; returns whether anything was staged.
    pub fn stage(&mut self, paths: Vec<PathBuf>, mode: ClipboardMode) -> bool {
        if paths.is_empty() {
            return false;
        }
        self.paths = paths;
        self.mode = Some(mode);
        true
    }

    pub fn peek(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn mode(&self) -> Option<ClipboardMode> {
        self.mode
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.mode = None;
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
