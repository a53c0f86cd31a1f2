//! Open-file state: tabs, content cache, active selection
//!
//! Pure state, no backend calls; the shell performs the reads and writes and
//! feeds results in. The cache holds the last known text per open path so
//! switching tabs never re-reads from disk, and per-tab dirty flags track
//! unsaved edits reported by the editor.

pub mod tree;

pub use tree::FileTree;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Tabbed open-file set over the workspace tree
#[derive(Debug, Default)]
pub struct Workspace {
    pub tree: FileTree,
    open_tabs: Vec<PathBuf>,
    contents: HashMap<PathBuf, String>,
    dirty: HashSet<PathBuf>,
    active: Option<PathBuf>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_tabs(&self) -> &[PathBuf] {
        &self.open_tabs
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.open_tabs.iter().any(|p| p == path)
    }

    pub fn active(&self) -> Option<&PathBuf> {
        self.active.as_ref()
    }

    pub fn content(&self, path: &Path) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    pub fn is_dirty(&self, path: &Path) -> bool {
        self.dirty.contains(path)
    }

    /// Add a tab with its freshly read content and make it active.
    /// Re-opening an already open path just switches to it.
    pub fn open_tab(&mut self, path: PathBuf, content: String) {
        if !self.is_open(&path) {
            self.open_tabs.push(path.clone());
        }
        self.contents.insert(path.clone(), content);
        self.dirty.remove(&path);
        self.active = Some(path);
    }

    /// Make an already open tab active. Unknown paths are ignored.
    pub fn activate(&mut self, path: &Path) {
        if self.is_open(path) {
            self.active = Some(path.to_path_buf());
        }
    }

    /// Store the latest editor text for a path (tab switch or save).
    pub fn store_content(&mut self, path: &Path, content: String) {
        if self.is_open(path) {
            self.contents.insert(path.to_path_buf(), content);
        }
    }

    /// Editor reported an edit on the active document.
    pub fn mark_active_dirty(&mut self) {
        if let Some(path) = &self.active {
            self.dirty.insert(path.clone());
        }
    }

    pub fn clear_dirty(&mut self, path: &Path) {
        self.dirty.remove(path);
    }

    /// Close a tab. Absent paths are a no-op (returns false).
    ///
    /// Closing the active tab activates the neighbor that slid into its
    /// index, or the new last tab when the closed one was last; the caller
    /// reads `active()` afterwards to refresh the editor.
    pub fn close_tab(&mut self, path: &Path) -> bool {
        let Some(index) = self.open_tabs.iter().position(|p| p == path) else {
            return false;
        };
        self.open_tabs.remove(index);
        self.contents.remove(path);
        self.dirty.remove(path);

        if self.active.as_deref() == Some(path) {
            self.active = if self.open_tabs.is_empty() {
                None
            } else {
                Some(self.open_tabs[index.min(self.open_tabs.len() - 1)].clone())
            };
        }
        true
    }

    /// Drop all tab state (new workspace opened).
    pub fn close_all(&mut self) {
        self.open_tabs.clear();
        self.contents.clear();
        self.dirty.clear();
        self.active = None;
    }
}
