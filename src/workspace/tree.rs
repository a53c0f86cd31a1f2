//! Workspace file tree state
//!
//! The nested node structure comes from the backend scan; this layer only
//! tracks which folders are collapsed and flattens the tree into visible
//! rows for the host. A freshly loaded tree starts fully collapsed.

use crate::backend::{TreeNode, WorkspaceTree};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Scanned workspace plus per-folder collapse state
#[derive(Debug, Default)]
pub struct FileTree {
    folder: Option<PathBuf>,
    nodes: Vec<TreeNode>,
    collapsed: HashSet<PathBuf>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Workspace root, `None` until a tree has been loaded.
    pub fn folder(&self) -> Option<&PathBuf> {
        self.folder.as_ref()
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn is_loaded(&self) -> bool {
        self.folder.is_some()
    }

    /// Replace the tree with a fresh scan, collapsing every folder.
    pub fn load(&mut self, tree: WorkspaceTree) {
        self.folder = Some(tree.folder);
        self.nodes = tree.nodes;
        self.collapse_all();
    }

    /// Refresh the node structure while keeping collapse state, so a rename
    /// or paste doesn't snap every folder shut. Collapse entries for paths
    /// that no longer exist are dropped.
    pub fn refresh(&mut self, tree: WorkspaceTree) {
        self.folder = Some(tree.folder);
        self.nodes = tree.nodes;
        let mut live = HashSet::new();
        collect_folders(&self.nodes, &mut live);
        self.collapsed.retain(|p| live.contains(p));
    }

    pub fn collapse_all(&mut self) {
        self.collapsed.clear();
        collect_folders(&self.nodes, &mut self.collapsed);
    }

    pub fn is_collapsed(&self, path: &Path) -> bool {
        self.collapsed.contains(path)
    }

    /// Flip one folder's collapse state.
    pub fn toggle(&mut self, path: &Path) {
        if !self.collapsed.remove(path) {
            self.collapsed.insert(path.to_path_buf());
        }
    }

    /// Depth-first flatten, skipping children of collapsed folders.
    pub fn visible(&self) -> Vec<(usize, &TreeNode)> {
        let mut rows = Vec::new();
        for node in &self.nodes {
            self.push_visible(node, 0, &mut rows);
        }
        rows
    }

    fn push_visible<'a>(
        &'a self,
        node: &'a TreeNode,
        depth: usize,
        rows: &mut Vec<(usize, &'a TreeNode)>,
    ) {
        rows.push((depth, node));
        if node.is_folder() && !self.is_collapsed(&node.path) {
            for child in &node.children {
                self.push_visible(child, depth + 1, rows);
            }
        }
    }
}

fn collect_folders(nodes: &[TreeNode], out: &mut HashSet<PathBuf>) {
    for node in nodes {
        if node.is_folder() {
            out.insert(node.path.clone());
            collect_folders(&node.children, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> WorkspaceTree {
        WorkspaceTree {
            folder: PathBuf::from("/ws"),
            nodes: vec![
                TreeNode::folder("src", "/ws/src").with_children(vec![
                    TreeNode::folder("nested", "/ws/src/nested")
                        .with_children(vec![TreeNode::file("deep.rs", "/ws/src/nested/deep.rs")]),
                    TreeNode::file("main.rs", "/ws/src/main.rs"),
                ]),
                TreeNode::file("README.md", "/ws/README.md"),
            ],
        }
    }

    #[test]
    fn test_load_collapses_everything() {
        let mut tree = FileTree::new();
        tree.load(sample_tree());

        assert!(tree.is_collapsed(Path::new("/ws/src")));
        assert!(tree.is_collapsed(Path::new("/ws/src/nested")));

        let names: Vec<&str> = tree.visible().iter().map(|(_, n)| n.name.as_str()).collect();
        assert_eq!(names, ["src", "README.md"]);
    }

    #[test]
    fn test_toggle_reveals_direct_children_only() {
        let mut tree = FileTree::new();
        tree.load(sample_tree());
        tree.toggle(Path::new("/ws/src"));

        let rows = tree.visible();
        let names: Vec<&str> = rows.iter().map(|(_, n)| n.name.as_str()).collect();
        assert_eq!(names, ["src", "nested", "main.rs", "README.md"]);

        let depths: Vec<usize> = rows.iter().map(|(d, _)| *d).collect();
        assert_eq!(depths, [0, 1, 1, 0]);
    }

    #[test]
    fn test_refresh_keeps_collapse_state() {
        let mut tree = FileTree::new();
        tree.load(sample_tree());
        tree.toggle(Path::new("/ws/src"));

        tree.refresh(sample_tree());
        assert!(!tree.is_collapsed(Path::new("/ws/src")));
        assert!(tree.is_collapsed(Path::new("/ws/src/nested")));
    }

    #[test]
    fn test_refresh_drops_stale_collapse_entries() {
        let mut tree = FileTree::new();
        tree.load(sample_tree());

        tree.refresh(WorkspaceTree {
            folder: PathBuf::from("/ws"),
            nodes: vec![TreeNode::file("README.md", "/ws/README.md")],
        });
        assert!(!tree.is_collapsed(Path::new("/ws/src")));
    }

    #[test]
    fn test_new_workspace_load_resets_prior_state() {
        let mut tree = FileTree::new();
        tree.load(sample_tree());
        tree.toggle(Path::new("/ws/src"));

        tree.load(sample_tree());
        assert!(tree.is_collapsed(Path::new("/ws/src")));
    }
}
