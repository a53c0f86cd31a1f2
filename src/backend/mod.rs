// Host backend abstraction layer
//
// Every capability the shell consumes from its host process goes through this
// trait: filesystem access, workspace scanning, process execution, and theme
// persistence. Implementations may live in-process (LocalBackend) or proxy to
// a native host bridge.

pub mod local;

pub use local::LocalBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Kind of a workspace tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One node of the workspace file tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::File,
            children: Vec::new(),
        }
    }

    pub fn folder(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::Folder,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// A scanned workspace: the root folder plus its nested entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceTree {
    pub folder: PathBuf,
    pub nodes: Vec<TreeNode>,
}

/// Result of running one terminal command through the host shell
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Captured standard output, if any
    pub output: Option<String>,
    /// Captured standard error, if any
    pub stderr: Option<String>,
    /// Render `output` as error lines (e.g. the process exited non-zero)
    #[serde(rename = "isError", default)]
    pub exit_failure: bool,
    /// Reset the terminal log instead of appending
    #[serde(default)]
    pub clear: bool,
    /// New working directory for the prompt indicator
    pub cwd: Option<PathBuf>,
}

impl CommandOutcome {
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = Some(stderr.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn cleared() -> Self {
        Self {
            clear: true,
            ..Self::default()
        }
    }
}

/// One installed theme as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub filename: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

/// Asynchronous host capability surface
///
/// Each method is one RPC to the host: `Ok` carries the payload, `Err` the
/// host-reported failure message. Callers never see a panic out of a backend;
/// the shell renders failures and stays interactive.
#[async_trait]
pub trait HostBackend: Send + Sync {
    /// Ask the host for a workspace root (native folder dialog).
    ///
    /// `Ok(None)` means the user cancelled.
    async fn select_folder(&self) -> io::Result<Option<PathBuf>>;

    /// Scan the current workspace into a nested tree.
    ///
    /// Ordering contract: folders before files, each group sorted by name
    /// (case-insensitive).
    async fn file_tree(&self) -> io::Result<WorkspaceTree>;

    /// Read a file as text.
    async fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Write text to a file, creating parent directories as needed.
    async fn save_file(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Create an empty file `name` under `parent`. Fails if it exists.
    async fn create_file(&self, parent: &Path, name: &str) -> io::Result<PathBuf>;

    /// Create a folder `name` under `parent`.
    async fn create_folder(&self, parent: &Path, name: &str) -> io::Result<PathBuf>;

    /// Rename an entry in place, returning its new path.
    async fn rename_item(&self, path: &Path, new_name: &str) -> io::Result<PathBuf>;

    /// Delete a file or folder (recursively).
    async fn delete_item(&self, path: &Path) -> io::Result<()>;

    /// Reveal an entry in the platform file manager.
    async fn reveal_item(&self, path: &Path) -> io::Result<()>;

    /// Absolute path for an entry, for copy-path actions.
    async fn full_path(&self, path: &Path) -> io::Result<PathBuf>;

    /// Put an entry on the host's file clipboard. Returns the copied name.
    async fn copy_item(&self, path: &Path, kind: EntryKind) -> io::Result<String>;

    /// Paste the clipboard entry into `target` (a folder, or a file whose
    /// parent folder is used). Returns the pasted name.
    async fn paste_item(&self, target: &Path) -> io::Result<String>;

    /// Run one command line through the host shell.
    async fn run_command(&self, command: &str) -> io::Result<CommandOutcome>;

    /// Theme persisted by a previous session, if any.
    async fn saved_theme(&self) -> io::Result<Option<String>>;

    /// Persist the theme choice across sessions.
    async fn save_theme(&self, filename: &str) -> io::Result<()>;

    /// All installed themes.
    async fn available_themes(&self) -> io::Result<Vec<ThemeInfo>>;
}
