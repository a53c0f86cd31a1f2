//! Local-machine host backend
//!
//! Implements the full capability surface against the local filesystem and
//! shell: workspace scanning with gitignore rules, file CRUD, a one-slot file
//! clipboard, command execution with a per-backend working directory, and
//! theme persistence through the shell config file.

use super::{CommandOutcome, EntryKind, HostBackend, ThemeInfo, TreeNode, WorkspaceTree};
use crate::config::ShellConfig;
use async_trait::async_trait;
use ignore::WalkBuilder;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::sync::Mutex;

/// Filename of the built-in theme, always listed and flagged as default.
pub const DEFAULT_THEME: &str = "default.json";

/// Entry held on the file clipboard between copy and paste
#[derive(Debug, Clone)]
struct ClipboardEntry {
    path: PathBuf,
    kind: EntryKind,
}

/// Host backend backed by the local filesystem and shell
pub struct LocalBackend {
    workspace: Mutex<Option<PathBuf>>,
    shell_cwd: Mutex<PathBuf>,
    clipboard: Mutex<Option<ClipboardEntry>>,
    themes_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl LocalBackend {
    /// Create a backend using the platform config locations for themes and
    /// the persisted theme choice.
    pub fn new() -> Self {
        let base = dirs::config_dir().map(|d| d.join("atelier"));
        Self::with_paths(
            base.as_ref().map(|d| d.join("themes")),
            base.map(|d| d.join("config.json")),
        )
    }

    /// Create a backend with explicit theme/config locations (for testing).
    pub fn with_paths(themes_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Self {
        Self {
            workspace: Mutex::new(None),
            shell_cwd: Mutex::new(
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            ),
            clipboard: Mutex::new(None),
            themes_dir,
            config_path,
        }
    }

    /// Pre-select the workspace root.
    ///
    /// A native folder dialog is the host's job; headless embedders and tests
    /// set the root directly and `select_folder` hands it back.
    pub async fn set_workspace(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        *self.shell_cwd.lock().await = path.clone();
        *self.workspace.lock().await = Some(path);
    }

    async fn change_dir(&self, arg: &str) -> io::Result<CommandOutcome> {
        let mut cwd = self.shell_cwd.lock().await;
        let target = if arg.is_empty() {
            dirs::home_dir().unwrap_or_else(|| cwd.clone())
        } else {
            let candidate = Path::new(arg);
            if candidate.is_absolute() {
                candidate.to_path_buf()
            } else {
                cwd.join(candidate)
            }
        };

        let canonical = tokio::fs::canonicalize(&target).await?;
        if !tokio::fs::metadata(&canonical).await?.is_dir() {
            return Err(io::Error::other(format!("not a directory: {arg}")));
        }
        *cwd = canonical.clone();
        Ok(CommandOutcome::default().with_cwd(canonical))
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostBackend for LocalBackend {
    async fn select_folder(&self) -> io::Result<Option<PathBuf>> {
        Ok(self.workspace.lock().await.clone())
    }

    async fn file_tree(&self) -> io::Result<WorkspaceTree> {
        let folder = self
            .workspace
            .lock()
            .await
            .clone()
            .ok_or_else(|| io::Error::other("no workspace folder selected"))?;

        let root = folder.clone();
        let nodes = tokio::task::spawn_blocking(move || scan_tree(&root))
            .await
            .map_err(io::Error::other)??;

        Ok(WorkspaceTree { folder, nodes })
    }

    async fn read_file(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn save_file(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await
    }

    async fn create_file(&self, parent: &Path, name: &str) -> io::Result<PathBuf> {
        let name = validate_name(name)?;
        let target = parent.join(name);
        tokio::fs::create_dir_all(parent).await?;
        // create_new fails with AlreadyExists instead of truncating
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await?;
        Ok(target)
    }

    async fn create_folder(&self, parent: &Path, name: &str) -> io::Result<PathBuf> {
        let name = validate_name(name)?;
        let target = parent.join(name);
        if tokio::fs::try_exists(&target).await? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{name}' already exists"),
            ));
        }
        tokio::fs::create_dir_all(&target).await?;
        Ok(target)
    }

    async fn rename_item(&self, path: &Path, new_name: &str) -> io::Result<PathBuf> {
        let new_name = validate_name(new_name)?;
        let parent = path
            .parent()
            .ok_or_else(|| io::Error::other("cannot rename the filesystem root"))?;
        let target = parent.join(new_name);
        if tokio::fs::try_exists(&target).await? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{new_name}' already exists"),
            ));
        }
        tokio::fs::rename(path, &target).await?;
        Ok(target)
    }

    async fn delete_item(&self, path: &Path) -> io::Result<()> {
        let meta = tokio::fs::metadata(path).await?;
        if meta.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        }
    }

    async fn reveal_item(&self, path: &Path) -> io::Result<()> {
        // Headless hosts have no file manager to open; verify the entry so a
        // stale tree row still reports a useful error.
        tokio::fs::metadata(path).await?;
        tracing::debug!(path = %path.display(), "reveal requested");
        Ok(())
    }

    async fn full_path(&self, path: &Path) -> io::Result<PathBuf> {
        tokio::fs::canonicalize(path).await
    }

    async fn copy_item(&self, path: &Path, kind: EntryKind) -> io::Result<String> {
        tokio::fs::metadata(path).await?;
        let name = file_name_of(path)?;
        *self.clipboard.lock().await = Some(ClipboardEntry {
            path: path.to_path_buf(),
            kind,
        });
        Ok(name)
    }

    async fn paste_item(&self, target: &Path) -> io::Result<String> {
        let entry = self
            .clipboard
            .lock()
            .await
            .clone()
            .ok_or_else(|| io::Error::other("clipboard is empty"))?;

        let dest_dir = if tokio::fs::metadata(target).await?.is_dir() {
            target.to_path_buf()
        } else {
            target
                .parent()
                .ok_or_else(|| io::Error::other("paste target has no parent"))?
                .to_path_buf()
        };

        let dest = free_destination(&dest_dir, &entry.path).await?;
        let source = entry.path.clone();
        match entry.kind {
            EntryKind::File => {
                tokio::fs::copy(&source, &dest).await?;
            }
            EntryKind::Folder => {
                let dest = dest.clone();
                tokio::task::spawn_blocking(move || copy_dir_recursive(&source, &dest))
                    .await
                    .map_err(io::Error::other)??;
            }
        }
        file_name_of(&dest)
    }

    async fn run_command(&self, command: &str) -> io::Result<CommandOutcome> {
        let trimmed = command.trim();

        // Builtins the host shell would either not affect (cd in a child
        // process) or that address the shell's own log (clear).
        if trimmed == "clear" || trimmed.eq_ignore_ascii_case("cls") {
            return Ok(CommandOutcome::cleared());
        }
        if trimmed == "cd" {
            return self.change_dir("").await;
        }
        if let Some(arg) = trimmed.strip_prefix("cd ") {
            return self.change_dir(arg.trim()).await;
        }

        let shell = detect_shell();
        let cwd = self.shell_cwd.lock().await.clone();
        let output = tokio::process::Command::new(&shell)
            .args(["-c", trimmed])
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        let mut outcome = CommandOutcome {
            exit_failure: !output.status.success(),
            ..CommandOutcome::default()
        };
        if !stdout.is_empty() {
            outcome.output = Some(stdout);
        }
        if !stderr.is_empty() {
            outcome.stderr = Some(stderr);
        }
        Ok(outcome)
    }

    async fn saved_theme(&self) -> io::Result<Option<String>> {
        let Some(path) = &self.config_path else {
            return Ok(None);
        };
        let config = ShellConfig::load_from(path).map_err(io::Error::other)?;
        Ok(config.theme)
    }

    async fn save_theme(&self, filename: &str) -> io::Result<()> {
        let path = self
            .config_path
            .as_ref()
            .ok_or_else(|| io::Error::other("no config path available"))?;
        // Tolerate a corrupt config on write; the theme choice wins.
        let mut config = ShellConfig::load_from(path).unwrap_or_default();
        config.theme = Some(filename.to_string());
        config.save_to(path).map_err(io::Error::other)
    }

    async fn available_themes(&self) -> io::Result<Vec<ThemeInfo>> {
        let mut themes = vec![ThemeInfo {
            filename: DEFAULT_THEME.to_string(),
            display_name: "Default".to_string(),
            is_default: true,
        }];

        if let Some(dir) = &self.themes_dir {
            if tokio::fs::try_exists(dir).await? {
                let mut extra = Vec::new();
                let mut entries = tokio::fs::read_dir(dir).await?;
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }
                    let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                        continue;
                    };
                    if filename == DEFAULT_THEME {
                        continue;
                    }
                    let stem = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or(filename);
                    extra.push(ThemeInfo {
                        filename: filename.to_string(),
                        display_name: display_name_from_stem(stem),
                        is_default: false,
                    });
                }
                extra.sort_by(|a, b| a.filename.cmp(&b.filename));
                themes.extend(extra);
            }
        }

        Ok(themes)
    }
}

/// Detect the shell to use for executing commands.
fn detect_shell() -> String {
    if let Ok(shell) = std::env::var("SHELL") {
        if !shell.is_empty() {
            return shell;
        }
    }

    #[cfg(unix)]
    {
        if Path::new("/bin/bash").exists() {
            return "/bin/bash".to_string();
        }
        if Path::new("/bin/sh").exists() {
            return "/bin/sh".to_string();
        }
    }

    #[cfg(windows)]
    {
        if let Ok(comspec) = std::env::var("COMSPEC") {
            return comspec;
        }
        return "cmd.exe".to_string();
    }

    "sh".to_string()
}

/// Reject names that would escape their parent directory.
fn validate_name(name: &str) -> io::Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "name is empty"));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid name: '{name}'"),
        ));
    }
    Ok(name)
}

fn file_name_of(path: &Path) -> io::Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::other(format!("path has no name: {}", path.display())))
}

/// Pick a destination path in `dest_dir` for the source entry, appending
/// " copy" (then " copy 2", …) to the stem while the name is taken.
async fn free_destination(dest_dir: &Path, source: &Path) -> io::Result<PathBuf> {
    let name = file_name_of(source)?;
    let candidate = dest_dir.join(&name);
    if !tokio::fs::try_exists(&candidate).await? {
        return Ok(candidate);
    }

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.clone());
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    for n in 1..100 {
        let suffixed = if n == 1 {
            format!("{stem} copy{ext}")
        } else {
            format!("{stem} copy {n}{ext}")
        };
        let candidate = dest_dir.join(suffixed);
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(io::Error::other(format!(
        "too many copies of '{name}' in {}",
        dest_dir.display()
    )))
}

fn copy_dir_recursive(source: &Path, dest: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Scan a workspace root into nested nodes, honoring gitignore rules and
/// skipping hidden entries.
fn scan_tree(root: &Path) -> io::Result<Vec<TreeNode>> {
    if !root.is_dir() {
        return Err(io::Error::other(format!(
            "workspace root is not a directory: {}",
            root.display()
        )));
    }

    let mut children: HashMap<PathBuf, Vec<TreeNode>> = HashMap::new();
    for entry in WalkBuilder::new(root).follow_links(false).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path().to_path_buf();
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let node = if is_dir {
            TreeNode::folder(name, &path)
        } else {
            TreeNode::file(name, &path)
        };

        let parent = path.parent().unwrap_or(root).to_path_buf();
        children.entry(parent).or_default().push(node);
    }

    let mut nodes = children.remove(root).unwrap_or_default();
    sort_nodes(&mut nodes);
    for node in &mut nodes {
        attach_children(node, &mut children);
    }
    Ok(nodes)
}

fn attach_children(node: &mut TreeNode, children: &mut HashMap<PathBuf, Vec<TreeNode>>) {
    if !node.is_folder() {
        return;
    }
    let mut kids = children.remove(&node.path).unwrap_or_default();
    sort_nodes(&mut kids);
    for kid in &mut kids {
        attach_children(kid, children);
    }
    node.children = kids;
}

/// Folders before files, each group by name, case-insensitive.
fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| match (a.kind, b.kind) {
        (EntryKind::Folder, EntryKind::File) => std::cmp::Ordering::Less,
        (EntryKind::File, EntryKind::Folder) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
}

/// "gruvbox_dark" -> "Gruvbox Dark"
fn display_name_from_stem(stem: &str) -> String {
    stem.replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
