//! The owning shell session
//!
//! One `Shell` instance holds every piece of mutable UI state: the terminal
//! session, the palette, the workspace (tree + tabs), the editor seam, the
//! current theme, and the transient status/alert strings. Hosts construct it
//! on UI init and route key events and editor notifications into it; all
//! state mutation happens on the caller's task, with backend awaits as the
//! only suspension points.

use crate::backend::{local::DEFAULT_THEME, EntryKind, HostBackend};
use crate::editor::{language_for_path, EditorComponent};
use crate::palette::{Badge, CommandId, CommandPalette, PaletteAction};
use crate::terminal::TerminalSession;
use crate::workspace::Workspace;
use crossterm::event::{KeyCode, KeyModifiers};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which pane keystrokes are routed to when the palette is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Terminal,
}

/// Work only the embedder can perform, surfaced instead of executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    /// Reload the whole surface (the `Reload Window` command).
    Reload,
    /// Prompt the user for a new file name under `parent`, then call
    /// [`Shell::new_file`].
    PromptNewFile { parent: PathBuf },
    /// Prompt for a new folder name under `parent`, then call
    /// [`Shell::new_folder`].
    PromptNewFolder { parent: PathBuf },
}

/// Front-end shell state over a host backend and an embedded editor
pub struct Shell<E: EditorComponent> {
    backend: Arc<dyn HostBackend>,
    pub terminal: TerminalSession,
    pub palette: CommandPalette,
    pub workspace: Workspace,
    pub editor: E,
    current_theme: Option<String>,
    status: Option<String>,
    alert: Option<String>,
    host_request: Option<HostRequest>,
}

impl<E: EditorComponent> Shell<E> {
    pub fn new(backend: Arc<dyn HostBackend>, editor: E) -> Self {
        Self {
            terminal: TerminalSession::new(backend.clone()),
            palette: CommandPalette::new(),
            workspace: Workspace::new(),
            editor,
            backend,
            current_theme: None,
            status: None,
            alert: None,
            host_request: None,
        }
    }

    /// Load the persisted theme choice. The default theme is the fallback
    /// for a fresh profile or an unreadable config; nothing is re-persisted.
    pub async fn init(&mut self) {
        self.current_theme = match self.backend.saved_theme().await {
            Ok(Some(theme)) => Some(theme),
            Ok(None) => Some(DEFAULT_THEME.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load saved theme");
                Some(DEFAULT_THEME.to_string())
            }
        };
    }

    pub fn current_theme(&self) -> Option<&str> {
        self.current_theme.as_deref()
    }

    /// Transient status line, cleared by reading it.
    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    /// Last alert-style error, cleared by reading it.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Pending request the embedder must act on, cleared by reading it.
    pub fn take_host_request(&mut self) -> Option<HostRequest> {
        self.host_request.take()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    fn set_alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "alert raised");
        self.alert = Some(message);
    }
}

// Key dispatch
impl<E: EditorComponent> Shell<E> {
    /// Route one key event. Global chords win, then the open palette, then
    /// the focused pane.
    pub async fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, focus: Focus) {
        let ctrl_shift = modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        if (ctrl_shift && matches!(code, KeyCode::Char('p') | KeyCode::Char('P')))
            || code == KeyCode::F(1)
        {
            self.palette.toggle();
            return;
        }
        if modifiers.contains(KeyModifiers::CONTROL)
            && matches!(code, KeyCode::Char('s') | KeyCode::Char('S'))
            && !ctrl_shift
        {
            self.save_active().await;
            return;
        }

        if self.palette.is_open() {
            self.handle_palette_key(code).await;
            return;
        }

        if focus == Focus::Terminal {
            self.handle_terminal_key(code).await;
        }
    }

    async fn handle_palette_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.palette.close(),
            KeyCode::Down => self.palette.select_next(),
            KeyCode::Up => self.palette.select_previous(),
            KeyCode::Enter => self.activate_selected().await,
            KeyCode::Backspace => {
                if !self.palette.backspace_on_empty() {
                    let mut query = self.palette.query().to_string();
                    query.pop();
                    self.palette.set_query(query);
                }
            }
            KeyCode::Char(c) => {
                let mut query = self.palette.query().to_string();
                query.push(c);
                self.palette.set_query(query);
            }
            _ => {}
        }
    }

    async fn handle_terminal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.run_terminal_command().await,
            KeyCode::Up => self.terminal.history_previous(),
            KeyCode::Down => self.terminal.history_next(),
            KeyCode::Backspace => {
                let mut input = self.terminal.input().to_string();
                input.pop();
                self.terminal.set_input(input);
            }
            KeyCode::Char(c) => {
                let mut input = self.terminal.input().to_string();
                input.push(c);
                self.terminal.set_input(input);
            }
            _ => {}
        }
    }

    /// Submit the terminal input line and render its result, driving all
    /// three submission phases in order.
    pub async fn run_terminal_command(&mut self) {
        self.terminal.run().await;
    }
}

// Palette wiring
impl<E: EditorComponent> Shell<E> {
    /// Render-time badge for a command row.
    pub fn command_badge(&self, id: CommandId) -> Option<Badge> {
        match id {
            CommandId::ToggleDebugPanel => Some(if self.terminal.debug_panel() {
                Badge::new("ON")
            } else {
                Badge::dimmed("OFF")
            }),
            _ => None,
        }
    }

    /// Flattened palette rows with badges resolved against current state.
    pub fn palette_rows(&self) -> Vec<crate::palette::PaletteRow> {
        self.palette
            .rows(|id| self.command_badge(id), self.current_theme.as_deref())
    }

    /// Invoke the currently highlighted palette item (Enter).
    pub async fn activate_selected(&mut self) {
        let action = self.palette.selected_action();
        self.run_palette_action(action).await;
    }

    /// Invoke the item at `index` (mouse click).
    pub async fn activate_at(&mut self, index: usize) {
        let action = self.palette.action_at(index);
        self.run_palette_action(action).await;
    }

    async fn run_palette_action(&mut self, action: Option<PaletteAction>) {
        // Closing is unconditional and precedes the action, so an action may
        // legitimately reopen the palette in another mode.
        self.palette.close();
        match action {
            Some(PaletteAction::Run(id)) => self.execute(id).await,
            Some(PaletteAction::ApplyTheme(theme)) => self.apply_theme(&theme.filename).await,
            None => {}
        }
    }

    /// Execute one registry command.
    pub async fn execute(&mut self, id: CommandId) {
        self.palette.close();
        tracing::info!(?id, "executing command");
        match id {
            CommandId::ReloadWindow => self.host_request = Some(HostRequest::Reload),
            CommandId::ToggleDebugPanel => {
                self.terminal.toggle_debug_panel();
            }
            CommandId::NewFile => {
                let parent = self.target_folder();
                self.host_request = Some(HostRequest::PromptNewFile { parent });
            }
            CommandId::NewFolder => {
                let parent = self.target_folder();
                self.host_request = Some(HostRequest::PromptNewFolder { parent });
            }
            CommandId::SaveFile => self.save_active().await,
            CommandId::OpenWorkspace => self.open_workspace().await,
            CommandId::ClearTerminal => self.terminal.output_mut().clear(),
            CommandId::ChangeTheme => {
                self.palette.enter_theme_mode();
                let result = self
                    .backend
                    .available_themes()
                    .await
                    .map_err(|e| e.to_string());
                self.palette.set_theme_list(result);
            }
        }
    }

    /// Apply and persist a theme choice.
    pub async fn apply_theme(&mut self, filename: &str) {
        self.current_theme = Some(filename.to_string());
        if let Err(e) = self.backend.save_theme(filename).await {
            self.set_alert(format!("Failed to save theme: {e}"));
            return;
        }
        let pretty = filename.trim_end_matches(".json").replace(['_', '-'], " ");
        self.set_status(format!("Theme changed to {pretty}"));
    }

    /// Folder that file-creation commands target: the active file's parent,
    /// or the workspace root.
    fn target_folder(&self) -> PathBuf {
        if let Some(active) = self.workspace.active() {
            if let Some(parent) = active.parent() {
                return parent.to_path_buf();
            }
        }
        self.workspace
            .tree
            .folder()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

// Workspace and file operations
impl<E: EditorComponent> Shell<E> {
    /// Ask the host for a workspace root and load its tree. A cancelled
    /// dialog changes nothing.
    pub async fn open_workspace(&mut self) {
        let folder = match self.backend.select_folder().await {
            Ok(Some(folder)) => folder,
            Ok(None) => return,
            Err(e) => {
                self.set_alert(format!("Failed to open workspace: {e}"));
                return;
            }
        };
        match self.backend.file_tree().await {
            Ok(tree) => {
                tracing::info!(folder = %folder.display(), "workspace opened");
                self.workspace.tree.load(tree);
                self.workspace.close_all();
                self.editor.clear();
            }
            Err(e) => self.set_alert(format!("Failed to read workspace: {e}")),
        }
    }

    /// Re-scan the tree, keeping collapse state.
    pub async fn refresh_tree(&mut self) {
        match self.backend.file_tree().await {
            Ok(tree) => self.workspace.tree.refresh(tree),
            Err(e) => self.set_alert(format!("Failed to refresh file tree: {e}")),
        }
    }

    /// Open a file into a tab, reading it unless already open.
    pub async fn open_file(&mut self, path: &Path) {
        if self.workspace.is_open(path) {
            self.switch_to(path);
            return;
        }
        match self.backend.read_file(path).await {
            Ok(content) => {
                self.stash_active_content();
                self.editor
                    .open_document(path, &content, language_for_path(path));
                self.workspace.open_tab(path.to_path_buf(), content);
            }
            Err(e) => self.set_alert(format!("Failed to open file: {e}")),
        }
    }

    /// Switch to an already open tab, stashing the outgoing editor text.
    pub fn switch_to(&mut self, path: &Path) {
        if !self.workspace.is_open(path) || self.workspace.active().map(|p| p.as_path()) == Some(path)
        {
            return;
        }
        self.stash_active_content();
        self.workspace.activate(path);
        if let Some(content) = self.workspace.content(path) {
            let content = content.to_string();
            self.editor
                .open_document(path, &content, language_for_path(path));
        }
    }

    /// Write the active document back through the backend.
    pub async fn save_active(&mut self) {
        let Some(path) = self.workspace.active().cloned() else {
            return;
        };
        let text = self.editor.text();
        match self.backend.save_file(&path, &text).await {
            Ok(()) => {
                self.workspace.store_content(&path, text);
                self.workspace.clear_dirty(&path);
                self.set_status("Saved");
            }
            Err(e) => self.set_alert(format!("Failed to save file: {e}")),
        }
    }

    /// Close a tab; absent paths are a no-op. Refreshes the editor with the
    /// newly active document, or clears it when none remain.
    pub fn close_tab(&mut self, path: &Path) {
        let was_active = self.workspace.active().map(|p| p.as_path()) == Some(path);
        if !self.workspace.close_tab(path) {
            return;
        }
        if was_active {
            match self.workspace.active().cloned() {
                Some(next) => {
                    if let Some(content) = self.workspace.content(&next) {
                        let content = content.to_string();
                        self.editor
                            .open_document(&next, &content, language_for_path(&next));
                    }
                }
                None => self.editor.clear(),
            }
        }
    }

    /// The editor reported an edit on the active document.
    pub fn on_editor_edited(&mut self) {
        self.workspace.mark_active_dirty();
    }

    /// Create a file under `parent` (a folder, or a file whose parent is
    /// used). Empty names are silently ignored.
    pub async fn new_file(&mut self, parent: &Path, name: &str) {
        if name.trim().is_empty() {
            return;
        }
        let parent = self.folder_target(parent);
        match self.backend.create_file(&parent, name).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "file created");
                self.refresh_tree().await;
            }
            Err(e) => self.set_alert(format!("Failed to create file: {e}")),
        }
    }

    /// Create a folder under `parent`. Empty names are silently ignored.
    pub async fn new_folder(&mut self, parent: &Path, name: &str) {
        if name.trim().is_empty() {
            return;
        }
        let parent = self.folder_target(parent);
        match self.backend.create_folder(&parent, name).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "folder created");
                self.refresh_tree().await;
            }
            Err(e) => self.set_alert(format!("Failed to create folder: {e}")),
        }
    }

    /// Rename an entry. Empty or unchanged names are a no-op. An open tab on
    /// the old path is closed (its cached content would be stale).
    pub async fn rename(&mut self, path: &Path, new_name: &str) {
        let new_name = new_name.trim();
        if new_name.is_empty() || path.file_name().and_then(|n| n.to_str()) == Some(new_name) {
            return;
        }
        match self.backend.rename_item(path, new_name).await {
            Ok(_) => {
                self.close_tab(path);
                self.refresh_tree().await;
            }
            Err(e) => self.set_alert(format!("Failed to rename: {e}")),
        }
    }

    /// Delete an entry, closing its tab if open.
    pub async fn delete(&mut self, path: &Path) {
        match self.backend.delete_item(path).await {
            Ok(()) => {
                self.close_tab(path);
                self.refresh_tree().await;
            }
            Err(e) => self.set_alert(format!("Failed to delete: {e}")),
        }
    }

    /// Reveal an entry in the platform file manager.
    pub async fn reveal(&mut self, path: &Path) {
        if let Err(e) = self.backend.reveal_item(path).await {
            self.set_alert(format!("Failed to reveal: {e}"));
        }
    }

    /// Absolute path string for the host clipboard.
    pub async fn copy_path(&mut self, path: &Path) -> Option<String> {
        match self.backend.full_path(path).await {
            Ok(full) => Some(full.to_string_lossy().into_owned()),
            Err(e) => {
                self.set_alert(format!("Failed to resolve path: {e}"));
                None
            }
        }
    }

    /// Workspace-relative path string for the host clipboard.
    pub fn copy_relative_path(&self, path: &Path) -> String {
        match self.workspace.tree.folder() {
            Some(folder) => path
                .strip_prefix(folder)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned(),
            None => path.to_string_lossy().into_owned(),
        }
    }

    /// Put an entry on the backend file clipboard.
    pub async fn copy(&mut self, path: &Path, kind: EntryKind) {
        match self.backend.copy_item(path, kind).await {
            Ok(name) => self.set_status(format!("Copied '{name}'")),
            Err(e) => self.set_alert(format!("Failed to copy: {e}")),
        }
    }

    /// Paste the clipboard entry into `target`.
    pub async fn paste(&mut self, target: &Path) {
        match self.backend.paste_item(target).await {
            Ok(name) => {
                self.set_status(format!("Pasted '{name}'"));
                self.refresh_tree().await;
            }
            Err(e) => self.set_alert(format!("Failed to paste: {e}")),
        }
    }

    /// Stash the live editor text for the outgoing active tab.
    fn stash_active_content(&mut self) {
        if let Some(active) = self.workspace.active().cloned() {
            self.workspace.store_content(&active, self.editor.text());
        }
    }

    /// File-creation targets use a file's parent directory.
    fn folder_target(&self, path: &Path) -> PathBuf {
        let is_known_file = self
            .workspace
            .tree
            .visible()
            .iter()
            .any(|(_, n)| n.path == path && n.is_file());
        if is_known_file || path.extension().is_some() {
            path.parent().unwrap_or(path).to_path_buf()
        } else {
            path.to_path_buf()
        }
    }
}
