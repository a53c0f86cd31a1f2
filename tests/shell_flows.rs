//! Cross-module flows over a real local backend and a gated mock backend.
//!
//! The gated backend parks each `run_command` on a oneshot the test resolves
//! by hand, which is how the out-of-order completion window is driven.

mod common;

use async_trait::async_trait;
use atelier::backend::{CommandOutcome, EntryKind, HostBackend, ThemeInfo, WorkspaceTree};
use atelier::palette::{CommandId, PaletteAction, PaletteMode, PaletteRow};
use atelier::terminal::{LineKind, SessionState, Submission, TerminalLine, TerminalSession};
use atelier::{BufferEditor, EditorComponent, Focus, LocalBackend, Shell};
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::{oneshot, Mutex};

/// Backend whose `run_command` blocks until the test resolves its gate.
#[derive(Default)]
struct GatedBackend {
    gates: Mutex<HashMap<String, oneshot::Receiver<io::Result<CommandOutcome>>>>,
}

impl GatedBackend {
    /// Register a gate for `command`; the returned sender resolves it.
    async fn gate(&self, command: &str) -> oneshot::Sender<io::Result<CommandOutcome>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.insert(command.to_string(), rx);
        tx
    }
}

#[async_trait]
impl HostBackend for GatedBackend {
    async fn select_folder(&self) -> io::Result<Option<PathBuf>> {
        Ok(None)
    }
    async fn file_tree(&self) -> io::Result<WorkspaceTree> {
        Err(io::Error::other("not gated"))
    }
    async fn read_file(&self, _path: &Path) -> io::Result<String> {
        Err(io::Error::other("not gated"))
    }
    async fn save_file(&self, _path: &Path, _content: &str) -> io::Result<()> {
        Err(io::Error::other("not gated"))
    }
    async fn create_file(&self, _parent: &Path, _name: &str) -> io::Result<PathBuf> {
        Err(io::Error::other("not gated"))
    }
    async fn create_folder(&self, _parent: &Path, _name: &str) -> io::Result<PathBuf> {
        Err(io::Error::other("not gated"))
    }
    async fn rename_item(&self, _path: &Path, _new_name: &str) -> io::Result<PathBuf> {
        Err(io::Error::other("not gated"))
    }
    async fn delete_item(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::other("not gated"))
    }
    async fn reveal_item(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::other("not gated"))
    }
    async fn full_path(&self, _path: &Path) -> io::Result<PathBuf> {
        Err(io::Error::other("not gated"))
    }
    async fn copy_item(&self, _path: &Path, _kind: EntryKind) -> io::Result<String> {
        Err(io::Error::other("not gated"))
    }
    async fn paste_item(&self, _target: &Path) -> io::Result<String> {
        Err(io::Error::other("not gated"))
    }
    async fn run_command(&self, command: &str) -> io::Result<CommandOutcome> {
        let gate = self
            .gates
            .lock()
            .await
            .remove(command)
            .unwrap_or_else(|| panic!("no gate registered for '{command}'"));
        gate.await.map_err(|_| io::Error::other("gate dropped"))?
    }
    async fn saved_theme(&self) -> io::Result<Option<String>> {
        Ok(None)
    }
    async fn save_theme(&self, _filename: &str) -> io::Result<()> {
        Ok(())
    }
    async fn available_themes(&self) -> io::Result<Vec<ThemeInfo>> {
        Ok(Vec::new())
    }
}

async fn shell_over_temp() -> (TempDir, Shell<BufferEditor>) {
    common::tracing::init_tracing_from_env();
    let temp = TempDir::new().unwrap();
    let backend = LocalBackend::with_paths(
        Some(temp.path().join(".atelier").join("themes")),
        Some(temp.path().join(".atelier").join("config.json")),
    );
    backend.set_workspace(temp.path()).await;
    let mut shell = Shell::new(Arc::new(backend), BufferEditor::new());
    shell.init().await;
    shell.open_workspace().await;
    (temp, shell)
}

fn dispatched(submission: Submission) -> atelier::terminal::PendingCommand {
    match submission {
        Submission::Dispatched(pending) => pending,
        _ => panic!("expected a dispatched submission"),
    }
}

#[tokio::test]
async fn out_of_order_completions_render_in_completion_order() {
    common::tracing::init_tracing_from_env();
    let backend = Arc::new(GatedBackend::default());
    let first_gate = backend.gate("first").await;
    let second_gate = backend.gate("second").await;

    let mut session = TerminalSession::new(backend);
    session.set_input("first");
    let first = dispatched(session.submit());
    session.set_input("second");
    let second = dispatched(session.submit());
    assert_eq!(session.state(), SessionState::Submitting);

    // The later submission resolves first; nothing reorders the rendering.
    second_gate
        .send(Ok(CommandOutcome::default().with_output("from second\n")))
        .unwrap();
    let (seq, result) = second.await;
    session.complete(seq, result);

    first_gate
        .send(Ok(CommandOutcome::default().with_output("from first\n")))
        .unwrap();
    let (seq, result) = first.await;
    session.complete(seq, result);

    assert_eq!(session.state(), SessionState::Idle);
    let texts: Vec<&str> = session.output().lines().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, ["first", "second", "from second", "from first"]);
}

#[tokio::test]
async fn terminal_rejection_keeps_the_session_interactive() {
    common::tracing::init_tracing_from_env();
    let backend = Arc::new(GatedBackend::default());
    let doomed = backend.gate("doomed").await;
    let echo = backend.gate("echo ok").await;

    let mut session = TerminalSession::new(backend);
    session.set_input("doomed");
    let pending = dispatched(session.submit());
    doomed.send(Err(io::Error::other("host crashed"))).unwrap();
    let (seq, result) = pending.await;
    session.complete(seq, result);

    let errors: Vec<&TerminalLine> = session
        .output()
        .lines()
        .filter(|l| l.kind == LineKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].text.contains("host crashed"));

    // Next command goes straight through
    session.set_input("echo ok");
    let pending = dispatched(session.submit());
    echo.send(Ok(CommandOutcome::default().with_output("ok\n")))
        .unwrap();
    let (seq, result) = pending.await;
    session.complete(seq, result);
    assert_eq!(session.output().lines().last().unwrap().text, "ok");
}

#[cfg(unix)]
#[tokio::test]
async fn terminal_flow_over_a_real_shell() {
    let (_temp, mut shell) = shell_over_temp().await;

    shell.terminal.set_input("echo integration");
    shell
        .handle_key(KeyCode::Enter, KeyModifiers::NONE, Focus::Terminal)
        .await;

    let texts: Vec<&str> = shell
        .terminal
        .output()
        .lines()
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(texts, ["echo integration", "integration"]);

    // clear is a backend builtin resolving to an outcome that resets the log
    shell.terminal.set_input("clear");
    shell
        .handle_key(KeyCode::Enter, KeyModifiers::NONE, Focus::Terminal)
        .await;
    assert!(shell.terminal.output().is_empty());
}

#[tokio::test]
async fn palette_filter_execute_and_theme_switch() {
    let (temp, mut shell) = shell_over_temp().await;
    let themes_dir = temp.path().join(".atelier").join("themes");
    tokio::fs::create_dir_all(&themes_dir).await.unwrap();
    tokio::fs::write(themes_dir.join("gruvbox_dark.json"), "{}")
        .await
        .unwrap();

    // Open, type a query, run the selected command
    shell
        .handle_key(KeyCode::F(1), KeyModifiers::NONE, Focus::Editor)
        .await;
    for c in "theme".chars() {
        shell
            .handle_key(KeyCode::Char(c), KeyModifiers::NONE, Focus::Editor)
            .await;
    }
    assert_eq!(
        shell.palette.selected_action(),
        Some(PaletteAction::Run(CommandId::ChangeTheme))
    );
    shell
        .handle_key(KeyCode::Enter, KeyModifiers::NONE, Focus::Editor)
        .await;

    // The action reopened the palette in theme mode with the fetched list
    assert!(shell.palette.is_open());
    assert_eq!(shell.palette.mode(), PaletteMode::Themes);
    assert_eq!(shell.palette.item_count(), 2);

    // Select the non-default theme and apply it
    for c in "gruv".chars() {
        shell
            .handle_key(KeyCode::Char(c), KeyModifiers::NONE, Focus::Editor)
            .await;
    }
    assert_eq!(shell.palette.item_count(), 1);
    shell
        .handle_key(KeyCode::Enter, KeyModifiers::NONE, Focus::Editor)
        .await;

    assert!(!shell.palette.is_open());
    assert_eq!(shell.current_theme(), Some("gruvbox_dark.json"));
    assert_eq!(
        shell.take_status(),
        Some("Theme changed to gruvbox dark".to_string())
    );

    // The choice survives a fresh shell over the same config
    let backend = LocalBackend::with_paths(
        Some(temp.path().join(".atelier").join("themes")),
        Some(temp.path().join(".atelier").join("config.json")),
    );
    let mut fresh = Shell::new(Arc::new(backend), BufferEditor::new());
    fresh.init().await;
    assert_eq!(fresh.current_theme(), Some("gruvbox_dark.json"));
}

#[tokio::test]
async fn palette_reopen_resets_after_theme_mode() {
    let (_temp, mut shell) = shell_over_temp().await;

    shell.execute(CommandId::ChangeTheme).await;
    assert_eq!(shell.palette.mode(), PaletteMode::Themes);
    shell
        .handle_key(KeyCode::Down, KeyModifiers::NONE, Focus::Editor)
        .await;
    shell
        .handle_key(KeyCode::Esc, KeyModifiers::NONE, Focus::Editor)
        .await;

    shell
        .handle_key(KeyCode::F(1), KeyModifiers::NONE, Focus::Editor)
        .await;
    assert_eq!(shell.palette.mode(), PaletteMode::Commands);
    assert_eq!(shell.palette.selected(), 0);
    assert_eq!(shell.palette.query(), "");
}

#[tokio::test]
async fn palette_rows_carry_headers_and_badges() {
    let (_temp, mut shell) = shell_over_temp().await;
    shell.execute(CommandId::ToggleDebugPanel).await;

    shell
        .handle_key(KeyCode::F(1), KeyModifiers::NONE, Focus::Editor)
        .await;
    let rows = shell.palette_rows();

    assert!(matches!(&rows[0], PaletteRow::Header(name) if name == "File"));
    let debug_row = rows
        .iter()
        .find_map(|r| match r {
            PaletteRow::Item(item) if item.label == "Toggle Debug Panel" => Some(item),
            _ => None,
        })
        .unwrap();
    assert_eq!(debug_row.badges[0].text, "ON");
}

#[tokio::test]
async fn workspace_open_edit_save_end_to_end() {
    let (temp, mut shell) = shell_over_temp().await;
    let src = temp.path().join("src");
    tokio::fs::create_dir_all(&src).await.unwrap();
    tokio::fs::write(src.join("main.rs"), "fn main() {}\n")
        .await
        .unwrap();

    shell.open_workspace().await;
    let visible: Vec<&str> = shell
        .workspace
        .tree
        .visible()
        .iter()
        .map(|(_, n)| n.name.as_str())
        .collect();
    // Folders come collapsed; only the root entries show
    assert!(visible.contains(&"src"));
    assert!(!visible.contains(&"main.rs"));

    shell.workspace.tree.toggle(&src);
    let path = src.join("main.rs");
    shell.open_file(&path).await;
    assert_eq!(shell.editor.text(), "fn main() {}\n");
    assert_eq!(shell.editor.language(), "rust");

    shell.editor.set_text("fn main() { run() }\n");
    shell.on_editor_edited();
    assert!(shell.workspace.is_dirty(&path));

    shell
        .handle_key(KeyCode::Char('s'), KeyModifiers::CONTROL, Focus::Editor)
        .await;
    assert_eq!(shell.take_status(), Some("Saved".to_string()));
    assert_eq!(
        tokio::fs::read_to_string(&path).await.unwrap(),
        "fn main() { run() }\n"
    );
}
