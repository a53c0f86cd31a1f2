//! atelier-shell: embeddable front-end shell for a desktop code editor
//!
//! The crate is the state layer a host drives: a workspace file tree with
//! tabbed open files, a line-oriented terminal panel, a command palette with
//! a theme picker, and theme persistence, all over an asynchronous
//! [`HostBackend`](backend::HostBackend) capability surface. Rendering and
//! the embedded text-editing widget are the host's, reached through the
//! [`EditorComponent`](editor::EditorComponent) seam.
//!
//! Everything hangs off one [`Shell`](shell::Shell) instance constructed at
//! UI init; hosts route key events and editor change notifications into it
//! and render from its accessors.

pub mod backend;
pub mod config;
pub mod editor;
pub mod logging;
pub mod palette;
pub mod shell;
pub mod terminal;
pub mod workspace;

pub use backend::{HostBackend, LocalBackend};
pub use editor::{BufferEditor, EditorComponent};
pub use shell::{Focus, HostRequest, Shell};
