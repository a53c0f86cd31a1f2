//! Editor component seam
//!
//! The embedded text editor is an external collaborator; the shell only needs
//! three capabilities from it: load a document (content plus language mode),
//! read the current text back, and go blank. Hosts wrap their real editor
//! widget in [`EditorComponent`]; [`BufferEditor`] is the in-memory stand-in
//! for tests and headless embedders.

use std::path::Path;

/// Opaque capability surface of the embedded text editor
pub trait EditorComponent {
    /// Replace the editor content with `content`, switching the language
    /// mode for `path`.
    fn open_document(&mut self, path: &Path, content: &str, language: &str);

    /// Current document text.
    fn text(&self) -> String;

    /// Empty the editor (no document open).
    fn clear(&mut self);
}

/// In-memory editor for tests and headless hosts
#[derive(Debug, Default)]
pub struct BufferEditor {
    content: String,
    language: String,
}

impl BufferEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Language mode of the currently open document.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Simulate the user typing: replace the content without touching the
    /// language mode.
    pub fn set_text(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }
}

impl EditorComponent for BufferEditor {
    fn open_document(&mut self, _path: &Path, content: &str, language: &str) {
        self.content = content.to_string();
        self.language = language.to_string();
    }

    fn text(&self) -> String {
        self.content.clone()
    }

    fn clear(&mut self) {
        self.content.clear();
        self.language.clear();
    }
}

/// Language mode for a file path, derived from its extension.
pub fn language_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("js") | Some("jsx") => "javascript",
        Some("ts") | Some("tsx") => "typescript",
        Some("py") => "python",
        Some("html") => "html",
        Some("css") => "css",
        Some("json") => "json",
        Some("xml") => "xml",
        Some("java") => "java",
        Some("cpp") => "cpp",
        Some("c") => "c",
        Some("php") => "php",
        Some("rb") => "ruby",
        Some("go") => "go",
        Some("rs") => "rust",
        _ => "plaintext",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_language_for_path() {
        assert_eq!(language_for_path(Path::new("a/b/main.rs")), "rust");
        assert_eq!(language_for_path(Path::new("app.TSX")), "typescript");
        assert_eq!(language_for_path(Path::new("index.jsx")), "javascript");
        assert_eq!(language_for_path(Path::new("notes.txt")), "plaintext");
        assert_eq!(language_for_path(Path::new("Makefile")), "plaintext");
    }

    #[test]
    fn test_buffer_editor_roundtrip() {
        let mut editor = BufferEditor::new();
        editor.open_document(&PathBuf::from("x.py"), "print(1)", "python");
        assert_eq!(editor.text(), "print(1)");
        assert_eq!(editor.language(), "python");

        editor.set_text("print(2)");
        assert_eq!(editor.text(), "print(2)");
        assert_eq!(editor.language(), "python");

        editor.clear();
        assert_eq!(editor.text(), "");
        assert_eq!(editor.language(), "");
    }
}
