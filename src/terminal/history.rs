//! Submitted-command history
//!
//! Append-only list with a cursor ranging over `[0, len]`; `len` is the
//! "fresh input" position reached by arrowing past the newest entry. After
//! any navigation the input line equals the entry at the cursor, or the empty
//! string at the fresh-input position.

/// History of submitted terminal commands plus the navigation cursor
#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position (for testing); equals `len()` when no entry is
    /// selected.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Record a submission verbatim and reset the cursor to fresh input.
    pub fn record(&mut self, command: impl Into<String>) {
        self.entries.push(command.into());
        self.cursor = self.entries.len();
    }

    /// ArrowUp: step toward older entries.
    ///
    /// The cursor floors at 0, so holding the key at the top keeps yielding
    /// the oldest entry. Returns `None` only when the history is empty.
    pub fn previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        Some(&self.entries[self.cursor])
    }

    /// ArrowDown: step toward newer entries.
    ///
    /// Past the newest entry the cursor pins at `len` and `None` is returned;
    /// the caller clears the input line.
    pub fn next(&mut self) -> Option<&str> {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            Some(&self.entries[self.cursor])
        } else {
            self.cursor = self.entries.len();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_resets_cursor_past_the_end() {
        let mut history = CommandHistory::new();
        history.record("a");
        history.record("b");
        history.record("echo hi");

        assert_eq!(history.entries(), ["a", "b", "echo hi"]);
        assert_eq!(history.cursor(), 3);
    }

    #[test]
    fn test_previous_walks_back_from_most_recent() {
        let mut history = CommandHistory::new();
        history.record("a");
        history.record("b");
        history.record("echo hi");

        assert_eq!(history.previous(), Some("echo hi"));
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.previous(), Some("b"));
        assert_eq!(history.previous(), Some("a"));
    }

    #[test]
    fn test_previous_floors_at_oldest_entry() {
        let mut history = CommandHistory::new();
        history.record("only");

        assert_eq!(history.previous(), Some("only"));
        assert_eq!(history.previous(), Some("only"));
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_next_returns_to_fresh_input() {
        let mut history = CommandHistory::new();
        history.record("a");
        history.record("b");

        history.previous();
        history.previous();
        assert_eq!(history.next(), Some("b"));
        assert_eq!(history.next(), None);
        assert_eq!(history.cursor(), 2);
        // Pinned: further ArrowDown stays at fresh input
        assert_eq!(history.next(), None);
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn test_empty_history_navigation_is_inert() {
        let mut history = CommandHistory::new();
        assert_eq!(history.previous(), None);
        assert_eq!(history.next(), None);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_duplicates_are_recorded_verbatim() {
        let mut history = CommandHistory::new();
        history.record("ls");
        history.record("ls");
        assert_eq!(history.entries(), ["ls", "ls"]);
    }
}
