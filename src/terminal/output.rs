//! Bounded terminal output log
//!
//! Append-only except for FIFO eviction at the head once the 500-line cap is
//! reached. The buffer drives an optional [`OutputView`] sink in the same call
//! that mutates it, so a host's rendered list can never drift from the logical
//! state in count or order.

use std::collections::VecDeque;

/// Maximum number of retained terminal lines.
pub const MAX_LINES: usize = 500;

/// Render class of one terminal line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Echo of a submitted command
    Command,
    /// Standard output
    Output,
    /// Standard error or a failure report
    Error,
}

/// One immutable line of the terminal log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub text: String,
    pub kind: LineKind,
}

impl TerminalLine {
    pub fn command(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Command,
        }
    }

    pub fn output(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Output,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Error,
        }
    }
}

/// Rendered-side mirror of the buffer
///
/// Callbacks fire inside the mutating call, one per logical change, so the
/// view applies exactly the same edits in exactly the same order.
pub trait OutputView {
    /// A line was appended at the tail.
    fn appended(&mut self, line: &TerminalLine);
    /// `count` lines were evicted from the head.
    fn evicted(&mut self, count: usize);
    /// The whole log was cleared.
    fn cleared(&mut self);
}

/// Capacity-bounded FIFO log of terminal lines
#[derive(Default)]
pub struct OutputBuffer {
    lines: VecDeque<TerminalLine>,
    view: Option<Box<dyn OutputView>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the rendered-side sink. At most one view; attaching replaces.
    pub fn set_view(&mut self, view: Box<dyn OutputView>) {
        self.view = Some(view);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &TerminalLine> {
        self.lines.iter()
    }

    /// Append one line, evicting from the head if the cap is exceeded.
    pub fn push(&mut self, line: TerminalLine) {
        self.lines.push_back(line);
        if let Some(view) = &mut self.view {
            // Safe: push_back above guarantees back() is Some
            view.appended(self.lines.back().unwrap());
        }
        self.trim();
    }

    /// Split `text` on `\n` and append one line per segment.
    ///
    /// A trailing empty segment from a terminal newline is dropped, so
    /// `"a\nb\n"` and `"a\nb"` both yield two lines; interior empty segments
    /// are kept.
    pub fn push_chunk(&mut self, text: &str, kind: LineKind) {
        let mut segments: Vec<&str> = text.split('\n').collect();
        if segments.last() == Some(&"") {
            segments.pop();
        }
        for segment in segments {
            self.push(TerminalLine {
                text: segment.to_string(),
                kind,
            });
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        if let Some(view) = &mut self.view {
            view.cleared();
        }
    }

    fn trim(&mut self) {
        let excess = self.lines.len().saturating_sub(MAX_LINES);
        if excess == 0 {
            return;
        }
        for _ in 0..excess {
            self.lines.pop_front();
        }
        if let Some(view) = &mut self.view {
            view.evicted(excess);
        }
    }
}

impl std::fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("lines", &self.lines)
            .field("has_view", &self.view.is_some())
            .finish()
    }
}
