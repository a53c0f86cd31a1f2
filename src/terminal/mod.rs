//! Terminal session state machine
//!
//! One input line over the bounded output log. Submission is split-phase so
//! request lifetimes stay explicit: `submit` synchronously echoes, records
//! history, and hands back a [`PendingCommand`] holding the backend future;
//! the host awaits it and feeds the result to `complete`, which renders and
//! returns the session to idle. Nothing serializes overlapping submissions,
//! so two rapid commands may render results out of submission order if the
//! backend resolves them that way (kept as observed behavior, covered by an
//! integration test rather than patched).

pub mod history;
pub mod output;

pub use history::CommandHistory;
pub use output::{LineKind, OutputBuffer, OutputView, TerminalLine, MAX_LINES};

use crate::backend::{CommandOutcome, HostBackend};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Command string handled entirely client-side, never sent to the backend.
pub const DEBUG_PANEL_COMMAND: &str = "devtools";

/// Coarse session state, derived from the in-flight request count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting,
}

/// Outcome of one `submit` call
pub enum Submission {
    /// Input was empty after trimming; nothing happened.
    Ignored,
    /// A client-side literal was handled locally; nothing was dispatched.
    Intercepted,
    /// A backend request is in flight; await it and pass the result to
    /// [`TerminalSession::complete`].
    Dispatched(PendingCommand),
}

/// Handle for one in-flight `run_command` request
///
/// Resolves to `(seq, result)` so the host can hand the pair straight to
/// [`TerminalSession::complete`]. Holding several handles and awaiting them
/// in any order is what makes the out-of-order window observable.
pub struct PendingCommand {
    seq: u64,
    future: Pin<Box<dyn Future<Output = io::Result<CommandOutcome>> + Send>>,
}

impl PendingCommand {
    /// Submission sequence number, monotonically increasing per session.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Future for PendingCommand {
    type Output = (u64, io::Result<CommandOutcome>);

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let seq = self.seq;
        self.future.as_mut().poll(cx).map(|result| (seq, result))
    }
}

impl std::fmt::Debug for PendingCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCommand").field("seq", &self.seq).finish()
    }
}

/// The terminal panel: input line, output log, history, prompt indicator
pub struct TerminalSession {
    backend: Arc<dyn HostBackend>,
    input: String,
    output: OutputBuffer,
    history: CommandHistory,
    cwd: Option<PathBuf>,
    debug_panel: bool,
    in_flight: usize,
    next_seq: AtomicU64,
}

impl TerminalSession {
    pub fn new(backend: Arc<dyn HostBackend>) -> Self {
        Self {
            backend,
            input: String::new(),
            output: OutputBuffer::new(),
            history: CommandHistory::new(),
            cwd: None,
            debug_panel: false,
            in_flight: 0,
            next_seq: AtomicU64::new(1),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.in_flight > 0 {
            SessionState::Submitting
        } else {
            SessionState::Idle
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut OutputBuffer {
        &mut self.output
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Working directory shown in the prompt, once a completion reported one.
    pub fn cwd(&self) -> Option<&PathBuf> {
        self.cwd.as_ref()
    }

    /// Local display flag toggled by the intercepted literal.
    pub fn debug_panel(&self) -> bool {
        self.debug_panel
    }

    /// Toggle the debug panel flag, returning the new value.
    pub fn toggle_debug_panel(&mut self) -> bool {
        self.debug_panel = !self.debug_panel;
        self.debug_panel
    }

    /// Phase one of submission: echo, record, dispatch.
    ///
    /// Empty-after-trim input is ignored with no state change. The
    /// [`DEBUG_PANEL_COMMAND`] literal is intercepted before dispatch:
    /// echoed and recorded like any command, but handled locally. Anything
    /// else is echoed as a command line, recorded, and turned into a
    /// [`PendingCommand`] the host awaits.
    pub fn submit(&mut self) -> Submission {
        let command = self.input.trim().to_string();
        if command.is_empty() {
            return Submission::Ignored;
        }

        self.output.push(TerminalLine::command(&command));
        self.history.record(&command);
        self.input.clear();

        if command == DEBUG_PANEL_COMMAND {
            let on = self.toggle_debug_panel();
            tracing::info!(on, "debug panel toggled from terminal");
            return Submission::Intercepted;
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.in_flight += 1;
        tracing::info!(seq, %command, "terminal command dispatched");

        // The future owns its backend handle; no borrow of the session is
        // held across the await.
        let backend = self.backend.clone();
        let future = Box::pin(async move { backend.run_command(&command).await });
        Submission::Dispatched(PendingCommand { seq, future })
    }

    /// Phase three: render one resolved request.
    ///
    /// Failures become exactly one error line; the session is ready for the
    /// next command either way.
    pub fn complete(&mut self, seq: u64, result: io::Result<CommandOutcome>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(outcome) => {
                tracing::debug!(seq, "terminal command completed");
                if outcome.clear {
                    self.output.clear();
                    return;
                }
                if let Some(text) = &outcome.output {
                    let kind = if outcome.exit_failure {
                        LineKind::Error
                    } else {
                        LineKind::Output
                    };
                    self.output.push_chunk(text, kind);
                }
                if let Some(text) = &outcome.stderr {
                    self.output.push_chunk(text, LineKind::Error);
                }
                if let Some(cwd) = outcome.cwd {
                    self.cwd = Some(cwd);
                }
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "terminal command failed");
                self.output.push(TerminalLine::error(format!("Error: {e}")));
            }
        }
    }

    /// Drive all three phases for hosts that don't interleave submissions.
    pub async fn run(&mut self) -> SessionState {
        if let Submission::Dispatched(pending) = self.submit() {
            let (seq, result) = pending.await;
            self.complete(seq, result);
        }
        self.state()
    }

    /// ArrowUp: replace the input line with the previous history entry.
    pub fn history_previous(&mut self) {
        if let Some(entry) = self.history.previous() {
            self.input = entry.to_string();
        }
    }

    /// ArrowDown: replace the input line with the next history entry, or
    /// clear it when walking past the newest.
    pub fn history_next(&mut self) {
        match self.history.next() {
            Some(entry) => self.input = entry.to_string(),
            None => self.input.clear(),
        }
    }
}

impl std::fmt::Debug for TerminalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSession")
            .field("state", &self.state())
            .field("input", &self.input)
            .field("lines", &self.output.len())
            .field("history_len", &self.history.len())
            .field("debug_panel", &self.debug_panel)
            .finish()
    }
}
