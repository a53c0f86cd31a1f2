//! Command palette
//!
//! Modal overlay over the static command table, with a second mode listing
//! themes fetched from the backend. The palette owns its UI state (mode,
//! query, selection) and produces flattened rows for the host to render;
//! executing a selection is the shell's job, reached through
//! [`PaletteAction`].
//!
//! Opening never resumes a previous session: mode, query, and selection all
//! reset. Closing always happens before an action runs, so an action may
//! reopen the palette in another mode (`Change Color Theme` does exactly
//! that).

pub mod registry;

pub use registry::{Category, Command, CommandGroup, CommandId, CommandRegistry};

use crate::backend::ThemeInfo;

/// What the palette is currently listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteMode {
    Commands,
    Themes,
}

/// Lifecycle of the asynchronously fetched theme list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeListState {
    /// Fetch issued, nothing to show yet
    Loading,
    Loaded(Vec<ThemeInfo>),
    Failed(String),
}

/// Render-time annotation on a palette item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub dimmed: bool,
}

impl Badge {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dimmed: false,
        }
    }

    pub fn dimmed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dimmed: true,
        }
    }
}

/// What invoking a palette item does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteAction {
    Run(CommandId),
    ApplyTheme(ThemeInfo),
}

/// One selectable row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteItem {
    pub action: PaletteAction,
    pub label: String,
    pub shortcut: Option<String>,
    pub badges: Vec<Badge>,
}

/// One rendered row of the open palette
///
/// Headers and notices are not selectable and consume no selection index.
/// The notice variants keep "no matches", "still loading", and "fetch
/// failed" distinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteRow {
    Header(String),
    Item(PaletteItem),
    NoMatches(String),
    Loading,
    Failed(String),
}

/// Modal command/theme overlay state
#[derive(Debug)]
pub struct CommandPalette {
    open: bool,
    mode: PaletteMode,
    query: String,
    selected: usize,
    themes: ThemeListState,
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self {
            open: false,
            mode: PaletteMode::Commands,
            query: String::new(),
            selected: 0,
            themes: ThemeListState::Loading,
        }
    }
}

impl CommandPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> PaletteMode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn theme_list(&self) -> &ThemeListState {
        &self.themes
    }

    /// Open in command mode with a fresh query and selection, regardless of
    /// how the previous session ended.
    pub fn open(&mut self) {
        self.open = true;
        self.mode = PaletteMode::Commands;
        self.query.clear();
        self.selected = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Switch to theme mode with a fresh query; the caller fetches the list
    /// and reports it via [`set_theme_list`](Self::set_theme_list).
    pub fn enter_theme_mode(&mut self) {
        self.open = true;
        self.mode = PaletteMode::Themes;
        self.query.clear();
        self.selected = 0;
        self.themes = ThemeListState::Loading;
    }

    /// Deliver the theme fetch result.
    pub fn set_theme_list(&mut self, result: Result<Vec<ThemeInfo>, String>) {
        self.themes = match result {
            Ok(themes) => ThemeListState::Loaded(themes),
            Err(reason) => ThemeListState::Failed(reason),
        };
        self.clamp_selection();
    }

    /// Replace the query; any edit resets the selection to the top.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.selected = 0;
    }

    /// Backspace on an already-empty query pops theme mode back to command
    /// mode (one level deep, not a general back-stack). Returns true when
    /// the mode reverted.
    pub fn backspace_on_empty(&mut self) -> bool {
        if self.mode == PaletteMode::Themes && self.query.is_empty() {
            self.mode = PaletteMode::Commands;
            self.selected = 0;
            true
        } else {
            false
        }
    }

    /// ArrowDown: move the selection down, clamped to the last item.
    pub fn select_next(&mut self) {
        let count = self.item_count();
        if count > 0 && self.selected + 1 < count {
            self.selected += 1;
        }
    }

    /// ArrowUp: move the selection up, clamped to the first item.
    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Mouse hover: jump the selection straight to `index` if it exists.
    pub fn select(&mut self, index: usize) {
        if index < self.item_count() {
            self.selected = index;
        }
    }

    /// Action bound to the currently selected item, if any item is visible.
    pub fn selected_action(&self) -> Option<PaletteAction> {
        self.visible_actions().into_iter().nth(self.selected)
    }

    /// Action at an arbitrary index (mouse click).
    pub fn action_at(&self, index: usize) -> Option<PaletteAction> {
        self.visible_actions().into_iter().nth(index)
    }

    /// Number of selectable items under the current query and mode.
    pub fn item_count(&self) -> usize {
        match self.mode {
            PaletteMode::Commands => CommandRegistry::filter(&self.query)
                .iter()
                .map(|g| g.commands.len())
                .sum(),
            PaletteMode::Themes => self.filtered_themes().len(),
        }
    }

    /// Flattened rows for the host to render.
    ///
    /// `command_badge` supplies render-time badges for command rows (e.g. the
    /// debug panel ON/OFF indicator); `current_theme` marks the active theme.
    pub fn rows<F>(&self, command_badge: F, current_theme: Option<&str>) -> Vec<PaletteRow>
    where
        F: Fn(CommandId) -> Option<Badge>,
    {
        match self.mode {
            PaletteMode::Commands => self.command_rows(command_badge),
            PaletteMode::Themes => self.theme_rows(current_theme),
        }
    }

    fn command_rows<F>(&self, command_badge: F) -> Vec<PaletteRow>
    where
        F: Fn(CommandId) -> Option<Badge>,
    {
        let groups = CommandRegistry::filter(&self.query);
        if groups.is_empty() {
            return vec![PaletteRow::NoMatches("No matching commands".to_string())];
        }

        let mut rows = Vec::new();
        for group in groups {
            rows.push(PaletteRow::Header(group.category.name().to_string()));
            for command in group.commands {
                rows.push(PaletteRow::Item(PaletteItem {
                    action: PaletteAction::Run(command.id),
                    label: command.label.to_string(),
                    shortcut: command.shortcut.map(str::to_string),
                    badges: command_badge(command.id).into_iter().collect(),
                }));
            }
        }
        rows
    }

    fn theme_rows(&self, current_theme: Option<&str>) -> Vec<PaletteRow> {
        match &self.themes {
            ThemeListState::Loading => vec![PaletteRow::Loading],
            ThemeListState::Failed(reason) => vec![PaletteRow::Failed(reason.clone())],
            ThemeListState::Loaded(_) => {
                let themes = self.filtered_themes();
                if themes.is_empty() {
                    return vec![PaletteRow::NoMatches("No matching themes".to_string())];
                }
                themes
                    .into_iter()
                    .map(|theme| {
                        let mut badges = Vec::new();
                        if current_theme == Some(theme.filename.as_str()) {
                            badges.push(Badge::new("ACTIVE"));
                        }
                        if theme.is_default {
                            badges.push(Badge::dimmed("DEFAULT"));
                        }
                        PaletteRow::Item(PaletteItem {
                            action: PaletteAction::ApplyTheme(theme.clone()),
                            label: theme.display_name.clone(),
                            shortcut: None,
                            badges,
                        })
                    })
                    .collect()
            }
        }
    }

    fn filtered_themes(&self) -> Vec<&ThemeInfo> {
        let ThemeListState::Loaded(themes) = &self.themes else {
            return Vec::new();
        };
        let needle = self.query.to_lowercase();
        themes
            .iter()
            .filter(|t| {
                needle.is_empty()
                    || t.display_name.to_lowercase().contains(&needle)
                    || t.filename.to_lowercase().contains(&needle)
            })
            .collect()
    }

    fn visible_actions(&self) -> Vec<PaletteAction> {
        match self.mode {
            PaletteMode::Commands => CommandRegistry::filter(&self.query)
                .iter()
                .flat_map(|g| g.commands.iter())
                .map(|c| PaletteAction::Run(c.id))
                .collect(),
            PaletteMode::Themes => self
                .filtered_themes()
                .into_iter()
                .map(|t| PaletteAction::ApplyTheme(t.clone()))
                .collect(),
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.item_count();
        if count == 0 {
            self.selected = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
        }
    }
}
