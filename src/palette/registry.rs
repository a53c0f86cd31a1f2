//! Static command table
//!
//! The set of invokable actions is fixed at startup; dispatch is by
//! [`CommandId`] rather than stored closures so rows stay plain data and the
//! shell's `execute` owns all effects. Badges are computed at render time by
//! the shell, not stored here.

use once_cell::sync::Lazy;

/// Every invokable palette action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    ReloadWindow,
    ToggleDebugPanel,
    NewFile,
    NewFolder,
    SaveFile,
    OpenWorkspace,
    ClearTerminal,
    ChangeTheme,
}

/// Grouping bucket shown as a palette header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    File,
    Preferences,
    Terminal,
    View,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::File => "File",
            Category::Preferences => "Preferences",
            Category::Terminal => "Terminal",
            Category::View => "View",
        }
    }
}

/// One row of the command table
#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub id: CommandId,
    pub label: &'static str,
    pub category: Category,
    pub shortcut: Option<&'static str>,
}

static COMMANDS: Lazy<Vec<Command>> = Lazy::new(|| {
    vec![
        Command {
            id: CommandId::ReloadWindow,
            label: "Reload Window",
            category: Category::View,
            shortcut: Some("Ctrl+Shift+R"),
        },
        Command {
            id: CommandId::ToggleDebugPanel,
            label: "Toggle Debug Panel",
            category: Category::View,
            shortcut: None,
        },
        Command {
            id: CommandId::NewFile,
            label: "New File",
            category: Category::File,
            shortcut: None,
        },
        Command {
            id: CommandId::NewFolder,
            label: "New Folder",
            category: Category::File,
            shortcut: None,
        },
        Command {
            id: CommandId::SaveFile,
            label: "Save File",
            category: Category::File,
            shortcut: Some("Ctrl+S"),
        },
        Command {
            id: CommandId::OpenWorkspace,
            label: "Open Workspace",
            category: Category::File,
            shortcut: None,
        },
        Command {
            id: CommandId::ClearTerminal,
            label: "Clear Terminal",
            category: Category::Terminal,
            shortcut: None,
        },
        Command {
            id: CommandId::ChangeTheme,
            label: "Change Color Theme",
            category: Category::Preferences,
            shortcut: None,
        },
    ]
});

/// Commands matching `query`, grouped by category
#[derive(Debug)]
pub struct CommandGroup {
    pub category: Category,
    pub commands: Vec<&'static Command>,
}

/// Read-only view over the static command table
#[derive(Debug, Default)]
pub struct CommandRegistry;

impl CommandRegistry {
    pub fn all() -> &'static [Command] {
        &COMMANDS
    }

    /// Filter by case-insensitive substring match against label or category
    /// name, grouped by category. Categories come out lexicographically; the
    /// table's insertion order is preserved within each group.
    pub fn filter(query: &str) -> Vec<CommandGroup> {
        let needle = query.to_lowercase();
        let mut groups: Vec<CommandGroup> = Vec::new();

        for command in COMMANDS.iter() {
            let matches = needle.is_empty()
                || command.label.to_lowercase().contains(&needle)
                || command.category.name().to_lowercase().contains(&needle);
            if !matches {
                continue;
            }
            match groups.iter_mut().find(|g| g.category == command.category) {
                Some(group) => group.commands.push(command),
                None => groups.push(CommandGroup {
                    category: command.category,
                    commands: vec![command],
                }),
            }
        }

        groups.sort_by(|a, b| a.category.name().cmp(b.category.name()));
        groups
    }
}
