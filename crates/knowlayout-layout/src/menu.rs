//! Toolkit-neutral menu model.

use knowlayout_core::CoordinateChange;

/// What selecting a menu item does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    NewWindow { factory_tag: String },
    /// Restore the window stored at `path`.
    RestoreWindow { path: String },
    /// Open a copy of the shared layout stored at `path`.
    RestoreLayout { path: String },
    ChangeView(CoordinateChange),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Action { label: String, command: MenuCommand },
    Check {
        label: String,
        checked: bool,
        command: MenuCommand,
    },
    /// Disabled text line.
    Info { label: String },
    Separator,
    Submenu(Menu),
}

impl MenuItem {
    pub fn action(label: impl Into<String>, command: MenuCommand) -> Self {
        MenuItem::Action {
            label: label.into(),
            command,
        }
    }

    pub fn check(label: impl Into<String>, checked: bool, command: MenuCommand) -> Self {
        MenuItem::Check {
            label: label.into(),
            checked,
            command,
        }
    }

    pub fn info(label: impl Into<String>) -> Self {
        MenuItem::Info {
            label: label.into(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            MenuItem::Action { label, .. }
            | MenuItem::Check { label, .. }
            | MenuItem::Info { label } => Some(label),
            MenuItem::Submenu(menu) => Some(&menu.label),
            MenuItem::Separator => None,
        }
    }

    pub fn command(&self) -> Option<&MenuCommand> {
        match self {
            MenuItem::Action { command, .. } | MenuItem::Check { command, .. } => Some(command),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Menu {
    pub label: String,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            items: Vec::new(),
        }
    }

    pub fn with_items(label: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            label: label.into(),
            items,
        }
    }

    pub fn push(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    /// Direct submenu with the given label
    pub fn submenu(&self, label: &str) -> Option<&Menu> {
        self.items.iter().find_map(|item| match item {
            MenuItem::Submenu(menu) if menu.label == label => Some(menu),
            _ => None,
        })
    }

    /// Every command reachable from this menu, depth-first
    pub fn commands(&self) -> Vec<&MenuCommand> {
        let mut commands = Vec::new();
        for item in &self.items {
            match item {
                MenuItem::Submenu(menu) => commands.extend(menu.commands()),
                other => commands.extend(other.command()),
            }
        }
        commands
    }
}
