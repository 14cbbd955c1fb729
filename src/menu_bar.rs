//! Main menu bar assembly.
//!
//! Provider items are merged into menus by name. `File` and `Edit` always
//! come first, menus introduced by providers follow in the order they first
//! appear, and the `Window` menu closes the bar.

use knowlayout_layout::{LayoutEnv, Menu, MenuCommand, MenuItem, RestoreSource};

use crate::services::ServiceRegistry;

pub const FILE_MENU: &str = "File";
pub const EDIT_MENU: &str = "Edit";
pub const WINDOW_MENU: &str = "Window";

/// Label of the window submenu listing stored windows.
pub const RESTORE_WINDOW_MENU: &str = "Restore window";
/// Label of the window submenu listing shared layouts.
pub const OPEN_LAYOUT_MENU: &str = "Open layout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuBar {
    menus: Vec<Menu>,
}

impl Default for MenuBar {
    fn default() -> Self {
        Self {
            menus: vec![Menu::new(FILE_MENU), Menu::new(EDIT_MENU)],
        }
    }
}

impl MenuBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every provider for its items, then append the window menu.
    pub fn build(services: &ServiceRegistry, env: &LayoutEnv) -> Self {
        let mut bar = Self::new();
        for provider in services.menu_providers() {
            for (menu_name, item) in provider.menu_items(env) {
                bar.add_item(&menu_name, item);
            }
        }
        for item in window_menu_items(services, env) {
            bar.add_item(WINDOW_MENU, item);
        }
        tracing::debug!(menus = ?bar.labels(), "built menu bar");
        bar
    }

    /// Append `item` to the menu named `menu_name`, creating it at the end
    /// of the bar when missing.
    pub fn add_item(&mut self, menu_name: &str, item: MenuItem) {
        match self.menus.iter_mut().find(|menu| menu.label == menu_name) {
            Some(menu) => menu.push(item),
            None => self.menus.push(Menu::with_items(menu_name, vec![item])),
        }
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn menu(&self, label: &str) -> Option<&Menu> {
        self.menus.iter().find(|menu| menu.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.menus.iter().map(|menu| menu.label.as_str()).collect()
    }

    pub fn commands(&self) -> Vec<&MenuCommand> {
        self.menus.iter().flat_map(|menu| menu.commands()).collect()
    }
}

fn window_menu_items(services: &ServiceRegistry, env: &LayoutEnv) -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = services
        .create_actions(env)
        .into_iter()
        .map(|action| {
            MenuItem::action(
                action.label,
                MenuCommand::NewWindow {
                    factory_tag: action.factory_tag,
                },
            )
        })
        .collect();

    let mut windows = Menu::new(RESTORE_WINDOW_MENU);
    let mut layouts = Menu::new(OPEN_LAYOUT_MENU);
    for action in services.restore_actions(env) {
        let path = action.node.path().to_string();
        match action.source {
            RestoreSource::Window => windows.push(MenuItem::action(
                action.label,
                MenuCommand::RestoreWindow { path },
            )),
            RestoreSource::SharedLayout => layouts.push(MenuItem::action(
                action.label,
                MenuCommand::RestoreLayout { path },
            )),
        }
    }

    let submenus: Vec<Menu> = [windows, layouts]
        .into_iter()
        .filter(|menu| !menu.items.is_empty())
        .collect();
    if !submenus.is_empty() && !items.is_empty() {
        items.push(MenuItem::Separator);
    }
    items.extend(submenus.into_iter().map(MenuItem::Submenu));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{FileMenuProvider, MenuProvider};
    use knowlayout_core::MemoryPreferences;
    use knowlayout_layout::{PreferencesFactory, SimpleWindowFactory, WindowFactory};
    use std::rc::Rc;

    struct HelpProvider;

    impl MenuProvider for HelpProvider {
        fn menu_items(&self, _env: &LayoutEnv) -> Vec<(String, MenuItem)> {
            vec![
                ("Help".to_string(), MenuItem::info("About")),
                ("Edit".to_string(), MenuItem::info("Preferences")),
            ]
        }
    }

    #[test]
    fn test_items_merge_by_menu_name() {
        let env = LayoutEnv::headless_cancelling(&MemoryPreferences::root()).unwrap();
        let services = ServiceRegistry::new()
            .with_menu_provider(Rc::new(FileMenuProvider))
            .with_menu_provider(Rc::new(HelpProvider));
        let bar = MenuBar::build(&services, &env);
        assert_eq!(bar.labels(), vec!["File", "Edit", "Help"]);
        assert_eq!(bar.menu("Edit").unwrap().items.len(), 1);
        assert_eq!(bar.commands(), vec![&MenuCommand::Quit]);
    }

    #[test]
    fn test_window_menu_lists_factories_and_stored_windows() {
        let env = LayoutEnv::headless_cancelling(&MemoryPreferences::root()).unwrap();
        let window = SimpleWindowFactory
            .create(&env, &PreferencesFactory::Under(env.windows.clone()))
            .unwrap();
        let bar = MenuBar::build(&ServiceRegistry::with_defaults(), &env);

        assert_eq!(bar.labels(), vec!["File", "Edit", "Window"]);
        let menu = bar.menu(WINDOW_MENU).unwrap();
        let restore = menu.submenu(RESTORE_WINDOW_MENU).unwrap();
        assert_eq!(
            restore.commands(),
            vec![&MenuCommand::RestoreWindow {
                path: window.blueprint().node().path().to_string()
            }]
        );
        assert!(menu.submenu(OPEN_LAYOUT_MENU).is_none());
        let new_windows = menu
            .items
            .iter()
            .filter(|item| matches!(item.command(), Some(MenuCommand::NewWindow { .. })))
            .count();
        assert_eq!(new_windows, 2);
    }
}
