//! View menus built by parallel tasks.
//!
//! Each section of a view menu is produced by one [`ViewMenuTask`] that
//! carries the coordinate and calculator it describes. The tasks run on the
//! tokio blocking pool and are joined before the menu is assembled, so the
//! menu never mixes sections derived from different coordinates.

use std::sync::Arc;

use knowlayout_core::coordinate::{CLASSIFIERS, LANGUAGES, STAMP_PATHS};
use knowlayout_core::{CoordinateChange, PremiseType, StatusSet, ViewCalculator, ViewCoordinate};
use tokio::runtime::Handle;

use crate::error::{LayoutError, LayoutResult};
use crate::menu::{Menu, MenuCommand, MenuItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSection {
    Stamp,
    Language,
    Logic,
    Navigation,
    View,
}

impl MenuSection {
    pub const ALL: [MenuSection; 5] = [
        MenuSection::Stamp,
        MenuSection::Language,
        MenuSection::Logic,
        MenuSection::Navigation,
        MenuSection::View,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            MenuSection::Stamp => "Stamp",
            MenuSection::Language => "Language",
            MenuSection::Logic => "Logic",
            MenuSection::Navigation => "Navigation",
            MenuSection::View => "View",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Items for coordinate fields that differ from the defaults.
    Overrides,
    /// Read-only description of one section.
    State(MenuSection),
    /// Choices that edit one section.
    Change(MenuSection),
}

/// One unit of view menu work with its inputs passed explicitly.
#[derive(Debug, Clone)]
pub struct ViewMenuTask {
    pub kind: TaskKind,
    pub coordinate: ViewCoordinate,
    pub calculator: Arc<ViewCalculator>,
}

impl ViewMenuTask {
    pub fn new(
        kind: TaskKind,
        coordinate: ViewCoordinate,
        calculator: Arc<ViewCalculator>,
    ) -> Self {
        Self {
            kind,
            coordinate,
            calculator,
        }
    }

    pub fn run(&self) -> LayoutResult<Vec<MenuItem>> {
        if self.calculator.coordinate() != &self.coordinate {
            return Err(LayoutError::MenuTask(format!(
                "{:?} task got a calculator for another coordinate",
                self.kind
            )));
        }
        Ok(match self.kind {
            TaskKind::Overrides => self.overrides(),
            TaskKind::State(section) => vec![MenuItem::Submenu(self.state(section))],
            TaskKind::Change(section) => vec![MenuItem::Submenu(self.change(section))],
        })
    }

    fn overrides(&self) -> Vec<MenuItem> {
        let defaults = ViewCoordinate::default();
        let coordinate = &self.coordinate;
        let mut items = Vec::new();
        if coordinate.stamp != defaults.stamp {
            items.push(MenuItem::info(format!(
                "Stamp override: {}",
                self.calculator.stamp_summary()
            )));
        }
        if coordinate.language != defaults.language {
            items.push(MenuItem::info(format!(
                "Language override: {}",
                self.calculator.language_summary()
            )));
        }
        if coordinate.logic != defaults.logic {
            items.push(MenuItem::info(format!(
                "Logic override: {}",
                self.calculator.logic_summary()
            )));
        }
        if coordinate.navigation != defaults.navigation {
            items.push(MenuItem::info(format!(
                "Navigation override: {}",
                self.calculator.navigation_summary()
            )));
        }
        if !items.is_empty() {
            items.push(MenuItem::action(
                "Reset overrides",
                MenuCommand::ChangeView(CoordinateChange::Reset),
            ));
        }
        items
    }

    fn state(&self, section: MenuSection) -> Menu {
        let summary = match section {
            MenuSection::Stamp => self.calculator.stamp_summary(),
            MenuSection::Language => self.calculator.language_summary(),
            MenuSection::Logic => self.calculator.logic_summary(),
            MenuSection::Navigation => self.calculator.navigation_summary(),
            MenuSection::View => self.calculator.summary(),
        };
        Menu::with_items(section.title(), vec![MenuItem::info(summary)])
    }

    fn change(&self, section: MenuSection) -> Menu {
        let coordinate = &self.coordinate;
        let change = MenuCommand::ChangeView;
        let items = match section {
            MenuSection::Stamp => {
                let mut items: Vec<MenuItem> = STAMP_PATHS
                    .iter()
                    .map(|path| {
                        MenuItem::check(
                            *path,
                            coordinate.stamp.path == *path,
                            change(CoordinateChange::StampPath(path.to_string())),
                        )
                    })
                    .collect();
                items.push(MenuItem::Separator);
                items.extend([StatusSet::Active, StatusSet::ActiveAndInactive].map(|states| {
                    MenuItem::check(
                        states.to_string(),
                        coordinate.stamp.allowed_states == states,
                        change(CoordinateChange::AllowedStates(states)),
                    )
                }));
                items
            }
            MenuSection::Language => LANGUAGES
                .iter()
                .map(|language| {
                    MenuItem::check(
                        *language,
                        coordinate.language.language == *language,
                        change(CoordinateChange::Language(language.to_string())),
                    )
                })
                .collect(),
            MenuSection::Logic => {
                let mut items: Vec<MenuItem> = CLASSIFIERS
                    .iter()
                    .map(|classifier| {
                        MenuItem::check(
                            *classifier,
                            coordinate.logic.classifier == *classifier,
                            change(CoordinateChange::Classifier(classifier.to_string())),
                        )
                    })
                    .collect();
                items.push(MenuItem::Separator);
                items.extend(PREMISES.map(|premise| {
                    MenuItem::check(
                        premise.to_string(),
                        coordinate.logic.premise == premise,
                        change(CoordinateChange::LogicPremise(premise)),
                    )
                }));
                items
            }
            MenuSection::Navigation => {
                let mut items: Vec<MenuItem> = PREMISES
                    .map(|premise| {
                        MenuItem::check(
                            premise.to_string(),
                            coordinate.navigation.premise == premise,
                            change(CoordinateChange::NavigationPremise(premise)),
                        )
                    })
                    .to_vec();
                let sorted = coordinate.navigation.sort_vertices;
                items.push(MenuItem::check(
                    "Sort vertices",
                    sorted,
                    change(CoordinateChange::SortVertices(!sorted)),
                ));
                items
            }
            MenuSection::View => vec![MenuItem::action(
                "Reset view",
                change(CoordinateChange::Reset),
            )],
        };
        Menu::with_items(format!("Change {}", section.title().to_lowercase()), items)
    }
}

const PREMISES: [PremiseType; 2] = [PremiseType::Stated, PremiseType::Inferred];

/// Builds view menus on the tokio blocking pool.
#[derive(Debug, Clone)]
pub struct ViewMenuFactory {
    runtime: Handle,
}

impl ViewMenuFactory {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// The tasks making up one menu, in assembly order
    pub fn tasks(
        coordinate: &ViewCoordinate,
        calculator: &Arc<ViewCalculator>,
    ) -> Vec<ViewMenuTask> {
        let task = |kind| ViewMenuTask::new(kind, coordinate.clone(), calculator.clone());
        let mut tasks = vec![task(TaskKind::Overrides)];
        tasks.extend(MenuSection::ALL.map(|section| task(TaskKind::State(section))));
        tasks.extend(MenuSection::ALL.map(|section| task(TaskKind::Change(section))));
        tasks
    }

    /// Fork every task, join them all, then assemble the menu.
    ///
    /// Any failing or panicking task fails the whole menu.
    pub async fn create(
        &self,
        coordinate: ViewCoordinate,
        calculator: Arc<ViewCalculator>,
    ) -> LayoutResult<Menu> {
        let handles: Vec<_> = Self::tasks(&coordinate, &calculator)
            .into_iter()
            .map(|task| self.runtime.spawn_blocking(move || task.run()))
            .collect();

        let mut sections = Vec::with_capacity(handles.len());
        for handle in handles {
            let items = handle
                .await
                .map_err(|err| LayoutError::MenuTask(err.to_string()))??;
            sections.push(items);
        }

        let mut sections = sections.into_iter();
        let overrides = sections.next().unwrap_or_default();
        let mut menu = Menu::new(calculator.summary());
        if !overrides.is_empty() {
            menu.items.extend(overrides);
            menu.push(MenuItem::Separator);
        }
        for (index, items) in sections.enumerate() {
            if index == MenuSection::ALL.len() {
                menu.push(MenuItem::Separator);
            }
            menu.items.extend(items);
        }
        tracing::debug!(menu = %menu.label, items = menu.items.len(), "built view menu");
        Ok(menu)
    }

    /// Blocking variant for callers outside the runtime
    pub fn create_blocking(
        &self,
        coordinate: ViewCoordinate,
        calculator: Arc<ViewCalculator>,
    ) -> LayoutResult<Menu> {
        self.runtime.block_on(self.create(coordinate, calculator))
    }
}
