//! Gadget factories and the type-tag registry used to restore them.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use knowlayout_core::{GadgetKey, GadgetKind, PreferenceKey, PreferencesNode, PreferencesResult};

use crate::env::LayoutEnv;
use crate::error::{LayoutError, LayoutResult};
use crate::gadget::{View, Widget, Window, WindowPane};

/// Metadata shared by every factory.
pub trait GadgetFactory {
    /// Stable tag stored in `FACTORY_CLASS` and used for registry lookup.
    fn type_tag(&self) -> &'static str;

    /// Display name; becomes the default window title and restore label.
    fn gadget_name(&self) -> &'static str;

    /// Base name for preference child nodes.
    fn implementation(&self) -> &'static str;

    fn kind(&self) -> GadgetKind;
}

pub trait WindowFactory: GadgetFactory {
    fn create(&self, env: &Rc<LayoutEnv>, prefs: &PreferencesFactory) -> LayoutResult<Rc<Window>>;

    fn restore(&self, env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<Window>>;
}

pub trait ViewFactory: GadgetFactory {
    fn create(&self, env: &Rc<LayoutEnv>, prefs: &PreferencesFactory) -> LayoutResult<Rc<View>>;

    fn restore(&self, env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<View>>;
}

pub trait WindowPaneFactory: GadgetFactory {
    fn create(
        &self,
        env: &Rc<LayoutEnv>,
        prefs: &PreferencesFactory,
    ) -> LayoutResult<Rc<WindowPane>>;

    fn restore(&self, env: &Rc<LayoutEnv>, node: PreferencesNode)
        -> LayoutResult<Rc<WindowPane>>;
}

pub trait WidgetFactory: GadgetFactory {
    fn create(&self, env: &Rc<LayoutEnv>, prefs: &PreferencesFactory) -> LayoutResult<Rc<Widget>>;

    fn restore(&self, env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<Widget>>;
}

/// Supplies the preference node for a new gadget.
#[derive(Debug, Clone)]
pub enum PreferencesFactory {
    /// Allocate a fresh `<implementation>-<n>` child of this node.
    Under(PreferencesNode),
    /// Use this node as is.
    Exact(PreferencesNode),
}

impl PreferencesFactory {
    pub fn node_for(&self, implementation: &str) -> PreferencesResult<PreferencesNode> {
        match self {
            PreferencesFactory::Exact(node) => Ok(node.clone()),
            PreferencesFactory::Under(parent) => {
                let name = free_child_name(parent, implementation)?;
                parent.child(&name)
            }
        }
    }
}

/// First `<base>-<n>` (n from 1) with no existing child of that name.
pub fn free_child_name(parent: &PreferencesNode, base: &str) -> PreferencesResult<String> {
    let taken = parent.children()?;
    let mut index = 1;
    loop {
        let candidate = format!("{base}-{index}");
        if !taken.iter().any(|child| child.name() == candidate) {
            return Ok(candidate);
        }
        index += 1;
    }
}

/// `preferred` when no child of that name exists, else the first free
/// `<preferred>-<n>`.
pub fn unique_child_name(parent: &PreferencesNode, preferred: &str) -> PreferencesResult<String> {
    match parent.existing_child(preferred)? {
        Some(_) => free_child_name(parent, preferred),
        None => Ok(preferred.to_string()),
    }
}

/// A factory registered under its type tag.
#[derive(Clone)]
pub enum RegisteredFactory {
    Window(Rc<dyn WindowFactory>),
    View(Rc<dyn ViewFactory>),
    WindowPane(Rc<dyn WindowPaneFactory>),
    Widget(Rc<dyn WidgetFactory>),
}

impl RegisteredFactory {
    pub fn type_tag(&self) -> &'static str {
        match self {
            RegisteredFactory::Window(f) => f.type_tag(),
            RegisteredFactory::View(f) => f.type_tag(),
            RegisteredFactory::WindowPane(f) => f.type_tag(),
            RegisteredFactory::Widget(f) => f.type_tag(),
        }
    }

    pub fn gadget_name(&self) -> &'static str {
        match self {
            RegisteredFactory::Window(f) => f.gadget_name(),
            RegisteredFactory::View(f) => f.gadget_name(),
            RegisteredFactory::WindowPane(f) => f.gadget_name(),
            RegisteredFactory::Widget(f) => f.gadget_name(),
        }
    }

    pub fn kind(&self) -> GadgetKind {
        match self {
            RegisteredFactory::Window(_) => GadgetKind::Window,
            RegisteredFactory::View(_) => GadgetKind::View,
            RegisteredFactory::WindowPane(_) => GadgetKind::WindowPane,
            RegisteredFactory::Widget(_) => GadgetKind::Widget,
        }
    }
}

impl fmt::Debug for RegisteredFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.type_tag())
    }
}

/// Maps stored type tags to factories.
///
/// Populated at startup; restore paths resolve `FACTORY_CLASS` values here
/// instead of guessing at constructors.
#[derive(Debug, Clone, Default)]
pub struct FactoryRegistry {
    factories: HashMap<String, RegisteredFactory>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every factory this crate ships
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::simple::register_defaults(&mut registry);
        registry
    }

    pub fn register(&mut self, factory: RegisteredFactory) {
        let tag = factory.type_tag().to_string();
        tracing::debug!(tag = %tag, kind = %factory.kind(), "registering factory");
        if self.factories.insert(tag.clone(), factory).is_some() {
            tracing::warn!(tag = %tag, "factory registration replaced an earlier one");
        }
    }

    pub fn register_window(&mut self, factory: Rc<dyn WindowFactory>) {
        self.register(RegisteredFactory::Window(factory));
    }

    pub fn register_view(&mut self, factory: Rc<dyn ViewFactory>) {
        self.register(RegisteredFactory::View(factory));
    }

    pub fn register_window_pane(&mut self, factory: Rc<dyn WindowPaneFactory>) {
        self.register(RegisteredFactory::WindowPane(factory));
    }

    pub fn register_widget(&mut self, factory: Rc<dyn WidgetFactory>) {
        self.register(RegisteredFactory::Widget(factory));
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn lookup(&self, tag: &str) -> LayoutResult<&RegisteredFactory> {
        self.factories
            .get(tag)
            .ok_or_else(|| LayoutError::UnknownFactory {
                tag: tag.to_string(),
            })
    }

    pub fn window(&self, tag: &str) -> LayoutResult<Rc<dyn WindowFactory>> {
        match self.lookup(tag)? {
            RegisteredFactory::Window(factory) => Ok(factory.clone()),
            other => Err(mismatch(tag, GadgetKind::Window, other)),
        }
    }

    pub fn view(&self, tag: &str) -> LayoutResult<Rc<dyn ViewFactory>> {
        match self.lookup(tag)? {
            RegisteredFactory::View(factory) => Ok(factory.clone()),
            other => Err(mismatch(tag, GadgetKind::View, other)),
        }
    }

    pub fn window_pane(&self, tag: &str) -> LayoutResult<Rc<dyn WindowPaneFactory>> {
        match self.lookup(tag)? {
            RegisteredFactory::WindowPane(factory) => Ok(factory.clone()),
            other => Err(mismatch(tag, GadgetKind::WindowPane, other)),
        }
    }

    pub fn widget(&self, tag: &str) -> LayoutResult<Rc<dyn WidgetFactory>> {
        match self.lookup(tag)? {
            RegisteredFactory::Widget(factory) => Ok(factory.clone()),
            other => Err(mismatch(tag, GadgetKind::Widget, other)),
        }
    }

    /// Window factories ordered by display name
    pub fn window_factories(&self) -> Vec<Rc<dyn WindowFactory>> {
        let mut factories: Vec<Rc<dyn WindowFactory>> = self
            .factories
            .values()
            .filter_map(|factory| match factory {
                RegisteredFactory::Window(window) => Some(window.clone()),
                _ => None,
            })
            .collect();
        factories.sort_by_key(|factory| factory.gadget_name());
        factories
    }
}

fn mismatch(tag: &str, expected: GadgetKind, found: &RegisteredFactory) -> LayoutError {
    LayoutError::FactoryKindMismatch {
        tag: tag.to_string(),
        expected,
        found: found.kind(),
    }
}

/// The factory tag stamped on a node that must be restorable.
pub fn stamped_tag(node: &PreferencesNode) -> LayoutResult<String> {
    let initialized = node.get_bool(GadgetKey::Initialized.key_name(), false)?;
    let tag = node.get_string(GadgetKey::FactoryClass.key_name(), "")?;
    if !initialized || tag.is_empty() {
        return Err(LayoutError::MissingStamp {
            path: node.path().to_string(),
        });
    }
    Ok(tag)
}

/// The single nested gadget node of a container node.
pub fn only_child(node: &PreferencesNode, expected: GadgetKind) -> LayoutResult<PreferencesNode> {
    let mut children = node.children()?;
    if children.len() != 1 {
        return Err(LayoutError::UnexpectedChildren {
            path: node.path().to_string(),
            expected,
            found: children.len(),
        });
    }
    Ok(children.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowlayout_core::MemoryPreferences;

    #[test]
    fn test_preferences_factory_picks_first_free_index() {
        let windows = MemoryPreferences::root().child("windows").unwrap();
        windows.child("simple-window-1").unwrap();
        windows.child("simple-window-3").unwrap();

        let prefs = PreferencesFactory::Under(windows.clone());
        let node = prefs.node_for("simple-window").unwrap();
        assert_eq!(node.name(), "simple-window-2");

        let exact = PreferencesFactory::Exact(node.clone());
        assert_eq!(exact.node_for("ignored").unwrap(), node);
    }

    #[test]
    fn test_registry_reports_unknown_and_mismatched_tags() {
        let registry = FactoryRegistry::with_defaults();
        let unknown = registry.window("com.example.Nonexistent").err().unwrap();
        assert_eq!(
            unknown,
            LayoutError::UnknownFactory {
                tag: "com.example.Nonexistent".to_string()
            }
        );

        let view_tag = crate::simple::SimpleViewFactory.type_tag();
        let mismatch = registry.window(view_tag).err().unwrap();
        assert!(matches!(
            mismatch,
            LayoutError::FactoryKindMismatch {
                expected: GadgetKind::Window,
                found: GadgetKind::View,
                ..
            }
        ));
        assert!(mismatch.is_configuration_error());
    }

    #[test]
    fn test_window_factories_sorted_by_name() {
        let registry = FactoryRegistry::with_defaults();
        let names: Vec<&str> = registry
            .window_factories()
            .iter()
            .map(|f| f.gadget_name())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.len() >= 2);
    }

    #[test]
    fn test_stamped_tag_requires_both_stamps() {
        let node = MemoryPreferences::root().child("w").unwrap();
        assert!(matches!(
            stamped_tag(&node),
            Err(LayoutError::MissingStamp { .. })
        ));
        node.put_bool("INITIALIZED", true).unwrap();
        node.put_string("FACTORY_CLASS", "knowlayout.SimpleWindow")
            .unwrap();
        assert_eq!(stamped_tag(&node).unwrap(), "knowlayout.SimpleWindow");
    }

    #[test]
    fn test_only_child_counts_children() {
        let node = MemoryPreferences::root().child("w").unwrap();
        assert!(matches!(
            only_child(&node, GadgetKind::View),
            Err(LayoutError::UnexpectedChildren { found: 0, .. })
        ));
        node.child("view-1").unwrap();
        assert_eq!(only_child(&node, GadgetKind::View).unwrap().name(), "view-1");
    }
}
