//! Restore-window and new-window actions.
//!
//! Every stamped child of the windows namespace becomes a [`RestoreAction`].
//! Actions resolve their factory only when invoked, so a node naming an
//! unknown factory fails on its own and never hides its siblings.

use std::rc::Rc;

use knowlayout_core::{GadgetKey, PreferenceKey, PreferencesNode};

use crate::env::LayoutEnv;
use crate::error::{LayoutError, LayoutResult};
use crate::factory::{unique_child_name, PreferencesFactory};
use crate::gadget::Window;

/// Where a restorable window lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    /// A private window node; restored in place.
    Window,
    /// A shared layout; copied into the windows namespace first.
    SharedLayout,
}

#[derive(Debug, Clone)]
pub struct RestoreAction {
    /// The stored name-for-restore.
    pub label: String,
    pub node: PreferencesNode,
    pub factory_tag: String,
    pub source: RestoreSource,
}

impl RestoreAction {
    /// Restore the window, make its contexts live and show it.
    pub fn invoke(&self, env: &Rc<LayoutEnv>) -> LayoutResult<Rc<Window>> {
        let result = self.restore_and_show(env);
        if let Err(err) = &result {
            if err.is_configuration_error() {
                tracing::warn!(node = %self.node, error = %err, "window could not be restored");
            }
        }
        result
    }

    fn restore_and_show(&self, env: &Rc<LayoutEnv>) -> LayoutResult<Rc<Window>> {
        let factory = env.registry.window(&self.factory_tag)?;
        let node = match self.source {
            RestoreSource::Window => self.node.clone(),
            RestoreSource::SharedLayout => {
                let name = unique_child_name(&env.windows, self.node.name())?;
                let copy = self.node.copy_subtree_as(&env.windows, &name, true)?;
                env.windows.flush()?;
                copy
            }
        };
        let window = factory.restore(env, node)?;
        window.context().subscribe_dependent_contexts()?;
        window.show();
        Ok(window)
    }
}

fn actions_under(
    parent: &PreferencesNode,
    source: RestoreSource,
) -> LayoutResult<Vec<RestoreAction>> {
    let mut actions = Vec::new();
    for child in parent.children()? {
        let tag = child.get_raw(GadgetKey::FactoryClass.key_name())?;
        let label = child.get_raw(GadgetKey::NameForRestore.key_name())?;
        match (tag, label) {
            (Some(factory_tag), Some(label)) if !factory_tag.is_empty() && !label.is_empty() => {
                actions.push(RestoreAction {
                    label,
                    node: child,
                    factory_tag,
                    source,
                });
            }
            _ => tracing::debug!(node = %child, "skipping unstamped node"),
        }
    }
    Ok(actions)
}

/// One action per stamped window node
pub fn restore_window_actions(env: &LayoutEnv) -> LayoutResult<Vec<RestoreAction>> {
    actions_under(&env.windows, RestoreSource::Window)
}

/// One action per stamped shared layout
pub fn shared_layout_actions(env: &LayoutEnv) -> LayoutResult<Vec<RestoreAction>> {
    actions_under(&env.shared_layouts, RestoreSource::SharedLayout)
}

/// Outcome of [`restore_all`], in action order.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub restored: Vec<Rc<Window>>,
    pub failed: Vec<(RestoreAction, LayoutError)>,
}

/// Invoke every restore action independently.
///
/// Only failing to list the windows namespace is an error; each window
/// that cannot be restored is reported in the result.
pub fn restore_all(env: &Rc<LayoutEnv>) -> LayoutResult<RestoreReport> {
    let mut report = RestoreReport::default();
    for action in restore_window_actions(env)? {
        match action.invoke(env) {
            Ok(window) => report.restored.push(window),
            Err(err) => report.failed.push((action, err)),
        }
    }
    tracing::info!(
        restored = report.restored.len(),
        failed = report.failed.len(),
        "restored windows"
    );
    Ok(report)
}

/// Creates a window from a registered factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWindowAction {
    pub label: String,
    pub factory_tag: String,
}

impl NewWindowAction {
    /// Create the window in the windows namespace, make it live and show it.
    pub fn invoke(&self, env: &Rc<LayoutEnv>) -> LayoutResult<Rc<Window>> {
        let factory = env.registry.window(&self.factory_tag)?;
        let window = factory.create(env, &PreferencesFactory::Under(env.windows.clone()))?;
        window.context().subscribe_dependent_contexts()?;
        window.show();
        Ok(window)
    }
}

/// One action per registered window factory, ordered by name
pub fn new_window_actions(env: &LayoutEnv) -> Vec<NewWindowAction> {
    env.registry
        .window_factories()
        .iter()
        .map(|factory| NewWindowAction {
            label: format!("New {}", factory.gadget_name()),
            factory_tag: factory.type_tag().to_string(),
        })
        .collect()
}
