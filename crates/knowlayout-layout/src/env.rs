//! Everything factories need to build and restore windows.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use knowlayout_core::{CalculatorCache, EventBus, PreferencesNode};

use crate::close::{ClosePrompt, ScriptedPrompt};
use crate::context::ContextFactory;
use crate::error::LayoutResult;
use crate::factory::FactoryRegistry;
use crate::headless::HeadlessToolkit;
use crate::host::HostToolkit;

/// Namespace under the preference root holding live windows.
pub const WINDOWS_NAMESPACE: &str = "windows";

/// Namespace under the preference root holding shared layouts.
pub const SHARED_LAYOUTS_NAMESPACE: &str = "shared-layouts";

pub struct LayoutEnv {
    pub toolkit: Rc<dyn HostToolkit>,
    pub registry: FactoryRegistry,
    pub contexts: ContextFactory,
    /// Parent of every window node.
    pub windows: PreferencesNode,
    /// Parent of every shared layout node.
    pub shared_layouts: PreferencesNode,
    pub prompt: Rc<dyn ClosePrompt>,
    pub events: Arc<EventBus>,
}

impl LayoutEnv {
    /// Environment with the default factories and a fresh calculator cache.
    pub fn new(
        toolkit: Rc<dyn HostToolkit>,
        windows: PreferencesNode,
        shared_layouts: PreferencesNode,
        prompt: Rc<dyn ClosePrompt>,
        events: Arc<EventBus>,
    ) -> Rc<Self> {
        Rc::new(Self {
            toolkit,
            registry: FactoryRegistry::with_defaults(),
            contexts: ContextFactory::new(CalculatorCache::new()),
            windows,
            shared_layouts,
            prompt,
            events,
        })
    }

    /// Headless environment under `root` with the default factories.
    ///
    /// Changed windows keep open on close unless `prompt` says otherwise.
    pub fn headless(root: &PreferencesNode, prompt: Rc<dyn ClosePrompt>) -> LayoutResult<Rc<Self>> {
        Ok(Self::new(
            Rc::new(HeadlessToolkit::new()),
            root.child(WINDOWS_NAMESPACE)?,
            root.child(SHARED_LAYOUTS_NAMESPACE)?,
            prompt,
            Arc::new(EventBus::new()),
        ))
    }

    /// Headless environment whose prompt always cancels
    pub fn headless_cancelling(root: &PreferencesNode) -> LayoutResult<Rc<Self>> {
        Self::headless(root, Rc::new(ScriptedPrompt::default()))
    }
}

impl fmt::Debug for LayoutEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEnv")
            .field("registry", &self.registry)
            .field("windows", &self.windows.path())
            .field("shared_layouts", &self.shared_layouts.path())
            .finish()
    }
}
