//! Factories shipped with the layout crate.

use std::rc::Rc;

use knowlayout_core::{GadgetKind, PreferencesNode};

use crate::env::LayoutEnv;
use crate::error::LayoutResult;
use crate::factory::{
    FactoryRegistry, GadgetFactory, PreferencesFactory, ViewFactory, WidgetFactory,
    WindowFactory, WindowPaneFactory,
};
use crate::gadget::{View, Widget, WidgetContent, Window, WindowPane};

/// Register every factory below.
pub fn register_defaults(registry: &mut FactoryRegistry) {
    registry.register_window(Rc::new(SimpleWindowFactory));
    registry.register_window(Rc::new(ComponentWindowFactory));
    registry.register_view(Rc::new(SimpleViewFactory));
    registry.register_window_pane(Rc::new(SimpleWindowPaneFactory));
    registry.register_widget(Rc::new(SimpleWidgetFactory));
    registry.register_widget(Rc::new(ComponentPaneFactory));
}

/// Build window, view, pane and widgets bottom-up under one fresh node.
fn create_window_with_widgets<F: WindowFactory + ?Sized>(
    factory: &F,
    env: &Rc<LayoutEnv>,
    prefs: &PreferencesFactory,
    widget_factories: &[&dyn WidgetFactory],
) -> LayoutResult<Rc<Window>> {
    let node = prefs.node_for(factory.implementation())?;
    let view_node =
        PreferencesFactory::Under(node.clone()).node_for(SimpleViewFactory.implementation())?;
    let pane_node = PreferencesFactory::Under(view_node.clone())
        .node_for(SimpleWindowPaneFactory.implementation())?;

    let widget_parent = PreferencesFactory::Under(pane_node.clone());
    let widgets = widget_factories
        .iter()
        .map(|widget| widget.create(env, &widget_parent))
        .collect::<LayoutResult<Vec<_>>>()?;

    let pane = WindowPane::create(env, pane_node, &SimpleWindowPaneFactory, widgets)?;
    let view = View::create(env, view_node, &SimpleViewFactory, pane)?;
    Window::create(env, node, factory, view)
}

/// A window with an empty whiteboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleWindowFactory;

impl GadgetFactory for SimpleWindowFactory {
    fn type_tag(&self) -> &'static str {
        "knowlayout.SimpleWindowFactory"
    }

    fn gadget_name(&self) -> &'static str {
        "Simple window"
    }

    fn implementation(&self) -> &'static str {
        "simple-window"
    }

    fn kind(&self) -> GadgetKind {
        GadgetKind::Window
    }
}

impl WindowFactory for SimpleWindowFactory {
    fn create(&self, env: &Rc<LayoutEnv>, prefs: &PreferencesFactory) -> LayoutResult<Rc<Window>> {
        create_window_with_widgets(self, env, prefs, &[])
    }

    fn restore(&self, env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<Window>> {
        Window::restore(env, node)
    }
}

/// A window whose whiteboard holds a component pane.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentWindowFactory;

impl GadgetFactory for ComponentWindowFactory {
    fn type_tag(&self) -> &'static str {
        "knowlayout.ComponentWindowFactory"
    }

    fn gadget_name(&self) -> &'static str {
        "Component window"
    }

    fn implementation(&self) -> &'static str {
        "component-window"
    }

    fn kind(&self) -> GadgetKind {
        GadgetKind::Window
    }
}

impl WindowFactory for ComponentWindowFactory {
    fn create(&self, env: &Rc<LayoutEnv>, prefs: &PreferencesFactory) -> LayoutResult<Rc<Window>> {
        create_window_with_widgets(self, env, prefs, &[&ComponentPaneFactory])
    }

    fn restore(&self, env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<Window>> {
        Window::restore(env, node)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleViewFactory;

impl GadgetFactory for SimpleViewFactory {
    fn type_tag(&self) -> &'static str {
        "knowlayout.SimpleViewFactory"
    }

    fn gadget_name(&self) -> &'static str {
        "Simple view"
    }

    fn implementation(&self) -> &'static str {
        "simple-view"
    }

    fn kind(&self) -> GadgetKind {
        GadgetKind::View
    }
}

impl ViewFactory for SimpleViewFactory {
    fn create(&self, env: &Rc<LayoutEnv>, prefs: &PreferencesFactory) -> LayoutResult<Rc<View>> {
        let node = prefs.node_for(self.implementation())?;
        let pane = SimpleWindowPaneFactory.create(env, &PreferencesFactory::Under(node.clone()))?;
        View::create(env, node, self, pane)
    }

    fn restore(&self, env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<View>> {
        View::restore(env, node)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleWindowPaneFactory;

impl GadgetFactory for SimpleWindowPaneFactory {
    fn type_tag(&self) -> &'static str {
        "knowlayout.SimpleWindowPaneFactory"
    }

    fn gadget_name(&self) -> &'static str {
        "Simple window pane"
    }

    fn implementation(&self) -> &'static str {
        "simple-window-pane"
    }

    fn kind(&self) -> GadgetKind {
        GadgetKind::WindowPane
    }
}

impl WindowPaneFactory for SimpleWindowPaneFactory {
    fn create(
        &self,
        env: &Rc<LayoutEnv>,
        prefs: &PreferencesFactory,
    ) -> LayoutResult<Rc<WindowPane>> {
        let node = prefs.node_for(self.implementation())?;
        WindowPane::create(env, node, self, Vec::new())
    }

    fn restore(
        &self,
        env: &Rc<LayoutEnv>,
        node: PreferencesNode,
    ) -> LayoutResult<Rc<WindowPane>> {
        WindowPane::restore(env, node)
    }
}

/// A label naming itself and the preferred language.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleWidgetFactory;

impl GadgetFactory for SimpleWidgetFactory {
    fn type_tag(&self) -> &'static str {
        "knowlayout.SimpleWidgetFactory"
    }

    fn gadget_name(&self) -> &'static str {
        "Simple widget"
    }

    fn implementation(&self) -> &'static str {
        "simple-widget"
    }

    fn kind(&self) -> GadgetKind {
        GadgetKind::Widget
    }
}

impl WidgetFactory for SimpleWidgetFactory {
    fn create(&self, env: &Rc<LayoutEnv>, prefs: &PreferencesFactory) -> LayoutResult<Rc<Widget>> {
        let node = prefs.node_for(self.implementation())?;
        Widget::create(env, node, self, WidgetContent::Label)
    }

    fn restore(&self, env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<Widget>> {
        Widget::restore(env, node, WidgetContent::Label)
    }
}

/// A component list describing its selected component.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentPaneFactory;

impl GadgetFactory for ComponentPaneFactory {
    fn type_tag(&self) -> &'static str {
        "knowlayout.ComponentPaneFactory"
    }

    fn gadget_name(&self) -> &'static str {
        "Component pane"
    }

    fn implementation(&self) -> &'static str {
        "component-pane"
    }

    fn kind(&self) -> GadgetKind {
        GadgetKind::Widget
    }
}

impl WidgetFactory for ComponentPaneFactory {
    fn create(&self, env: &Rc<LayoutEnv>, prefs: &PreferencesFactory) -> LayoutResult<Rc<Widget>> {
        let node = prefs.node_for(self.implementation())?;
        Widget::create(env, node, self, WidgetContent::component_list())
    }

    fn restore(&self, env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<Widget>> {
        Widget::restore(env, node, WidgetContent::component_list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowlayout_core::MemoryPreferences;

    #[test]
    fn test_component_window_builds_full_tree() {
        let env = LayoutEnv::headless_cancelling(&MemoryPreferences::root()).unwrap();
        let window = ComponentWindowFactory
            .create(&env, &PreferencesFactory::Under(env.windows.clone()))
            .unwrap();

        assert_eq!(window.blueprint().node().path(), "/windows/component-window-1");
        let pane = window.view().pane();
        assert_eq!(
            pane.blueprint().node().path(),
            "/windows/component-window-1/simple-view-1/simple-window-pane-1"
        );
        assert_eq!(pane.widgets().len(), 1);
        assert_eq!(
            pane.widgets()[0].blueprint().factory_tag(),
            ComponentPaneFactory.type_tag()
        );
        assert_eq!(window.as_gadget().descendants().len(), 3);
    }

    #[test]
    fn test_second_window_gets_next_index() {
        let env = LayoutEnv::headless_cancelling(&MemoryPreferences::root()).unwrap();
        let prefs = PreferencesFactory::Under(env.windows.clone());
        SimpleWindowFactory.create(&env, &prefs).unwrap();
        let second = SimpleWindowFactory.create(&env, &prefs).unwrap();
        assert_eq!(second.blueprint().node().name(), "simple-window-2");
    }
}
