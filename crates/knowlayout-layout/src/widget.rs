//! Leaf gadgets placed on a window pane's grid.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use knowlayout_core::{GadgetKind, PreferencesNode, Property, ViewCalculator};

use crate::blueprint::{Blueprint, SaveParticipant};
use crate::context::Context;
use crate::env::LayoutEnv;
use crate::error::LayoutResult;
use crate::factory::GadgetFactory;
use crate::gadget::{ContextLink, ContextSensitive};
use crate::host::NodeHost;
use crate::participants::GridPlacement;

/// Component shown by a freshly created component list.
pub const DEFAULT_COMPONENT: &str = "Heart";

/// What a widget displays.
#[derive(Debug, Clone)]
pub enum WidgetContent {
    /// Caption naming the widget and the preferred language.
    Label,
    /// Description of the selected component.
    ComponentList { selected: Property<String> },
}

impl WidgetContent {
    pub fn component_list() -> Self {
        WidgetContent::ComponentList {
            selected: Property::new(DEFAULT_COMPONENT.to_string()),
        }
    }

    fn render(&self, node_name: &str, calculator: &ViewCalculator) -> String {
        match self {
            WidgetContent::Label => format!("{node_name} ({})", calculator.language_summary()),
            WidgetContent::ComponentList { selected } => {
                calculator.describe_component(&selected.get())
            }
        }
    }
}

pub struct Widget {
    blueprint: Blueprint,
    host: Rc<dyn NodeHost>,
    placement: Rc<GridPlacement>,
    content: WidgetContent,
    link: ContextLink,
}

impl Widget {
    pub fn create<F: GadgetFactory + ?Sized>(
        env: &LayoutEnv,
        node: PreferencesNode,
        factory: &F,
        content: WidgetContent,
    ) -> LayoutResult<Rc<Self>> {
        let placement = Rc::new(GridPlacement::new()?);
        let blueprint = Blueprint::create(
            GadgetKind::Widget,
            node,
            factory,
            vec![placement.clone() as Rc<dyn SaveParticipant>],
        )?;
        Ok(Self::assemble(env, blueprint, placement, content))
    }

    pub fn restore(
        env: &LayoutEnv,
        node: PreferencesNode,
        content: WidgetContent,
    ) -> LayoutResult<Rc<Self>> {
        let placement = Rc::new(GridPlacement::new()?);
        let blueprint = Blueprint::restore(
            GadgetKind::Widget,
            node,
            vec![placement.clone() as Rc<dyn SaveParticipant>],
        )?;
        Ok(Self::assemble(env, blueprint, placement, content))
    }

    fn assemble(
        env: &LayoutEnv,
        blueprint: Blueprint,
        placement: Rc<GridPlacement>,
        content: WidgetContent,
    ) -> Rc<Self> {
        let host = env.toolkit.create_node();
        blueprint.retain(placement.bind(host.placement()));
        host.text().set(blueprint.node().name().to_string());
        Rc::new(Self {
            blueprint,
            host,
            placement,
            content,
            link: ContextLink::default(),
        })
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn host(&self) -> &Rc<dyn NodeHost> {
        &self.host
    }

    pub fn placement(&self) -> &GridPlacement {
        &self.placement
    }

    pub fn content(&self) -> &WidgetContent {
        &self.content
    }

    /// Text currently shown by the host
    pub fn text(&self) -> String {
        self.host.text().get()
    }

    /// Select a component; the description refreshes on the next coordinate
    /// change or subscription.
    pub fn select_component(&self, component: impl Into<String>) -> bool {
        match &self.content {
            WidgetContent::ComponentList { selected } => selected.set(component.into()),
            WidgetContent::Label => false,
        }
    }

    fn refresh(&self, calculator: &Arc<ViewCalculator>) {
        let text = self.content.render(self.blueprint.node().name(), calculator);
        self.host.text().set(text);
    }
}

impl ContextSensitive for Widget {
    fn subscribe_to_context(&self, context: &Rc<Context>) {
        self.refresh(&context.calculator());
        let text = self.host.text().clone();
        let content = self.content.clone();
        let name = self.blueprint.node().name().to_string();
        self.link.replace(context.on_coordinate_changed(move |_, calculator| {
            text.set(content.render(&name, calculator));
        }));
    }

    fn unsubscribe_from_context(&self) {
        self.link.clear();
    }

    fn is_subscribed(&self) -> bool {
        self.link.is_linked()
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("blueprint", &self.blueprint)
            .field("content", &self.content)
            .finish()
    }
}
