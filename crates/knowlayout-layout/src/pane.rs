//! Window panes: the whiteboard holding a view's widgets.

use std::fmt;
use std::rc::Rc;

use knowlayout_core::{GadgetKind, PreferencesNode};

use crate::blueprint::{Blueprint, SaveParticipant};
use crate::context::Context;
use crate::env::LayoutEnv;
use crate::error::LayoutResult;
use crate::factory::{stamped_tag, GadgetFactory};
use crate::gadget::{ContextLink, ContextSensitive, Widget};
use crate::host::NodeHost;
use crate::participants::PaneTransform;

pub struct WindowPane {
    blueprint: Blueprint,
    host: Rc<dyn NodeHost>,
    transform: Rc<PaneTransform>,
    widgets: Vec<Rc<Widget>>,
    link: ContextLink,
}

impl WindowPane {
    pub fn create<F: GadgetFactory + ?Sized>(
        env: &LayoutEnv,
        node: PreferencesNode,
        factory: &F,
        widgets: Vec<Rc<Widget>>,
    ) -> LayoutResult<Rc<Self>> {
        let transform = Rc::new(PaneTransform::new()?);
        let blueprint = Blueprint::create(
            GadgetKind::WindowPane,
            node,
            factory,
            vec![transform.clone() as Rc<dyn SaveParticipant>],
        )?;
        Ok(Self::assemble(env, blueprint, transform, widgets))
    }

    /// Restore the pane and every restorable widget below it.
    ///
    /// A widget whose factory cannot be resolved is skipped with a warning.
    pub fn restore(env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<Self>> {
        let mut widgets = Vec::new();
        for child in node.children()? {
            let restored = stamped_tag(&child)
                .and_then(|tag| env.registry.widget(&tag))
                .and_then(|factory| factory.restore(env, child.clone()));
            match restored {
                Ok(widget) => widgets.push(widget),
                Err(err) if err.is_configuration_error() => {
                    tracing::warn!(node = %child, error = %err, "skipping widget");
                }
                Err(err) => return Err(err),
            }
        }

        let transform = Rc::new(PaneTransform::new()?);
        let blueprint = Blueprint::restore(
            GadgetKind::WindowPane,
            node,
            vec![transform.clone() as Rc<dyn SaveParticipant>],
        )?;
        Ok(Self::assemble(env, blueprint, transform, widgets))
    }

    fn assemble(
        env: &LayoutEnv,
        blueprint: Blueprint,
        transform: Rc<PaneTransform>,
        widgets: Vec<Rc<Widget>>,
    ) -> Rc<Self> {
        let host = env.toolkit.create_node();
        blueprint.retain(transform.bind(host.transform()));
        for widget in &widgets {
            host.add_child(widget.host().clone());
        }
        Rc::new(Self {
            blueprint,
            host,
            transform,
            widgets,
            link: ContextLink::default(),
        })
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn host(&self) -> &Rc<dyn NodeHost> {
        &self.host
    }

    pub fn transform(&self) -> &PaneTransform {
        &self.transform
    }

    pub fn widgets(&self) -> &[Rc<Widget>] {
        &self.widgets
    }

    /// Center label text
    pub fn label(&self) -> String {
        self.host.text().get()
    }
}

impl ContextSensitive for WindowPane {
    fn subscribe_to_context(&self, context: &Rc<Context>) {
        let label = self.host.text().clone();
        label.set(context.calculator().summary());
        self.link.replace(context.on_coordinate_changed(move |_, calculator| {
            label.set(calculator.summary());
        }));
    }

    fn unsubscribe_from_context(&self) {
        self.link.clear();
    }

    fn is_subscribed(&self) -> bool {
        self.link.is_linked()
    }
}

impl fmt::Debug for WindowPane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowPane")
            .field("blueprint", &self.blueprint)
            .field("widgets", &self.widgets)
            .finish()
    }
}
