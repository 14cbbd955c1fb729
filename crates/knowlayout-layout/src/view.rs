//! Views: the context-bearing container between a window and its pane.

use std::fmt;
use std::rc::{Rc, Weak};

use knowlayout_core::{GadgetKind, PreferencesNode};

use crate::blueprint::{Blueprint, SaveParticipant};
use crate::context::Context;
use crate::env::LayoutEnv;
use crate::error::LayoutResult;
use crate::factory::{only_child, stamped_tag, GadgetFactory};
use crate::gadget::{ContextLink, ContextSensitive, WeakGadget, WindowPane};
use crate::host::NodeHost;

pub struct View {
    blueprint: Blueprint,
    host: Rc<dyn NodeHost>,
    context: Rc<Context>,
    pane: Rc<WindowPane>,
    link: ContextLink,
}

impl View {
    pub fn create<F: GadgetFactory + ?Sized>(
        env: &LayoutEnv,
        node: PreferencesNode,
        factory: &F,
        pane: Rc<WindowPane>,
    ) -> LayoutResult<Rc<Self>> {
        let context = env
            .contexts
            .create(GadgetKind::View, &node, factory.implementation(), None)?;
        let blueprint = Blueprint::create(
            GadgetKind::View,
            node,
            factory,
            vec![context.clone() as Rc<dyn SaveParticipant>],
        )?;
        Ok(Self::assemble(env, blueprint, context, pane))
    }

    /// Restore the view and the pane stored as its only child.
    pub fn restore(env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<Self>> {
        let pane_node = only_child(&node, GadgetKind::WindowPane)?;
        let tag = stamped_tag(&pane_node)?;
        let pane = env.registry.window_pane(&tag)?.restore(env, pane_node)?;

        let context = env.contexts.restore(GadgetKind::View, &node)?;
        let blueprint = Blueprint::restore(
            GadgetKind::View,
            node,
            vec![context.clone() as Rc<dyn SaveParticipant>],
        )?;
        Ok(Self::assemble(env, blueprint, context, pane))
    }

    fn assemble(
        env: &LayoutEnv,
        blueprint: Blueprint,
        context: Rc<Context>,
        pane: Rc<WindowPane>,
    ) -> Rc<Self> {
        let host = env.toolkit.create_node();
        host.add_child(pane.host().clone());
        let view = Rc::new(Self {
            blueprint,
            host,
            context,
            pane,
            link: ContextLink::default(),
        });
        view.context.attach_peer(WeakGadget::View(Rc::downgrade(&view)));
        view
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn host(&self) -> &Rc<dyn NodeHost> {
        &self.host
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    pub fn pane(&self) -> &Rc<WindowPane> {
        &self.pane
    }
}

impl ContextSensitive for View {
    /// The view's own context takes over the enclosing coordinate.
    fn subscribe_to_context(&self, context: &Rc<Context>) {
        self.context.set_coordinate(context.coordinate());
        let own: Weak<Context> = Rc::downgrade(&self.context);
        self.link.replace(context.on_coordinate_changed(move |coordinate, _| {
            if let Some(own) = own.upgrade() {
                own.set_coordinate(coordinate.clone());
            }
        }));
    }

    fn unsubscribe_from_context(&self) {
        self.link.clear();
    }

    fn is_subscribed(&self) -> bool {
        self.link.is_linked()
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("blueprint", &self.blueprint)
            .field("context", &self.context)
            .field("pane", &self.pane)
            .finish()
    }
}
