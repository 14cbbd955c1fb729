//! Top-level windows.
//!
//! A window binds its geometry to a stage, bears the root context of its
//! gadget tree and routes the stage's close requests through the close
//! prompt.

use std::fmt;
use std::rc::Rc;

use knowlayout_core::{AppEvent, GadgetKind, PreferenceKey, PreferencesNode, WindowEvent, WindowKey};

use crate::blueprint::{Blueprint, SaveParticipant};
use crate::close::CloseOutcome;
use crate::context::Context;
use crate::env::LayoutEnv;
use crate::error::LayoutResult;
use crate::factory::{only_child, stamped_tag, GadgetFactory};
use crate::gadget::{Gadget, View, WeakGadget};
use crate::host::{CloseHandler, StageHost};
use crate::participants::WindowGeometry;

pub struct Window {
    blueprint: Blueprint,
    stage: Rc<dyn StageHost>,
    geometry: Rc<WindowGeometry>,
    context: Rc<Context>,
    view: Rc<View>,
}

impl Window {
    /// Create path. The factory's display name becomes the initial title.
    pub fn create<F: GadgetFactory + ?Sized>(
        env: &Rc<LayoutEnv>,
        node: PreferencesNode,
        factory: &F,
        view: Rc<View>,
    ) -> LayoutResult<Rc<Self>> {
        node.put_string(WindowKey::Title.key_name(), factory.gadget_name())?;
        let context = env
            .contexts
            .create(GadgetKind::Window, &node, factory.implementation(), None)?;
        let geometry = Rc::new(WindowGeometry::new()?);
        let blueprint = Blueprint::create(
            GadgetKind::Window,
            node,
            factory,
            vec![
                context.clone() as Rc<dyn SaveParticipant>,
                geometry.clone() as Rc<dyn SaveParticipant>,
            ],
        )?;
        let window = Self::assemble(env, blueprint, geometry, context, view);
        env.events.publish(AppEvent::Window(WindowEvent::Created {
            path: window.blueprint.node().path().to_string(),
            factory: factory.type_tag().to_string(),
        }));
        Ok(window)
    }

    /// Restore path: the view is the window node's only child.
    pub fn restore(env: &Rc<LayoutEnv>, node: PreferencesNode) -> LayoutResult<Rc<Self>> {
        let view_node = only_child(&node, GadgetKind::View)?;
        let tag = stamped_tag(&view_node)?;
        let view = env.registry.view(&tag)?.restore(env, view_node)?;

        let context = env.contexts.restore(GadgetKind::Window, &node)?;
        let geometry = Rc::new(WindowGeometry::new()?);
        let blueprint = Blueprint::restore(
            GadgetKind::Window,
            node,
            vec![
                context.clone() as Rc<dyn SaveParticipant>,
                geometry.clone() as Rc<dyn SaveParticipant>,
            ],
        )?;
        let window = Self::assemble(env, blueprint, geometry, context, view);
        env.events.publish(AppEvent::Window(WindowEvent::Restored {
            path: window.blueprint.node().path().to_string(),
            factory: window.blueprint.factory_tag(),
        }));
        Ok(window)
    }

    fn assemble(
        env: &Rc<LayoutEnv>,
        blueprint: Blueprint,
        geometry: Rc<WindowGeometry>,
        context: Rc<Context>,
        view: Rc<View>,
    ) -> Rc<Self> {
        let stage = env.toolkit.create_stage();
        stage.set_root(view.host().clone());
        blueprint.retain(geometry.bind(stage.geometry()));

        let window = Rc::new(Self {
            blueprint,
            stage,
            geometry,
            context,
            view,
        });
        window
            .context
            .attach_peer(WeakGadget::Window(Rc::downgrade(&window)));

        let weak = Rc::downgrade(&window);
        let handler_env = env.clone();
        let handler: CloseHandler = Rc::new(move |request| {
            let Some(window) = weak.upgrade() else {
                return;
            };
            match window.handle_close_request(&handler_env) {
                Ok(CloseOutcome::Close) => {}
                Ok(CloseOutcome::KeepOpen) => request.consume(),
                Err(err) => {
                    tracing::error!(
                        window = %window.blueprint.node(),
                        error = %err,
                        "close request failed, keeping window open"
                    );
                    request.consume();
                }
            }
        });
        window
            .blueprint
            .retain(window.stage.on_close_request(handler));
        window
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn stage(&self) -> &Rc<dyn StageHost> {
        &self.stage
    }

    pub fn geometry(&self) -> &WindowGeometry {
        &self.geometry
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    pub fn view(&self) -> &Rc<View> {
        &self.view
    }

    pub fn title(&self) -> String {
        self.geometry.title.get()
    }

    pub fn show(&self) {
        self.stage.show();
    }

    pub fn hide(&self) {
        self.stage.hide();
    }

    pub fn is_showing(&self) -> bool {
        self.stage.is_showing()
    }

    /// Ask the stage to close; the close handler may keep it open.
    ///
    /// Returns whether the stage closed.
    pub fn request_close(&self) -> bool {
        self.stage.request_close()
    }

    pub fn as_gadget(self: &Rc<Self>) -> Gadget {
        Gadget::Window(self.clone())
    }

    /// Save the window and every nested gadget
    pub fn save(self: &Rc<Self>) -> LayoutResult<()> {
        self.as_gadget().save_tree()
    }

    /// Revert the window and every nested gadget
    pub fn revert(self: &Rc<Self>) -> LayoutResult<()> {
        self.as_gadget().revert_tree()
    }

    pub fn any_changed(self: &Rc<Self>) -> bool {
        self.as_gadget().any_changed()
    }

    /// Remove the window's preference subtree.
    ///
    /// Dependent contexts are unsubscribed first. Nested gadgets stop
    /// tracking changes; the stage is left to the caller.
    pub fn delete(self: &Rc<Self>) -> LayoutResult<()> {
        self.context.unsubscribe_dependent_contexts()?;
        self.blueprint.delete()?;
        for gadget in self.as_gadget().descendants() {
            gadget.blueprint().release();
        }
        Ok(())
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("blueprint", &self.blueprint)
            .field("title", &self.geometry.title.get())
            .field("context", &self.context)
            .field("view", &self.view)
            .finish()
    }
}
