//! The gadget tree: `Window | View | WindowPane | Widget`.
//!
//! A window owns one view, the view owns one window pane and the pane owns
//! any number of widgets. Windows and views bear contexts; views, panes and
//! widgets are context-sensitive and follow the nearest enclosing context
//! while their composite is live.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use knowlayout_core::{GadgetKind, Subscription};

use crate::blueprint::Blueprint;
use crate::context::Context;
use crate::error::LayoutResult;

pub use crate::pane::WindowPane;
pub use crate::view::View;
pub use crate::widget::{Widget, WidgetContent};
pub use crate::window::Window;

/// A gadget that reacts to the coordinate of an enclosing context.
pub trait ContextSensitive {
    /// Start following `context`, replacing any earlier subscription
    fn subscribe_to_context(&self, context: &Rc<Context>);

    fn unsubscribe_from_context(&self);

    fn is_subscribed(&self) -> bool;
}

/// The at-most-one coordinate subscription a context-sensitive gadget holds.
#[derive(Debug, Default)]
pub(crate) struct ContextLink {
    subscription: RefCell<Option<Subscription>>,
}

impl ContextLink {
    pub(crate) fn replace(&self, subscription: Subscription) {
        let previous = self.subscription.borrow_mut().replace(subscription);
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
    }

    pub(crate) fn clear(&self) {
        let previous = self.subscription.borrow_mut().take();
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
    }

    pub(crate) fn is_linked(&self) -> bool {
        self.subscription.borrow().is_some()
    }
}

#[derive(Debug, Clone)]
pub enum Gadget {
    Window(Rc<Window>),
    View(Rc<View>),
    WindowPane(Rc<WindowPane>),
    Widget(Rc<Widget>),
}

#[derive(Debug, Clone)]
pub enum WeakGadget {
    Window(Weak<Window>),
    View(Weak<View>),
    WindowPane(Weak<WindowPane>),
    Widget(Weak<Widget>),
}

impl WeakGadget {
    pub fn upgrade(&self) -> Option<Gadget> {
        match self {
            WeakGadget::Window(weak) => weak.upgrade().map(Gadget::Window),
            WeakGadget::View(weak) => weak.upgrade().map(Gadget::View),
            WeakGadget::WindowPane(weak) => weak.upgrade().map(Gadget::WindowPane),
            WeakGadget::Widget(weak) => weak.upgrade().map(Gadget::Widget),
        }
    }
}

impl Gadget {
    pub fn kind(&self) -> GadgetKind {
        match self {
            Gadget::Window(_) => GadgetKind::Window,
            Gadget::View(_) => GadgetKind::View,
            Gadget::WindowPane(_) => GadgetKind::WindowPane,
            Gadget::Widget(_) => GadgetKind::Widget,
        }
    }

    pub fn blueprint(&self) -> &Blueprint {
        match self {
            Gadget::Window(window) => window.blueprint(),
            Gadget::View(view) => view.blueprint(),
            Gadget::WindowPane(pane) => pane.blueprint(),
            Gadget::Widget(widget) => widget.blueprint(),
        }
    }

    /// Directly nested gadgets
    pub fn children(&self) -> Vec<Gadget> {
        match self {
            Gadget::Window(window) => vec![Gadget::View(window.view().clone())],
            Gadget::View(view) => vec![Gadget::WindowPane(view.pane().clone())],
            Gadget::WindowPane(pane) => {
                pane.widgets().iter().cloned().map(Gadget::Widget).collect()
            }
            Gadget::Widget(_) => Vec::new(),
        }
    }

    /// The context this gadget bears, if any
    pub fn context(&self) -> Option<Rc<Context>> {
        match self {
            Gadget::Window(window) => Some(window.context().clone()),
            Gadget::View(view) => Some(view.context().clone()),
            Gadget::WindowPane(_) | Gadget::Widget(_) => None,
        }
    }

    pub fn as_context_sensitive(&self) -> Option<&dyn ContextSensitive> {
        match self {
            Gadget::Window(_) => None,
            Gadget::View(view) => Some(&**view),
            Gadget::WindowPane(pane) => Some(&**pane),
            Gadget::Widget(widget) => Some(&**widget),
        }
    }

    /// Visit this gadget and then every nested gadget, pre-order
    pub fn visit_depth_first(&self, visitor: &mut dyn FnMut(&Gadget)) {
        visitor(self);
        for child in self.children() {
            child.visit_depth_first(visitor);
        }
    }

    /// Every nested gadget in pre-order, excluding this one
    pub fn descendants(&self) -> Vec<Gadget> {
        let mut found = Vec::new();
        for child in self.children() {
            child.visit_depth_first(&mut |gadget| found.push(gadget.clone()));
        }
        found
    }

    /// Save this gadget and every nested gadget.
    pub fn save_tree(&self) -> LayoutResult<()> {
        self.blueprint().save()?;
        for child in self.children() {
            child.save_tree()?;
        }
        Ok(())
    }

    /// Revert this gadget and every nested gadget.
    pub fn revert_tree(&self) -> LayoutResult<()> {
        self.blueprint().revert()?;
        for child in self.children() {
            child.revert_tree()?;
        }
        Ok(())
    }

    /// Whether any gadget in the tree holds unsaved changes
    pub fn any_changed(&self) -> bool {
        let mut changed = false;
        self.visit_depth_first(&mut |gadget| changed |= gadget.blueprint().is_changed());
        changed
    }

    pub fn downgrade(&self) -> WeakGadget {
        match self {
            Gadget::Window(window) => WeakGadget::Window(Rc::downgrade(window)),
            Gadget::View(view) => WeakGadget::View(Rc::downgrade(view)),
            Gadget::WindowPane(pane) => WeakGadget::WindowPane(Rc::downgrade(pane)),
            Gadget::Widget(widget) => WeakGadget::Widget(Rc::downgrade(widget)),
        }
    }
}
