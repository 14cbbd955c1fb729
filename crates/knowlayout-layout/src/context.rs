//! Contexts and depth-first propagation to dependent gadgets.
//!
//! A [`Context`] is a named, identified view coordinate attached to one
//! context-bearing gadget, its peer. Nested gadgets that declare themselves
//! [`ContextSensitive`] follow the nearest enclosing context once the
//! composite's context has been made live with
//! [`Context::subscribe_dependent_contexts`]. Making the context live is the
//! caller's job: a freshly built window is `Detached` and nothing propagates
//! until it is subscribed.
//!
//! ```text
//! Detached --subscribe_dependent_contexts--> Live
//! Live --unsubscribe_dependent_contexts--> Detached --> delete
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use knowlayout_core::{
    shared, CalculatorCache, ContextKey, CoordinateChange, GadgetKind, KeyGroup, PersistentSlot,
    PreferenceProperty, PreferencesNode, PreferencesResult, Shared, Subscription, UiCallback,
    ViewCalculator, ViewCoordinate,
};
use uuid::Uuid;

use crate::blueprint::SaveParticipant;
use crate::error::{LayoutError, LayoutResult};
use crate::gadget::{ContextSensitive, Gadget, WeakGadget};

/// Whether coordinate changes reach the dependent gadgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationState {
    Detached,
    Live,
}

pub struct Context {
    kind: GadgetKind,
    node: PreferencesNode,
    name: PreferenceProperty<String>,
    id: PreferenceProperty<Uuid>,
    coordinate: PreferenceProperty<ViewCoordinate>,
    calculator: Shared<Arc<ViewCalculator>>,
    calculator_link: RefCell<Subscription>,
    peer: RefCell<Option<WeakGadget>>,
    state: Cell<PropagationState>,
}

impl Context {
    fn new(
        kind: GadgetKind,
        node: PreferencesNode,
        calculators: &CalculatorCache,
    ) -> LayoutResult<Self> {
        let coordinate = PreferenceProperty::new(kind, ContextKey::ViewCoordinate)?;
        let calculator = shared(calculators.get_or_create(&coordinate.get()));

        // Registered first so dependents always read the matching calculator.
        let cache = calculators.clone();
        let slot = calculator.clone();
        let calculator_link = coordinate.subscribe(move |coordinate: &ViewCoordinate| {
            let next = cache.get_or_create(coordinate);
            *slot.borrow_mut() = next;
        });

        Ok(Self {
            kind,
            node,
            name: PreferenceProperty::new(kind, ContextKey::ContextName)?,
            id: PreferenceProperty::new(kind, ContextKey::ContextUuid)?,
            coordinate,
            calculator,
            calculator_link: RefCell::new(calculator_link),
            peer: RefCell::new(None),
            state: Cell::new(PropagationState::Detached),
        })
    }

    pub fn kind(&self) -> GadgetKind {
        self.kind
    }

    pub fn node(&self) -> &PreferencesNode {
        &self.node
    }

    pub fn name(&self) -> String {
        self.name.get()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.name.set(name.into());
    }

    pub fn id(&self) -> Uuid {
        self.id.get()
    }

    pub fn coordinate(&self) -> ViewCoordinate {
        self.coordinate.get()
    }

    /// Replace the coordinate; returns whether it changed
    pub fn set_coordinate(&self, coordinate: ViewCoordinate) -> bool {
        self.coordinate.set(coordinate)
    }

    /// Apply one menu edit to the coordinate
    pub fn apply(&self, change: &CoordinateChange) -> bool {
        let next = change.apply(&self.coordinate.get());
        self.set_coordinate(next)
    }

    pub fn calculator(&self) -> Arc<ViewCalculator> {
        self.calculator.borrow().clone()
    }

    pub fn state(&self) -> PropagationState {
        self.state.get()
    }

    /// Listen for coordinate changes together with the new calculator
    pub fn on_coordinate_changed(
        &self,
        listener: impl Fn(&ViewCoordinate, &Arc<ViewCalculator>) + 'static,
    ) -> Subscription {
        let calculator = self.calculator.clone();
        self.coordinate.subscribe(move |coordinate| {
            let current = calculator.borrow().clone();
            listener(coordinate, &current);
        })
    }

    /// Attach the gadget this context belongs to
    pub fn attach_peer(&self, peer: WeakGadget) {
        *self.peer.borrow_mut() = Some(peer);
    }

    pub fn peer(&self) -> LayoutResult<Gadget> {
        self.peer
            .borrow()
            .as_ref()
            .and_then(WeakGadget::upgrade)
            .ok_or_else(|| LayoutError::PeerDropped { name: self.name() })
    }

    /// Save the name, id and coordinate keys and flush.
    pub fn save(&self) -> LayoutResult<()> {
        self.persist(&self.node)?;
        self.node.flush()?;
        Ok(())
    }

    /// Reload the name, id and coordinate keys.
    pub fn revert(&self) -> LayoutResult<()> {
        SaveParticipant::restore(self, &self.node)?;
        Ok(())
    }

    /// Remove this context's own keys; the owning gadget removes the node.
    pub fn delete(&self) -> LayoutResult<()> {
        for slot in self.slots() {
            self.node.remove(slot.key_name())?;
        }
        self.node.flush()?;
        std::mem::take(&mut *self.calculator_link.borrow_mut()).unsubscribe();
        Ok(())
    }

    /// Subscribe every context-sensitive descendant of the peer.
    ///
    /// Each descendant follows the nearest enclosing context. Returns the
    /// number of gadgets subscribed; a context that is already live returns
    /// zero without touching its descendants.
    pub fn subscribe_dependent_contexts(self: &Rc<Self>) -> LayoutResult<usize> {
        if self.state.get() == PropagationState::Live {
            tracing::debug!(context = %self.name(), "dependent contexts already subscribed");
            return Ok(0);
        }
        let peer = self.peer()?;
        let mut visited = 0;
        subscribe_below(&peer, self, &mut visited);
        self.state.set(PropagationState::Live);
        tracing::debug!(context = %self.name(), visited, "subscribed dependent contexts");
        Ok(visited)
    }

    /// Unsubscribe every context-sensitive descendant of the peer.
    ///
    /// Completes for the whole subtree before returning, so the caller may
    /// delete the subtree afterwards. Nested contexts that were made live on
    /// their own are detached too.
    pub fn unsubscribe_dependent_contexts(&self) -> LayoutResult<usize> {
        if self.state.get() == PropagationState::Detached {
            return Ok(0);
        }
        let peer = self.peer()?;
        let mut visited = 0;
        unsubscribe_below(&peer, &mut visited);
        self.state.set(PropagationState::Detached);
        tracing::debug!(context = %self.name(), visited, "unsubscribed dependent contexts");
        Ok(visited)
    }

    fn slots(&self) -> [&dyn PersistentSlot; 3] {
        [&self.name, &self.id, &self.coordinate]
    }
}

fn subscribe_below(gadget: &Gadget, context: &Rc<Context>, visited: &mut usize) {
    for child in gadget.children() {
        if let Some(sensitive) = child.as_context_sensitive() {
            sensitive.subscribe_to_context(context);
            *visited += 1;
        }
        let nearest = child.context().unwrap_or_else(|| context.clone());
        subscribe_below(&child, &nearest, visited);
    }
}

fn unsubscribe_below(gadget: &Gadget, visited: &mut usize) {
    for child in gadget.children() {
        if let Some(sensitive) = child.as_context_sensitive() {
            sensitive.unsubscribe_from_context();
            *visited += 1;
        }
        if let Some(nested) = child.context() {
            nested.state.set(PropagationState::Detached);
        }
        unsubscribe_below(&child, visited);
    }
}

impl SaveParticipant for Context {
    fn group(&self) -> KeyGroup {
        KeyGroup::Context
    }

    fn restore(&self, node: &PreferencesNode) -> PreferencesResult<()> {
        for slot in self.slots() {
            slot.restore_or_default(node)?;
        }
        if self.id.get().is_nil() {
            let fresh = Uuid::new_v4();
            tracing::warn!(node = %node, id = %fresh, "context had no id, assigning a fresh one");
            self.id.set(fresh);
            self.id.save(node)?;
        }
        Ok(())
    }

    fn persist(&self, node: &PreferencesNode) -> PreferencesResult<()> {
        for slot in self.slots() {
            slot.save(node)?;
        }
        Ok(())
    }

    fn watch(&self, on_change: UiCallback) -> Subscription {
        self.slots()
            .iter()
            .fold(Subscription::empty(), |acc, slot| {
                acc.and(slot.watch(on_change.clone()))
            })
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name.get())
            .field("id", &self.id.get())
            .field("node", &self.node.path())
            .field("state", &self.state.get())
            .finish()
    }
}

/// Builds contexts for newly created and restored gadgets.
#[derive(Debug, Clone, Default)]
pub struct ContextFactory {
    calculators: CalculatorCache,
    coordinate: ViewCoordinate,
}

impl ContextFactory {
    pub fn new(calculators: CalculatorCache) -> Self {
        Self {
            calculators,
            coordinate: ViewCoordinate::default(),
        }
    }

    /// Use `coordinate` for every newly created context
    pub fn with_coordinate(mut self, coordinate: ViewCoordinate) -> Self {
        self.coordinate = coordinate;
        self
    }

    pub fn calculators(&self) -> &CalculatorCache {
        &self.calculators
    }

    pub fn context_name(implementation: &str) -> String {
        format!("Context for {implementation}")
    }

    /// Fresh context for a new gadget, written to `node` immediately.
    ///
    /// A random id is generated unless `id` is given.
    pub fn create(
        &self,
        kind: GadgetKind,
        node: &PreferencesNode,
        implementation: &str,
        id: Option<Uuid>,
    ) -> LayoutResult<Rc<Context>> {
        let context = Context::new(kind, node.clone(), &self.calculators)?;
        context.name.set(Self::context_name(implementation));
        context.id.set(id.unwrap_or_else(Uuid::new_v4));
        context.coordinate.set(self.coordinate.clone());
        context.persist(node)?;
        Ok(Rc::new(context))
    }

    /// Context recovered from the name, id and coordinate stored on `node`
    pub fn restore(&self, kind: GadgetKind, node: &PreferencesNode) -> LayoutResult<Rc<Context>> {
        let context = Context::new(kind, node.clone(), &self.calculators)?;
        SaveParticipant::restore(&context, node)?;
        Ok(Rc::new(context))
    }
}
