//! Shared create/restore/save/revert/delete lifecycle of every gadget.
//!
//! A [`Blueprint`] owns the gadget's preference node, its identity stamps,
//! the `changed` flag and an ordered list of [`SaveParticipant`]s. Each
//! participant persists one key group (context, geometry, transform, grid
//! placement); the blueprint walks the list in order for every operation.
//!
//! Two entry paths exist:
//!
//! * [`Blueprint::create`] stamps `INITIALIZED`, `FACTORY_CLASS` and
//!   `NAME_FOR_RESTORE`, syncs them durably, then runs the common setup.
//!   The new gadget starts changed.
//! * [`Blueprint::restore`] runs the common setup only and starts unchanged.
//!
//! Common setup loads every participant with restore-or-default, which
//! writes missing or malformed keys back as their defaults, and then wires
//! every property to mark the gadget changed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use knowlayout_core::{
    GadgetKind, KeyGroup, PreferenceKey, PreferencesNode, PreferencesResult, Property,
    PropertySet, Subscription, UiCallback,
};

use crate::error::{LayoutError, LayoutResult};
use crate::factory::GadgetFactory;
use crate::participants::GadgetIdentity;

/// One save/revert capability of a gadget.
pub trait SaveParticipant {
    fn group(&self) -> KeyGroup;

    /// Load every key from the node, healing absent ones to defaults
    fn restore(&self, node: &PreferencesNode) -> PreferencesResult<()>;

    /// Write every key to the node
    fn persist(&self, node: &PreferencesNode) -> PreferencesResult<()>;

    /// Call `on_change` on any value change
    fn watch(&self, on_change: UiCallback) -> Subscription;
}

impl<S: PropertySet> SaveParticipant for S {
    fn group(&self) -> KeyGroup {
        S::Key::GROUP
    }

    fn restore(&self, node: &PreferencesNode) -> PreferencesResult<()> {
        self.restore_all(node)
    }

    fn persist(&self, node: &PreferencesNode) -> PreferencesResult<()> {
        self.save_all(node)
    }

    fn watch(&self, on_change: UiCallback) -> Subscription {
        self.watch_all(on_change)
    }
}

/// Lifecycle core embedded in every gadget.
pub struct Blueprint {
    kind: GadgetKind,
    node: PreferencesNode,
    identity: Rc<GadgetIdentity>,
    participants: Vec<Rc<dyn SaveParticipant>>,
    changed: Property<bool>,
    subscriptions: RefCell<Subscription>,
}

impl Blueprint {
    /// Create path: stamp identity, sync it, then load the participants.
    pub fn create<F: GadgetFactory + ?Sized>(
        kind: GadgetKind,
        node: PreferencesNode,
        factory: &F,
        participants: Vec<Rc<dyn SaveParticipant>>,
    ) -> LayoutResult<Self> {
        if factory.kind() != kind {
            return Err(LayoutError::FactoryKindMismatch {
                tag: factory.type_tag().to_string(),
                expected: kind,
                found: factory.kind(),
            });
        }
        let identity = Rc::new(GadgetIdentity::new(kind)?);
        identity.stamp(factory);
        identity.save_all(&node)?;
        node.sync()?;
        tracing::debug!(
            kind = %kind,
            node = %node,
            tag = factory.type_tag(),
            "stamped new gadget"
        );

        let blueprint = Self::assemble(kind, node, identity, participants)?;
        blueprint.changed.set(true);
        Ok(blueprint)
    }

    /// Restore path: load the identity and participants from the node.
    pub fn restore(
        kind: GadgetKind,
        node: PreferencesNode,
        participants: Vec<Rc<dyn SaveParticipant>>,
    ) -> LayoutResult<Self> {
        let identity = Rc::new(GadgetIdentity::new(kind)?);
        let blueprint = Self::assemble(kind, node, identity, participants)?;
        tracing::debug!(kind = %kind, node = %blueprint.node, "restored gadget");
        Ok(blueprint)
    }

    fn assemble(
        kind: GadgetKind,
        node: PreferencesNode,
        identity: Rc<GadgetIdentity>,
        participants: Vec<Rc<dyn SaveParticipant>>,
    ) -> LayoutResult<Self> {
        for participant in &participants {
            if !kind.declares(participant.group()) {
                return Err(LayoutError::Property(
                    knowlayout_core::PropertyError::UndeclaredKey {
                        kind: kind.to_string(),
                        group: participant.group().to_string(),
                        key: "*".to_string(),
                    },
                ));
            }
        }

        let mut all: Vec<Rc<dyn SaveParticipant>> = Vec::with_capacity(participants.len() + 1);
        all.push(identity.clone());
        all.extend(participants);
        for participant in &all {
            participant.restore(&node)?;
        }

        let changed = Property::new(false);
        let flag = changed.downgrade();
        let mark_changed: UiCallback = Rc::new(move || {
            if let Some(flag) = flag.upgrade() {
                flag.set(true);
            }
        });
        let watches = all
            .iter()
            .fold(Subscription::empty(), |acc, participant| {
                acc.and(participant.watch(mark_changed.clone()))
            });

        Ok(Self {
            kind,
            node,
            identity,
            participants: all,
            changed,
            subscriptions: RefCell::new(watches),
        })
    }

    pub fn kind(&self) -> GadgetKind {
        self.kind
    }

    pub fn node(&self) -> &PreferencesNode {
        &self.node
    }

    pub fn identity(&self) -> &GadgetIdentity {
        &self.identity
    }

    pub fn factory_tag(&self) -> String {
        self.identity.factory_class.get()
    }

    pub fn name_for_restore(&self) -> String {
        self.identity.name_for_restore.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.identity.initialized.get()
    }

    pub fn is_changed(&self) -> bool {
        self.changed.get()
    }

    /// Observable dirty flag
    pub fn changed(&self) -> &Property<bool> {
        &self.changed
    }

    /// Keep `subscription` alive until the gadget is deleted
    pub fn retain(&self, subscription: Subscription) {
        self.subscriptions.borrow_mut().add(subscription);
    }

    /// Write every participant, flush, and clear `changed`.
    pub fn save(&self) -> LayoutResult<()> {
        for participant in &self.participants {
            participant.persist(&self.node)?;
        }
        self.node.flush()?;
        self.changed.set(false);
        Ok(())
    }

    /// Reload every participant from the store and clear `changed`.
    ///
    /// Bound host cells follow the reloaded values.
    pub fn revert(&self) -> LayoutResult<()> {
        for participant in &self.participants {
            participant.restore(&self.node)?;
        }
        self.changed.set(false);
        Ok(())
    }

    /// Remove the node subtree and flush its parent.
    ///
    /// Dependent contexts must already be unsubscribed; the host is left
    /// alone.
    pub fn delete(&self) -> LayoutResult<()> {
        let parent = self.node.parent();
        self.node.remove_node()?;
        if let Some(parent) = parent {
            parent.flush()?;
        }
        self.release();
        tracing::debug!(kind = %self.kind, node = %self.node, "deleted gadget");
        Ok(())
    }

    /// Drop every retained subscription
    pub(crate) fn release(&self) {
        std::mem::take(&mut *self.subscriptions.borrow_mut()).unsubscribe();
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("kind", &self.kind)
            .field("node", &self.node.path())
            .field("changed", &self.changed.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participants::PaneTransform;
    use crate::simple::SimpleWindowPaneFactory;
    use knowlayout_core::MemoryPreferences;
    use std::sync::Arc;

    fn pane_blueprint(node: &PreferencesNode) -> (Blueprint, Rc<PaneTransform>) {
        let transform = Rc::new(PaneTransform::new().unwrap());
        let blueprint = Blueprint::create(
            GadgetKind::WindowPane,
            node.clone(),
            &SimpleWindowPaneFactory,
            vec![transform.clone() as Rc<dyn SaveParticipant>],
        )
        .unwrap();
        (blueprint, transform)
    }

    #[test]
    fn test_create_stamps_identity_and_starts_changed() {
        let node = MemoryPreferences::root().child("pane").unwrap();
        let (blueprint, _) = pane_blueprint(&node);
        assert!(blueprint.is_initialized());
        assert!(blueprint.is_changed());
        assert_eq!(blueprint.factory_tag(), SimpleWindowPaneFactory.type_tag());
        assert!(blueprint
            .name_for_restore()
            .starts_with(SimpleWindowPaneFactory.gadget_name()));
        assert!(node.get_bool("INITIALIZED", false).unwrap());
    }

    #[test]
    fn test_create_rejects_factory_of_other_kind() {
        let node = MemoryPreferences::root().child("pane").unwrap();
        let result = Blueprint::create(
            GadgetKind::Window,
            node,
            &SimpleWindowPaneFactory,
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(LayoutError::FactoryKindMismatch { .. })
        ));
    }

    #[test]
    fn test_undeclared_participant_group_fails_fast() {
        let node = MemoryPreferences::root().child("widget").unwrap();
        let transform: Rc<dyn SaveParticipant> = Rc::new(PaneTransform::new().unwrap());
        let result = Blueprint::restore(GadgetKind::Widget, node, vec![transform]);
        assert!(matches!(result, Err(LayoutError::Property(_))));
    }

    #[test]
    fn test_save_is_idempotent_and_clears_changed() {
        let backend = Arc::new(MemoryPreferences::new());
        let node = PreferencesNode::root(backend.clone()).child("pane").unwrap();
        let (blueprint, transform) = pane_blueprint(&node);

        transform.rotate.set(45.0);
        assert!(blueprint.is_changed());
        blueprint.save().unwrap();
        let first = backend.snapshot();
        assert!(!blueprint.is_changed());

        blueprint.save().unwrap();
        assert_eq!(backend.snapshot(), first);
        assert!(!blueprint.is_changed());
        assert_eq!(node.get_double("ROTATE", 0.0).unwrap(), 45.0);
    }

    #[test]
    fn test_revert_discards_unsaved_edits() {
        let node = MemoryPreferences::root().child("pane").unwrap();
        let (blueprint, transform) = pane_blueprint(&node);
        blueprint.save().unwrap();

        transform.scale_x.set(3.0);
        assert!(blueprint.is_changed());
        blueprint.revert().unwrap();
        assert_eq!(transform.scale_x.get(), 1.0);
        assert!(!blueprint.is_changed());
    }

    #[test]
    fn test_restore_heals_missing_keys_and_starts_unchanged() {
        let node = MemoryPreferences::root().child("pane").unwrap();
        let transform = Rc::new(PaneTransform::new().unwrap());
        let participants = vec![transform as Rc<dyn SaveParticipant>];
        let blueprint =
            Blueprint::restore(GadgetKind::WindowPane, node.clone(), participants).unwrap();
        assert!(!blueprint.is_changed());
        assert_eq!(node.get_raw("SCALE_Y").unwrap().as_deref(), Some("1"));
        assert_eq!(node.get_raw("INITIALIZED").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_delete_removes_subtree_and_stops_change_tracking() {
        let node = MemoryPreferences::root().child("pane").unwrap();
        let (blueprint, transform) = pane_blueprint(&node);
        blueprint.save().unwrap();
        blueprint.delete().unwrap();

        assert!(!node.exists());
        transform.rotate.set(90.0);
        assert!(!blueprint.is_changed());
        assert!(matches!(
            blueprint.save(),
            Err(LayoutError::Preferences(
                knowlayout_core::PreferencesError::NodeRemoved { .. }
            ))
        ));
    }
}
