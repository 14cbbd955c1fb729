//! Properties backed by preference keys.

use std::fmt;
use std::rc::Rc;

use super::cell::Property;
use super::subscription::Subscription;
use crate::error::{PreferencesResult, PropertyError};
use crate::keys::{GadgetKind, KeyGroup, PreferenceKey};
use crate::preferences::{PreferencesNode, StoredValue};

/// A typed observable value tied to one preference key.
///
/// Construction only binds the property to its key; the owning gadget fills
/// it through [`PreferenceProperty::restore_or_default`].
pub struct PreferenceProperty<T: StoredValue> {
    property: Property<T>,
    key_name: &'static str,
    group: KeyGroup,
    default: T,
}

impl<T: StoredValue> PreferenceProperty<T> {
    /// Bind a property to `key` for a gadget of `kind`.
    ///
    /// Fails when the kind does not declare the key's group, or when the
    /// key's default is not a `T`.
    pub fn new<K: PreferenceKey>(kind: GadgetKind, key: K) -> Result<Self, PropertyError> {
        if !kind.declares(K::GROUP) {
            return Err(PropertyError::UndeclaredKey {
                kind: kind.to_string(),
                group: K::GROUP.to_string(),
                key: key.key_name().to_string(),
            });
        }
        let default =
            T::from_default(&key.default_value()).ok_or(PropertyError::DefaultTypeMismatch {
                key: key.key_name().to_string(),
                expected: T::TYPE_NAME,
            })?;
        Ok(Self {
            property: Property::new(default.clone()),
            key_name: key.key_name(),
            group: K::GROUP,
            default,
        })
    }

    pub fn key_name(&self) -> &'static str {
        self.key_name
    }

    pub fn group(&self) -> KeyGroup {
        self.group
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// The underlying observable cell
    pub fn property(&self) -> &Property<T> {
        &self.property
    }

    pub fn get(&self) -> T {
        self.property.get()
    }

    pub fn set(&self, value: T) -> bool {
        self.property.set(value)
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.property.subscribe(listener)
    }

    /// Load the stored value, or the default when absent or malformed.
    ///
    /// A default that had to be used is written back so the node holds an
    /// explicit value afterwards.
    pub fn restore_or_default(&self, node: &PreferencesNode) -> PreferencesResult<()> {
        let value = match node.get_raw(self.key_name)? {
            Some(raw) => match T::decode(&raw) {
                Some(value) => value,
                None => {
                    tracing::warn!(
                        node = %node,
                        key = self.key_name,
                        raw = %raw,
                        expected = T::TYPE_NAME,
                        "malformed preference value, restoring default"
                    );
                    node.put(self.key_name, &self.default)?;
                    self.default.clone()
                }
            },
            None => {
                node.put(self.key_name, &self.default)?;
                self.default.clone()
            }
        };
        self.property.set(value);
        Ok(())
    }

    /// Write the current value to the node
    pub fn save(&self, node: &PreferencesNode) -> PreferencesResult<()> {
        node.put(self.key_name, &self.property.get())
    }
}

impl<T: StoredValue> fmt::Debug for PreferenceProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceProperty")
            .field("key", &self.key_name)
            .field("value", &self.property.get())
            .finish()
    }
}

/// Type-erased view of a preference property.
pub trait PersistentSlot {
    fn key_name(&self) -> &'static str;

    fn restore_or_default(&self, node: &PreferencesNode) -> PreferencesResult<()>;

    fn save(&self, node: &PreferencesNode) -> PreferencesResult<()>;

    /// Call `on_change` whenever the value changes
    fn watch(&self, on_change: Rc<dyn Fn()>) -> Subscription;
}

impl<T: StoredValue> PersistentSlot for PreferenceProperty<T> {
    fn key_name(&self) -> &'static str {
        self.key_name
    }

    fn restore_or_default(&self, node: &PreferencesNode) -> PreferencesResult<()> {
        PreferenceProperty::restore_or_default(self, node)
    }

    fn save(&self, node: &PreferencesNode) -> PreferencesResult<()> {
        PreferenceProperty::save(self, node)
    }

    fn watch(&self, on_change: Rc<dyn Fn()>) -> Subscription {
        self.property.subscribe(move |_| on_change())
    }
}

/// One preference property per key of a group.
///
/// Implementors map each key to its slot; loading, saving and change
/// watching then run over the keys in enumeration order.
pub trait PropertySet {
    type Key: PreferenceKey;

    fn slot(&self, key: Self::Key) -> &dyn PersistentSlot;

    fn restore_all(&self, node: &PreferencesNode) -> PreferencesResult<()> {
        for key in Self::Key::all() {
            self.slot(*key).restore_or_default(node)?;
        }
        Ok(())
    }

    fn save_all(&self, node: &PreferencesNode) -> PreferencesResult<()> {
        for key in Self::Key::all() {
            self.slot(*key).save(node)?;
        }
        Ok(())
    }

    fn watch_all(&self, on_change: Rc<dyn Fn()>) -> Subscription {
        Self::Key::all()
            .iter()
            .fold(Subscription::empty(), |acc, key| {
                acc.and(self.slot(*key).watch(on_change.clone()))
            })
    }
}
