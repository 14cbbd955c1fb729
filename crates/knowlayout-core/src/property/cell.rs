//! Observable cell and bidirectional binding.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::subscription::Subscription;

type Listener<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: RefCell<T>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_id: Cell<u64>,
}

/// A single-threaded observable value.
///
/// `set` notifies every listener synchronously on the calling thread, after
/// the new value is stored. Setting a value equal to the current one is a
/// no-op and notifies nobody. Listeners may read or set other properties,
/// including this one.
pub struct Property<T> {
    inner: Rc<Inner<T>>,
}

/// Non-owning reference to a [`Property`].
pub struct WeakProperty<T> {
    inner: Weak<Inner<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Clone for WeakProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value without cloning
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Store a value; returns whether it changed
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value.clone();
        }
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&value);
        }
        true
    }

    /// Register a listener called with every new value
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn downgrade(&self) -> WeakProperty<T> {
        WeakProperty {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> WeakProperty<T> {
    pub fn upgrade(&self) -> Option<Property<T>> {
        self.inner.upgrade().map(|inner| Property { inner })
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.inner.value.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

/// Keep two properties in step.
///
/// `target` first takes the value of `source`; afterwards a change on either
/// side is copied to the other. A change settles in one pass: the copy made
/// while propagating does not echo back. If the receiving side replaces the
/// copied value from one of its own listeners (a host clamping a width, say),
/// the replacement is copied back once so both sides hold what the receiver
/// settled on. The binding holds only weak references, so it never keeps
/// either property alive.
pub fn bind_bidirectional<T>(source: &Property<T>, target: &Property<T>) -> Subscription
where
    T: Clone + PartialEq + 'static,
{
    target.set(source.get());
    let propagating = Rc::new(Cell::new(false));
    let correcting = Rc::new(Cell::new(false));
    let forward = mirror(source, target, propagating.clone(), correcting.clone());
    let backward = mirror(target, source, propagating, correcting);
    forward.and(backward)
}

fn mirror<T>(
    from: &Property<T>,
    to: &Property<T>,
    propagating: Rc<Cell<bool>>,
    correcting: Rc<Cell<bool>>,
) -> Subscription
where
    T: Clone + PartialEq + 'static,
{
    let source = from.downgrade();
    let to = to.downgrade();
    from.subscribe(move |value| {
        if propagating.get() {
            return;
        }
        let Some(to) = to.upgrade() else {
            return;
        };
        propagating.set(true);
        to.set(value.clone());
        propagating.set(false);

        // Values that never compare equal (NaN) would correct forever.
        if correcting.get() {
            return;
        }
        let settled = to.get();
        if settled != *value {
            if let Some(from) = source.upgrade() {
                correcting.set(true);
                from.set(settled);
                correcting.set(false);
            }
        }
    })
}
