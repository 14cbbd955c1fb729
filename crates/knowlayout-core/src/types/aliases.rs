//! Type aliases for commonly used complex types.
//!
//! Gadgets, properties and contexts live on the UI thread and share state
//! through `Rc<RefCell<T>>`.

use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
pub type Shared<T> = Rc<RefCell<T>>;

/// A shared vector for single-threaded collection management.
pub type SharedVec<T> = Rc<RefCell<Vec<T>>>;

/// A UI-thread callback with no arguments.
pub type UiCallback = Rc<dyn Fn()>;

/// Create a new `Shared<T>` from a value.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Create a new empty `SharedVec<T>`.
#[inline]
pub fn shared_vec<T>() -> SharedVec<T> {
    Rc::new(RefCell::new(Vec::new()))
}
