//! Type system utilities and aliases.
//!
//! - [`aliases`]: Type aliases for `Rc<RefCell<T>>`, shared vectors, callbacks

pub mod aliases;

pub use aliases::*;
