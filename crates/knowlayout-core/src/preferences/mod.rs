//! # Preference Store
//!
//! A hierarchical namespace of nodes, each holding string-encoded key/value
//! pairs. Gadgets persist their state through [`PreferencesNode`] handles;
//! the storage engine behind them is any [`PreferencesBackend`].
//!
//! ## Overview
//!
//! - [`PreferenceTree`] is the plain data model shared by every backend
//! - [`MemoryPreferences`] keeps the tree in memory (tests, scratch sessions)
//! - File-backed persistence lives in the settings crate
//! - [`StoredValue`] maps typed values to and from their stored text

mod backend;
mod memory;
mod node;
mod tree;
mod value;

pub use backend::*;
pub use memory::*;
pub use node::*;
pub use tree::*;
pub use value::*;
