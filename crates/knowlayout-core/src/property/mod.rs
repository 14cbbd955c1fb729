//! Observable properties.
//!
//! - [`Property`]: single-threaded observable cell with explicit subscriptions
//! - [`PreferenceProperty`]: a property bound to one preference key
//! - [`PropertySet`]: a fixed group of preference properties addressed by key
//!
//! Properties live on the UI thread; they are `Rc` based and deliberately not
//! `Send`.

mod cell;
mod preference;
mod subscription;

pub use cell::*;
pub use preference::*;
pub use subscription::*;
