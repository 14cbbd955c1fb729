//! # Event Bus Module
//!
//! Publish/subscribe channel for application-level notifications: lifecycle
//! transitions, window lifecycle, and status reports.
//!
//! ## Overview
//!
//! - Publishers emit typed [`AppEvent`]s without knowing subscribers
//! - Synchronous handlers filter by [`EventCategory`]
//! - Async consumers take a broadcast [`EventBus::receiver`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use knowlayout_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let id = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Window]),
//!     |event| tracing::info!("{}", event.description()),
//! );
//! bus.unsubscribe(id);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
