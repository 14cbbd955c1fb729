//! # KnowLayout Core
//!
//! Core types and utilities for KnowLayout.
//! Provides the preference store abstraction, preference keys, observable
//! properties, view coordinates and the application event bus.

pub mod coordinate;
pub mod error;
pub mod event_bus;
pub mod keys;
pub mod preferences;
pub mod property;
pub mod types;

pub use coordinate::{
    CalculatorCache, CoordinateChange, LanguageCoordinate, LogicCoordinate, NavigationCoordinate,
    PremiseType, StampCoordinate, StatusSet, ViewCalculator, ViewCoordinate,
};

pub use error::{Error, PreferencesError, PreferencesResult, PropertyError, Result};

pub use event_bus::{
    AppEvent, EventBus, EventBusConfig, EventCategory, EventFilter, LifecycleChange, StatusReport,
    SubscriptionId, WindowEvent,
};

pub use keys::{
    AppKey, ContextKey, GadgetKey, GadgetKind, KeyGroup, PaneKey, PreferenceKey, PreferenceValue,
    WidgetKey, WindowKey,
};

pub use preferences::{
    MemoryPreferences, PreferenceTree, PreferencesBackend, PreferencesNode, StoredValue,
};

pub use property::{
    bind_bidirectional, PersistentSlot, PreferenceProperty, Property, PropertySet, Subscription,
    WeakProperty,
};

pub use types::{shared, shared_vec, Shared, SharedVec, UiCallback};
