//! Event type definitions for the event bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root event enum for all application events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AppEvent {
    /// Orchestrator lifecycle transitions
    Lifecycle(LifecycleChange),
    /// Window creation, persistence and closing
    Window(WindowEvent),
    /// User-facing status reports
    Status(StatusReport),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Lifecycle(_) => EventCategory::Lifecycle,
            AppEvent::Window(_) => EventCategory::Window,
            AppEvent::Status(_) => EventCategory::Status,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Lifecycle(change) => format!("Lifecycle {} -> {}", change.from, change.to),
            AppEvent::Window(e) => e.description(),
            AppEvent::Status(report) => format!("Status: {}", report.message),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Lifecycle,
    Window,
    Status,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Lifecycle => write!(f, "Lifecycle"),
            EventCategory::Window => write!(f, "Window"),
            EventCategory::Status => write!(f, "Status"),
        }
    }
}

/// A lifecycle state change, named by state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifecycleChange {
    pub from: String,
    pub to: String,
}

/// Window-related events, keyed by the window's preference node path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WindowEvent {
    /// A window was created by a factory.
    Created {
        /// Preference node of the window.
        path: String,
        /// Type tag of the producing factory.
        factory: String,
    },
    /// A window was restored from its preference node.
    Restored { path: String, factory: String },
    /// Window and every nested gadget saved.
    Saved { path: String },
    /// Window and every nested gadget reverted to the store.
    Reverted { path: String },
    /// Window subtree removed from the store.
    Deleted { path: String },
    /// Window subtree copied to the shared layouts and removed.
    SavedAsLayout {
        path: String,
        /// Path of the shared layout copy.
        layout: String,
    },
    /// A close request was consumed and the window stays open.
    CloseCancelled { path: String },
}

impl WindowEvent {
    pub fn path(&self) -> &str {
        match self {
            WindowEvent::Created { path, .. }
            | WindowEvent::Restored { path, .. }
            | WindowEvent::Saved { path }
            | WindowEvent::Reverted { path }
            | WindowEvent::Deleted { path }
            | WindowEvent::SavedAsLayout { path, .. }
            | WindowEvent::CloseCancelled { path } => path,
        }
    }

    pub fn description(&self) -> String {
        match self {
            WindowEvent::Created { path, factory } => format!("Window {path} created by {factory}"),
            WindowEvent::Restored { path, factory } => {
                format!("Window {path} restored by {factory}")
            }
            WindowEvent::Saved { path } => format!("Window {path} saved"),
            WindowEvent::Reverted { path } => format!("Window {path} reverted"),
            WindowEvent::Deleted { path } => format!("Window {path} deleted"),
            WindowEvent::SavedAsLayout { path, layout } => {
                format!("Window {path} saved as layout {layout}")
            }
            WindowEvent::CloseCancelled { path } => format!("Window {path} kept open"),
        }
    }
}

/// A status message with the time it was reported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusReport {
    pub message: String,
    pub at: DateTime<Utc>,
}

impl StatusReport {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            at: Utc::now(),
        }
    }
}
