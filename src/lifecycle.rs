//! Application lifecycle state machine.
//!
//! ```text
//! Starting ──Started──▶ SelectDataSource ──DataSourceSelected──▶ SelectedDataSource
//!                             ▲                                        │
//!                         LoadFailed                               LoadStarted
//!                             │                                        ▼
//!                  Running ◀──LoadCompleted── LoadingDataSource ◀──────┘
//! ```
//!
//! `ShutdownRequested` moves any live state to `Shutdown`, which is final.

use std::fmt;

/// Where the application is in its startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Starting,
    /// Waiting for the user or a default to pick a data source
    SelectDataSource,
    /// A data source is chosen; the main menu bar is built
    SelectedDataSource,
    /// The chosen data source is loading on the worker pool
    LoadingDataSource,
    Running,
    Shutdown,
}

/// Something that moves the lifecycle forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Started,
    DataSourceSelected,
    LoadStarted,
    LoadCompleted,
    LoadFailed,
    ShutdownRequested,
}

impl Lifecycle {
    /// State reached from this one on `event`, if the event is allowed here.
    pub fn on(self, event: LifecycleEvent) -> Option<Lifecycle> {
        use Lifecycle::*;
        use LifecycleEvent::*;
        match (self, event) {
            (Shutdown, _) => None,
            (_, ShutdownRequested) => Some(Shutdown),
            (Starting, Started) => Some(SelectDataSource),
            (SelectDataSource, DataSourceSelected) => Some(SelectedDataSource),
            (SelectedDataSource, LoadStarted) => Some(LoadingDataSource),
            (LoadingDataSource, LoadCompleted) => Some(Running),
            (LoadingDataSource, LoadFailed) => Some(SelectDataSource),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Lifecycle::Running)
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, Lifecycle::Shutdown)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "Starting"),
            Self::SelectDataSource => write!(f, "SelectDataSource"),
            Self::SelectedDataSource => write!(f, "SelectedDataSource"),
            Self::LoadingDataSource => write!(f, "LoadingDataSource"),
            Self::Running => write!(f, "Running"),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}
