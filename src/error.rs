//! Error types for the orchestrator.

use knowlayout_core::PreferencesError;
use knowlayout_layout::LayoutError;
use knowlayout_settings::{ConfigError, SettingsError};
use thiserror::Error;

use crate::lifecycle::{Lifecycle, LifecycleEvent};

/// Errors raised while bootstrapping and driving the application.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The lifecycle does not accept `event` in its current state.
    #[error("Invalid lifecycle transition from {current} on {event:?}")]
    InvalidTransition {
        current: Lifecycle,
        event: LifecycleEvent,
    },

    /// No provider is registered for a required service.
    #[error("No {service} registered")]
    MissingService { service: &'static str },

    /// No configured data source can be selected.
    #[error("No data source available: {0}")]
    NoDataSource(String),

    /// A data source was selected but failed to load.
    #[error("Data source '{name}' failed to load: {reason}")]
    DataSource { name: String, reason: String },

    /// A menu command names a window or layout that cannot be found.
    #[error("Nothing to restore at {path}")]
    NotRestorable { path: String },

    /// The operation needs a loaded data source.
    #[error("Not available while {state}")]
    NotRunning { state: Lifecycle },

    /// A command arrived after shutdown.
    #[error("Orchestrator is shut down")]
    ShutDown,

    /// A background worker stopped without answering.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// The worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Preferences(#[from] PreferencesError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for orchestrator operations.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_names_state_and_event() {
        let err = OrchestratorError::InvalidTransition {
            current: Lifecycle::Running,
            event: LifecycleEvent::Started,
        };
        assert_eq!(
            err.to_string(),
            "Invalid lifecycle transition from Running on Started"
        );
    }

    #[test]
    fn test_layout_errors_pass_through() {
        let err: OrchestratorError = LayoutError::UnknownFactory {
            tag: "x".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "No factory registered for type tag 'x'");
    }
}
