//! KnowLayout Settings Crate
//!
//! Handles application configuration, the settings directory, and the
//! file-backed preference store.

pub mod config;
pub mod error;
pub mod manager;
pub mod persistence;

pub use config::{
    Config, DataSourceKind, DataSourceSettings, LoggingSettings, OrchestratorSettings,
    PreferencesSettings,
};
pub use error::{
    ConfigError, ConfigResult, PersistenceError, PersistenceResult, SettingsError, SettingsResult,
};
pub use manager::SettingsManager;
pub use persistence::FilePreferences;
