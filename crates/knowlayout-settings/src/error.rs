//! Error types for the settings crate.
//!
//! This module provides structured error types for configuration management,
//! preference file persistence, and validation.

use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The configuration file could not be loaded.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// The configuration file could not be saved.
    #[error("Failed to save settings: {0}")]
    SaveError(String),

    /// The configuration directory could not be found or created.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// A configuration validation error occurred.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A persistence error occurred.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Errors related to configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration key is missing.
    #[error("Missing configuration key: {0}")]
    MissingKey(String),

    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A configuration value is out of valid range.
    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },

    /// A preference namespace is not a valid absolute path.
    #[error("Invalid namespace '{key}': {reason}")]
    InvalidNamespace { key: String, reason: String },

    /// Platform is not supported for config directory resolution.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

/// Errors related to the preference file.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The preference file exists but does not hold a preference tree.
    #[error("Corrupted preference file {path}: {reason}")]
    Corrupted { path: String, reason: String },

    /// I/O error during persistence.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON error during persistence.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::LoadError("file not found".to_string());
        assert_eq!(err.to_string(), "Failed to load settings: file not found");

        let err = SettingsError::ConfigDirectory("permission denied".to_string());
        assert_eq!(err.to_string(), "Config directory error: permission denied");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ValueOutOfRange {
            key: "orchestrator.worker_threads".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Value out of range for 'orchestrator.worker_threads': 0"
        );

        let err = ConfigError::UnsupportedFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported config format: yaml");
    }

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::MissingKey("preferences.file_name".to_string());
        let settings_err: SettingsError = config_err.into();
        assert!(matches!(settings_err, SettingsError::Config(_)));

        let persist_err = PersistenceError::Corrupted {
            path: "p.json".to_string(),
            reason: "eof".to_string(),
        };
        let settings_err: SettingsError = persist_err.into();
        assert!(matches!(settings_err, SettingsError::Persistence(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let settings_err: SettingsError = io_err.into();
        assert!(matches!(settings_err, SettingsError::IoError(_)));
    }
}
