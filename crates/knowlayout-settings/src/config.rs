//! Configuration and settings management for KnowLayout
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats, chosen by file extension.
//!
//! Configuration is organized into logical sections:
//! - Preference store (file name and well-known namespaces)
//! - Orchestrator (worker pool and data sources)
//! - Logging (default filter directive)

use knowlayout_core::preferences::validate_path;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Preference store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesSettings {
    /// Preference file, relative to the config directory
    pub file_name: String,
    /// Namespace holding one node per open or restorable window
    pub windows_namespace: String,
    /// Namespace holding layouts shared between users of the store
    pub layouts_namespace: String,
    /// Namespace holding application values such as the last run stamp
    pub user_namespace: String,
}

impl Default for PreferencesSettings {
    fn default() -> Self {
        Self {
            file_name: "preferences.json".to_string(),
            windows_namespace: "/windows".to_string(),
            layouts_namespace: "/shared-layouts".to_string(),
            user_namespace: "/user".to_string(),
        }
    }
}

/// Kind of backing data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// Data bundled with the application
    Embedded,
    /// A local directory
    Directory,
    /// A remote server
    Remote,
}

impl std::fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded"),
            Self::Directory => write!(f, "directory"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// One selectable data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceSettings {
    pub name: String,
    pub kind: DataSourceKind,
    /// Directory path or server URL; empty for embedded data
    #[serde(default)]
    pub location: String,
}

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    /// Size of the background worker pool
    pub worker_threads: usize,
    /// Data source selected without asking, if any
    pub default_data_source: Option<String>,
    /// Data sources offered at startup
    pub data_sources: Vec<DataSourceSettings>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            default_data_source: Some("Embedded sample".to_string()),
            data_sources: vec![DataSourceSettings {
                name: "Embedded sample".to_string(),
                kind: DataSourceKind::Embedded,
                location: String::new(),
            }],
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub preferences: PreferencesSettings,
    pub orchestrator: OrchestratorSettings,
    pub logging: LoggingSettings,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match Self::format_of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Self::format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.preferences.file_name.trim().is_empty() {
            return Err(ConfigError::MissingKey("preferences.file_name".to_string()));
        }

        let namespaces = [
            ("preferences.windows_namespace", &self.preferences.windows_namespace),
            ("preferences.layouts_namespace", &self.preferences.layouts_namespace),
            ("preferences.user_namespace", &self.preferences.user_namespace),
        ];
        for (key, namespace) in namespaces {
            if namespace.as_str() == "/" {
                return Err(ConfigError::InvalidNamespace {
                    key: key.to_string(),
                    reason: "the root node cannot be a namespace".to_string(),
                });
            }
            validate_path(namespace).map_err(|e| ConfigError::InvalidNamespace {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        }
        for (i, (key, namespace)) in namespaces.iter().enumerate() {
            for (_, other) in &namespaces[i + 1..] {
                if namespace == other {
                    return Err(ConfigError::InvalidNamespace {
                        key: key.to_string(),
                        reason: format!("{} is used twice", namespace),
                    });
                }
            }
        }

        if self.orchestrator.worker_threads == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "orchestrator.worker_threads".to_string(),
                value: "0".to_string(),
            });
        }

        if let Some(default) = &self.orchestrator.default_data_source {
            if self.data_source(default).is_none() {
                return Err(ConfigError::MissingKey(format!(
                    "orchestrator.data_sources[{}]",
                    default
                )));
            }
        }

        Ok(())
    }

    /// Look up a configured data source by name
    pub fn data_source(&self, name: &str) -> Option<&DataSourceSettings> {
        self.orchestrator
            .data_sources
            .iter()
            .find(|source| source.name == name)
    }

    fn format_of(path: &Path) -> SettingsResult<Format> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("<none>").to_string()).into()),
        }
    }
}

enum Format {
    Json,
    Toml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default();
        config.orchestrator.worker_threads = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_namespaces_must_be_distinct_absolute_paths() {
        let mut config = Config::default();
        config.preferences.layouts_namespace = "layouts".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNamespace { .. })
        ));

        let mut config = Config::default();
        config.preferences.user_namespace = config.preferences.windows_namespace.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_default_data_source_rejected() {
        let mut config = Config::default();
        config.orchestrator.default_data_source = Some("Missing".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::MissingKey(_))));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[orchestrator]\nworker_threads = 4\n").unwrap();
        assert_eq!(config.orchestrator.worker_threads, 4);
        assert_eq!(config.preferences, PreferencesSettings::default());
    }
}
