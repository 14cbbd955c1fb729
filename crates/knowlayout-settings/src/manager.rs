//! Settings directory and configuration lifecycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ConfigError, SettingsError, SettingsResult};
use crate::persistence::FilePreferences;

const APP_DIR: &str = "knowlayout";
const CONFIG_FILE: &str = "config.toml";

/// Owns the loaded configuration and the directory it came from
#[derive(Debug, Clone)]
pub struct SettingsManager {
    config_dir: PathBuf,
    config: Config,
}

impl SettingsManager {
    /// Platform config directory for the application
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| {
                ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into()
            })
    }

    /// Create the platform config directory if needed
    pub fn ensure_config_dir() -> SettingsResult<PathBuf> {
        let dir = Self::config_dir()?;
        std::fs::create_dir_all(&dir)
            .map_err(|e| SettingsError::ConfigDirectory(format!("{}: {}", dir.display(), e)))?;
        Ok(dir)
    }

    pub fn config_file_path() -> SettingsResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load from the platform config directory
    pub fn load() -> SettingsResult<Self> {
        Self::load_from_dir(Self::ensure_config_dir()?)
    }

    /// Load `config.toml` from `dir`, writing defaults when it is missing
    pub fn load_from_dir(dir: impl Into<PathBuf>) -> SettingsResult<Self> {
        let config_dir = dir.into();
        std::fs::create_dir_all(&config_dir).map_err(|e| {
            SettingsError::ConfigDirectory(format!("{}: {}", config_dir.display(), e))
        })?;
        let path = config_dir.join(CONFIG_FILE);
        let config = if path.exists() {
            Config::load_from_file(&path)?
        } else {
            tracing::info!("Writing default configuration to {}", path.display());
            let config = Config::default();
            config.save_to_file(&path)?;
            config
        };
        Ok(Self { config_dir, config })
    }

    /// Load a configuration file outside the config directory
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let config = Config::load_from_file(path)?;
        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self { config_dir, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn directory(&self) -> &Path {
        &self.config_dir
    }

    /// Write the configuration back to `config.toml`
    pub fn save(&self) -> SettingsResult<()> {
        self.config.save_to_file(&self.config_dir.join(CONFIG_FILE))
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.config_dir.join(&self.config.preferences.file_name)
    }

    /// Open the preference file named by the configuration
    pub fn open_preferences(&self) -> SettingsResult<Arc<FilePreferences>> {
        Ok(Arc::new(FilePreferences::open(self.preferences_path())?))
    }
}
