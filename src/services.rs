//! Service-provider surface of the orchestrator.
//!
//! Data-source services run on the worker pool and report back over a
//! channel. Menu and window providers run on the UI thread and are asked
//! for their items whenever the menu bar is rebuilt.

use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use knowlayout_layout::{
    new_window_actions, restore_window_actions, shared_layout_actions, LayoutEnv, LayoutResult,
    MenuCommand, MenuItem, NewWindowAction, RestoreAction,
};
use knowlayout_settings::{DataSourceKind, DataSourceSettings, OrchestratorSettings};
use tokio::sync::mpsc;

use crate::error::{OrchestratorError, OrchestratorResult};

/// Results sent from the worker pool to the UI thread.
#[derive(Debug)]
pub enum ServiceMessage {
    Selected(OrchestratorResult<DataSourceSettings>),
    Loaded(OrchestratorResult<LoadedData>),
    Status(String),
}

/// Lets background services post status lines to the orchestrator.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    tx: mpsc::UnboundedSender<ServiceMessage>,
}

impl StatusReporter {
    pub fn new(tx: mpsc::UnboundedSender<ServiceMessage>) -> Self {
        Self { tx }
    }

    /// Post a status line; dropped silently once the orchestrator is gone
    pub fn report(&self, message: impl Into<String>) {
        let _ = self.tx.send(ServiceMessage::Status(message.into()));
    }
}

/// Summary of a loaded data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedData {
    pub source: String,
    pub kind: DataSourceKind,
    pub loaded_at: DateTime<Utc>,
}

/// Picks the data source to open.
#[async_trait]
pub trait SelectDataService: Send + Sync {
    async fn select_data_source(
        &self,
        settings: OrchestratorSettings,
        status: StatusReporter,
    ) -> OrchestratorResult<DataSourceSettings>;
}

/// Opens a selected data source.
#[async_trait]
pub trait StartDataService: Send + Sync {
    async fn start_data_source(
        &self,
        source: DataSourceSettings,
        status: StatusReporter,
    ) -> OrchestratorResult<LoadedData>;
}

/// Selects the configured default, or the first configured source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfiguredSelectDataService;

#[async_trait]
impl SelectDataService for ConfiguredSelectDataService {
    async fn select_data_source(
        &self,
        settings: OrchestratorSettings,
        status: StatusReporter,
    ) -> OrchestratorResult<DataSourceSettings> {
        let preferred = settings
            .default_data_source
            .as_deref()
            .and_then(|name| settings.data_sources.iter().find(|s| s.name == name));
        let source = preferred
            .or_else(|| settings.data_sources.first())
            .cloned()
            .ok_or_else(|| OrchestratorError::NoDataSource("none configured".to_string()))?;
        status.report(format!("Selected data source {}", source.name));
        Ok(source)
    }
}

/// Opens embedded data and local directories.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStartDataService;

#[async_trait]
impl StartDataService for LocalStartDataService {
    async fn start_data_source(
        &self,
        source: DataSourceSettings,
        status: StatusReporter,
    ) -> OrchestratorResult<LoadedData> {
        status.report(format!("Loading {} data source {}", source.kind, source.name));
        let failure = |reason: String| OrchestratorError::DataSource {
            name: source.name.clone(),
            reason,
        };
        match source.kind {
            DataSourceKind::Embedded => {}
            DataSourceKind::Directory => {
                let metadata = tokio::fs::metadata(Path::new(&source.location))
                    .await
                    .map_err(|err| failure(format!("{}: {err}", source.location)))?;
                if !metadata.is_dir() {
                    return Err(failure(format!("{} is not a directory", source.location)));
                }
            }
            DataSourceKind::Remote => {
                return Err(failure("remote data sources are not served locally".to_string()))
            }
        }
        tracing::info!(source = %source.name, kind = %source.kind, "data source loaded");
        Ok(LoadedData {
            source: source.name,
            kind: source.kind,
            loaded_at: Utc::now(),
        })
    }
}

/// Contributes items to named menus of the main menu bar.
pub trait MenuProvider {
    /// `(menu name, item)` pairs, in the order they should appear
    fn menu_items(&self, env: &LayoutEnv) -> Vec<(String, MenuItem)>;
}

/// Offers actions that create new windows.
pub trait WindowCreateProvider {
    fn create_window_actions(&self, env: &LayoutEnv) -> Vec<NewWindowAction>;
}

/// Offers actions that restore stored windows.
pub trait WindowRestoreProvider {
    fn restore_window_actions(&self, env: &LayoutEnv) -> LayoutResult<Vec<RestoreAction>>;
}

/// File menu with the quit command.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileMenuProvider;

impl MenuProvider for FileMenuProvider {
    fn menu_items(&self, _env: &LayoutEnv) -> Vec<(String, MenuItem)> {
        vec![(
            "File".to_string(),
            MenuItem::action("Quit", MenuCommand::Quit),
        )]
    }
}

/// New-window actions for every registered window factory, and restore
/// actions for every stamped private window.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutWindowProvider;

impl WindowCreateProvider for LayoutWindowProvider {
    fn create_window_actions(&self, env: &LayoutEnv) -> Vec<NewWindowAction> {
        new_window_actions(env)
    }
}

impl WindowRestoreProvider for LayoutWindowProvider {
    fn restore_window_actions(&self, env: &LayoutEnv) -> LayoutResult<Vec<RestoreAction>> {
        restore_window_actions(env)
    }
}

/// Restore actions for layouts saved to the shared namespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct SharedLayoutProvider;

impl WindowRestoreProvider for SharedLayoutProvider {
    fn restore_window_actions(&self, env: &LayoutEnv) -> LayoutResult<Vec<RestoreAction>> {
        shared_layout_actions(env)
    }
}

/// Every service and provider the orchestrator talks to.
#[derive(Default)]
pub struct ServiceRegistry {
    select_data: Option<Arc<dyn SelectDataService>>,
    start_data: Option<Arc<dyn StartDataService>>,
    menu_providers: Vec<Rc<dyn MenuProvider>>,
    window_create: Vec<Rc<dyn WindowCreateProvider>>,
    window_restore: Vec<Rc<dyn WindowRestoreProvider>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local data services plus the built-in menu and window providers
    pub fn with_defaults() -> Self {
        Self::new()
            .with_select_data(Arc::new(ConfiguredSelectDataService))
            .with_start_data(Arc::new(LocalStartDataService))
            .with_menu_provider(Rc::new(FileMenuProvider))
            .with_window_create(Rc::new(LayoutWindowProvider))
            .with_window_restore(Rc::new(LayoutWindowProvider))
            .with_window_restore(Rc::new(SharedLayoutProvider))
    }

    pub fn with_select_data(mut self, service: Arc<dyn SelectDataService>) -> Self {
        self.select_data = Some(service);
        self
    }

    pub fn with_start_data(mut self, service: Arc<dyn StartDataService>) -> Self {
        self.start_data = Some(service);
        self
    }

    pub fn with_menu_provider(mut self, provider: Rc<dyn MenuProvider>) -> Self {
        self.menu_providers.push(provider);
        self
    }

    pub fn with_window_create(mut self, provider: Rc<dyn WindowCreateProvider>) -> Self {
        self.window_create.push(provider);
        self
    }

    pub fn with_window_restore(mut self, provider: Rc<dyn WindowRestoreProvider>) -> Self {
        self.window_restore.push(provider);
        self
    }

    pub fn select_data(&self) -> OrchestratorResult<Arc<dyn SelectDataService>> {
        self.select_data
            .clone()
            .ok_or(OrchestratorError::MissingService {
                service: "select data service",
            })
    }

    pub fn start_data(&self) -> OrchestratorResult<Arc<dyn StartDataService>> {
        self.start_data
            .clone()
            .ok_or(OrchestratorError::MissingService {
                service: "start data service",
            })
    }

    pub fn menu_providers(&self) -> &[Rc<dyn MenuProvider>] {
        &self.menu_providers
    }

    pub fn window_create_providers(&self) -> &[Rc<dyn WindowCreateProvider>] {
        &self.window_create
    }

    pub fn window_restore_providers(&self) -> &[Rc<dyn WindowRestoreProvider>] {
        &self.window_restore
    }

    /// Restore actions from every provider; a failing provider is logged
    /// and skipped.
    pub fn restore_actions(&self, env: &LayoutEnv) -> Vec<RestoreAction> {
        let mut actions = Vec::new();
        for provider in &self.window_restore {
            match provider.restore_window_actions(env) {
                Ok(found) => actions.extend(found),
                Err(err) => tracing::warn!(error = %err, "restore provider failed"),
            }
        }
        actions
    }

    pub fn create_actions(&self, env: &LayoutEnv) -> Vec<NewWindowAction> {
        self.window_create
            .iter()
            .flat_map(|provider| provider.create_window_actions(env))
            .collect()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("select_data", &self.select_data.is_some())
            .field("start_data", &self.start_data.is_some())
            .field("menu_providers", &self.menu_providers.len())
            .field("window_create", &self.window_create.len())
            .field("window_restore", &self.window_restore.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> (StatusReporter, mpsc::UnboundedReceiver<ServiceMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (StatusReporter::new(tx), rx)
    }

    fn source(name: &str, kind: DataSourceKind, location: &str) -> DataSourceSettings {
        DataSourceSettings {
            name: name.to_string(),
            kind,
            location: location.to_string(),
        }
    }

    #[tokio::test]
    async fn test_select_prefers_configured_default() {
        let (status, mut rx) = reporter();
        let settings = OrchestratorSettings {
            worker_threads: 1,
            default_data_source: Some("second".to_string()),
            data_sources: vec![
                source("first", DataSourceKind::Embedded, ""),
                source("second", DataSourceKind::Embedded, ""),
            ],
        };
        let selected = ConfiguredSelectDataService
            .select_data_source(settings, status)
            .await
            .unwrap();
        assert_eq!(selected.name, "second");
        assert!(matches!(rx.try_recv(), Ok(ServiceMessage::Status(_))));
    }

    #[tokio::test]
    async fn test_select_falls_back_to_first_source() {
        let (status, _rx) = reporter();
        let settings = OrchestratorSettings {
            worker_threads: 1,
            default_data_source: None,
            data_sources: vec![source("only", DataSourceKind::Embedded, "")],
        };
        let selected = ConfiguredSelectDataService
            .select_data_source(settings, status)
            .await
            .unwrap();
        assert_eq!(selected.name, "only");
    }

    #[tokio::test]
    async fn test_select_without_sources_fails() {
        let (status, _rx) = reporter();
        let settings = OrchestratorSettings {
            worker_threads: 1,
            default_data_source: None,
            data_sources: Vec::new(),
        };
        let err = ConfiguredSelectDataService
            .select_data_source(settings, status)
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::NoDataSource(_)));
    }

    #[tokio::test]
    async fn test_start_checks_directory_exists() {
        let (status, _rx) = reporter();
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().to_string_lossy().to_string();
        let loaded = LocalStartDataService
            .start_data_source(
                source("local", DataSourceKind::Directory, &location),
                status.clone(),
            )
            .await
            .unwrap();
        assert_eq!(loaded.source, "local");

        let missing = dir.path().join("missing").to_string_lossy().to_string();
        let err = LocalStartDataService
            .start_data_source(source("gone", DataSourceKind::Directory, &missing), status)
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::DataSource { name, .. } if name == "gone"));
    }

    #[tokio::test]
    async fn test_start_rejects_remote_sources() {
        let (status, _rx) = reporter();
        let err = LocalStartDataService
            .start_data_source(
                source("server", DataSourceKind::Remote, "https://example.org"),
                status,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::DataSource { .. }));
    }

    #[test]
    fn test_empty_registry_reports_missing_services() {
        let registry = ServiceRegistry::new();
        assert!(matches!(
            registry.select_data(),
            Err(OrchestratorError::MissingService { .. })
        ));
        assert!(matches!(
            registry.start_data(),
            Err(OrchestratorError::MissingService { .. })
        ));
    }
}
