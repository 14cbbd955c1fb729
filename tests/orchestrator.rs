use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use knowlayout::{
    Lifecycle, LoadedData, Orchestrator, OrchestratorError, OrchestratorResult, ServiceRegistry,
    StartDataService, StatusReporter, RESTORE_WINDOW_MENU, WINDOW_MENU,
};
use knowlayout_core::{
    AppEvent, CoordinateChange, MemoryPreferences, PreferencesNode, StampCoordinate,
};
use knowlayout_layout::{
    CloseChoice, GadgetFactory, HeadlessToolkit, MenuCommand, ScriptedPrompt, SimpleWindowFactory,
};
use knowlayout_settings::{Config, DataSourceSettings};

const TIMEOUT: Duration = Duration::from_secs(10);

struct Session {
    root: PreferencesNode,
    prompt: Rc<ScriptedPrompt>,
}

impl Session {
    fn new() -> Self {
        Self {
            root: MemoryPreferences::root(),
            prompt: Rc::new(ScriptedPrompt::new(Some(CloseChoice::SaveAndClose))),
        }
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::headless(Config::default(), &self.root, self.prompt.clone()).unwrap()
    }

    fn running(&self) -> Orchestrator {
        let mut orchestrator = self.orchestrator();
        orchestrator.start().unwrap();
        orchestrator.run_until(Lifecycle::Running, TIMEOUT).unwrap();
        orchestrator
    }
}

fn new_simple_window() -> MenuCommand {
    MenuCommand::NewWindow {
        factory_tag: SimpleWindowFactory.type_tag().to_string(),
    }
}

struct BrokenStart;

#[async_trait]
impl StartDataService for BrokenStart {
    async fn start_data_source(
        &self,
        source: DataSourceSettings,
        _status: StatusReporter,
    ) -> OrchestratorResult<LoadedData> {
        Err(OrchestratorError::DataSource {
            name: source.name,
            reason: "index is corrupt".to_string(),
        })
    }
}

#[test]
fn test_startup_reaches_running() {
    let session = Session::new();
    let mut orchestrator = session.orchestrator();
    let mut events = orchestrator.events().receiver();
    assert_eq!(orchestrator.state(), Lifecycle::Starting);

    orchestrator.start().unwrap();
    orchestrator.run_until(Lifecycle::Running, TIMEOUT).unwrap();

    assert_eq!(
        orchestrator.selected_data_source().unwrap().name,
        "Embedded sample"
    );
    assert_eq!(orchestrator.loaded_data().unwrap().source, "Embedded sample");
    assert_eq!(orchestrator.status().get(), "Loaded Embedded sample");
    assert!(orchestrator.last_run().is_none());

    let mut states = vec![];
    while let Ok(event) = events.try_recv() {
        if let AppEvent::Lifecycle(change) = event {
            states.push(change.to);
        }
    }
    assert_eq!(
        states,
        vec![
            "SelectDataSource",
            "SelectedDataSource",
            "LoadingDataSource",
            "Running"
        ]
    );

    let bar = orchestrator.menu_bar().unwrap();
    assert_eq!(bar.labels(), vec!["File", "Edit", "Window"]);
}

#[test]
fn test_second_start_reports_last_run() {
    let session = Session::new();
    let first = session.running();
    drop(first);

    let mut orchestrator = session.orchestrator();
    let statuses = Rc::new(RefCell::new(Vec::new()));
    let sink = statuses.clone();
    let _watch = orchestrator
        .status()
        .subscribe(move |line: &String| sink.borrow_mut().push(line.clone()));

    orchestrator.start().unwrap();
    orchestrator.run_until(Lifecycle::Running, TIMEOUT).unwrap();

    let previous = orchestrator.last_run().unwrap().to_string();
    assert!(statuses
        .borrow()
        .contains(&format!("Last opened: {previous}")));
}

#[test]
fn test_failed_load_returns_to_selection() {
    let session = Session::new();
    let services = ServiceRegistry::with_defaults().with_start_data(Arc::new(BrokenStart));
    let mut orchestrator = Orchestrator::new(
        Config::default(),
        &session.root,
        Rc::new(HeadlessToolkit::new()),
        session.prompt.clone(),
        services,
    )
    .unwrap();

    orchestrator.start().unwrap();
    orchestrator
        .run_until(Lifecycle::LoadingDataSource, TIMEOUT)
        .unwrap();
    orchestrator
        .run_until(Lifecycle::SelectDataSource, TIMEOUT)
        .unwrap();

    assert!(orchestrator.selected_data_source().is_none());
    assert!(orchestrator.status().get().contains("index is corrupt"));
    assert!(matches!(
        orchestrator.restore_windows(),
        Err(OrchestratorError::NotRunning {
            state: Lifecycle::SelectDataSource
        })
    ));
}

#[test]
fn test_invalid_config_is_rejected() {
    let session = Session::new();
    let mut config = Config::default();
    config.orchestrator.worker_threads = 0;
    let err = Orchestrator::headless(config, &session.root, session.prompt.clone()).unwrap_err();
    assert!(matches!(err, OrchestratorError::Config(_)));
}

#[test]
fn test_missing_select_service() {
    let session = Session::new();
    let mut orchestrator = Orchestrator::new(
        Config::default(),
        &session.root,
        Rc::new(HeadlessToolkit::new()),
        session.prompt.clone(),
        ServiceRegistry::new(),
    )
    .unwrap();
    assert!(matches!(
        orchestrator.start(),
        Err(OrchestratorError::MissingService { .. })
    ));
}

#[test]
fn test_new_window_is_listed_for_restore() {
    let session = Session::new();
    let mut orchestrator = session.running();

    let window = orchestrator.dispatch(&new_simple_window()).unwrap().unwrap();
    let path = window.blueprint().node().path().to_string();
    assert!(path.starts_with("/windows/simple-window-"));
    assert!(window.is_showing());
    assert_eq!(orchestrator.windows().len(), 1);

    let restore = orchestrator
        .menu_bar()
        .and_then(|bar| bar.menu(WINDOW_MENU))
        .and_then(|menu| menu.submenu(RESTORE_WINDOW_MENU))
        .unwrap();
    assert_eq!(
        restore.commands(),
        vec![&MenuCommand::RestoreWindow { path: path.clone() }]
    );
}

#[test]
fn test_close_then_restore_window() {
    let session = Session::new();
    let mut orchestrator = session.running();
    let window = orchestrator.dispatch(&new_simple_window()).unwrap().unwrap();
    window.geometry().width.set(640.0);
    let path = window.blueprint().node().path().to_string();

    assert!(orchestrator.close_window(&window).unwrap());
    assert_eq!(session.prompt.asked(), 1);
    assert!(orchestrator.windows().is_empty());

    let restored = orchestrator
        .dispatch(&MenuCommand::RestoreWindow { path: path.clone() })
        .unwrap()
        .unwrap();
    assert_eq!(restored.blueprint().node().path(), path);
    assert_eq!(restored.geometry().width.get(), 640.0);
}

#[test]
fn test_restore_unknown_path() {
    let session = Session::new();
    let mut orchestrator = session.running();
    let err = orchestrator
        .dispatch(&MenuCommand::RestoreWindow {
            path: "/windows/nowhere".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::NotRestorable { .. }));
}

#[test]
fn test_change_view_targets_front_window() {
    let session = Session::new();
    let mut orchestrator = session.running();
    let back = orchestrator.dispatch(&new_simple_window()).unwrap().unwrap();
    let front = orchestrator.dispatch(&new_simple_window()).unwrap().unwrap();

    let changed = orchestrator
        .dispatch(&MenuCommand::ChangeView(CoordinateChange::StampPath(
            "master".to_string(),
        )))
        .unwrap()
        .unwrap();
    assert!(Rc::ptr_eq(&changed, &front));
    assert_eq!(front.context().coordinate().stamp.path, "master");
    assert_eq!(
        back.context().coordinate().stamp,
        StampCoordinate::default()
    );

    let menu = orchestrator.view_menu(&front).unwrap();
    assert_eq!(menu.label, front.context().calculator().summary());
}

#[test]
fn test_restore_windows_after_restart() {
    let session = Session::new();
    {
        let mut orchestrator = session.running();
        let window = orchestrator.dispatch(&new_simple_window()).unwrap().unwrap();
        window.save().unwrap();
        orchestrator.dispatch(&MenuCommand::Quit).unwrap();
    }

    let mut orchestrator = session.running();
    let report = orchestrator.restore_windows().unwrap();
    assert_eq!(report.restored.len(), 1);
    assert!(report.failed.is_empty());
    assert_eq!(orchestrator.windows().len(), 1);
}

#[test]
fn test_quit_shuts_down() {
    let session = Session::new();
    let mut orchestrator = session.running();
    let window = orchestrator.dispatch(&new_simple_window()).unwrap().unwrap();

    assert!(orchestrator.dispatch(&MenuCommand::Quit).unwrap().is_none());
    assert_eq!(orchestrator.state(), Lifecycle::Shutdown);
    assert!(!window.is_showing());
    assert!(orchestrator.windows().is_empty());
    assert!(matches!(
        orchestrator.dispatch(&new_simple_window()),
        Err(OrchestratorError::ShutDown)
    ));
    orchestrator.shutdown().unwrap();
}
