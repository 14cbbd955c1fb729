//! Application bootstrap and lifecycle driver.
//!
//! The orchestrator owns the UI-thread side of the application: the layout
//! environment, the open windows, the main menu bar and the lifecycle
//! property. Data-source services run on a fixed-size tokio worker pool and
//! send their results back over an mpsc channel; nothing they produce is
//! applied until [`Orchestrator::pump`] (or [`Orchestrator::run_until`])
//! drains the channel on the UI thread.

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use knowlayout_core::{
    shared_vec, AppEvent, AppKey, CoordinateChange, EventBus, LifecycleChange, PreferenceKey,
    PreferencesNode, Property, SharedVec, StatusReport,
};
use knowlayout_layout::{
    restore_all, ClosePrompt, HeadlessToolkit, HostToolkit, LayoutEnv, LayoutError, Menu,
    MenuCommand, RestoreReport, RestoreSource, ScriptedPrompt, ViewMenuFactory, Window,
};
use knowlayout_settings::{Config, DataSourceSettings};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::lifecycle::{Lifecycle, LifecycleEvent};
use crate::menu_bar::MenuBar;
use crate::services::{LoadedData, ServiceMessage, ServiceRegistry, StatusReporter};

pub struct Orchestrator {
    config: Config,
    runtime: Runtime,
    env: Rc<LayoutEnv>,
    user: PreferencesNode,
    services: ServiceRegistry,
    lifecycle: Property<Lifecycle>,
    status: Property<String>,
    last_run: Option<String>,
    selected: Option<DataSourceSettings>,
    loaded: Option<LoadedData>,
    menu_bar: Option<MenuBar>,
    windows: SharedVec<Rc<Window>>,
    view_menus: ViewMenuFactory,
    tx: mpsc::UnboundedSender<ServiceMessage>,
    rx: mpsc::UnboundedReceiver<ServiceMessage>,
}

impl Orchestrator {
    /// Build an orchestrator over the preference store rooted at `root`.
    ///
    /// The configuration is validated first; the well-known namespaces are
    /// created when missing.
    pub fn new(
        config: Config,
        root: &PreferencesNode,
        toolkit: Rc<dyn HostToolkit>,
        prompt: Rc<dyn ClosePrompt>,
        services: ServiceRegistry,
    ) -> OrchestratorResult<Self> {
        config.validate()?;
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.orchestrator.worker_threads)
            .thread_name("knowlayout-worker")
            .enable_all()
            .build()?;

        let backend = root.backend();
        let namespaces = &config.preferences;
        let windows = PreferencesNode::open(backend.clone(), &namespaces.windows_namespace)?;
        let layouts = PreferencesNode::open(backend.clone(), &namespaces.layouts_namespace)?;
        let user = PreferencesNode::open(backend.clone(), &namespaces.user_namespace)?;

        let env = LayoutEnv::new(toolkit, windows, layouts, prompt, Arc::new(EventBus::new()));
        let view_menus = ViewMenuFactory::new(runtime.handle().clone());
        let (tx, rx) = mpsc::unbounded_channel();

        tracing::info!(
            workers = config.orchestrator.worker_threads,
            windows = %env.windows,
            layouts = %env.shared_layouts,
            "orchestrator ready"
        );
        Ok(Self {
            config,
            runtime,
            env,
            user,
            services,
            lifecycle: Property::new(Lifecycle::Starting),
            status: Property::new(String::new()),
            last_run: None,
            selected: None,
            loaded: None,
            menu_bar: None,
            windows: shared_vec(),
            view_menus,
            tx,
            rx,
        })
    }

    /// Headless orchestrator with the default services; changed windows
    /// ask `prompt` before they close.
    pub fn headless(
        config: Config,
        root: &PreferencesNode,
        prompt: Rc<ScriptedPrompt>,
    ) -> OrchestratorResult<Self> {
        Self::new(
            config,
            root,
            Rc::new(HeadlessToolkit::new()),
            prompt,
            ServiceRegistry::with_defaults(),
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn env(&self) -> &Rc<LayoutEnv> {
        &self.env
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.env.events
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Observable lifecycle state
    pub fn lifecycle(&self) -> &Property<Lifecycle> {
        &self.lifecycle
    }

    pub fn state(&self) -> Lifecycle {
        self.lifecycle.get()
    }

    /// Observable status line
    pub fn status(&self) -> &Property<String> {
        &self.status
    }

    /// Last run stamp found at startup, before it was overwritten
    pub fn last_run(&self) -> Option<&str> {
        self.last_run.as_deref()
    }

    pub fn selected_data_source(&self) -> Option<&DataSourceSettings> {
        self.selected.as_ref()
    }

    pub fn loaded_data(&self) -> Option<&LoadedData> {
        self.loaded.as_ref()
    }

    /// The main menu bar, built once a data source is selected
    pub fn menu_bar(&self) -> Option<&MenuBar> {
        self.menu_bar.as_ref()
    }

    /// Windows opened through this orchestrator that are still showing
    pub fn windows(&self) -> Vec<Rc<Window>> {
        self.windows
            .borrow()
            .iter()
            .filter(|window| window.is_showing())
            .cloned()
            .collect()
    }

    /// Record the run stamp and launch data-source selection.
    pub fn start(&mut self) -> OrchestratorResult<()> {
        self.record_last_run()?;
        self.transition(LifecycleEvent::Started)?;
        self.select_data_source()
    }

    /// Launch the select data service on the worker pool.
    ///
    /// Called by [`start`](Self::start) and again by the UI after a data
    /// source failed to load.
    pub fn select_data_source(&mut self) -> OrchestratorResult<()> {
        let service = self.services.select_data()?;
        let settings = self.config.orchestrator.clone();
        let status = StatusReporter::new(self.tx.clone());
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = service.select_data_source(settings, status).await;
            let _ = tx.send(ServiceMessage::Selected(result));
        });
        Ok(())
    }

    /// Apply every pending worker result; returns how many were applied.
    pub fn pump(&mut self) -> OrchestratorResult<usize> {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Block the UI thread on worker results until `target` is reached.
    pub fn run_until(&mut self, target: Lifecycle, timeout: Duration) -> OrchestratorResult<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.state() != target {
            if self.state().is_shutdown() {
                return Err(OrchestratorError::ShutDown);
            }
            let rx = &mut self.rx;
            let received = self
                .runtime
                .block_on(async move { tokio::time::timeout_at(deadline, rx.recv()).await });
            match received {
                Ok(Some(message)) => self.apply(message)?,
                Ok(None) => {
                    return Err(OrchestratorError::WorkerPool(
                        "service channel closed".to_string(),
                    ))
                }
                Err(_) => {
                    return Err(OrchestratorError::WorkerPool(format!(
                        "timed out in {} waiting for {target}",
                        self.state()
                    )))
                }
            }
        }
        Ok(())
    }

    /// Log the message, show it in the status line and publish it.
    pub fn report_status(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(status = %message);
        self.status.set(message.clone());
        self.env
            .events
            .publish(AppEvent::Status(StatusReport::now(message)));
    }

    /// Run a menu command on the UI thread.
    ///
    /// Window commands return the window they opened. `ChangeView` applies
    /// to the most recently opened window that is still showing.
    pub fn dispatch(&mut self, command: &MenuCommand) -> OrchestratorResult<Option<Rc<Window>>> {
        if self.state().is_shutdown() {
            return Err(OrchestratorError::ShutDown);
        }
        tracing::debug!(?command, "dispatching menu command");
        match command {
            MenuCommand::NewWindow { factory_tag } => {
                let action = self
                    .services
                    .create_actions(&self.env)
                    .into_iter()
                    .find(|action| &action.factory_tag == factory_tag)
                    .ok_or_else(|| LayoutError::UnknownFactory {
                        tag: factory_tag.clone(),
                    })?;
                let window = action.invoke(&self.env)?;
                self.opened(&window);
                Ok(Some(window))
            }
            MenuCommand::RestoreWindow { path } => self
                .restore(path, RestoreSource::Window)
                .map(Some),
            MenuCommand::RestoreLayout { path } => self
                .restore(path, RestoreSource::SharedLayout)
                .map(Some),
            MenuCommand::ChangeView(change) => Ok(self.change_front_view(change)),
            MenuCommand::Quit => {
                self.shutdown()?;
                Ok(None)
            }
        }
    }

    /// Restore every stored window once the data source is running.
    ///
    /// Windows that fail are reported and skipped.
    pub fn restore_windows(&mut self) -> OrchestratorResult<RestoreReport> {
        if !self.state().is_running() {
            return Err(OrchestratorError::NotRunning {
                state: self.state(),
            });
        }
        let report = restore_all(&self.env)?;
        for (action, err) in &report.failed {
            self.report_status(format!("Could not restore {}: {err}", action.label));
        }
        self.windows
            .borrow_mut()
            .extend(report.restored.iter().cloned());
        self.refresh_menu_bar();
        Ok(report)
    }

    /// Ask `window` to close, honouring its close prompt.
    ///
    /// Returns whether the window closed.
    pub fn close_window(&mut self, window: &Rc<Window>) -> OrchestratorResult<bool> {
        let closed = window.request_close();
        if closed {
            self.windows
                .borrow_mut()
                .retain(|open| !Rc::ptr_eq(open, window));
            self.refresh_menu_bar();
        }
        Ok(closed)
    }

    /// View menu for `window`'s current coordinate, built on the worker pool
    pub fn view_menu(&self, window: &Window) -> OrchestratorResult<Menu> {
        let context = window.context();
        Ok(self
            .view_menus
            .create_blocking(context.coordinate(), context.calculator())?)
    }

    /// Move to `Shutdown` and flush the preference store.
    ///
    /// Open windows keep their stored state; unsaved changes are not saved.
    pub fn shutdown(&mut self) -> OrchestratorResult<()> {
        if self.state().is_shutdown() {
            return Ok(());
        }
        self.transition(LifecycleEvent::ShutdownRequested)?;
        for window in self.windows.borrow_mut().drain(..) {
            window.context().unsubscribe_dependent_contexts()?;
            window.hide();
        }
        self.env.windows.flush()?;
        self.env.shared_layouts.flush()?;
        self.user.flush()?;
        tracing::info!("orchestrator shut down");
        Ok(())
    }

    fn transition(&self, event: LifecycleEvent) -> OrchestratorResult<Lifecycle> {
        let current = self.state();
        let next = current
            .on(event)
            .ok_or(OrchestratorError::InvalidTransition { current, event })?;
        tracing::info!(from = %current, to = %next, ?event, "lifecycle transition");
        self.lifecycle.set(next);
        self.env.events.publish(AppEvent::Lifecycle(LifecycleChange {
            from: current.to_string(),
            to: next.to_string(),
        }));
        Ok(next)
    }

    fn record_last_run(&mut self) -> OrchestratorResult<()> {
        let key = AppKey::LastRun.key_name();
        self.last_run = self.user.get_raw(key)?.filter(|value| !value.is_empty());
        match &self.last_run {
            Some(previous) => tracing::info!(last_run = %previous, "last run"),
            None => tracing::info!("last run not set"),
        }
        let now = Local::now().format("%Y-%m-%d %H:%M:%S %Z").to_string();
        self.user.put_string(key, &now)?;
        self.user.flush()?;
        tracing::info!(last_run = %now, "updated last run");
        Ok(())
    }

    fn apply(&mut self, message: ServiceMessage) -> OrchestratorResult<()> {
        match message {
            ServiceMessage::Status(line) => self.report_status(line),
            ServiceMessage::Selected(Ok(source)) => {
                self.selected = Some(source);
                self.transition(LifecycleEvent::DataSourceSelected)?;
                self.enter_selected()?;
            }
            ServiceMessage::Selected(Err(err)) => {
                tracing::error!(error = %err, "data source selection failed");
                self.report_status(format!("Data source selection failed: {err}"));
                self.shutdown()?;
            }
            ServiceMessage::Loaded(Ok(data)) => {
                self.report_status(format!("Loaded {}", data.source));
                self.loaded = Some(data);
                self.transition(LifecycleEvent::LoadCompleted)?;
                self.refresh_menu_bar();
            }
            ServiceMessage::Loaded(Err(err)) => {
                tracing::error!(error = %err, "data source failed to load");
                self.report_status(err.to_string());
                self.selected = None;
                self.transition(LifecycleEvent::LoadFailed)?;
            }
        }
        Ok(())
    }

    fn enter_selected(&mut self) -> OrchestratorResult<()> {
        self.menu_bar = Some(MenuBar::build(&self.services, &self.env));
        let service = self.services.start_data()?;
        let source = self
            .selected
            .clone()
            .ok_or_else(|| OrchestratorError::NoDataSource("nothing selected".to_string()))?;
        let status = StatusReporter::new(self.tx.clone());
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = service.start_data_source(source, status).await;
            let _ = tx.send(ServiceMessage::Loaded(result));
        });
        self.transition(LifecycleEvent::LoadStarted)?;
        if let Some(previous) = self.last_run.clone() {
            self.report_status(format!("Last opened: {previous}"));
        }
        Ok(())
    }

    fn restore(&mut self, path: &str, source: RestoreSource) -> OrchestratorResult<Rc<Window>> {
        let action = self
            .services
            .restore_actions(&self.env)
            .into_iter()
            .find(|action| action.source == source && action.node.path() == path)
            .ok_or_else(|| OrchestratorError::NotRestorable {
                path: path.to_string(),
            })?;
        let window = action.invoke(&self.env)?;
        self.opened(&window);
        Ok(window)
    }

    fn opened(&mut self, window: &Rc<Window>) {
        self.windows.borrow_mut().push(window.clone());
        self.refresh_menu_bar();
    }

    fn change_front_view(&self, change: &CoordinateChange) -> Option<Rc<Window>> {
        let window = self.windows().pop()?;
        if window.context().apply(change) {
            tracing::debug!(window = %window.title(), ?change, "view changed");
        }
        Some(window)
    }

    /// Rebuild the menu bar so the window menu lists current windows.
    fn refresh_menu_bar(&mut self) {
        if self.menu_bar.is_some() {
            self.menu_bar = Some(MenuBar::build(&self.services, &self.env));
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state())
            .field("status", &self.status.get())
            .field("selected", &self.selected)
            .field("windows", &self.windows.borrow().len())
            .field("services", &self.services)
            .finish()
    }
}
