use std::rc::Rc;
use std::time::Duration;

use anyhow::Context as _;
use knowlayout::{init_logging, Lifecycle, Orchestrator, BUILD_DATE, VERSION};
use knowlayout_layout::{CloseChoice, MenuCommand, ScriptedPrompt};
use knowlayout_settings::{FilePreferences, SettingsManager};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> anyhow::Result<()> {
    let settings = SettingsManager::load().context("loading settings")?;
    init_logging(&settings.config().logging.filter)?;
    tracing::info!(version = VERSION, built = BUILD_DATE, "starting KnowLayout");
    tracing::info!(config = %settings.directory().display(), "settings directory");

    let root = FilePreferences::open_root(settings.preferences_path())
        .context("opening preference file")?;

    // Headless sessions keep whatever the user left unsaved.
    let prompt = Rc::new(ScriptedPrompt::new(Some(CloseChoice::SaveAndClose)));
    let mut orchestrator = Orchestrator::headless(settings.config().clone(), &root, prompt)?;
    orchestrator.start()?;
    orchestrator.run_until(Lifecycle::Running, STARTUP_TIMEOUT)?;

    let report = orchestrator.restore_windows()?;
    if report.restored.is_empty() {
        let new_window = orchestrator.menu_bar().and_then(|bar| {
            bar.commands()
                .into_iter()
                .find(|command| matches!(command, MenuCommand::NewWindow { .. }))
                .cloned()
        });
        if let Some(command) = new_window {
            orchestrator.dispatch(&command)?;
        }
    }

    for window in orchestrator.windows() {
        let menu = orchestrator.view_menu(&window)?;
        tracing::info!(window = %window.title(), view = %menu.label, "window open");
    }
    if let Some(bar) = orchestrator.menu_bar() {
        tracing::info!(menus = ?bar.labels(), "menu bar");
    }

    orchestrator.dispatch(&MenuCommand::Quit)?;
    Ok(())
}
