//! # KnowLayout
//!
//! Preference-backed window layouts for knowledge modeling workbenches.
//!
//! Every window is a tree of gadgets whose geometry, placement and view
//! coordinates live in a hierarchical preference store, so a session can be
//! closed and restored exactly as it was left.
//!
//! ## Architecture
//!
//! KnowLayout is organized as a workspace with multiple crates:
//!
//! 1. **knowlayout-core** - Preference store, keys, observable properties, view coordinates, events
//! 2. **knowlayout-settings** - Configuration file, settings directory, file-backed preferences
//! 3. **knowlayout-layout** - Gadgets, blueprints, contexts, factories, close prompt, view menus
//! 4. **knowlayout** - Orchestrator, lifecycle, services and the main binary
//!
//! ## Features
//!
//! - **Self-healing restore**: missing or malformed stored values fall back to defaults
//! - **Context propagation**: view coordinate changes flow from a window to every nested gadget
//! - **Shared layouts**: a window can be saved for reuse and reopened as a copy
//! - **Background work**: data sources and view menus are built on a tokio worker pool

pub mod error;
pub mod lifecycle;
pub mod menu_bar;
pub mod orchestrator;
pub mod services;

pub use error::{OrchestratorError, OrchestratorResult};
pub use lifecycle::{Lifecycle, LifecycleEvent};
pub use menu_bar::{
    MenuBar, EDIT_MENU, FILE_MENU, OPEN_LAYOUT_MENU, RESTORE_WINDOW_MENU, WINDOW_MENU,
};
pub use orchestrator::Orchestrator;
pub use services::{
    ConfiguredSelectDataService, FileMenuProvider, LayoutWindowProvider, LoadedData,
    LocalStartDataService, MenuProvider, SelectDataService, ServiceMessage, ServiceRegistry,
    SharedLayoutProvider, StartDataService, StatusReporter, WindowCreateProvider,
    WindowRestoreProvider,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support, falling back to `default_filter`
/// - Thread ids and names, targets and line numbers
pub fn init_logging(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
