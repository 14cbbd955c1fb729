//! # KnowLayout Layout
//!
//! Preference-backed gadgets for KnowLayout windows.
//!
//! A window is a tree of gadgets (window, view, window pane, widgets). Every
//! gadget is created by a factory or restored from its preference node, keeps
//! its properties bound to a visual host, and saves, reverts or deletes
//! through its [`Blueprint`]. Contexts carry view coordinates down the tree
//! once a window's dependent contexts are subscribed.

pub mod blueprint;
pub mod close;
pub mod context;
pub mod env;
pub mod error;
pub mod factory;
pub mod gadget;
pub mod headless;
pub mod host;
pub mod menu;
pub mod pane;
pub mod participants;
pub mod restore;
pub mod simple;
pub mod view;
pub mod view_menu;
pub mod widget;
pub mod window;

pub use blueprint::{Blueprint, SaveParticipant};
pub use close::{CloseChoice, CloseOutcome, ClosePrompt, ScriptedPrompt};
pub use context::{Context, ContextFactory, PropagationState};
pub use env::{LayoutEnv, SHARED_LAYOUTS_NAMESPACE, WINDOWS_NAMESPACE};
pub use error::{LayoutError, LayoutResult};
pub use factory::{
    FactoryRegistry, GadgetFactory, PreferencesFactory, RegisteredFactory, ViewFactory,
    WidgetFactory, WindowFactory, WindowPaneFactory,
};
pub use gadget::{
    ContextSensitive, Gadget, View, WeakGadget, Widget, WidgetContent, Window, WindowPane,
};
pub use headless::{HeadlessNode, HeadlessStage, HeadlessToolkit};
pub use host::{
    CloseHandler, CloseRequest, GeometryCells, HostToolkit, NodeHost, PlacementCells, StageHost,
    TransformCells,
};
pub use menu::{Menu, MenuCommand, MenuItem};
pub use participants::{GadgetIdentity, GridPlacement, PaneTransform, WindowGeometry};
pub use restore::{
    new_window_actions, restore_all, restore_window_actions, shared_layout_actions,
    NewWindowAction, RestoreAction, RestoreReport, RestoreSource,
};
pub use simple::{
    ComponentPaneFactory, ComponentWindowFactory, SimpleViewFactory, SimpleWidgetFactory,
    SimpleWindowFactory, SimpleWindowPaneFactory,
};
pub use view_menu::{MenuSection, TaskKind, ViewMenuFactory, ViewMenuTask};
