//! Visual host collaborator.
//!
//! Gadgets never talk to a GUI toolkit directly. A window wraps one
//! [`StageHost`]; views, panes and widgets each wrap one [`NodeHost`]. Every
//! attribute a gadget persists is exposed by the host as an observable
//! [`Property`] cell, which the gadget binds both ways to its preference
//! properties.

use knowlayout_core::{Property, Subscription};
use std::cell::Cell;
use std::rc::Rc;

/// Stage attributes bound to the window geometry keys.
#[derive(Debug, Clone)]
pub struct GeometryCells {
    pub x: Property<f64>,
    pub y: Property<f64>,
    pub width: Property<f64>,
    pub height: Property<f64>,
    pub opacity: Property<f64>,
    pub visible: Property<bool>,
    pub title: Property<String>,
}

impl Default for GeometryCells {
    fn default() -> Self {
        Self {
            x: Property::new(0.0),
            y: Property::new(0.0),
            width: Property::new(0.0),
            height: Property::new(0.0),
            opacity: Property::new(1.0),
            visible: Property::new(false),
            title: Property::new(String::new()),
        }
    }
}

/// Node transform bound to the pane transform keys.
#[derive(Debug, Clone)]
pub struct TransformCells {
    pub translate_x: Property<f64>,
    pub translate_y: Property<f64>,
    pub translate_z: Property<f64>,
    pub scale_x: Property<f64>,
    pub scale_y: Property<f64>,
    pub scale_z: Property<f64>,
    pub rotate: Property<f64>,
}

impl Default for TransformCells {
    fn default() -> Self {
        Self {
            translate_x: Property::new(0.0),
            translate_y: Property::new(0.0),
            translate_z: Property::new(0.0),
            scale_x: Property::new(1.0),
            scale_y: Property::new(1.0),
            scale_z: Property::new(1.0),
            rotate: Property::new(0.0),
        }
    }
}

/// Grid constraints bound to the widget placement keys.
#[derive(Debug, Clone, Default)]
pub struct PlacementCells {
    pub h_grow: Property<String>,
    pub v_grow: Property<String>,
    pub h_alignment: Property<String>,
    pub v_alignment: Property<String>,
    pub column_index: Property<i32>,
    pub row_index: Property<i32>,
    pub column_span: Property<i32>,
    pub row_span: Property<i32>,
    /// Top, right, bottom, left insets.
    pub margin: Property<Vec<f64>>,
}

/// Close request delivered to stage handlers.
#[derive(Debug, Default)]
pub struct CloseRequest {
    consumed: Cell<bool>,
}

impl CloseRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the stage open
    pub fn consume(&self) {
        self.consumed.set(true);
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.get()
    }
}

/// Handler invoked when the user asks to close a stage.
pub type CloseHandler = Rc<dyn Fn(&CloseRequest)>;

/// A top-level window of the toolkit.
pub trait StageHost {
    fn geometry(&self) -> &GeometryCells;

    /// Install the scene root
    fn set_root(&self, root: Rc<dyn NodeHost>);

    fn root(&self) -> Option<Rc<dyn NodeHost>>;

    fn show(&self);

    fn hide(&self);

    fn is_showing(&self) -> bool {
        self.geometry().visible.get()
    }

    fn on_close_request(&self, handler: CloseHandler) -> Subscription;

    /// Deliver a close request; returns whether the stage closed
    fn request_close(&self) -> bool;
}

/// A layout container or leaf element of the toolkit.
pub trait NodeHost {
    fn transform(&self) -> &TransformCells;

    fn placement(&self) -> &PlacementCells;

    /// Text shown by the node (center label, widget caption)
    fn text(&self) -> &Property<String>;

    fn add_child(&self, child: Rc<dyn NodeHost>);

    fn children(&self) -> Vec<Rc<dyn NodeHost>>;
}

/// Creates host objects for new gadgets.
pub trait HostToolkit {
    fn create_stage(&self) -> Rc<dyn StageHost>;

    fn create_node(&self) -> Rc<dyn NodeHost>;
}
