//! In-memory toolkit.
//!
//! Implements the host contract with plain observable cells. Used by the
//! binary's headless session and by tests; a GUI binding would provide its
//! own [`HostToolkit`].

use knowlayout_core::{Property, Subscription};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::host::{
    CloseHandler, CloseRequest, GeometryCells, HostToolkit, NodeHost, PlacementCells, StageHost,
    TransformCells,
};

/// Toolkit producing [`HeadlessStage`]s and [`HeadlessNode`]s.
#[derive(Debug, Default)]
pub struct HeadlessToolkit {
    stages_created: Cell<usize>,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages_created(&self) -> usize {
        self.stages_created.get()
    }
}

impl HostToolkit for HeadlessToolkit {
    fn create_stage(&self) -> Rc<dyn StageHost> {
        self.stages_created.set(self.stages_created.get() + 1);
        Rc::new(HeadlessStage::default())
    }

    fn create_node(&self) -> Rc<dyn NodeHost> {
        Rc::new(HeadlessNode::default())
    }
}

#[derive(Default)]
pub struct HeadlessStage {
    geometry: GeometryCells,
    root: RefCell<Option<Rc<dyn NodeHost>>>,
    handlers: Rc<RefCell<Vec<(u64, CloseHandler)>>>,
    next_handler: Cell<u64>,
}

impl StageHost for HeadlessStage {
    fn geometry(&self) -> &GeometryCells {
        &self.geometry
    }

    fn set_root(&self, root: Rc<dyn NodeHost>) {
        *self.root.borrow_mut() = Some(root);
    }

    fn root(&self) -> Option<Rc<dyn NodeHost>> {
        self.root.borrow().clone()
    }

    fn show(&self) {
        self.geometry.visible.set(true);
    }

    fn hide(&self) {
        self.geometry.visible.set(false);
    }

    fn on_close_request(&self, handler: CloseHandler) -> Subscription {
        let id = self.next_handler.get();
        self.next_handler.set(id + 1);
        self.handlers.borrow_mut().push((id, handler));
        let handlers = Rc::downgrade(&self.handlers);
        Subscription::new(move || {
            if let Some(handlers) = handlers.upgrade() {
                handlers.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }

    fn request_close(&self) -> bool {
        let request = CloseRequest::new();
        let handlers: Vec<CloseHandler> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(&request);
        }
        if request.is_consumed() {
            return false;
        }
        self.hide();
        true
    }
}

#[derive(Default)]
pub struct HeadlessNode {
    transform: TransformCells,
    placement: PlacementCells,
    text: Property<String>,
    children: RefCell<Vec<Rc<dyn NodeHost>>>,
}

impl NodeHost for HeadlessNode {
    fn transform(&self) -> &TransformCells {
        &self.transform
    }

    fn placement(&self) -> &PlacementCells {
        &self.placement
    }

    fn text(&self) -> &Property<String> {
        &self.text
    }

    fn add_child(&self, child: Rc<dyn NodeHost>) {
        self.children.borrow_mut().push(child);
    }

    fn children(&self) -> Vec<Rc<dyn NodeHost>> {
        self.children.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconsumed_close_hides_stage() {
        let stage = HeadlessStage::default();
        stage.show();
        assert!(stage.is_showing());
        assert!(stage.request_close());
        assert!(!stage.is_showing());
    }

    #[test]
    fn test_consumed_close_keeps_stage_open() {
        let stage = HeadlessStage::default();
        stage.show();
        let sub = stage.on_close_request(Rc::new(|request| request.consume()));
        assert!(!stage.request_close());
        assert!(stage.is_showing());

        sub.unsubscribe();
        assert!(stage.request_close());
    }
}
