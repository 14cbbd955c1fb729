//! Close requests: the save/delete/revert/cancel prompt of a window.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use knowlayout_core::{AppEvent, PreferencesNode, WindowEvent};

use crate::env::LayoutEnv;
use crate::error::LayoutResult;
use crate::factory::unique_child_name;
use crate::gadget::Window;

/// Answers offered when a window with unsaved changes is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseChoice {
    Cancel,
    DeleteWindow,
    SaveAndClose,
    SaveAndKeepOpen,
    /// Copy the window into the shared layouts and remove the private copy.
    SaveAsLayout,
    RevertWindow,
}

impl CloseChoice {
    pub const ALL: [CloseChoice; 6] = [
        CloseChoice::Cancel,
        CloseChoice::DeleteWindow,
        CloseChoice::SaveAndClose,
        CloseChoice::SaveAndKeepOpen,
        CloseChoice::SaveAsLayout,
        CloseChoice::RevertWindow,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CloseChoice::Cancel => "Cancel",
            CloseChoice::DeleteWindow => "Delete window",
            CloseChoice::SaveAndClose => "Save window and close",
            CloseChoice::SaveAndKeepOpen => "Save window and keep open",
            CloseChoice::SaveAsLayout => "Save as layout",
            CloseChoice::RevertWindow => "Revert window",
        }
    }
}

/// Asks the user what to do with a changed window.
pub trait ClosePrompt {
    /// `None` means the prompt was dismissed, treated as cancel
    fn choose(&self, window: &Window) -> Option<CloseChoice>;
}

/// Prompt answering from a queue, then with a fixed fallback.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<CloseChoice>>,
    fallback: Option<CloseChoice>,
    asked: Cell<usize>,
}

impl ScriptedPrompt {
    pub fn new(fallback: Option<CloseChoice>) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    pub fn push(&self, choice: CloseChoice) {
        self.answers.borrow_mut().push_back(choice);
    }

    /// How many times the prompt was shown
    pub fn asked(&self) -> usize {
        self.asked.get()
    }
}

impl ClosePrompt for ScriptedPrompt {
    fn choose(&self, window: &Window) -> Option<CloseChoice> {
        self.asked.set(self.asked.get() + 1);
        let choice = self.answers.borrow_mut().pop_front().or(self.fallback);
        tracing::debug!(window = %window.title(), ?choice, "close prompt answered");
        choice
    }
}

/// What the stage should do after a close request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Close,
    KeepOpen,
}

impl Window {
    /// Handle a close request from the stage.
    ///
    /// An unchanged window closes without prompting. Otherwise the prompt
    /// decides; cancelling leaves every state untouched.
    pub fn handle_close_request(self: &Rc<Self>, env: &LayoutEnv) -> LayoutResult<CloseOutcome> {
        if !self.any_changed() {
            return Ok(CloseOutcome::Close);
        }
        let path = self.blueprint().node().path().to_string();
        let choice = env.prompt.choose(self).unwrap_or(CloseChoice::Cancel);
        tracing::info!(window = %path, choice = choice.label(), "closing changed window");

        match choice {
            CloseChoice::Cancel => {
                env.events.publish(AppEvent::Window(WindowEvent::CloseCancelled { path }));
                Ok(CloseOutcome::KeepOpen)
            }
            CloseChoice::DeleteWindow => {
                self.context().unsubscribe_dependent_contexts()?;
                self.delete()?;
                env.events.publish(AppEvent::Window(WindowEvent::Deleted { path }));
                Ok(CloseOutcome::Close)
            }
            CloseChoice::SaveAndClose => {
                self.save()?;
                env.events.publish(AppEvent::Window(WindowEvent::Saved { path }));
                Ok(CloseOutcome::Close)
            }
            CloseChoice::SaveAndKeepOpen => {
                self.save()?;
                env.events.publish(AppEvent::Window(WindowEvent::Saved { path }));
                Ok(CloseOutcome::KeepOpen)
            }
            CloseChoice::SaveAsLayout => {
                self.save_as_layout(env)?;
                Ok(CloseOutcome::Close)
            }
            CloseChoice::RevertWindow => {
                self.revert()?;
                env.events.publish(AppEvent::Window(WindowEvent::Reverted { path }));
                Ok(CloseOutcome::Close)
            }
        }
    }

    /// Save, copy the subtree into the shared layouts and delete this window.
    ///
    /// Returns the shared layout node. The copy keeps the window's node name
    /// unless a layout of that name already exists.
    pub fn save_as_layout(self: &Rc<Self>, env: &LayoutEnv) -> LayoutResult<PreferencesNode> {
        self.save()?;
        let node = self.blueprint().node().clone();
        let name = unique_child_name(&env.shared_layouts, node.name())?;
        let layout = node.copy_subtree_as(&env.shared_layouts, &name, true)?;
        env.shared_layouts.flush()?;

        self.context().unsubscribe_dependent_contexts()?;
        self.delete()?;
        env.events.publish(AppEvent::Window(WindowEvent::SavedAsLayout {
            path: node.path().to_string(),
            layout: layout.path().to_string(),
        }));
        Ok(layout)
    }
}
