//! Error types for the layout crate.

use knowlayout_core::{GadgetKind, PreferencesError, PropertyError};
use thiserror::Error;

/// Errors raised while building, restoring or persisting gadgets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The preference store failed; fatal to the running save, revert or delete.
    #[error(transparent)]
    Preferences(#[from] PreferencesError),

    /// A property was wired to a key its gadget kind does not declare.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// A stored factory tag has no registered factory.
    #[error("No factory registered for type tag '{tag}'")]
    UnknownFactory {
        /// The stored tag.
        tag: String,
    },

    /// A factory was found but produces a different gadget kind.
    #[error("Factory '{tag}' builds {found} gadgets, expected {expected}")]
    FactoryKindMismatch {
        tag: String,
        expected: GadgetKind,
        found: GadgetKind,
    },

    /// A node that must carry a factory stamp does not.
    #[error("Preference node {path} has no factory stamp")]
    MissingStamp { path: String },

    /// A container node does not hold exactly one nested gadget.
    #[error("Expected exactly one {expected} under {path}, found {found}")]
    UnexpectedChildren {
        path: String,
        expected: GadgetKind,
        found: usize,
    },

    /// The context's peer gadget has been dropped.
    #[error("Context '{name}' is no longer attached to a gadget")]
    PeerDropped { name: String },

    /// A view menu task failed or panicked.
    #[error("Menu task failed: {0}")]
    MenuTask(String),
}

impl LayoutError {
    /// Configuration errors are reported per item and never abort a batch.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LayoutError::UnknownFactory { .. }
                | LayoutError::FactoryKindMismatch { .. }
                | LayoutError::MissingStamp { .. }
                | LayoutError::UnexpectedChildren { .. }
        )
    }
}

/// Result type alias for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_factory_display() {
        let err = LayoutError::UnknownFactory {
            tag: "com.example.Nonexistent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No factory registered for type tag 'com.example.Nonexistent'"
        );
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_store_failures_are_not_configuration_errors() {
        let err: LayoutError = PreferencesError::storage("disk full").into();
        assert!(!err.is_configuration_error());
    }
}
