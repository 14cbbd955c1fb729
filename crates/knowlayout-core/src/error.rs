//! Error handling for KnowLayout core
//!
//! Provides the error types shared by every layer of the application:
//! - Preference store errors (removed nodes, bad paths, backing I/O)
//! - Property errors (keys a gadget kind does not declare)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Preference store error type
///
/// Raised by the hierarchical preference store and by node handles.
/// A failure while syncing or flushing is fatal to the save, revert or
/// delete that triggered it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreferencesError {
    /// The node was removed while a handle to it was still in use
    #[error("Preference node {path} has been removed")]
    NodeRemoved {
        /// Absolute path of the removed node.
        path: String,
    },

    /// The path is not a valid absolute node path
    #[error("Invalid preference path '{path}': {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// The backing store failed to persist or load
    #[error("Preference storage failure: {message}")]
    Storage {
        /// Description of the backing failure.
        message: String,
    },
}

impl PreferencesError {
    /// Create a storage error from anything printable
    pub fn storage(message: impl Into<String>) -> Self {
        PreferencesError::Storage {
            message: message.into(),
        }
    }
}

/// Property error type
///
/// Programming errors detected when wiring a property to a gadget.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// The key's group is not declared for the gadget kind
    #[error("Key {key} of group {group} is not declared for {kind} gadgets")]
    UndeclaredKey {
        /// Gadget kind the property was constructed for.
        kind: String,
        /// Key group the key belongs to.
        group: String,
        /// Stored key name.
        key: String,
    },

    /// The key's declared default cannot be represented by the property type
    #[error("Default of key {key} does not match the property type {expected}")]
    DefaultTypeMismatch {
        /// Stored key name.
        key: String,
        /// Name of the Rust type the property holds.
        expected: &'static str,
    },
}

/// Main error type for KnowLayout core
///
/// A unified error type that can represent any error from the core layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Preference store error
    #[error(transparent)]
    Preferences(#[from] PreferencesError),

    /// Property wiring error
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a preference store error
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Preferences(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for preference store operations
pub type PreferencesResult<T> = std::result::Result<T, PreferencesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_error_display() {
        let err = PreferencesError::NodeRemoved {
            path: "/windows/simple-window-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Preference node /windows/simple-window-1 has been removed"
        );

        let err = PreferencesError::storage("disk full");
        assert_eq!(err.to_string(), "Preference storage failure: disk full");
    }

    #[test]
    fn test_property_error_display() {
        let err = PropertyError::UndeclaredKey {
            kind: "Widget".to_string(),
            group: "WindowGeometry".to_string(),
            key: "WINDOW_WIDTH".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Key WINDOW_WIDTH of group WindowGeometry is not declared for Widget gadgets"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = PreferencesError::storage("x").into();
        assert!(err.is_store_error());

        let err: Error = PropertyError::DefaultTypeMismatch {
            key: "ROTATE".to_string(),
            expected: "bool",
        }
        .into();
        assert!(matches!(err, Error::Property(_)));
        assert!(!err.is_store_error());
    }
}
