//! Backend trait for the preference store.

use crate::error::{PreferencesError, PreferencesResult};

/// Storage engine behind preference nodes.
///
/// All paths are absolute (`/`, `/windows`, `/windows/simple-window-1`).
/// Implementations must be usable from the UI thread and from background
/// workers, hence `Send + Sync`.
pub trait PreferencesBackend: Send + Sync {
    /// Stored text for `key` on the node, `None` when absent
    fn get(&self, path: &str, key: &str) -> PreferencesResult<Option<String>>;

    /// Store text for `key` on the node
    fn put(&self, path: &str, key: &str, value: &str) -> PreferencesResult<()>;

    /// Remove `key` from the node; absent keys are ignored
    fn remove(&self, path: &str, key: &str) -> PreferencesResult<()>;

    /// Keys stored on the node, sorted
    fn keys(&self, path: &str) -> PreferencesResult<Vec<String>>;

    /// Names of the node's direct children, sorted
    fn child_names(&self, path: &str) -> PreferencesResult<Vec<String>>;

    /// Whether the node exists
    fn node_exists(&self, path: &str) -> bool;

    /// Create the node and any missing ancestors
    fn create_node(&self, path: &str) -> PreferencesResult<()>;

    /// Remove the node and its whole subtree
    fn remove_node(&self, path: &str) -> PreferencesResult<()>;

    /// Make the node durable and pick up external changes
    fn sync(&self, path: &str) -> PreferencesResult<()>;

    /// Make pending changes to the node durable
    fn flush(&self, path: &str) -> PreferencesResult<()>;

    /// Copy the node at `from` to `to`, replacing whatever was there
    fn copy_subtree(&self, from: &str, to: &str, recursive: bool) -> PreferencesResult<()> {
        if to == from
            || to.starts_with(&format!("{from}/"))
            || from.starts_with(&format!("{to}/"))
        {
            return Err(PreferencesError::InvalidPath {
                path: to.to_string(),
                reason: format!("cannot copy {from} onto an overlapping node"),
            });
        }
        if self.node_exists(to) {
            self.remove_node(to)?;
        }
        self.create_node(to)?;
        for key in self.keys(from)? {
            if let Some(value) = self.get(from, &key)? {
                self.put(to, &key, &value)?;
            }
        }
        if recursive {
            for child in self.child_names(from)? {
                self.copy_subtree(&child_path(from, &child)?, &child_path(to, &child)?, true)?;
            }
        }
        Ok(())
    }
}

/// Join a parent path and a child name.
pub fn child_path(parent: &str, name: &str) -> PreferencesResult<String> {
    validate_name(parent, name)?;
    if parent == "/" {
        Ok(format!("/{name}"))
    } else {
        Ok(format!("{parent}/{name}"))
    }
}

/// Last segment of a path, empty for the root.
pub fn node_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

/// Parent of a path, `None` for the root.
pub fn parent_path(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(index) => Some(&path[..index]),
        None => None,
    }
}

/// Check that a path is absolute and well formed.
pub fn validate_path(path: &str) -> PreferencesResult<()> {
    let invalid = |reason: &str| PreferencesError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };
    if !path.starts_with('/') {
        return Err(invalid("path must be absolute"));
    }
    if path.len() > 1 && (path.ends_with('/') || path.contains("//")) {
        return Err(invalid("path contains an empty segment"));
    }
    Ok(())
}

fn validate_name(parent: &str, name: &str) -> PreferencesResult<()> {
    if name.is_empty() || name.contains('/') {
        return Err(PreferencesError::InvalidPath {
            path: format!("{parent}/{name}"),
            reason: "child names must be non-empty and contain no '/'".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_helpers() {
        assert_eq!(child_path("/", "windows").as_deref(), Ok("/windows"));
        assert_eq!(
            child_path("/windows", "w-1").as_deref(),
            Ok("/windows/w-1")
        );
        assert!(child_path("/windows", "a/b").is_err());
        assert!(child_path("/windows", "").is_err());

        assert_eq!(node_name("/windows/w-1"), "w-1");
        assert_eq!(node_name("/"), "");
        assert_eq!(parent_path("/windows/w-1"), Some("/windows"));
        assert_eq!(parent_path("/windows"), Some("/"));
        assert_eq!(parent_path("/"), None);
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("/").is_ok());
        assert!(validate_path("/a/b").is_ok());
        assert!(validate_path("a/b").is_err());
        assert!(validate_path("/a//b").is_err());
        assert!(validate_path("/a/").is_err());
    }
}
