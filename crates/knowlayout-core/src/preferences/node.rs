//! Handles to preference nodes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::backend::{child_path, node_name, parent_path, validate_path, PreferencesBackend};
use super::value::StoredValue;
use crate::error::{PreferencesError, PreferencesResult};

/// A cheap, clonable handle to one node of a preference namespace.
///
/// The backend owns the data; a handle only names a path. Once the node is
/// removed every operation through any handle to it fails with
/// [`PreferencesError::NodeRemoved`].
#[derive(Clone)]
pub struct PreferencesNode {
    backend: Arc<dyn PreferencesBackend>,
    path: String,
}

impl PreferencesNode {
    /// Handle to the root of a backend's namespace
    pub fn root(backend: Arc<dyn PreferencesBackend>) -> Self {
        Self {
            backend,
            path: "/".to_string(),
        }
    }

    /// Open a node by absolute path, creating it when missing
    pub fn open(backend: Arc<dyn PreferencesBackend>, path: &str) -> PreferencesResult<Self> {
        validate_path(path)?;
        backend.create_node(path)?;
        Ok(Self {
            backend,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment, empty for the root
    pub fn name(&self) -> &str {
        node_name(&self.path)
    }

    pub fn backend(&self) -> &Arc<dyn PreferencesBackend> {
        &self.backend
    }

    pub fn exists(&self) -> bool {
        self.backend.node_exists(&self.path)
    }

    pub fn parent(&self) -> Option<Self> {
        parent_path(&self.path).map(|parent| Self {
            backend: self.backend.clone(),
            path: parent.to_string(),
        })
    }

    /// Child node by name, created when missing
    pub fn child(&self, name: &str) -> PreferencesResult<Self> {
        self.ensure_exists()?;
        let path = child_path(&self.path, name)?;
        self.backend.create_node(&path)?;
        Ok(Self {
            backend: self.backend.clone(),
            path,
        })
    }

    /// Child node by name, `None` when it does not exist
    pub fn existing_child(&self, name: &str) -> PreferencesResult<Option<Self>> {
        self.ensure_exists()?;
        let path = child_path(&self.path, name)?;
        Ok(self.backend.node_exists(&path).then(|| Self {
            backend: self.backend.clone(),
            path,
        }))
    }

    /// Direct children in name order
    pub fn children(&self) -> PreferencesResult<Vec<Self>> {
        self.backend
            .child_names(&self.path)?
            .into_iter()
            .map(|name| {
                Ok(Self {
                    backend: self.backend.clone(),
                    path: child_path(&self.path, &name)?,
                })
            })
            .collect()
    }

    pub fn keys(&self) -> PreferencesResult<Vec<String>> {
        self.backend.keys(&self.path)
    }

    /// Stored text for a key, `None` when absent
    pub fn get_raw(&self, key: &str) -> PreferencesResult<Option<String>> {
        self.backend.get(&self.path, key)
    }

    pub fn put_raw(&self, key: &str, value: &str) -> PreferencesResult<()> {
        self.backend.put(&self.path, key, value)
    }

    pub fn remove(&self, key: &str) -> PreferencesResult<()> {
        self.backend.remove(&self.path, key)
    }

    /// Typed read that applies `default` when the key is absent or malformed
    pub fn get<T: StoredValue>(&self, key: &str, default: T) -> PreferencesResult<T> {
        match self.get_raw(key)? {
            Some(raw) => match T::decode(&raw) {
                Some(value) => Ok(value),
                None => {
                    tracing::warn!(
                        node = %self.path,
                        key,
                        raw = %raw,
                        expected = T::TYPE_NAME,
                        "malformed preference value, using default"
                    );
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    pub fn put<T: StoredValue>(&self, key: &str, value: &T) -> PreferencesResult<()> {
        self.put_raw(key, &value.encode())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> PreferencesResult<bool> {
        self.get(key, default)
    }

    pub fn put_bool(&self, key: &str, value: bool) -> PreferencesResult<()> {
        self.put(key, &value)
    }

    pub fn get_string(&self, key: &str, default: &str) -> PreferencesResult<String> {
        self.get(key, default.to_string())
    }

    pub fn put_string(&self, key: &str, value: &str) -> PreferencesResult<()> {
        self.put_raw(key, value)
    }

    pub fn get_double(&self, key: &str, default: f64) -> PreferencesResult<f64> {
        self.get(key, default)
    }

    pub fn put_double(&self, key: &str, value: f64) -> PreferencesResult<()> {
        self.put(key, &value)
    }

    pub fn get_int(&self, key: &str, default: i32) -> PreferencesResult<i32> {
        self.get(key, default)
    }

    pub fn put_int(&self, key: &str, value: i32) -> PreferencesResult<()> {
        self.put(key, &value)
    }

    pub fn get_double_array(&self, key: &str, default: &[f64]) -> PreferencesResult<Vec<f64>> {
        self.get(key, default.to_vec())
    }

    pub fn put_double_array(&self, key: &str, value: &[f64]) -> PreferencesResult<()> {
        self.put(key, &value.to_vec())
    }

    /// Read an opaque object stored whole as JSON
    pub fn get_object<T>(&self, key: &str, default: T) -> PreferencesResult<T>
    where
        T: DeserializeOwned,
    {
        match self.get_raw(key)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(value),
                Err(e) => {
                    tracing::warn!(node = %self.path, key, "malformed stored object: {}", e);
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    pub fn put_object<T: Serialize>(&self, key: &str, value: &T) -> PreferencesResult<()> {
        let text = serde_json::to_string(value).map_err(|e| {
            PreferencesError::storage(format!("cannot encode {key} on {}: {e}", self.path))
        })?;
        self.put_raw(key, &text)
    }

    /// Remove this node and its subtree
    pub fn remove_node(&self) -> PreferencesResult<()> {
        self.backend.remove_node(&self.path)
    }

    pub fn sync(&self) -> PreferencesResult<()> {
        self.backend.sync(&self.path)
    }

    pub fn flush(&self) -> PreferencesResult<()> {
        self.backend.flush(&self.path)
    }

    /// Copy this node under `target_root`, keeping its name
    pub fn copy_subtree_to(&self, target_root: &Self, recursive: bool) -> PreferencesResult<Self> {
        self.copy_subtree_as(target_root, self.name(), recursive)
    }

    /// Copy this node under `target_parent` with a new name
    pub fn copy_subtree_as(
        &self,
        target_parent: &Self,
        name: &str,
        recursive: bool,
    ) -> PreferencesResult<Self> {
        self.ensure_exists()?;
        target_parent.ensure_exists()?;
        let target = child_path(&target_parent.path, name)?;
        self.backend.copy_subtree(&self.path, &target, recursive)?;
        Ok(Self {
            backend: target_parent.backend.clone(),
            path: target,
        })
    }

    fn ensure_exists(&self) -> PreferencesResult<()> {
        if self.exists() {
            Ok(())
        } else {
            Err(PreferencesError::NodeRemoved {
                path: self.path.clone(),
            })
        }
    }
}

impl PartialEq for PreferencesNode {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && Arc::ptr_eq(&self.backend, &other.backend)
    }
}

impl fmt::Debug for PreferencesNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferencesNode")
            .field("path", &self.path)
            .finish()
    }
}

impl fmt::Display for PreferencesNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferences;

    #[test]
    fn test_typed_defaults_when_absent() {
        let root = MemoryPreferences::root();
        let node = root.child("window").unwrap();
        assert!(!node.get_bool("VISIBLE", false).unwrap());
        assert_eq!(node.get_double("WIDTH", 800.0).unwrap(), 800.0);
        assert_eq!(node.get_int("ROW", 3).unwrap(), 3);
        assert_eq!(node.get_string("TITLE", "Untitled").unwrap(), "Untitled");
        assert_eq!(
            node.get_double_array("MARGIN", &[0.0; 4]).unwrap(),
            vec![0.0; 4]
        );
        assert_eq!(node.get_raw("TITLE").unwrap(), None);
    }

    #[test]
    fn test_malformed_value_reads_as_default() {
        let root = MemoryPreferences::root();
        let node = root.child("window").unwrap();
        node.put_raw("WIDTH", "very wide").unwrap();
        assert_eq!(node.get_double("WIDTH", 800.0).unwrap(), 800.0);
        node.put_raw("OBJ", "{").unwrap();
        let value: Vec<String> = node.get_object("OBJ", vec!["x".to_string()]).unwrap();
        assert_eq!(value, vec!["x".to_string()]);
    }

    #[test]
    fn test_children_and_names() {
        let root = MemoryPreferences::root();
        let windows = root.child("windows").unwrap();
        windows.child("b-2").unwrap();
        windows.child("a-1").unwrap();
        let names: Vec<String> = windows
            .children()
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["a-1", "b-2"]);
        assert_eq!(windows.parent().unwrap(), root);
        assert!(windows.existing_child("c-3").unwrap().is_none());
    }

    #[test]
    fn test_removed_node_rejects_operations() {
        let root = MemoryPreferences::root();
        let node = root.child("gone").unwrap();
        node.put_bool("INITIALIZED", true).unwrap();
        node.remove_node().unwrap();
        assert!(!node.exists());
        assert!(matches!(
            node.put_bool("INITIALIZED", true),
            Err(PreferencesError::NodeRemoved { .. })
        ));
        assert!(node.flush().is_err());
        assert!(node.child("x").is_err());
    }

    #[test]
    fn test_copy_subtree_to_keeps_name() {
        let root = MemoryPreferences::root();
        let window = root.child("windows").unwrap().child("w-1").unwrap();
        window.put_string("TITLE", "Saved").unwrap();
        window.child("view-1").unwrap().put_int("N", 7).unwrap();
        let layouts = root.child("layouts").unwrap();

        let copy = window.copy_subtree_to(&layouts, true).unwrap();
        assert_eq!(copy.path(), "/layouts/w-1");
        assert_eq!(copy.get_string("TITLE", "").unwrap(), "Saved");
        assert_eq!(copy.child("view-1").unwrap().get_int("N", 0).unwrap(), 7);

        let renamed = copy.copy_subtree_as(&root.child("windows").unwrap(), "w-9", true).unwrap();
        assert_eq!(renamed.path(), "/windows/w-9");
        assert_eq!(renamed.get_string("TITLE", "").unwrap(), "Saved");
    }
}
