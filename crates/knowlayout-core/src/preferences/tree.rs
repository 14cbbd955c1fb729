//! In-memory data model of a preference namespace.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::backend::{child_path, validate_path};
use crate::error::{PreferencesError, PreferencesResult};

/// Every node of a namespace keyed by absolute path.
///
/// The root node always exists. Creating a node creates its ancestors, and
/// removing a node removes everything below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceTree {
    nodes: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for PreferenceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceTree {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), BTreeMap::new());
        Self { nodes }
    }

    /// Number of nodes, the root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    pub fn get(&self, path: &str, key: &str) -> PreferencesResult<Option<String>> {
        Ok(self.values(path)?.get(key).cloned())
    }

    pub fn put(&mut self, path: &str, key: &str, value: &str) -> PreferencesResult<()> {
        self.values_mut(path)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove(&mut self, path: &str, key: &str) -> PreferencesResult<()> {
        self.values_mut(path)?.remove(key);
        Ok(())
    }

    pub fn keys(&self, path: &str) -> PreferencesResult<Vec<String>> {
        Ok(self.values(path)?.keys().cloned().collect())
    }

    pub fn child_names(&self, path: &str) -> PreferencesResult<Vec<String>> {
        self.values(path)?;
        let prefix = Self::descendant_prefix(path);
        Ok(self
            .nodes
            .range(prefix.clone()..)
            .take_while(|(candidate, _)| candidate.starts_with(&prefix))
            .filter_map(|(candidate, _)| {
                let rest = &candidate[prefix.len()..];
                (!rest.is_empty() && !rest.contains('/')).then(|| rest.to_string())
            })
            .collect())
    }

    pub fn create_node(&mut self, path: &str) -> PreferencesResult<()> {
        validate_path(path)?;
        let mut current = String::from("/");
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = child_path(&current, segment)?;
            self.nodes.entry(current.clone()).or_default();
        }
        Ok(())
    }

    pub fn remove_node(&mut self, path: &str) -> PreferencesResult<()> {
        if path == "/" {
            return Err(PreferencesError::InvalidPath {
                path: path.to_string(),
                reason: "the root node cannot be removed".to_string(),
            });
        }
        self.values(path)?;
        let prefix = Self::descendant_prefix(path);
        self.nodes
            .retain(|candidate, _| candidate != path && !candidate.starts_with(&prefix));
        Ok(())
    }

    /// Copy the node at `from` to `to`, replacing whatever was there.
    ///
    /// With `recursive` the whole subtree is copied, otherwise only the
    /// node's own values.
    pub fn copy_subtree(&mut self, from: &str, to: &str, recursive: bool) -> PreferencesResult<()> {
        self.values(from)?;
        validate_path(to)?;
        if to == from || to.starts_with(&Self::descendant_prefix(from)) {
            return Err(PreferencesError::InvalidPath {
                path: to.to_string(),
                reason: format!("cannot copy {from} into itself"),
            });
        }
        let prefix = Self::descendant_prefix(from);
        let copies: Vec<(String, BTreeMap<String, String>)> = self
            .nodes
            .iter()
            .filter_map(|(path, values)| {
                if path == from {
                    Some((to.to_string(), values.clone()))
                } else if recursive && path.starts_with(&prefix) {
                    let suffix = &path[prefix.len()..];
                    Some((format!("{to}/{suffix}"), values.clone()))
                } else {
                    None
                }
            })
            .collect();

        if self.contains(to) {
            self.remove_node(to)?;
        }
        self.create_node(to)?;
        for (path, values) in copies {
            self.create_node(&path)?;
            self.nodes.insert(path, values);
        }
        Ok(())
    }

    fn values(&self, path: &str) -> PreferencesResult<&BTreeMap<String, String>> {
        self.nodes.get(path).ok_or_else(|| PreferencesError::NodeRemoved {
            path: path.to_string(),
        })
    }

    fn values_mut(&mut self, path: &str) -> PreferencesResult<&mut BTreeMap<String, String>> {
        self.nodes
            .get_mut(path)
            .ok_or_else(|| PreferencesError::NodeRemoved {
                path: path.to_string(),
            })
    }

    fn descendant_prefix(path: &str) -> String {
        if path == "/" {
            "/".to_string()
        } else {
            format!("{path}/")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node_creates_ancestors() {
        let mut tree = PreferenceTree::new();
        tree.create_node("/windows/w-1/view-1").unwrap();
        assert!(tree.contains("/windows"));
        assert!(tree.contains("/windows/w-1"));
        assert_eq!(tree.child_names("/").unwrap(), vec!["windows"]);
        assert_eq!(tree.child_names("/windows").unwrap(), vec!["w-1"]);
    }

    #[test]
    fn test_child_names_excludes_grandchildren_and_siblings() {
        let mut tree = PreferenceTree::new();
        tree.create_node("/a/b/c").unwrap();
        tree.create_node("/a/d").unwrap();
        tree.create_node("/ab").unwrap();
        assert_eq!(tree.child_names("/a").unwrap(), vec!["b", "d"]);
    }

    #[test]
    fn test_remove_node_removes_subtree_only() {
        let mut tree = PreferenceTree::new();
        tree.create_node("/a/b").unwrap();
        tree.create_node("/ab").unwrap();
        tree.put("/a/b", "k", "v").unwrap();
        tree.remove_node("/a").unwrap();
        assert!(!tree.contains("/a"));
        assert!(!tree.contains("/a/b"));
        assert!(tree.contains("/ab"));
        assert!(matches!(
            tree.get("/a/b", "k"),
            Err(PreferencesError::NodeRemoved { .. })
        ));
        assert!(tree.remove_node("/").is_err());
    }

    #[test]
    fn test_copy_subtree() {
        let mut tree = PreferenceTree::new();
        tree.create_node("/windows/w-1/view").unwrap();
        tree.put("/windows/w-1", "TITLE", "One").unwrap();
        tree.put("/windows/w-1/view", "NAME", "v").unwrap();

        tree.copy_subtree("/windows/w-1", "/layouts/w-1", true).unwrap();
        assert_eq!(tree.get("/layouts/w-1", "TITLE").unwrap().as_deref(), Some("One"));
        assert_eq!(tree.get("/layouts/w-1/view", "NAME").unwrap().as_deref(), Some("v"));

        tree.copy_subtree("/windows/w-1", "/shallow", false).unwrap();
        assert!(tree.child_names("/shallow").unwrap().is_empty());

        assert!(tree.copy_subtree("/windows", "/windows/w-1/x", true).is_err());
    }
}
