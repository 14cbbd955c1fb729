//! Volatile preference backend.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::backend::PreferencesBackend;
use super::node::PreferencesNode;
use super::tree::PreferenceTree;
use crate::error::PreferencesResult;

/// Preference backend that never leaves memory.
///
/// `sync` and `flush` only check that the node exists and count the call,
/// which makes this backend convenient for asserting persistence behavior.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    tree: RwLock<PreferenceTree>,
    flushes: AtomicUsize,
    syncs: AtomicUsize,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing tree
    pub fn with_tree(tree: PreferenceTree) -> Self {
        Self {
            tree: RwLock::new(tree),
            ..Default::default()
        }
    }

    /// Create a backend and return a handle to its root node
    pub fn root() -> PreferencesNode {
        PreferencesNode::root(Arc::new(Self::new()))
    }

    /// Copy of the current tree
    pub fn snapshot(&self) -> PreferenceTree {
        self.tree.read().clone()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn sync_count(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }
}

impl PreferencesBackend for MemoryPreferences {
    fn get(&self, path: &str, key: &str) -> PreferencesResult<Option<String>> {
        self.tree.read().get(path, key)
    }

    fn put(&self, path: &str, key: &str, value: &str) -> PreferencesResult<()> {
        self.tree.write().put(path, key, value)
    }

    fn remove(&self, path: &str, key: &str) -> PreferencesResult<()> {
        self.tree.write().remove(path, key)
    }

    fn keys(&self, path: &str) -> PreferencesResult<Vec<String>> {
        self.tree.read().keys(path)
    }

    fn child_names(&self, path: &str) -> PreferencesResult<Vec<String>> {
        self.tree.read().child_names(path)
    }

    fn node_exists(&self, path: &str) -> bool {
        self.tree.read().contains(path)
    }

    fn create_node(&self, path: &str) -> PreferencesResult<()> {
        self.tree.write().create_node(path)
    }

    fn remove_node(&self, path: &str) -> PreferencesResult<()> {
        self.tree.write().remove_node(path)
    }

    fn sync(&self, path: &str) -> PreferencesResult<()> {
        self.tree.read().keys(path)?;
        self.syncs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn flush(&self, path: &str) -> PreferencesResult<()> {
        self.tree.read().keys(path)?;
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn copy_subtree(&self, from: &str, to: &str, recursive: bool) -> PreferencesResult<()> {
        self.tree.write().copy_subtree(from, to, recursive)
    }
}
