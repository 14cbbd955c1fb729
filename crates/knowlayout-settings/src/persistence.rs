//! Preference File Persistence
//!
//! A [`PreferencesBackend`] that keeps the whole namespace in memory and
//! writes it to a single JSON file on `flush`/`sync`. Writes go to a
//! sibling temporary file first and are renamed into place, so a crash
//! mid-write never leaves a truncated preference file behind.

use knowlayout_core::preferences::{PreferenceTree, PreferencesBackend, PreferencesNode};
use knowlayout_core::{PreferencesError, PreferencesResult};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{PersistenceError, PersistenceResult};

/// File-backed preference store
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    tree: RwLock<PreferenceTree>,
    dirty: AtomicBool,
}

impl FilePreferences {
    /// Open the preference file, starting empty when it does not exist
    pub fn open(path: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let path = path.into();
        let tree = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| PersistenceError::Corrupted {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!("No preference file at {}, starting empty", path.display());
            PreferenceTree::new()
        };
        Ok(Self {
            path,
            tree: RwLock::new(tree),
            dirty: AtomicBool::new(false),
        })
    }

    /// Open the preference file and return a handle to its root node
    pub fn open_root(path: impl Into<PathBuf>) -> PersistenceResult<PreferencesNode> {
        Ok(PreferencesNode::root(Arc::new(Self::open(path)?)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are changes not yet written to disk
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn write_out(&self) -> PersistenceResult<()> {
        let content = serde_json::to_string_pretty(&*self.tree.read())?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, content)?;
        std::fs::rename(&staging, &self.path)?;
        tracing::debug!("Preferences written to {}", self.path.display());
        Ok(())
    }

    fn persist(&self, node: &str) -> PreferencesResult<()> {
        // Flushing a removed node is still an error even with nothing to write.
        self.tree.read().keys(node)?;
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.write_out().map_err(|e| {
            self.dirty.store(true, Ordering::SeqCst);
            PreferencesError::storage(format!("{}: {}", self.path.display(), e))
        })
    }

    fn mark_dirty<T>(&self, result: PreferencesResult<T>) -> PreferencesResult<T> {
        if result.is_ok() {
            self.dirty.store(true, Ordering::SeqCst);
        }
        result
    }
}

impl PreferencesBackend for FilePreferences {
    fn get(&self, path: &str, key: &str) -> PreferencesResult<Option<String>> {
        self.tree.read().get(path, key)
    }

    fn put(&self, path: &str, key: &str, value: &str) -> PreferencesResult<()> {
        let result = self.tree.write().put(path, key, value);
        self.mark_dirty(result)
    }

    fn remove(&self, path: &str, key: &str) -> PreferencesResult<()> {
        let result = self.tree.write().remove(path, key);
        self.mark_dirty(result)
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
        let mut tree = self.tree.write();
        if tree.contains(path) {
            return Ok(());
        }
        let result = tree.create_node(path);
        drop(tree);
        self.mark_dirty(result)
    }

    fn remove_node(&self, path: &str) -> PreferencesResult<()> {
        let result = self.tree.write().remove_node(path);
        self.mark_dirty(result)
    }

    /// Single-writer store: syncing is flushing.
    fn sync(&self, path: &str) -> PreferencesResult<()> {
        self.persist(path)
    }

    fn flush(&self, path: &str) -> PreferencesResult<()> {
        self.persist(path)
    }

    fn copy_subtree(&self, from: &str, to: &str, recursive: bool) -> PreferencesResult<()> {
        let result = self.tree.write().copy_subtree(from, to, recursive);
        self.mark_dirty(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_flush_writes_and_reopen_reads() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("prefs.json");

        let root = FilePreferences::open_root(&file).unwrap();
        let window = root.child("windows").unwrap().child("simple-window-1").unwrap();
        window.put_double("WINDOW_WIDTH", 450.0).unwrap();
        assert!(!file.exists());
        window.flush().unwrap();
        assert!(file.exists());
        assert!(!dir.path().join("prefs.json.tmp").exists());

        let reopened = FilePreferences::open_root(&file).unwrap();
        let window = reopened
            .existing_child("windows")
            .unwrap()
            .and_then(|w| w.existing_child("simple-window-1").unwrap())
            .expect("window node persisted");
        assert_eq!(window.get_double("WINDOW_WIDTH", 0.0).unwrap(), 450.0);
    }

    #[test]
    fn test_flush_without_changes_does_not_write() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("prefs.json");
        let store = FilePreferences::open(&file).unwrap();
        store.flush("/").unwrap();
        assert!(!file.exists());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_corrupted_file_is_reported() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("prefs.json");
        std::fs::write(&file, "{ not json").unwrap();
        assert!(matches!(
            FilePreferences::open(&file),
            Err(PersistenceError::Corrupted { .. })
        ));
    }

    #[test]
    fn test_write_failure_surfaces_as_storage_error() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let file = dir.path().join("prefs.json");
        std::fs::create_dir(&file).unwrap();
        let store = FilePreferences {
            path: file,
            tree: RwLock::new(PreferenceTree::new()),
            dirty: AtomicBool::new(false),
        };
        store.put("/", "LAST_RUN", "now").unwrap();
        assert!(matches!(
            store.flush("/"),
            Err(PreferencesError::Storage { .. })
        ));
        assert!(store.is_dirty());
    }
}
