use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use knowlayout_core::{
    MemoryPreferences, PreferencesBackend, PreferencesError, PreferencesNode, PreferencesResult,
};
use knowlayout_layout::{
    LayoutEnv, LayoutError, PreferencesFactory, SimpleWindowFactory, WindowFactory,
};

/// Memory store whose flush and sync fail on demand.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryPreferences,
    failing: AtomicBool,
}

impl FlakyStore {
    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> PreferencesResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(PreferencesError::storage("disk unavailable"))
        } else {
            Ok(())
        }
    }
}

impl PreferencesBackend for FlakyStore {
    fn get(&self, path: &str, key: &str) -> PreferencesResult<Option<String>> {
        self.inner.get(path, key)
    }

    fn put(&self, path: &str, key: &str, value: &str) -> PreferencesResult<()> {
        self.inner.put(path, key, value)
    }

    fn remove(&self, path: &str, key: &str) -> PreferencesResult<()> {
        self.inner.remove(path, key)
    }

    fn keys(&self, path: &str) -> PreferencesResult<Vec<String>> {
        self.inner.keys(path)
    }

    fn child_names(&self, path: &str) -> PreferencesResult<Vec<String>> {
        self.inner.child_names(path)
    }

    fn node_exists(&self, path: &str) -> bool {
        self.inner.node_exists(path)
    }

    fn create_node(&self, path: &str) -> PreferencesResult<()> {
        self.inner.create_node(path)
    }

    fn remove_node(&self, path: &str) -> PreferencesResult<()> {
        self.inner.remove_node(path)
    }

    fn sync(&self, path: &str) -> PreferencesResult<()> {
        self.check()?;
        self.inner.sync(path)
    }

    fn flush(&self, path: &str) -> PreferencesResult<()> {
        self.check()?;
        self.inner.flush(path)
    }
}

fn setup() -> (Arc<FlakyStore>, std::rc::Rc<LayoutEnv>) {
    let store = Arc::new(FlakyStore::default());
    let root = PreferencesNode::root(store.clone());
    let env = LayoutEnv::headless_cancelling(&root).unwrap();
    (store, env)
}

fn is_storage_error(err: &LayoutError) -> bool {
    matches!(err, LayoutError::Preferences(PreferencesError::Storage { .. }))
}

#[test]
fn test_create_fails_when_stamps_cannot_sync() {
    let (store, env) = setup();
    store.fail(true);
    let err = SimpleWindowFactory
        .create(&env, &PreferencesFactory::Under(env.windows.clone()))
        .unwrap_err();
    assert!(is_storage_error(&err));
}

#[test]
fn test_save_failure_is_reported_and_keeps_changed() {
    let (store, env) = setup();
    let window = SimpleWindowFactory
        .create(&env, &PreferencesFactory::Under(env.windows.clone()))
        .unwrap();
    window.geometry().width.set(450.0);

    store.fail(true);
    let err = window.save().unwrap_err();
    assert!(is_storage_error(&err));
    assert!(window.blueprint().is_changed());

    store.fail(false);
    window.save().unwrap();
    assert!(!window.any_changed());
}

#[test]
fn test_delete_failure_is_reported() {
    let (store, env) = setup();
    let window = SimpleWindowFactory
        .create(&env, &PreferencesFactory::Under(env.windows.clone()))
        .unwrap();
    window.save().unwrap();

    store.fail(true);
    assert!(is_storage_error(&window.delete().unwrap_err()));
}

#[test]
fn test_save_as_layout_failure_keeps_private_copy() {
    let (store, env) = setup();
    let window = SimpleWindowFactory
        .create(&env, &PreferencesFactory::Under(env.windows.clone()))
        .unwrap();
    store.fail(true);
    assert!(is_storage_error(&window.save_as_layout(&env).unwrap_err()));
    assert!(window.blueprint().node().exists());
    assert!(env.shared_layouts.children().unwrap().is_empty());
}
