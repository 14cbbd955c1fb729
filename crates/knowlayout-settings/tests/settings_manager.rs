use knowlayout_core::preferences::PreferencesNode;
use knowlayout_settings::{Config, SettingsManager};
use tempfile::tempdir;

#[test]
fn test_load_from_dir_writes_defaults() {
    let dir = tempdir().unwrap();
    let manager = SettingsManager::load_from_dir(dir.path()).unwrap();
    assert_eq!(manager.config(), &Config::default());
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_saved_changes_survive_reload() {
    let dir = tempdir().unwrap();
    let mut manager = SettingsManager::load_from_dir(dir.path()).unwrap();
    manager.config_mut().orchestrator.worker_threads = 6;
    manager.config_mut().logging.filter = "debug".to_string();
    manager.save().unwrap();

    let reloaded = SettingsManager::load_from_dir(dir.path()).unwrap();
    assert_eq!(reloaded.config().orchestrator.worker_threads, 6);
    assert_eq!(reloaded.config().logging.filter, "debug");
}

#[test]
fn test_json_config_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut config = Config::default();
    config.preferences.windows_namespace = "/workspace/windows".to_string();
    config.save_to_file(&path).unwrap();

    let manager = SettingsManager::load_from_file(&path).unwrap();
    assert_eq!(manager.config().preferences.windows_namespace, "/workspace/windows");
    assert_eq!(manager.directory(), dir.path());
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    assert!(Config::default().save_to_file(&path).is_err());
}

#[test]
fn test_preferences_open_under_config_dir() {
    let dir = tempdir().unwrap();
    let manager = SettingsManager::load_from_dir(dir.path()).unwrap();
    let backend = manager.open_preferences().unwrap();
    assert_eq!(backend.path(), dir.path().join("preferences.json"));

    let root = PreferencesNode::root(backend);
    let user = root.child("user").unwrap();
    user.put_string("LAST_RUN", "2026-10-17T09:00:00Z").unwrap();
    user.flush().unwrap();
    assert!(manager.preferences_path().exists());
}
