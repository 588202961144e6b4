//! Preference export/import tests.
//!
//! Tests verify:
//! - import(export()) leaves both documents unchanged
//! - Partial imports merge with current values
//! - Rejected imports change nothing, even when a write fails midway

use cmdsmith_common::error::{CmdsmithError, Result};
use cmdsmith_common::preferences::{PreferenceStore, Theme, PREFERENCES_KEY, SYSTEM_CONFIG_KEY};
use cmdsmith_common::store::{FileStore, KeyValueStore, MemoryStore};
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn customized() -> PreferenceStore {
    let prefs = PreferenceStore::new(Arc::new(MemoryStore::new()));
    prefs
        .save_preferences(json!({
            "defaultSID": "PRD",
            "theme": "dark",
            "commandHistoryLimit": 20,
        }))
        .unwrap();
    prefs.toggle_favorite("hana-trace").unwrap();
    prefs
        .save_system_config(json!({"networkSettings": {"defaultTestHost": "sap.example.com"}}))
        .unwrap();
    prefs
}

#[test]
fn test_import_of_export_is_identity() {
    let prefs = customized();
    let before_prefs = prefs.preferences();
    let before_config = prefs.system_config();

    assert!(prefs.import_config(&prefs.export_config()));
    assert_eq!(prefs.preferences(), before_prefs);
    assert_eq!(prefs.system_config(), before_config);
}

#[test]
fn test_export_moves_between_stores() {
    let source = customized();
    let dir = tempdir().unwrap();
    let target = PreferenceStore::new(Arc::new(FileStore::new(dir.path())));

    assert!(target.import_config(&source.export_config()));
    assert_eq!(target.preferences(), source.preferences());
    assert_eq!(target.system_config(), source.system_config());
    assert!(dir.path().join("cmdsmith-preferences.json").exists());
}

#[test]
fn test_partial_import_merges() {
    let prefs = customized();
    assert!(prefs.import_config(r#"{"preferences": {"theme": "light"}}"#));

    let p = prefs.preferences();
    assert_eq!(p.theme, Theme::Light);
    assert_eq!(p.default_sid, "PRD");
    assert_eq!(p.favorite_utilities, vec!["hana-trace"]);
    assert_eq!(
        prefs.system_config().network_settings.default_test_host,
        "sap.example.com"
    );
}

#[test]
fn test_rejected_imports_change_nothing() {
    let prefs = customized();
    let exported = prefs.export_config();

    let rejected = [
        "",
        "not json",
        r#"{"preferences": {"theme": "neon"}}"#,
        r#"{"preferences": {"theme": "light"}, "systemConfig": {"networkSettings": {"timeoutSeconds": "soon"}}}"#,
        r#"{"preferences": 42}"#,
    ];
    for text in rejected {
        assert!(!prefs.import_config(text), "accepted {:?}", text);
        assert_eq!(prefs.export_config(), exported, "changed by {:?}", text);
    }
}

#[test]
fn test_import_ignores_unknown_sections() {
    let prefs = customized();
    let before = prefs.export_config();
    assert!(prefs.import_config(r#"{"version": 3}"#));
    assert_eq!(prefs.export_config(), before);
}

#[test]
fn test_reset_after_import() {
    let store = Arc::new(MemoryStore::new());
    let prefs = PreferenceStore::new(store.clone());
    assert!(prefs.import_config(r#"{"preferences": {"defaultSID": "QAS"}}"#));
    assert!(store.get(PREFERENCES_KEY).is_some());

    prefs.reset_to_defaults().unwrap();
    assert_eq!(prefs.preferences().default_sid, "HDB");
}

#[test]
fn test_non_object_json_imports_nothing() {
    let prefs = customized();
    let before = prefs.export_config();
    for text in ["5", "[1, 2, 3]", "\"preferences\"", "null"] {
        assert!(prefs.import_config(text), "rejected {:?}", text);
        assert_eq!(prefs.export_config(), before, "changed by {:?}", text);
    }
}

#[test]
fn test_null_section_is_skipped() {
    let prefs = customized();
    let before_config = prefs.system_config();
    assert!(prefs.import_config(r#"{"preferences": {"theme": "light"}, "systemConfig": null}"#));
    assert_eq!(prefs.preferences().theme, Theme::Light);
    assert_eq!(prefs.system_config(), before_config);
}

/// Memory store whose system config writes always fail
struct BrokenConfigStore {
    inner: MemoryStore,
}

impl KeyValueStore for BrokenConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if key == SYSTEM_CONFIG_KEY {
            return Err(CmdsmithError::Store("disk full".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}

#[test]
fn test_failed_second_write_restores_preferences() {
    let store = Arc::new(BrokenConfigStore {
        inner: MemoryStore::new(),
    });
    let prefs = PreferenceStore::new(store.clone());
    prefs.save_preferences(json!({"defaultSID": "PRD"})).unwrap();
    let stored_before = store.get(PREFERENCES_KEY);

    let imported = prefs.import_config(
        r#"{"preferences": {"defaultSID": "QAS"}, "systemConfig": {"networkSettings": {"timeoutSeconds": 5}}}"#,
    );
    assert!(!imported);
    assert_eq!(store.get(PREFERENCES_KEY), stored_before);
    assert_eq!(prefs.preferences().default_sid, "PRD");
}

#[test]
fn test_failed_second_write_removes_new_preferences() {
    let store = Arc::new(BrokenConfigStore {
        inner: MemoryStore::new(),
    });
    let prefs = PreferenceStore::new(store.clone());

    assert!(!prefs.import_config(
        r#"{"preferences": {"defaultSID": "QAS"}, "systemConfig": {"networkSettings": {"timeoutSeconds": 5}}}"#
    ));
    assert!(store.get(PREFERENCES_KEY).is_none());
}
