//! User preferences and system config
//!
//! Both documents are stored as JSON through a `KeyValueStore`. Reads merge
//! whatever is stored over the defaults, so documents written by older or
//! newer versions still load: missing fields take their default, unknown
//! fields are dropped. Anything unreadable loads as the defaults.

use crate::error::{CmdsmithError, Result};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::store::KeyValueStore;
use crate::template::TemplateDefinition;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub const PREFERENCES_KEY: &str = "cmdsmith-preferences";
pub const SYSTEM_CONFIG_KEY: &str = "cmdsmith-system-config";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Pre-filled HANA system id
    #[serde(rename = "defaultSID", default = "default_sid")]
    pub default_sid: String,

    #[serde(default = "default_instance_number")]
    pub default_instance_number: String,

    /// Template ids pinned by the user
    #[serde(default)]
    pub favorite_utilities: Vec<String>,

    #[serde(default)]
    pub theme: Theme,

    /// History capacity
    #[serde(default = "default_history_limit")]
    pub command_history_limit: usize,

    #[serde(default = "default_true")]
    pub show_danger_warnings: bool,

    /// Save valid results to history automatically
    #[serde(default = "default_true")]
    pub auto_save_history: bool,
}

fn default_sid() -> String {
    "HDB".to_string()
}

fn default_instance_number() -> String {
    "00".to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_true() -> bool {
    true
}

impl UserPreferences {
    /// Fill unset `sid` and `instanceNumber` inputs of `template` from the
    /// stored defaults. Values the caller passed, even empty ones, are kept.
    pub fn apply_defaults(&self, template: &TemplateDefinition, inputs: &mut HashMap<String, String>) {
        let defaults = [
            ("sid", &self.default_sid),
            ("instanceNumber", &self.default_instance_number),
        ];
        for (name, value) in defaults {
            if template.find_input(name).is_some() && !inputs.contains_key(name) {
                inputs.insert(name.to_string(), value.clone());
            }
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_sid: default_sid(),
            default_instance_number: default_instance_number(),
            favorite_utilities: Vec::new(),
            theme: Theme::default(),
            command_history_limit: default_history_limit(),
            show_danger_warnings: true,
            auto_save_history: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommonPaths {
    pub sap_install_path: String,
    pub log_directory: String,
    pub backup_directory: String,
    pub temp_directory: String,
}

impl Default for CommonPaths {
    fn default() -> Self {
        Self {
            sap_install_path: "/usr/sap".to_string(),
            log_directory: "/var/log".to_string(),
            backup_directory: "/backup".to_string(),
            temp_directory: "/tmp".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkSettings {
    pub default_test_host: String,
    pub timeout_seconds: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            default_test_host: "google.com".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecuritySettings {
    pub allow_dangerous_commands: bool,
    pub require_confirmation: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            allow_dangerous_commands: false,
            require_confirmation: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemConfig {
    pub common_paths: CommonPaths,
    pub network_settings: NetworkSettings,
    pub security_settings: SecuritySettings,
}

/// Export document: `{ "preferences": ..., "systemConfig": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigExport {
    preferences: UserPreferences,
    system_config: SystemConfig,
}

/// Overlay `patch` onto `base`: objects merge key by key, anything else replaces
fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, patch) => *base = patch,
    }
}

pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.store.get(key) else {
            return T::default();
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                debug!("Using defaults for unreadable '{}': {}", key, e);
                T::default()
            }
        }
    }

    /// Current value of `key` with `patch` overlaid, without saving
    fn patched<T>(&self, key: &str, patch: Value) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        if !patch.is_object() {
            return Err(CmdsmithError::Config(format!(
                "'{}' patch must be a JSON object",
                key
            )));
        }
        let mut current = serde_json::to_value(self.load::<T>(key))?;
        merge_json(&mut current, patch);
        serde_json::from_value(current).map_err(|e| {
            CmdsmithError::Config(format!("invalid value for '{}': {}", key, e))
        })
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json).map_err(|e| {
            warn!("Failed to save '{}': {}", key, e);
            e
        })
    }

    pub fn preferences(&self) -> UserPreferences {
        self.load(PREFERENCES_KEY)
    }

    pub fn system_config(&self) -> SystemConfig {
        self.load(SYSTEM_CONFIG_KEY)
    }

    /// Merge a partial preferences object (camelCase keys) and save it
    pub fn save_preferences(&self, patch: Value) -> Result<UserPreferences> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let updated: UserPreferences = self.patched(PREFERENCES_KEY, patch)?;
        self.save(PREFERENCES_KEY, &updated)?;
        Ok(updated)
    }

    /// Merge a partial system config object and save it
    pub fn save_system_config(&self, patch: Value) -> Result<SystemConfig> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let updated: SystemConfig = self.patched(SYSTEM_CONFIG_KEY, patch)?;
        self.save(SYSTEM_CONFIG_KEY, &updated)?;
        Ok(updated)
    }

    /// Add or remove `template_id` from favorites; returns whether it is now a favorite
    pub fn toggle_favorite(&self, template_id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut prefs = self.preferences();
        let now_favorite = match prefs.favorite_utilities.iter().position(|id| id == template_id) {
            Some(index) => {
                prefs.favorite_utilities.remove(index);
                false
            }
            None => {
                prefs.favorite_utilities.push(template_id.to_string());
                true
            }
        };
        self.save(PREFERENCES_KEY, &prefs)?;
        Ok(now_favorite)
    }

    pub fn reset_to_defaults(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.store.remove(PREFERENCES_KEY)?;
        self.store.remove(SYSTEM_CONFIG_KEY)
    }

    /// Pretty-printed JSON with both documents
    pub fn export_config(&self) -> String {
        let export = ConfigExport {
            preferences: self.preferences(),
            system_config: self.system_config(),
        };
        serde_json::to_string_pretty(&export).unwrap_or_else(|e| {
            warn!("Failed to serialize config export: {}", e);
            String::from("{}")
        })
    }

    /// Merge each section present in `text`. Returns false, changing nothing,
    /// when the text is not JSON or a section does not fit. JSON that is not
    /// an object carries no sections and imports nothing.
    pub fn import_config(&self, text: &str) -> bool {
        let doc: Value = match serde_json::from_str(text) {
            Ok(doc) => doc,
            Err(e) => {
                debug!("Rejected config import: {}", e);
                return false;
            }
        };
        let Value::Object(mut doc) = doc else {
            debug!("Config import is not an object; nothing to merge");
            return true;
        };

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let preferences = match self.import_section::<UserPreferences>(&mut doc, "preferences", PREFERENCES_KEY) {
            Ok(prefs) => prefs,
            Err(()) => return false,
        };
        let system_config = match self.import_section::<SystemConfig>(&mut doc, "systemConfig", SYSTEM_CONFIG_KEY) {
            Ok(config) => config,
            Err(()) => return false,
        };

        let previous_prefs = self.store.get(PREFERENCES_KEY);
        if let Some(prefs) = &preferences {
            if self.save(PREFERENCES_KEY, prefs).is_err() {
                return false;
            }
        }
        if let Some(config) = &system_config {
            if self.save(SYSTEM_CONFIG_KEY, config).is_err() {
                if preferences.is_some() {
                    self.restore(PREFERENCES_KEY, previous_prefs);
                }
                return false;
            }
        }
        true
    }

    /// Merged value of one export section; `Ok(None)` when absent or null
    fn import_section<T>(
        &self,
        doc: &mut Map<String, Value>,
        section: &str,
        key: &str,
    ) -> std::result::Result<Option<T>, ()>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        match doc.remove(section) {
            None | Some(Value::Null) => Ok(None),
            Some(patch) => self.patched(key, patch).map(Some).map_err(|e| {
                debug!("Rejected config import: {}", e);
            }),
        }
    }

    /// Put back the raw document held before a failed import
    fn restore(&self, key: &str, previous: Option<String>) {
        let restored = match previous {
            Some(raw) => self.store.set(key, &raw),
            None => self.store.remove(key),
        };
        if let Err(e) = restored {
            warn!("Failed to restore '{}' after an aborted import: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn prefs_store() -> (Arc<MemoryStore>, PreferenceStore) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), PreferenceStore::new(store))
    }

    #[test]
    fn test_defaults_when_empty() {
        let (_, prefs) = prefs_store();
        let p = prefs.preferences();
        assert_eq!(p.default_sid, "HDB");
        assert_eq!(p.command_history_limit, 50);
        assert_eq!(p.theme, Theme::System);
        assert_eq!(prefs.system_config().common_paths.log_directory, "/var/log");
    }

    #[test]
    fn test_stored_partial_document_merges_with_defaults() {
        let (store, prefs) = prefs_store();
        store
            .set(PREFERENCES_KEY, r#"{"defaultSID":"PRD","futureField":true}"#)
            .unwrap();
        store
            .set(SYSTEM_CONFIG_KEY, r#"{"commonPaths":{"logDirectory":"/srv/log"}}"#)
            .unwrap();

        let p = prefs.preferences();
        assert_eq!(p.default_sid, "PRD");
        assert_eq!(p.default_instance_number, "00");

        let c = prefs.system_config();
        assert_eq!(c.common_paths.log_directory, "/srv/log");
        assert_eq!(c.common_paths.sap_install_path, "/usr/sap");
        assert_eq!(c.network_settings.timeout_seconds, 30);
    }

    #[test]
    fn test_corrupt_document_reads_defaults() {
        let (store, prefs) = prefs_store();
        store.set(PREFERENCES_KEY, "nope").unwrap();
        assert_eq!(prefs.preferences(), UserPreferences::default());
    }

    #[test]
    fn test_save_preferences_patch() {
        let (_, prefs) = prefs_store();
        prefs.save_preferences(json!({"theme": "dark"})).unwrap();
        let updated = prefs.save_preferences(json!({"commandHistoryLimit": 10})).unwrap();
        assert_eq!(updated.theme, Theme::Dark);
        assert_eq!(updated.command_history_limit, 10);
        assert_eq!(prefs.preferences(), updated);

        assert!(prefs.save_preferences(json!({"theme": "neon"})).is_err());
        assert!(prefs.save_preferences(json!(["theme"])).is_err());
        assert_eq!(prefs.preferences().theme, Theme::Dark);
    }

    #[test]
    fn test_system_config_patch_is_deep() {
        let (_, prefs) = prefs_store();
        prefs
            .save_system_config(json!({"commonPaths": {"backupDirectory": "/hana/backup"}}))
            .unwrap();
        prefs
            .save_system_config(json!({"commonPaths": {"tempDirectory": "/var/tmp"}}))
            .unwrap();

        let paths = prefs.system_config().common_paths;
        assert_eq!(paths.backup_directory, "/hana/backup");
        assert_eq!(paths.temp_directory, "/var/tmp");
    }

    #[test]
    fn test_toggle_favorite() {
        let (_, prefs) = prefs_store();
        assert!(prefs.toggle_favorite("log-search").unwrap());
        assert_eq!(prefs.preferences().favorite_utilities, vec!["log-search"]);
        assert!(!prefs.toggle_favorite("log-search").unwrap());
        assert!(prefs.preferences().favorite_utilities.is_empty());
    }

    #[test]
    fn test_reset_to_defaults() {
        let (store, prefs) = prefs_store();
        prefs.save_preferences(json!({"defaultSID": "QAS"})).unwrap();
        prefs.save_system_config(json!({"networkSettings": {"timeoutSeconds": 5}})).unwrap();
        prefs.reset_to_defaults().unwrap();
        assert!(store.is_empty());
        assert_eq!(prefs.preferences().default_sid, "HDB");
    }

    #[test]
    fn test_apply_defaults_fills_only_unset_inputs() {
        use crate::template::InputSpec;

        let template = TemplateDefinition::new("t", "T", "hana", "ls /usr/sap/{sid}/HDB{instanceNumber}")
            .input(InputSpec::text("sid", "SID"))
            .input(InputSpec::text("instanceNumber", "Instance"));
        let prefs = UserPreferences {
            default_sid: "PRD".to_string(),
            default_instance_number: "10".to_string(),
            ..Default::default()
        };

        let mut inputs = HashMap::new();
        inputs.insert("instanceNumber".to_string(), String::new());
        prefs.apply_defaults(&template, &mut inputs);
        assert_eq!(inputs["sid"], "PRD");
        assert_eq!(inputs["instanceNumber"], "");

        let other = TemplateDefinition::new("o", "O", "x", "true");
        let mut untouched = HashMap::new();
        prefs.apply_defaults(&other, &mut untouched);
        assert!(untouched.is_empty());
    }

    #[test]
    fn test_export_shape() {
        let (_, prefs) = prefs_store();
        let exported: Value = serde_json::from_str(&prefs.export_config()).unwrap();
        assert_eq!(exported["preferences"]["defaultSID"], "HDB");
        assert_eq!(exported["systemConfig"]["securitySettings"]["requireConfirmation"], true);
        assert!(prefs.export_config().contains("\n  "));
    }
}
