//! TOML-based application configuration.
//!
//! Stores the timer preferences (phase durations, long-break interval,
//! sound/notification toggles) at `~/.config/studyflow/config.toml`.
//! The CLI exposes the fields through dot-separated keys, e.g.
//! `timer.focus_secs`.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{ConfigStore, TimerConfig};

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyflow/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/studyflow"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist. Returns an error for
    /// unknown keys or unparseable values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value).map_err(|m| invalid(m))?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        self.timer = self.timer.clone().normalized();
        self.save()
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), String> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err("config key is empty".to_string());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| format!("unknown config key: {key}"))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| format!("unknown config key: {key}"))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| e.to_string())?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| format!("cannot parse '{value}' as number"))?;
                        serde_json::Value::Number(n.into())
                    }
                    _ => serde_json::Value::String(value.to_string()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
        }

        Err(format!("unknown config key: {key}"))
    }
}

/// [`ConfigStore`] backed by the TOML config file.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlConfigStore;

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> TimerConfig {
        Config::load_or_default().timer.normalized()
    }

    fn save(&self, config: &TimerConfig) -> Result<(), ConfigError> {
        let mut cfg = Config::load_or_default();
        cfg.timer = config.clone();
        cfg.save()
    }
}

/// In-memory [`ConfigStore`] for tests and embedding. Clones share the
/// same backing cell, so a test can hold one clone and hand the other
/// to the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    inner: Rc<RefCell<TimerConfig>>,
}

impl MemoryConfigStore {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(config)),
        }
    }

    /// The last saved config.
    pub fn saved(&self) -> TimerConfig {
        self.inner.borrow().clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> TimerConfig {
        self.inner.borrow().clone()
    }

    fn save(&self, config: &TimerConfig) -> Result<(), ConfigError> {
        *self.inner.borrow_mut() = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer, cfg.timer);
    }

    #[test]
    fn empty_file_fills_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.timer, TimerConfig::default());
    }

    #[test]
    fn partial_section_fills_remaining_fields() {
        let parsed: Config = toml::from_str("[timer]\nfocus_secs = 3000\n").unwrap();
        assert_eq!(parsed.timer.focus_secs, 3000);
        assert_eq!(parsed.timer.short_break_secs, 300);
        assert!(parsed.timer.sound_enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.focus_secs").as_deref(), Some("1500"));
        assert_eq!(cfg.get("timer.sound_enabled").as_deref(), Some("true"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "timer.focus_secs", "3000").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "timer.focus_secs").unwrap(),
            &serde_json::Value::Number(3000.into())
        );
    }

    #[test]
    fn set_json_value_by_path_updates_nested_bool() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "timer.sound_enabled", "false").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "timer.sound_enabled").unwrap(),
            &serde_json::Value::Bool(false)
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        assert!(Config::set_json_value_by_path(&mut json, "timer.nonexistent", "1").is_err());
        assert!(Config::set_json_value_by_path(&mut json, "nonexistent.key", "1").is_err());
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_type() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        assert!(
            Config::set_json_value_by_path(&mut json, "timer.sound_enabled", "not_a_bool")
                .is_err()
        );
        assert!(Config::set_json_value_by_path(&mut json, "timer.focus_secs", "abc").is_err());
    }

    #[test]
    fn first_load_writes_defaults_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer, TimerConfig::default());
        assert!(path.exists());

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("focus_secs = 1500"));
    }

    #[test]
    fn on_disk_roundtrip_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::load_from(&path).unwrap();
        cfg.timer.focus_secs = 3000;
        cfg.timer.sound_enabled = false;
        cfg.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.timer.focus_secs, 3000);
        assert!(!reloaded.timer.sound_enabled);
        assert_eq!(reloaded.timer.short_break_secs, 300);
    }

    #[test]
    fn corrupt_file_fails_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = not valid toml").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryConfigStore::new(TimerConfig::default());
        let mut cfg = store.load();
        cfg.focus_secs = 3000;
        store.save(&cfg).unwrap();
        assert_eq!(store.saved().focus_secs, 3000);
        assert_eq!(store.load(), cfg);
    }
}
