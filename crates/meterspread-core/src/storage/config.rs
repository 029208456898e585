//! TOML-based application configuration.
//!
//! Stores:
//! - Engine tuning constants (realism ceiling, volatility bands, smoothing thresholds)
//! - Defaults for CLI requests (profile, precision, bucket count)
//! - Adaptive weight memory switch
//!
//! Configuration is stored at `~/.config/meterspread/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::distribution::{EngineConfig, UsageProfile};
use crate::error::ConfigError;

/// Defaults applied when a request leaves a field out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub profile: UsageProfile,
    #[serde(default = "default_precision")]
    pub precision: u32,
    #[serde(default = "default_bucket_count")]
    pub bucket_count: usize,
}

/// Adaptive weight memory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/meterspread/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

// Default functions
fn default_precision() -> u32 {
    1
}
fn default_bucket_count() -> usize {
    24
}
fn default_true() -> bool {
    true
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            profile: UsageProfile::default(),
            precision: default_precision(),
            bucket_count: default_bucket_count(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
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
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    // Null only deserializes into optional fields; required ones fail in `apply`
                    serde_json::Value::Number(_) if value == "none" || value.is_empty() => {
                        serde_json::Value::Null
                    }
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    // Optional numbers (e.g. engine.seed) start out as null
                    serde_json::Value::Null => {
                        if value == "none" || value.is_empty() {
                            serde_json::Value::Null
                        } else {
                            serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/meterspread"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
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
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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

    /// Update a value by key in memory without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the field.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
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
        assert_eq!(parsed.engine.realism_ceiling, 60.0);
        assert_eq!(parsed.defaults.bucket_count, 24);
        assert!(parsed.memory.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("memory.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("defaults.profile").as_deref(), Some("residential"));
        assert_eq!(cfg.get("engine.realism_ceiling").as_deref(), Some("60.0"));
        assert!(cfg.get("engine.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("engine.realism_ceiling", "45").unwrap();
        assert_eq!(cfg.engine.realism_ceiling, 45.0);
        cfg.apply("engine.fresh_weight_blend", "0.8").unwrap();
        assert_eq!(cfg.engine.fresh_weight_blend, 0.8);
    }

    #[test]
    fn apply_updates_optional_seed() {
        let mut cfg = Config::default();
        cfg.apply("engine.seed", "42").unwrap();
        assert_eq!(cfg.engine.seed, Some(42));
        cfg.apply("engine.seed", "7").unwrap();
        assert_eq!(cfg.engine.seed, Some(7));
    }

    #[test]
    fn apply_clears_seed_after_it_was_set() {
        let mut cfg = Config::default();
        cfg.apply("engine.seed", "42").unwrap();
        cfg.apply("engine.seed", "none").unwrap();
        assert_eq!(cfg.engine.seed, None);

        cfg.apply("engine.seed", "9").unwrap();
        cfg.apply("engine.seed", "").unwrap();
        assert_eq!(cfg.engine.seed, None);
    }

    #[test]
    fn apply_rejects_none_for_required_number() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("engine.realism_ceiling", "none"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.engine.realism_ceiling, 60.0);
    }

    #[test]
    fn apply_updates_profile_and_bool() {
        let mut cfg = Config::default();
        cfg.apply("defaults.profile", "flat").unwrap();
        assert_eq!(cfg.defaults.profile, UsageProfile::Flat);
        cfg.apply("memory.enabled", "false").unwrap();
        assert!(!cfg.memory.enabled);
    }

    #[test]
    fn apply_rejects_unknown_key_and_bad_value() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("engine.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.apply("memory.enabled", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.apply("defaults.profile", "industrial"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.defaults.precision, 1);

        std::fs::write(&path, "[engine]\nrealism_ceiling = 30.0\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.engine.realism_ceiling, 30.0);
        assert_eq!(cfg.engine.headroom_margin, 20.0);
        assert!(cfg.memory.enabled);
    }
}
