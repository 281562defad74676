//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Feedback toggles (sound, vibration)
//! - Display options
//! - Countdown defaults and presets
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::notify::FeedbackSettings;
use crate::timer::{clamp_sets, Countdown, DurationInput};

/// Feedback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default = "default_true")]
    pub vibration: bool,
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_milliseconds: bool,
}

/// A named countdown length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub label: String,
    pub seconds: u64,
}

/// Countdown defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownConfig {
    #[serde(default = "default_minutes")]
    pub minutes: i64,
    #[serde(default)]
    pub seconds: i64,
    #[serde(default = "default_target_sets")]
    pub target_sets: i64,
    #[serde(default = "default_presets")]
    pub presets: Vec<Preset>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub countdown: CountdownConfig,
}

fn default_true() -> bool {
    true
}
fn default_minutes() -> i64 {
    5
}
fn default_target_sets() -> i64 {
    1
}
fn default_presets() -> Vec<Preset> {
    [("30s", 30), ("1m", 60), ("3m", 180), ("5m", 300), ("10m", 600), ("15m", 900)]
        .into_iter()
        .map(|(label, seconds)| Preset {
            label: label.into(),
            seconds,
        })
        .collect()
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            sound: true,
            vibration: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_milliseconds: true,
        }
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            minutes: default_minutes(),
            seconds: 0,
            target_sets: default_target_sets(),
            presets: default_presets(),
        }
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        for part in parents.into_iter().flat_map(|p| p.split('.')) {
            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<i64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the default cannot
    /// be written.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg = toml::from_str::<Config>(&content).map_err(|e| {
                    ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    }
                })?;
                Ok(cfg)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to default config");
            Self::default()
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
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

    /// Set a config value by key in memory. Returns error if key is unknown
    /// or the value does not fit the field's type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn feedback_settings(&self) -> FeedbackSettings {
        FeedbackSettings {
            sound: self.feedback.sound,
            vibration: self.feedback.vibration,
        }
    }

    /// A fresh countdown from the configured defaults, clamped.
    pub fn countdown(&self) -> Countdown {
        Countdown::new(
            DurationInput::clamped(self.countdown.minutes, self.countdown.seconds),
            clamp_sets(self.countdown.target_sets),
        )
    }

    /// Resolve a preset by label (case-insensitive) or by a number of seconds.
    pub fn preset(&self, name: &str) -> Option<u64> {
        self.countdown
            .presets
            .iter()
            .find(|p| p.label.eq_ignore_ascii_case(name))
            .map(|p| p.seconds)
            .or_else(|| name.parse::<u64>().ok())
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
        assert!(parsed.feedback.sound);
        assert_eq!(parsed.countdown.minutes, 5);
        assert_eq!(parsed.countdown.presets.len(), 6);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[feedback]\nsound = false\n").unwrap();
        assert!(!parsed.feedback.sound);
        assert!(parsed.feedback.vibration);
        assert!(parsed.display.show_milliseconds);
        assert_eq!(parsed.countdown.target_sets, 1);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("feedback.sound").as_deref(), Some("true"));
        assert_eq!(cfg.get("countdown.minutes").as_deref(), Some("5"));
        assert!(cfg.get("feedback.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("feedback.vibration", "false").unwrap();
        cfg.set("countdown.target_sets", "4").unwrap();
        assert!(!cfg.feedback.vibration);
        assert_eq!(cfg.countdown.target_sets, 4);
    }

    #[test]
    fn set_replaces_presets_from_json() {
        let mut cfg = Config::default();
        cfg.set("countdown.presets", r#"[{"label":"tabata","seconds":20}]"#)
            .unwrap();
        assert_eq!(cfg.preset("Tabata"), Some(20));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("feedback.nonexistent", "true").unwrap_err();
        assert!(matches!(
            err,
            crate::error::CoreError::Config(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("display.show_milliseconds", "not_a_bool").is_err());
        assert!(cfg.set("countdown.minutes", "five").is_err());
    }

    #[test]
    fn countdown_from_config_is_clamped() {
        let mut cfg = Config::default();
        cfg.countdown.minutes = 500;
        cfg.countdown.seconds = -4;
        cfg.countdown.target_sets = 0;
        let cd = cfg.countdown();
        assert_eq!(cd.configured_ms(), 99 * 60 * 1000);
        assert_eq!(cd.target_sets(), 1);
    }

    #[test]
    fn preset_lookup() {
        let cfg = Config::default();
        assert_eq!(cfg.preset("3m"), Some(180));
        assert_eq!(cfg.preset("45"), Some(45));
        assert_eq!(cfg.preset("nope"), None);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.countdown.minutes, 5);

        let mut cfg = cfg;
        cfg.feedback.sound = false;
        cfg.save_to(&path).unwrap();
        assert!(!Config::load_from(&path).unwrap().feedback.sound);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "feedback = 3").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CoreError::Config(ConfigError::LoadFailed { .. })
        ));
    }
}
