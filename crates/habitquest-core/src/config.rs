//! TOML-based engine configuration.
//!
//! Stores:
//! - Whether weekly events are enabled
//! - The display locale forwarded to catalog text
//! - An optional fixed UTC offset for the clock
//! - An optional custom event catalog
//! - The level curve
//!
//! Configuration is stored at `~/.config/habitquest/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calendar::SystemClock;
use crate::error::{ConfigError, CoreError, Result};
use crate::level::LevelCurve;
use crate::locale::PRIMARY_LOCALE;

/// Returns `~/.config/habitquest[-dev]/` based on HABITQUEST_ENV.
///
/// Set HABITQUEST_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITQUEST_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitquest-dev")
    } else {
        base_dir.join("habitquest")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_true")]
    pub events_enabled: bool,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Fixed offset east of UTC in minutes; the system timezone when unset.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    /// Custom event catalog replacing the builtin one.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub level: LevelCurve,
}

fn default_true() -> bool {
    true
}
fn default_locale() -> String {
    PRIMARY_LOCALE.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            events_enabled: true,
            locale: default_locale(),
            utc_offset_minutes: None,
            catalog_path: None,
            level: LevelCurve::default(),
        }
    }
}

/// Keys holding optional values; `none` or an empty value clears them.
const OPTIONAL_KEYS: &[&str] = &["utc_offset_minutes", "catalog_path"];

impl EngineConfig {
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

    fn parse_value(
        existing: &serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<serde_json::Value, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        if OPTIONAL_KEYS.contains(&key) && (value.is_empty() || value == "none") {
            return Ok(serde_json::Value::Null);
        }

        let parsed = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => Self::parse_number(value)
                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
            // Unset optional values: take whatever the text looks like.
            serde_json::Value::Null => Self::parse_number(value)
                .unwrap_or_else(|| serde_json::Value::String(value.into())),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => serde_json::from_str(value)
                .map_err(|e| invalid(format!("cannot parse '{value}' as JSON: {e}")))?,
            serde_json::Value::String(_) => serde_json::Value::String(value.into()),
        };
        Ok(parsed)
    }

    fn parse_number(value: &str) -> Option<serde_json::Value> {
        if let Ok(n) = value.parse::<i64>() {
            Some(serde_json::Value::Number(n.into()))
        } else {
            value
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
        }
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;
                let new_value = Self::parse_value(existing, key, value)?;
                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from `path`, returning defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into())
            }
        };

        let cfg: EngineConfig = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
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

    /// Load from the default location, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.locale.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "locale".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }
        self.level.validate().map_err(|e| match e {
            CoreError::InvalidInput(inner) => ConfigError::InvalidValue {
                key: "level".to_string(),
                message: inner.to_string(),
            }
            .into(),
            other => other,
        })
    }

    /// The system clock at the configured offset, or the local timezone.
    pub fn clock(&self) -> Result<SystemClock> {
        match self.utc_offset_minutes {
            Some(minutes) => SystemClock::with_offset_minutes(minutes),
            None => Ok(SystemClock::local()),
        }
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

    /// Set a config value by dot-separated key, without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// or the resulting config is invalid. The config is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: EngineConfig = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
