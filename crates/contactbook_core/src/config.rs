//! Runtime configuration for stores opened by the FFI and CLI surfaces.
//!
//! # Responsibility
//! - Resolve database location, load policy and logging settings.
//! - Apply `CONTACTBOOK_*` environment overrides on top of defaults.
//!
//! # Invariants
//! - Unset or blank environment variables leave the default in place.
//! - Invalid values are reported, never silently replaced.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_DB_PATH: &str = "CONTACTBOOK_DB_PATH";
pub const ENV_LOAD_POLICY: &str = "CONTACTBOOK_LOAD_POLICY";
pub const ENV_LOG_LEVEL: &str = "CONTACTBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CONTACTBOOK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "contactbook.sqlite3";

/// What to do when a stored collection cannot be decoded at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Log a warning and start that collection empty.
    #[default]
    FallbackEmpty,
    /// Fail store construction.
    Strict,
}

impl FromStr for LoadPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fallback" | "fallback_empty" | "lenient" => Ok(Self::FallbackEmpty),
            "strict" => Ok(Self::Strict),
            other => Err(ConfigError::InvalidValue {
                key: ENV_LOAD_POLICY,
                value: other.to_string(),
                expected: "fallback|strict",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid {key} value `{value}`; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for opening a persistent contact store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite file holding the key-value table.
    pub db_path: PathBuf,
    pub load_policy: LoadPolicy,
    pub log_level: String,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            load_policy: LoadPolicy::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(policy) = read(ENV_LOAD_POLICY) {
            config.load_policy = policy.parse()?;
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, LoadPolicy, StoreConfig, ENV_DB_PATH, ENV_LOAD_POLICY, ENV_LOG_DIR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = StoreConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.load_policy, LoadPolicy::FallbackEmpty);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn overrides_apply_and_blank_values_are_ignored() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /tmp/people.sqlite3 "),
            (ENV_LOAD_POLICY, "STRICT"),
            (ENV_LOG_DIR, "   "),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/people.sqlite3"));
        assert_eq!(config.load_policy, LoadPolicy::Strict);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn unknown_load_policy_is_rejected() {
        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_LOAD_POLICY, "yolo")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_LOAD_POLICY));
    }
}
