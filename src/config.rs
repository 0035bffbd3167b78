//! Configuration loading and management
//!
//! Handles parsing of `tickoff.toml` in the data directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analytics::WeekStart;
use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::store::TaskDefaults;
use crate::task::{Priority, DEFAULT_CATEGORY};

/// Name of the config file inside the data directory
pub const CONFIG_FILE: &str = "tickoff.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for new tasks
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Statistics configuration
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Persistence tuning
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Category for tasks created without one
    #[serde(default = "default_category")]
    pub default_category: String,

    /// Priority for tasks created without one
    #[serde(default)]
    pub default_priority: Priority,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            default_priority: Priority::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// First day of the week for weekly figures (`sunday` or `monday`)
    #[serde(default)]
    pub week_start: WeekStart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// How long to wait for `tasks.lock` before giving up
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a `tickoff.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> Self {
        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    pub fn task_defaults(&self) -> TaskDefaults {
        TaskDefaults {
            category_id: self.tasks.default_category.trim().to_string(),
            priority: self.tasks.default_priority,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tasks.default_category.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "tasks.default_category cannot be empty".to_string(),
            ));
        }
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.tasks.default_category, "personal");
        assert_eq!(cfg.tasks.default_priority, Priority::Medium);
        assert_eq!(cfg.analytics.week_start, WeekStart::Sunday);
        assert_eq!(cfg.storage.lock_timeout_ms, 5000);
        assert_eq!(cfg.task_defaults(), TaskDefaults::default());
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[tasks]
default_category = "work"
default_priority = "high"

[analytics]
week_start = "monday"

[storage]
lock_timeout_ms = 250
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.tasks.default_category, "work");
        assert_eq!(cfg.tasks.default_priority, Priority::High);
        assert_eq!(cfg.analytics.week_start, WeekStart::Monday);
        assert_eq!(cfg.storage.lock_timeout_ms, 250);
    }

    #[test]
    fn unknown_week_start_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[analytics]\nweek_start = \"friday\"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        assert!(matches!(err, Error::TomlParse(_)));
    }

    #[test]
    fn invalid_values_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[tasks]\ndefault_category = \"  \"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_from_dir_defaults_when_missing_or_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from_dir(dir.path());
        assert_eq!(cfg.tasks.default_category, "personal");

        fs::write(dir.path().join(CONFIG_FILE), "[storage]\nlock_timeout_ms = 0")
            .expect("write config");
        let cfg = Config::load_from_dir(dir.path());
        assert_eq!(cfg.storage.lock_timeout_ms, 5000);
    }

    #[test]
    fn load_from_dir_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[tasks]\ndefault_priority = \"urgent\"",
        )
        .expect("write config");

        let cfg = Config::load_from_dir(dir.path());
        assert_eq!(cfg.tasks.default_priority, Priority::Urgent);
        assert_eq!(cfg.tasks.default_category, "personal");
    }
}
