use crate::core::calculator::recurrence::Horizon;
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Keys every configuration file is expected to carry.
pub const KNOWN_KEYS: [&str; 4] = ["database", "horizon_days", "horizon_limit", "list_limit"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    /// Days ahead of today materialized for rules that never end.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Cap on new dates entering the rolling window in one pass.
    #[serde(default = "default_horizon_limit")]
    pub horizon_limit: usize,
    /// Default page size for future/past occurrence listings.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

fn default_horizon_days() -> u32 {
    365
}
fn default_horizon_limit() -> usize {
    500
}
fn default_list_limit() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            horizon_days: default_horizon_days(),
            horizon_limit: default_horizon_limit(),
            list_limit: default_list_limit(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rmeetings")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".rmeetings")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rmeetings.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rmeetings.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
            Self::from_yaml(&content)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)
    }

    /// Keys absent from a YAML document (they silently fall back to defaults).
    pub fn missing_keys(content: &str) -> AppResult<Vec<&'static str>> {
        let doc: Value =
            serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))?;
        let map = doc
            .as_mapping()
            .ok_or_else(|| AppError::Config("configuration is not a mapping".into()))?;

        Ok(KNOWN_KEYS
            .iter()
            .copied()
            .filter(|k| !map.contains_key(*k))
            .collect())
    }

    /// Rolling materialization window for a series starting at `series_start`.
    pub fn horizon(&self, today: NaiveDate, series_start: NaiveDate) -> Horizon {
        Horizon::rolling(today, series_start, self.horizon_days, self.horizon_limit)
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = std::path::Path::new(&name);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        } else {
            Self::database_file()
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            let yaml = config.to_yaml()?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = Config::from_yaml("database: /tmp/x.sqlite\n").unwrap();
        assert_eq!(cfg.horizon_days, 365);
        assert_eq!(cfg.horizon_limit, 500);
        assert_eq!(cfg.list_limit, 10);
    }

    #[test]
    fn missing_keys_are_reported() {
        let missing = Config::missing_keys("database: a\nlist_limit: 3\n").unwrap();
        assert_eq!(missing, vec!["horizon_days", "horizon_limit"]);
    }

    #[test]
    fn horizon_uses_configured_window() {
        let cfg = Config {
            database: String::new(),
            horizon_days: 7,
            horizon_limit: 3,
            list_limit: 10,
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let h = cfg.horizon(today, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(h.until, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(h.limit, 3);
    }
}
