//! User preferences persisted as JSON under the application directory.

use std::{
    env,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::services::YearBounds;
use crate::transfer::FileFormat;

/// Overrides the application directory (defaults to `~/.finance_core`).
pub const HOME_ENV: &str = "FINANCE_CORE_HOME";
const APP_DIR_NAME: &str = ".finance_core";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Unknown configuration key `{0}`")]
    UnknownKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Default directory for `export` and `import`. Falls back to `<app dir>/data`.
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub default_format: FileFormat,
    #[serde(default)]
    pub timing_enabled: bool,
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    #[serde(default = "Config::default_min_year")]
    pub analytics_min_year: i32,
    #[serde(default = "Config::default_max_years_ahead")]
    pub analytics_max_years_ahead: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_format: FileFormat::default(),
            timing_enabled: false,
            log_filter: Self::default_log_filter(),
            analytics_min_year: Self::default_min_year(),
            analytics_max_years_ahead: Self::default_max_years_ahead(),
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 6] = [
        "data_dir",
        "default_format",
        "timing_enabled",
        "log_filter",
        "analytics_min_year",
        "analytics_max_years_ahead",
    ];

    pub fn default_log_filter() -> String {
        "finance_core=info".into()
    }

    pub fn default_min_year() -> i32 {
        YearBounds::default().min_year
    }

    pub fn default_max_years_ahead() -> i32 {
        YearBounds::default().max_years_ahead
    }

    pub fn year_bounds(&self) -> YearBounds {
        YearBounds {
            min_year: self.analytics_min_year,
            max_years_ahead: self.analytics_max_years_ahead,
        }
    }

    pub fn resolve_data_dir(&self, app_dir: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| app_dir.join("data"))
    }

    /// Applies a `config set <key> <value>` change.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "data_dir" => {
                self.data_dir = if value.is_empty() || value == "default" {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "default_format" => {
                self.default_format = value
                    .parse()
                    .map_err(|err: crate::core::errors::TransferError| invalid(key, err))?;
            }
            "timing_enabled" => {
                self.timing_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid(key, "expected on/off")),
                };
            }
            "log_filter" => {
                if value.is_empty() {
                    return Err(invalid(key, "filter must not be empty"));
                }
                self.log_filter = value.to_string();
            }
            "analytics_min_year" => {
                self.analytics_min_year = value.parse().map_err(|err| invalid(key, err))?;
            }
            "analytics_max_years_ahead" => {
                let years: i32 = value.parse().map_err(|err| invalid(key, err))?;
                if years < 0 {
                    return Err(invalid(key, "must not be negative"));
                }
                self.analytics_max_years_ahead = years;
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// `(key, value)` pairs for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "data_dir",
                self.data_dir
                    .as_ref()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_else(|| "(default)".into()),
            ),
            ("default_format", self.default_format.to_string()),
            ("timing_enabled", self.timing_enabled.to_string()),
            ("log_filter", self.log_filter.clone()),
            ("analytics_min_year", self.analytics_min_year.to_string()),
            (
                "analytics_max_years_ahead",
                self.analytics_max_years_ahead.to_string(),
            ),
        ]
    }
}

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// `$FINANCE_CORE_HOME` when set, otherwise `~/.finance_core`.
pub fn app_dir() -> PathBuf {
    match env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME),
    }
}

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir)?;
        Ok(Self {
            config_path: config_dir.join("config.json"),
            base_dir: base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
