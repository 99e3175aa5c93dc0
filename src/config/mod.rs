use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Endpoint of the reservation sheet web app (read + write).
    #[serde(default)]
    pub api_url: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Keys a complete configuration file carries.
pub const CONFIG_KEYS: [&str; 5] = [
    "api_url",
    "database",
    "poll_interval_secs",
    "request_timeout_secs",
    "log_level",
];

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_poll_interval() -> u64 {
    4
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            database: default_database(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("seatsync")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".seatsync")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("seatsync.conf")
    }

    /// Return the full path of the pending-store database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("seatsync.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            tracing::error!("invalid configuration file: {e}");
            AppError::ConfigLoad
        })
    }

    /// Keys of [`CONFIG_KEYS`] absent from `content` (defaults apply to them).
    pub fn missing_keys(content: &str) -> AppResult<Vec<&'static str>> {
        let value: serde_yaml::Value = if content.trim().is_empty() {
            serde_yaml::Value::Null
        } else {
            serde_yaml::from_str(content)?
        };

        Ok(CONFIG_KEYS
            .iter()
            .copied()
            .filter(|k| value.get(*k).is_none())
            .collect())
    }

    pub fn save(&self) -> AppResult<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir).map_err(|_| AppError::ConfigSave)?;

        let yaml = serde_yaml::to_string(self)?;
        let mut file = fs::File::create(Self::config_file()).map_err(|_| AppError::ConfigSave)?;
        file.write_all(yaml.as_bytes())
            .map_err(|_| AppError::ConfigSave)?;
        Ok(())
    }

    /// Initialize configuration and database location.
    ///
    /// `custom_db` may be absolute or relative to the config directory.
    /// In test mode nothing is written to the config file.
    pub fn init_all(
        custom_db: Option<String>,
        api_url: Option<String>,
        is_test: bool,
    ) -> AppResult<Self> {
        let dir = Self::config_dir();

        let database = match custom_db {
            Some(name) => {
                let p = std::path::Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let config = Config {
            api_url: api_url.unwrap_or_default(),
            database: database.to_string_lossy().to_string(),
            ..Self::default()
        };

        if !is_test {
            config.save()?;
        }

        Ok(config)
    }
}
