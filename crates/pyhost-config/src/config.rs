use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "PYHOST_CONFIG";

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &["search-path", "venv-path", "redirect-output", "log-file"];

const CONFIG_FILE_NAME: &str = "pyhost.toml";
const POINTER_FILE_NAME: &str = ".pyhost_config_path";

/// Persisted startup settings
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_path: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venv_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_output: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Config {
    /// Resolve the config file location
    ///
    /// `PYHOST_CONFIG` wins when set and non-empty. Otherwise a pointer file
    /// next to the default location may redirect to another file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let default = Self::default_path()?;
        if let Some(pointer) = Self::pointer_path()? {
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return Ok(PathBuf::from(trimmed));
                }
            }
        }

        Ok(default)
    }

    /// Platform default config file location
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        #[cfg(not(target_os = "windows"))]
        let dir = dirs::home_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(".config")
            .join("pyhost");

        #[cfg(target_os = "windows")]
        let dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("pyhost");

        Ok(dir.join(CONFIG_FILE_NAME))
    }

    /// Location of the pointer file that redirects the default config path
    pub fn pointer_path() -> Result<Option<PathBuf>, ConfigError> {
        let default = Self::default_path()?;
        Ok(default.parent().map(|p| p.join(POINTER_FILE_NAME)))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "search-path" => self.search_path.as_ref().map(|p| p.join(",")),
            "venv-path" => self.venv_path.clone(),
            "redirect-output" => self.redirect_output.map(|b| b.to_string()),
            "log-file" => self.log_file.clone(),
            _ => None,
        }
    }

    /// Set a key from its string form
    ///
    /// `search-path` takes a comma-separated list; an empty value clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "search-path" => {
                let entries: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                self.search_path = if entries.is_empty() {
                    None
                } else {
                    Some(entries)
                };
            }
            "venv-path" => self.venv_path = Some(value.to_string()),
            "redirect-output" => {
                let parsed = value.parse::<bool>().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
                self.redirect_output = Some(parsed);
            }
            "log-file" => self.log_file = Some(value.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.search_path.is_none()
            && self.venv_path.is_none()
            && self.redirect_output.is_none()
            && self.log_file.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}
