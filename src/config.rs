use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api/v1";
pub const DEFAULT_CREATOR: &str = "techsquad@digitalnest.org";

const APP_DIR_NAME: &str = "nestqueue";
const CONFIG_FILE_NAME: &str = "config.json";

const ENV_API_URL: &str = "NESTQUEUE_API_URL";
const ENV_USER: &str = "NESTQUEUE_USER";
const ENV_TIMEOUT: &str = "NESTQUEUE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub default_creator: String,
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::resolve(stored, |name| env::var(name).ok())
    }

    /// Layers environment overrides on top of the stored file, then defaults.
    pub fn resolve(
        stored: StoredConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let non_empty = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_base_url = non_empty(lookup(ENV_API_URL))
            .or(non_empty(stored.api_base_url))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(AppError::Configuration(format!(
                "API base URL must start with http:// or https://, got '{api_base_url}'"
            )));
        }

        let default_creator = non_empty(lookup(ENV_USER))
            .or(non_empty(stored.default_creator))
            .unwrap_or_else(|| DEFAULT_CREATOR.to_string());

        let timeout_secs = match non_empty(lookup(ENV_TIMEOUT)) {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                AppError::Configuration(format!("{ENV_TIMEOUT} must be a whole number of seconds"))
            })?),
            None => stored.request_timeout_secs,
        };

        Ok(Self {
            api_base_url,
            default_creator,
            request_timeout: timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_creator: DEFAULT_CREATOR.to_string(),
            request_timeout: None,
        }
    }
}

/// What `nestqueue config init` writes to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("could not determine a configuration directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = AppConfig::resolve(StoredConfig::default(), env_of(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn environment_overrides_stored_values() {
        let stored = StoredConfig {
            api_base_url: Some("http://tickets.internal/api/v1".to_string()),
            default_creator: Some("ops@x.org".to_string()),
            request_timeout_secs: Some(30),
        };
        let config = AppConfig::resolve(
            stored.clone(),
            env_of(&[(ENV_API_URL, "https://override/api"), (ENV_TIMEOUT, "5")]),
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://override/api");
        assert_eq!(config.default_creator, "ops@x.org");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));

        let config = AppConfig::resolve(stored, env_of(&[(ENV_USER, " ")])).unwrap();
        assert_eq!(config.api_base_url, "http://tickets.internal/api/v1");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_bad_values() {
        let err = AppConfig::resolve(StoredConfig::default(), env_of(&[(ENV_TIMEOUT, "soon")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));

        let err = AppConfig::resolve(
            StoredConfig::default(),
            env_of(&[(ENV_API_URL, "localhost:3000")]),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn stored_config_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        assert_eq!(StoredConfig::load_from(&path).unwrap(), StoredConfig::default());

        let stored = StoredConfig {
            api_base_url: Some("http://tickets.internal/api/v1".to_string()),
            default_creator: None,
            request_timeout_secs: Some(10),
        };
        stored.save_to(&path).unwrap();
        assert_eq!(StoredConfig::load_from(&path).unwrap(), stored);

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            StoredConfig::load_from(&path),
            Err(AppError::Configuration(_))
        ));
    }
}
