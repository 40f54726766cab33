use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that overrides `catalog.api_key`
pub const API_KEY_ENV_VAR: &str = "YOUTUBE_API_KEY";

/// Upper bound the catalog accepts for `maxResults`
const MAX_RESULTS_LIMIT: u32 = 50;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotatorConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// API key for the video catalog. `YOUTUBE_API_KEY` takes precedence when set.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Most recent items requested per channel on every refresh
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".into()
}

const fn default_max_results() -> u32 {
    10
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_retries() -> u32 {
    3
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl CatalogConfig {
    /// The API key to use, preferring the environment over the file.
    ///
    /// Returns `None` when neither source provides a non-empty key.
    #[must_use]
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                let key = self.api_key.trim();
                (!key.is_empty()).then(|| key.to_string())
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".into()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file in the cache directory
    #[serde(default)]
    pub enabled: bool,
}

impl RotatorConfig {
    /// Get the configuration directory path (~/.config/rotator/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/rotator/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default location or create a template on first run.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template, or an error
    /// if the file cannot be read, parsed or validated.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Same as [`Self::load_or_create`] for an explicit path.
    ///
    /// # Errors
    ///
    /// See [`Self::load_or_create`].
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(config_path, CONFIG_TEMPLATE)?;
            info!("Wrote config template to {}", config_path.display());

            return Err(CoreError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(config_path)?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigParseError`] on invalid TOML.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check field values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.catalog.base_url).is_err() {
            return Err(CoreError::ConfigInvalid {
                message: format!("catalog.base_url is not a URL: {}", self.catalog.base_url),
            });
        }
        if self.catalog.max_results == 0 || self.catalog.max_results > MAX_RESULTS_LIMIT {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "catalog.max_results must be between 1 and {MAX_RESULTS_LIMIT}, got {}",
                    self.catalog.max_results
                ),
            });
        }
        if self.proxy.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "proxy.bind_address is not a socket address: {}",
                    self.proxy.bind_address
                ),
            });
        }
        Ok(())
    }
}

/// Template written on first run.
pub const CONFIG_TEMPLATE: &str = r#"# Rotator Configuration
# ~/.config/rotator/config.toml

[catalog]
# Required: a YouTube Data API v3 key. The YOUTUBE_API_KEY environment
# variable overrides this value when set.
api_key = ""
base_url = "https://www.googleapis.com/youtube/v3"
# Most recent videos fetched per channel on each refresh (1-50)
max_results = 10
timeout_secs = 10
max_retries = 3

[proxy]
bind_address = "127.0.0.1:3000"

[logging]
# Also write logs to a file in the cache directory
enabled = false
"#;
