//! # Configuration
//!
//! Client settings resolved from defaults, an optional YAML or JSON file,
//! `MYECOM_*` environment variables, and command-line overrides, in that order.

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};
use thiserror::Error;
use url::Url;

const DEFAULT_API_ORIGIN: &str = "http://localhost:8000/";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SUGGESTION_DEBOUNCE_MS: u64 = 300;

/// Errors raised while resolving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported configuration format. Use 'yaml' or 'json'.")]
    UnsupportedFormat,

    #[error("Invalid {var} value: {reason}")]
    InvalidEnv { var: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the storefront client and CLI.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Origin of the storefront API; endpoints live under `<origin>/api/`.
    pub api_origin: Url,

    /// Logging level used when `RUST_LOG` is not set.
    pub log_level: String,

    /// File holding the persisted access/refresh tokens.
    pub token_path: PathBuf,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Quiet period before a search suggestion request is issued.
    pub suggestion_debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Config {
    /// Generates a default configuration.
    ///
    /// # Panics
    /// Never; the default origin is a valid URL literal.
    #[must_use]
    #[allow(clippy::missing_panics_doc)]
    pub fn with_defaults() -> Self {
        Self {
            api_origin: Url::parse(DEFAULT_API_ORIGIN).expect("default API origin is valid"),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            token_path: default_token_path(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            suggestion_debounce_ms: DEFAULT_SUGGESTION_DEBOUNCE_MS,
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// # Arguments
    /// * `config_path` - Optional path to a `.yaml`/`.yml` or `.json` file.
    /// * `origin_override` - Optional API origin that wins over every other source.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, an environment
    /// variable holds an invalid value, or the resolved values fail validation.
    pub fn load_config(
        config_path: Option<PathBuf>,
        origin_override: Option<Url>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::with_defaults();
        let mut config = defaults.clone();

        if let Some(path) = config_path {
            let content = fs::read_to_string(&path)?;
            config = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => serde_yml::from_str(&content)?,
                Some("json") => serde_json::from_str(&content)?,
                _ => return Err(ConfigError::UnsupportedFormat),
            };
        }

        // Environment variables only fill values still at their defaults.
        if config.api_origin == defaults.api_origin {
            if let Ok(origin) = env::var("MYECOM_API_URL") {
                config.api_origin =
                    Url::parse(&origin).map_err(|err| ConfigError::InvalidEnv {
                        var: "MYECOM_API_URL",
                        reason: err.to_string(),
                    })?;
            }
        }
        if config.log_level == defaults.log_level {
            if let Ok(level) = env::var("MYECOM_LOG_LEVEL") {
                config.log_level = level;
            }
        }
        if config.token_path == defaults.token_path {
            if let Ok(path) = env::var("MYECOM_TOKEN_PATH") {
                config.token_path = PathBuf::from(path);
            }
        }
        if config.request_timeout_secs == defaults.request_timeout_secs {
            if let Ok(timeout) = env::var("MYECOM_REQUEST_TIMEOUT") {
                config.request_timeout_secs =
                    timeout.parse().map_err(|_| ConfigError::InvalidEnv {
                        var: "MYECOM_REQUEST_TIMEOUT",
                        reason: "must be a whole number of seconds".to_string(),
                    })?;
            }
        }

        if let Some(origin) = origin_override {
            config.api_origin = origin;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the resolved configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a non-HTTP origin or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.api_origin.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "API origin must use http or https, got {}",
                self.api_origin
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL every endpoint path is joined onto (`<origin>/api/`).
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if the origin cannot be a base URL.
    pub fn api_base(&self) -> Result<Url, ConfigError> {
        let mut origin = self.api_origin.clone();
        if !origin.path().ends_with('/') {
            let path = format!("{}/", origin.path());
            origin.set_path(&path);
        }
        origin
            .join("api/")
            .map_err(|err| ConfigError::Invalid(format!("invalid API origin: {err}")))
    }
}

/// Default location of the persisted token file.
#[must_use]
pub fn default_token_path() -> PathBuf {
    BaseDirs::new().map_or_else(
        || PathBuf::from("./myecom-tokens.json"),
        |dirs| dirs.config_dir().join("myecom").join("tokens.json"),
    )
}
