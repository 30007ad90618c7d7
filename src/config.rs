use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "settings.json";

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_PREDICT_PATH: &str = "/predict";
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;
const DEFAULT_MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;
const DEFAULT_OVERLAY_OPACITY: f32 = 0.5;

const ENV_API_URL: &str = "FLOOD_API_URL";
const ENV_TIMEOUT: &str = "FLOOD_REQUEST_TIMEOUT_SECS";
const ENV_LOG_LEVEL: &str = "FLOOD_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub predict_path: String,
    /// No timeout unless set; the inference call otherwise waits indefinitely.
    pub request_timeout_secs: Option<u64>,
    pub max_upload_bytes: u64,
    pub max_response_bytes: u64,
    pub overlay_opacity: f32,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            predict_path: DEFAULT_PREDICT_PATH.to_string(),
            request_timeout_secs: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
            log_level: "info".to_string(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is valid")
}

impl AppConfig {
    /// Defaults, then `settings.json` from `config_dir` when present, then
    /// environment overrides.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(&config_dir.join(CONFIG_FILE_NAME))?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_API_URL) {
            self.api_base_url = Url::parse(raw.trim()).map_err(|e| ConfigError::Env {
                name: ENV_API_URL,
                reason: e.to_string(),
            })?;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            let raw = raw.trim();
            self.request_timeout_secs = if raw.is_empty() || raw == "0" {
                None
            } else {
                Some(raw.parse::<u64>().map_err(|e| ConfigError::Env {
                    name: ENV_TIMEOUT,
                    reason: e.to_string(),
                })?)
            };
        }

        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            self.log_level = raw.trim().to_string();
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.api_base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::Invalid {
                    field: "api_base_url",
                    reason: format!("must use http or https, got {}", other),
                })
            }
        }

        if self.predict_path.trim_matches('/').is_empty() {
            return Err(ConfigError::Invalid {
                field: "predict_path",
                reason: "must not be empty".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(ConfigError::Invalid {
                field: "overlay_opacity",
                reason: format!("must be within [0, 1], got {}", self.overlay_opacity),
            });
        }

        if self.max_upload_bytes == 0 || self.max_response_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_upload_bytes/max_response_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }

        self.log_level().map(|_| ())
    }

    /// Base URL with the predict path appended, keeping any base path prefix.
    pub fn predict_url(&self) -> Url {
        let mut url = self.api_base_url.clone();
        let base = url.path().trim_end_matches('/').to_string();
        let suffix = self.predict_path.trim_start_matches('/');
        url.set_path(&format!("{}/{}", base, suffix));
        url
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .trim()
            .parse::<tracing::Level>()
            .map_err(|e| ConfigError::Invalid {
                field: "log_level",
                reason: e.to_string(),
            })
    }
}
