use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::adapters::deepl::{DeepLSettings, DEFAULT_MAX_POLL_INTERVAL};
use crate::adapters::probe::{DEFAULT_PROBE_ADDRESS, DEFAULT_PROBE_TIMEOUT};
use crate::core::connectivity::DEFAULT_PROBE_INTERVAL;
use crate::domain::language::TargetLanguage;
use crate::domain::model::Credential;
use crate::utils::error::{Result, TranslatorError};
use crate::utils::validation::{
    validate_positive_number, validate_socket_addr, validate_url, Validate,
};
use regex::Regex;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "translator.toml";
pub const AUTH_KEY_ENV: &str = "DEEPL_AUTH_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub deepl: DeepLConfig,
    pub connectivity: Option<ConnectivityConfig>,
    pub ui: Option<UiConfig>,
}

#[derive(Clone, Default, Deserialize)]
pub struct DeepLConfig {
    #[serde(default)]
    pub auth_key: String,
    pub server_url: Option<String>,
    pub max_poll_seconds: Option<u64>,
}

impl std::fmt::Debug for DeepLConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLConfig")
            .field("auth_key", &Credential::new(self.auth_key.clone()))
            .field("server_url", &self.server_url)
            .field("max_poll_seconds", &self.max_poll_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectivityConfig {
    pub probe_address: Option<String>,
    pub interval_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiConfig {
    pub default_language: Option<String>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TranslatorError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TranslatorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Configuration taken only from the environment.
    pub fn from_env() -> Self {
        Self {
            deepl: DeepLConfig {
                auth_key: std::env::var(AUTH_KEY_ENV).unwrap_or_default(),
                ..DeepLConfig::default()
            },
            ..Self::default()
        }
    }

    /// `explicit` path, then `./translator.toml`, then the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::debug!("Loading configuration from ./{}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                tracing::debug!("No configuration file, reading {}", AUTH_KEY_ENV);
                return Ok(Self::from_env());
            }
        };

        if config.deepl.auth_key.trim().is_empty() {
            config.deepl.auth_key = std::env::var(AUTH_KEY_ENV).unwrap_or_default();
        }
        Ok(config)
    }

    /// Replaces `${VAR}`; unset variables become empty.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TranslatorError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", var_name);
                String::new()
            })
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(url) = &self.deepl.server_url {
            validate_url("deepl.server_url", url)?;
        }
        if let Some(seconds) = self.deepl.max_poll_seconds {
            validate_positive_number("deepl.max_poll_seconds", seconds, 1)?;
        }

        if let Some(connectivity) = &self.connectivity {
            if let Some(address) = &connectivity.probe_address {
                validate_socket_addr("connectivity.probe_address", address)?;
            }
            if let Some(seconds) = connectivity.interval_seconds {
                validate_positive_number("connectivity.interval_seconds", seconds, 1)?;
            }
            if let Some(seconds) = connectivity.timeout_seconds {
                validate_positive_number("connectivity.timeout_seconds", seconds, 1)?;
            }
        }

        self.default_language()?;
        Ok(())
    }

    /// Missing keys are not an error here; the translate action reports them.
    pub fn credential(&self) -> Credential {
        Credential::new(self.deepl.auth_key.trim())
    }

    pub fn deepl_settings(&self) -> DeepLSettings {
        DeepLSettings {
            server_url: self.deepl.server_url.clone(),
            max_poll_interval: self
                .deepl
                .max_poll_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_MAX_POLL_INTERVAL),
        }
    }

    pub fn probe_address(&self) -> Result<SocketAddr> {
        let address = self
            .connectivity
            .as_ref()
            .and_then(|c| c.probe_address.as_deref())
            .unwrap_or(DEFAULT_PROBE_ADDRESS);
        validate_socket_addr("connectivity.probe_address", address)
    }

    pub fn probe_interval(&self) -> Duration {
        self.connectivity
            .as_ref()
            .and_then(|c| c.interval_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PROBE_INTERVAL)
    }

    pub fn probe_timeout(&self) -> Duration {
        self.connectivity
            .as_ref()
            .and_then(|c| c.timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT)
    }

    pub fn default_language(&self) -> Result<TargetLanguage> {
        match self.ui.as_ref().and_then(|ui| ui.default_language.as_deref()) {
            Some(code) => code.parse(),
            None => Ok(TargetLanguage::default()),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
