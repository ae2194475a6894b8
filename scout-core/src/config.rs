//! Runtime configuration.
//!
//! Every component receives the parts of [`AppConfig`] it needs through its
//! constructor. Values come from built-in defaults, an optional TOML file, and
//! finally the environment (`SUPABASE_APIKEY`, `PROXY_URL`, `REQUEST_DELAY`,
//! `DEEPSEEK_APIKEY`, `IDEA_SCOUT_CACHE_DIR`).

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_RECORDS_URL: &str =
    "https://xvndstojqjjnwqgxibxa.supabase.co/rest/v1/micro_saas_ideas";
pub const DEFAULT_GENERATOR_URL: &str =
    "https://www.findmicrosaasideas.com/api/micro-saas-ideas-generator";
pub const DEFAULT_PING_URL: &str = "https://httpbin.org/ip";
pub const DEFAULT_USER_ID: &str = "01b7b465-e18d-4340-9b2c-1e89cc7b1e57";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:140.0) Gecko/20100101 Firefox/140.0";
pub const DEFAULT_LLM_URL: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "deepseek-chat";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub acquisition: AcquisitionConfig,
    pub cache: CacheConfig,
    pub llm: LlmConfig,
}

/// Upstream idea service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub records_url: String,
    pub generator_url: String,
    pub ping_url: String,
    pub api_key: Option<String>,
    pub user_id: String,
    pub user_agent: String,
    pub proxy_url: Option<String>,
    /// Sleep after every identifier generation call, successful or not.
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub ping_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub max_requests: u32,
    /// Extra sleep at the end of every acquisition cycle.
    pub cycle_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens_per_idea: u32,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            records_url: DEFAULT_RECORDS_URL.to_string(),
            generator_url: DEFAULT_GENERATOR_URL.to_string(),
            ping_url: DEFAULT_PING_URL.to_string(),
            api_key: None,
            user_id: DEFAULT_USER_ID.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy_url: None,
            request_delay_ms: 500,
            request_timeout_secs: 15,
            ping_timeout_secs: 5,
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            cycle_delay_ms: 1000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".cache"),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LLM_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key: None,
            temperature: 0.2,
            max_tokens_per_idea: 300,
            timeout_secs: 120,
        }
    }
}

impl ApiConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }
}

impl AcquisitionConfig {
    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Defaults, then the TOML file if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            },
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Applies environment overrides. `lookup` abstracts `std::env::var` so
    /// tests do not have to mutate the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(key) = non_empty("SUPABASE_APIKEY") {
            self.api.api_key = Some(key);
        }
        if let Some(proxy) = non_empty("PROXY_URL") {
            self.api.proxy_url = Some(proxy);
        }
        if let Some(delay) = non_empty("REQUEST_DELAY") {
            let seconds: f64 = delay.parse().map_err(|_| ConfigError::InvalidValue {
                field: "REQUEST_DELAY".to_string(),
                value: delay.clone(),
            })?;
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "REQUEST_DELAY".to_string(),
                    value: delay,
                });
            }
            self.api.request_delay_ms = (seconds * 1000.0).round() as u64;
        }
        if let Some(key) = non_empty("DEEPSEEK_APIKEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(dir) = non_empty("IDEA_SCOUT_CACHE_DIR") {
            self.cache.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("api.records_url", &self.api.records_url),
            ("api.generator_url", &self.api.generator_url),
            ("llm.url", &self.llm.url),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }

        if let Some(proxy) = &self.api.proxy_url {
            if url::Url::parse(proxy).is_err() {
                return Err(ConfigError::InvalidValue {
                    field: "api.proxy_url".to_string(),
                    value: proxy.clone(),
                });
            }
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "api.request_timeout_secs must be greater than zero".to_string(),
            });
        }

        if self.api.user_id.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "api.user_id must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
