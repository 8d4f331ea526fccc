//! 适配器配置：模型标识、凭据、缓存容量与 TTL。
//!
//! Adapter configuration.
//!
//! One explicit value built at startup and shared (behind an `Arc`) by every
//! component that needs it. Fields are all optional in YAML; missing ones take
//! the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Error, ErrorContext, Result};

pub const DEFAULT_VISION_MODEL: &str = "hunyuan-vision-1.5-instruct";
pub const DEFAULT_TEXT_MODEL: &str = "hunyuan-2.0-thinking-20251109";
pub const DEFAULT_API_BASE: &str = "https://api.hunyuan.cloud.tencent.com/v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Model that turns images into text.
    pub vision_model: String,
    /// Model the request is forwarded to after a cascade.
    pub text_model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_base: String,
    pub cache_max_size: usize,
    pub cache_ttl_secs: u64,
    pub vision_max_tokens: u32,
    pub vision_timeout_secs: u64,
    pub enable_cache_logging: bool,
    /// Top-level request fields the backend rejects.
    pub unsupported_params: Vec<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            cache_max_size: 1000,
            cache_ttl_secs: 3600,
            vision_max_tokens: 2000,
            vision_timeout_secs: 60,
            enable_cache_logging: true,
            unsupported_params: vec![
                "parallel_tool_calls".to_string(),
                "reasoning_effort".to_string(),
            ],
        }
    }
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn with_cache_max_size(mut self, max_size: usize) -> Self {
        self.cache_max_size = max_size;
        self
    }

    /// TTL has whole-second granularity; a fractional part rounds up, so a
    /// non-zero duration never becomes 0.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
        self
    }

    pub fn with_cache_logging(mut self, enabled: bool) -> Self {
        self.enable_cache_logging = enabled;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_secs(self.vision_timeout_secs)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("failed to read config file: {}", e),
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_source("config_loader"),
            )
        })?;
        Self::from_yaml_str(&content)
    }

    /// Fill the API key from `API_KEY` when unset; `HUNYUAN_*` variables
    /// override endpoint and model ids.
    pub fn apply_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var("API_KEY").ok().filter(|k| !k.is_empty());
        }
        if let Ok(base) = std::env::var("HUNYUAN_API_BASE") {
            self.api_base = base;
        }
        if let Ok(model) = std::env::var("HUNYUAN_VISION_MODEL") {
            self.vision_model = model;
        }
        if let Ok(model) = std::env::var("HUNYUAN_TEXT_MODEL") {
            self.text_model = model;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("vision_model", &self.vision_model),
            ("text_model", &self.text_model),
            ("api_base", &self.api_base),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::configuration_with_context(
                    format!("{} must not be empty", field),
                    ErrorContext::new()
                        .with_field_path(format!("config.{}", field))
                        .with_source("config_validator"),
                ));
            }
        }

        if self.cache_max_size == 0 {
            return Err(Error::configuration_with_context(
                "cache_max_size must be at least 1",
                ErrorContext::new()
                    .with_field_path("config.cache_max_size")
                    .with_source("config_validator"),
            ));
        }

        if self.cache_ttl_secs == 0 {
            return Err(Error::configuration_with_context(
                "cache_ttl_secs must be at least 1",
                ErrorContext::new()
                    .with_field_path("config.cache_ttl_secs")
                    .with_source("config_validator"),
            ));
        }

        if self.vision_max_tokens == 0 {
            return Err(Error::configuration_with_context(
                "vision_max_tokens must be positive",
                ErrorContext::new()
                    .with_field_path("config.vision_max_tokens")
                    .with_source("config_validator"),
            ));
        }

        Ok(())
    }
}
