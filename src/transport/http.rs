use async_trait::async_trait;
use reqwest::Proxy;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

use crate::cascade::{VisionClient, VisionRequest};
use crate::config::AdapterConfig;
use crate::{Error, Result};

/// Vision client speaking the OpenAI-compatible `/chat/completions` API.
pub struct HttpVisionClient {
    client: reqwest::Client,
}

impl HttpVisionClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(
                env::var("HUNYUAN_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(32),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("HUNYUAN_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &AdapterConfig) -> Result<Self> {
        Self::new(config.vision_timeout())
    }
}

#[async_trait]
impl VisionClient for HttpVisionClient {
    async fn describe(&self, request: &VisionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", request.api_base.trim_end_matches('/'));
        let body = json!({
            "model": request.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
        });

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &request.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(TransportError::Http)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let json: Value = response.json().await.map_err(TransportError::Http)?;
        extract_content(&json).ok_or_else(|| {
            Error::Transport(TransportError::Other(
                "response has no choices[0].message.content".to_string(),
            ))
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// `choices[0].message.content` as text; array content has its text parts
/// concatenated.
fn extract_content(response: &Value) -> Option<String> {
    let content = response.pointer("/choices/0/message/content")?;
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => {
            let text: String = parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();
            Some(text)
        }
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
