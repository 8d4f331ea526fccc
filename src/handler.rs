//! 代理处理器：管理流水线生命周期、请求 ID 与错误响应。
//!
//! Long-lived handle the serving layer keeps for the process lifetime.
//!
//! Wraps a [`RequestPipeline`] with an initialize/shutdown lifecycle, per
//! request ids and timing, a status snapshot, and the translation of errors
//! into client-facing JSON bodies.

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, Instrument};

use crate::cache::CacheStats;
use crate::cascade::VisionClient;
use crate::config::AdapterConfig;
use crate::pipeline::RequestPipeline;
use crate::transport::HttpVisionClient;
use crate::{Error, ErrorContext, Result};

/// Client-facing error body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub code: u16,
}

impl ErrorResponse {
    fn from_error(err: &Error, request_id: &str) -> Self {
        let body = if err.is_client_error() {
            ErrorBody {
                error_type: "validation_error".to_string(),
                message: err.to_string(),
                code: 400,
            }
        } else {
            ErrorBody {
                error_type: "server_error".to_string(),
                message: "internal server error".to_string(),
                code: 500,
            }
        };
        Self {
            error: body,
            request_id: request_id.to_string(),
        }
    }

    pub fn code(&self) -> u16 {
        self.error.code
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerStatus {
    pub initialized: bool,
    pub vision_model: String,
    pub text_model: String,
    pub cache: CacheStats,
    pub cache_healthy: bool,
}

pub struct AdapterHandler {
    pipeline: RequestPipeline,
    initialized: AtomicBool,
}

impl AdapterHandler {
    pub fn new(config: AdapterConfig, vision: Arc<dyn VisionClient>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pipeline: RequestPipeline::new(config, vision),
            initialized: AtomicBool::new(false),
        })
    }

    /// Handler backed by the HTTP vision client.
    pub fn from_config(config: AdapterConfig) -> Result<Self> {
        let vision = Arc::new(HttpVisionClient::from_config(&config)?);
        Self::new(config, vision)
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Verify the cache works and start accepting requests.
    pub fn initialize(&self) -> Result<()> {
        if !self.pipeline.cache().self_check() {
            return Err(Error::runtime_with_context(
                "image cache self-check failed",
                ErrorContext::new().with_source("adapter_handler"),
            ));
        }
        self.initialized.store(true, Ordering::SeqCst);
        info!(
            vision_model = %self.pipeline.config().vision_model,
            text_model = %self.pipeline.config().text_model,
            "adapter handler initialized"
        );
        Ok(())
    }

    /// Run one raw request body through the pipeline.
    ///
    /// Uses the body's `request_id` when present, otherwise a fresh v4 UUID.
    pub async fn process_request(&self, raw: Value) -> std::result::Result<Value, ErrorResponse> {
        let request_id = raw
            .get("request_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let span = tracing::info_span!("request", request_id = %request_id);
        async {
            if !self.is_initialized() {
                let err = Error::runtime_with_context(
                    "handler is not initialized",
                    ErrorContext::new().with_source("adapter_handler"),
                );
                error!(error = %err, "request rejected");
                return Err(ErrorResponse::from_error(&err, &request_id));
            }

            let started = Instant::now();
            info!("processing request");
            match self.pipeline.process_value(raw).await {
                Ok(body) => {
                    info!(elapsed_ms = started.elapsed().as_millis() as u64, "request processed");
                    Ok(body)
                }
                Err(err) => {
                    error!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        error = %err,
                        "request failed"
                    );
                    Err(ErrorResponse::from_error(&err, &request_id))
                }
            }
        }
        .instrument(span)
        .await
    }

    pub fn status(&self) -> HandlerStatus {
        let config = self.pipeline.config();
        HandlerStatus {
            initialized: self.is_initialized(),
            vision_model: config.vision_model.clone(),
            text_model: config.text_model.clone(),
            cache: self.pipeline.cache_stats(),
            cache_healthy: self.pipeline.cache().self_check(),
        }
    }

    /// Stop accepting requests and drop all cached descriptions.
    pub fn shutdown(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        self.pipeline.clear_cache();
        info!("adapter handler shut down");
    }
}
