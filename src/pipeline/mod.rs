//! 请求处理流水线：校验 → 级联 → 消息修正 → 参数清理。
//!
//! # Request Pipeline
//!
//! The single entry point the serving layer calls for every chat-completion
//! request before it is forwarded to the backend.
//!
//! ## Stages
//!
//! ```text
//! request → validate → cascade → repair → cleanup → request'
//!                         │
//!                 ImageCache + VisionClient
//! ```
//!
//! The cascade always finishes before repair starts: substituting
//! descriptions can itself leave empty content or a trailing assistant
//! message that repair must then fix.
//!
//! ## Example
//!
//! ```rust
//! use hunyuan_adapter::cascade::NullVisionClient;
//! use hunyuan_adapter::pipeline::RequestPipeline;
//! use hunyuan_adapter::types::{ChatRequest, Message};
//! use hunyuan_adapter::AdapterConfig;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let pipeline = RequestPipeline::new(AdapterConfig::default(), Arc::new(NullVisionClient::new()));
//! let request = ChatRequest::new("gpt-4o", vec![Message::user("hi"), Message::assistant("hello")]);
//!
//! let fixed = pipeline.process(request).await.unwrap();
//! assert_eq!(fixed.messages.len(), 3); // ends on a user message again
//! assert_eq!(fixed.model, "gpt-4o"); // no images, no model switch
//! # });
//! ```

mod cleanup;
mod validate;


use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{CacheStats, ImageCache};
use crate::cascade::{CascadeOrchestrator, VisionClient};
use crate::config::AdapterConfig;
use crate::repair::repair_messages;
use crate::types::ChatRequest;
use crate::Result;

const PREVIEW_CHARS: usize = 100;

pub struct RequestPipeline {
    config: Arc<AdapterConfig>,
    cascade: CascadeOrchestrator,
}

impl RequestPipeline {
    /// Pipeline with its own cache sized from `config`.
    pub fn new(config: AdapterConfig, vision: Arc<dyn VisionClient>) -> Self {
        let cache = Arc::new(ImageCache::from_config(&config));
        Self::with_cache(Arc::new(config), cache, vision)
    }

    /// Pipeline sharing an existing cache.
    pub fn with_cache(
        config: Arc<AdapterConfig>,
        cache: Arc<ImageCache>,
        vision: Arc<dyn VisionClient>,
    ) -> Self {
        let cascade = CascadeOrchestrator::new(config.clone(), cache, vision);
        Self { config, cascade }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        self.cascade.cache()
    }

    /// Rewrite `request` so the backend accepts it.
    pub async fn process(&self, request: ChatRequest) -> Result<ChatRequest> {
        validate::validate_request(&request)?;

        let mut request = self.cascade.process(request).await;
        for (i, msg) in request.messages.iter().enumerate() {
            debug!(
                index = i,
                role = %msg.role,
                content = %preview(&msg.text()),
                tool_calls = msg.has_tool_calls(),
                tool_call_id = ?msg.tool_call_id,
                "message after cascade"
            );
        }

        request.messages = repair_messages(&request.messages);
        cleanup::strip_unsupported(&mut request, &self.config.unsupported_params);
        Ok(request)
    }

    /// [`process`](Self::process) for an untyped JSON body.
    pub async fn process_value(&self, raw: Value) -> Result<Value> {
        validate::validate_value(&raw)?;
        let request = validate::parse_request(raw)?;
        let processed = self.process(request).await?;
        Ok(serde_json::to_value(processed)?)
    }

    pub fn cache_stats(&self) -> CacheStats {
        let stats = self.cache().stats();
        if self.config.enable_cache_logging {
            info!(
                hit_rate = stats.hit_rate_percent(),
                hits = stats.hits,
                misses = stats.misses,
                size = stats.size,
                max_size = stats.max_size,
                "image cache stats"
            );
        }
        stats
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
        info!("image cache cleared");
    }

    pub fn delete_cache_entry(&self, key: &str) -> bool {
        let removed = self.cache().delete(key);
        if removed {
            info!(key, "cache entry deleted");
        } else {
            debug!(key, "cache entry not found");
        }
        removed
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
