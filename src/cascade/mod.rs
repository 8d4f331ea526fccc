//! 级联处理：图片先由视觉模型描述，再以文本形式交给文本模型。
//!
//! # Vision Cascade
//!
//! The primary model cannot see images. When a request carries any, each
//! image-bearing message is sent to a vision model, the description replaces
//! the images in that message, and the request is redirected to the text
//! model.
//!
//! Descriptions are cached under [`key::cascade_key`], so asking the same
//! question about the same images twice costs one vision call. Vision failures
//! never fail the request: they become an inline `[image analysis failed: ...]`
//! marker. Concurrent misses on the same key are not collapsed; both callers
//! hit the vision model and the last write wins.

mod vision;

pub use vision::{NullVisionClient, VisionClient, VisionRequest};

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{key, ImageCache};
use crate::config::AdapterConfig;
use crate::types::{ChatRequest, ContentPart, Message, MessageContent, MessageRole};

pub const VISION_INSTRUCTION: &str = "Describe this image in detail, including all visible text, \
code, charts and interface elements. The user's question is: ";
pub const DESCRIPTION_HEADER: &str = "[Image description]:";
pub const FAILURE_PREFIX: &str = "[image analysis failed: ";

pub struct CascadeOrchestrator {
    config: Arc<AdapterConfig>,
    cache: Arc<ImageCache>,
    vision: Arc<dyn VisionClient>,
}

impl CascadeOrchestrator {
    pub fn new(
        config: Arc<AdapterConfig>,
        cache: Arc<ImageCache>,
        vision: Arc<dyn VisionClient>,
    ) -> Self {
        Self {
            config,
            cache,
            vision,
        }
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Replace images with descriptions and switch to the text model.
    ///
    /// A request without images is returned untouched, model included.
    pub async fn process(&self, mut request: ChatRequest) -> ChatRequest {
        if !request.has_images() {
            return request;
        }
        info!(
            messages = request.messages.len(),
            vision = self.vision.name(),
            "image content detected, starting cascade"
        );

        let messages = std::mem::take(&mut request.messages);
        // join_all yields in input order regardless of completion order.
        request.messages = join_all(messages.into_iter().map(|msg| self.rewrite_message(msg))).await;

        let original = std::mem::replace(&mut request.model, self.config.text_model.clone());
        info!(from = %original, to = %request.model, "switched model after cascade");
        request
    }

    async fn rewrite_message(&self, msg: Message) -> Message {
        let Some(content) = msg.content.as_ref().filter(|c| c.contains_image()) else {
            return msg;
        };
        let (images, context) = extract_images(content);
        if images.is_empty() {
            return msg;
        }

        let description = self.describe(&images, &context).await;
        debug!(role = %msg.role, images = images.len(), "replaced images with description");
        Message {
            content: Some(MessageContent::Text(format!(
                "{}\n\n{}\n{}",
                context, DESCRIPTION_HEADER, description
            ))),
            ..msg
        }
    }

    /// Description of `images` asked under `context`, from cache when possible.
    pub async fn describe(&self, images: &[ContentPart], context: &str) -> String {
        let cache_key = key::cascade_key(images, context);
        if let Some(hit) = cache_key.as_deref().and_then(|k| self.cache.get(k)) {
            if self.config.enable_cache_logging {
                info!(images = images.len(), "cascade cache hit");
            }
            return hit;
        }

        let request = self.vision_request(images, context);
        match self.vision.describe(&request).await {
            Ok(description) => {
                info!(
                    model = %request.model,
                    chars = description.chars().count(),
                    "image analysis complete"
                );
                if let Some(k) = cache_key {
                    self.cache.set(&k, description.clone());
                }
                description
            }
            Err(e) => {
                warn!(model = %request.model, error = %e, "vision model call failed");
                format!("{}{}]", FAILURE_PREFIX, e)
            }
        }
    }

    fn vision_request(&self, images: &[ContentPart], context: &str) -> VisionRequest {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(ContentPart::text(format!("{}{}", VISION_INSTRUCTION, context)));
        parts.extend(images.iter().cloned());

        VisionRequest {
            model: self.config.vision_model.clone(),
            messages: vec![Message::with_content(
                MessageRole::User,
                MessageContent::Parts(parts),
            )],
            api_key: self.config.api_key.clone(),
            api_base: self.config.api_base.clone(),
            max_tokens: self.config.vision_max_tokens,
        }
    }
}

/// Ordered image parts and the message's text joined by single spaces.
///
/// Text content that is itself a data URL counts as one image with no text.
pub fn extract_images(content: &MessageContent) -> (Vec<ContentPart>, String) {
    match content {
        MessageContent::Parts(parts) => {
            let images = parts.iter().filter(|p| p.is_image()).cloned().collect();
            let text = parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" ");
            (images, text)
        }
        MessageContent::Text(text) if content.contains_image() => {
            (vec![ContentPart::image_url(text.clone())], String::new())
        }
        MessageContent::Text(text) => (Vec::new(), text.clone()),
    }
}
