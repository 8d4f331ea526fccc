//! Vision inference collaborator.

use async_trait::async_trait;

use crate::types::Message;
use crate::{Error, ErrorContext, Result};

/// One call to a vision-capable model.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub api_key: Option<String>,
    pub api_base: String,
    pub max_tokens: u32,
}

/// Something that can turn a vision request into text.
///
/// Retries and timeouts are the implementation's business; the cascade only
/// sees success or failure.
#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn describe(&self, request: &VisionRequest) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Client that refuses every request. Cascades still run, producing failure
/// markers instead of descriptions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVisionClient;

impl NullVisionClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VisionClient for NullVisionClient {
    async fn describe(&self, _: &VisionRequest) -> Result<String> {
        Err(Error::runtime_with_context(
            "vision inference is disabled",
            ErrorContext::new().with_source("null_vision_client"),
        ))
    }
    fn name(&self) -> &'static str {
        "null"
    }
}
