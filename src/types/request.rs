//! Chat-completion request envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::Message;

/// Inbound chat-completion request.
///
/// Only the fields the adapter rewrites are typed; everything else, `tools`
/// included, rides in `extra` and is serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the opaque `tools` list.
    pub fn with_tools(self, tools: Vec<Value>) -> Self {
        self.with_extra("tools", Value::Array(tools))
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn has_images(&self) -> bool {
        self.messages.iter().any(Message::contains_image)
    }
}
