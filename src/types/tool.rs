//! Tool calls recorded on assistant messages (OpenAI-compatible wire shape)
//!
//! Tool *definitions* are not typed: they stay in
//! [`ChatRequest::extra`](super::ChatRequest) and pass through untouched apart
//! from parameter cleanup.

use serde::{Deserialize, Serialize};

fn default_tool_type() -> String {
    "function".to_string()
}

/// Tool call (invocation recorded on an assistant message)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default = "default_tool_type")]
    pub call_type: String,
    #[serde(default)]
    pub function: FunctionCall,
    /// Fields the adapter does not interpret (`index`, vendor extensions).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: None,
            call_type: default_tool_type(),
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Function name, `"unknown"` when the caller left it blank.
    pub fn name(&self) -> &str {
        if self.function.name.is_empty() {
            "unknown"
        } else {
            &self.function.name
        }
    }
}
