//! Chat message format spoken by the caller (OpenAI-compatible wire shape).

use serde::{Deserialize, Deserializer, Serialize};

use super::tool::ToolCall;

/// Prefix that marks an inline (data URL) image.
pub const EMBEDDED_IMAGE_PREFIX: &str = "data:image/";

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fields the adapter does not interpret (`reasoning_content`, `refusal`,
    /// `audio`, ...). Kept verbatim through every rewrite.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_content(MessageRole::System, MessageContent::Text(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_content(MessageRole::User, MessageContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_content(MessageRole::Assistant, MessageContent::Text(text.into()))
    }

    pub fn tool(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_content(MessageRole::Tool, MessageContent::Text(text.into()))
        }
    }

    pub fn with_content(role: MessageRole, content: MessageContent) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
            name: None,
            extra: serde_json::Map::new(),
        }
    }

    /// A message with no content at all.
    pub fn empty(role: MessageRole) -> Self {
        Self {
            role,
            content: None,
            tool_calls: None,
            tool_call_id: None,
            name: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_tool_calls(mut self, calls: Vec<ToolCall>) -> Self {
        self.tool_calls = Some(calls);
        self
    }

    /// Absent, whitespace-only text, or an empty parts list.
    pub fn has_empty_content(&self) -> bool {
        self.content.as_ref().map_or(true, MessageContent::is_empty)
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }

    pub fn contains_image(&self) -> bool {
        self.content.as_ref().is_some_and(MessageContent::contains_image)
    }

    /// Content flattened to text; absent content renders as "".
    pub fn text(&self) -> String {
        self.content
            .as_ref()
            .map(MessageContent::render_text)
            .unwrap_or_default()
    }
}

/// Message role
///
/// Roles outside the four the backend knows are kept verbatim so they
/// survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
    Other(String),
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Other(role) => role,
        }
    }
}

impl From<String> for MessageRole {
    fn from(role: String) -> Self {
        match role.as_str() {
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "tool" => Self::Tool,
            _ => Self::Other(role),
        }
    }
}

impl From<MessageRole> for String {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message content (can be string or array of content parts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text(text.into())
    }

    pub fn parts(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(text) => text.trim().is_empty(),
            MessageContent::Parts(parts) => parts.is_empty(),
        }
    }

    pub fn contains_image(&self) -> bool {
        match self {
            MessageContent::Text(text) => text.starts_with(EMBEDDED_IMAGE_PREFIX),
            MessageContent::Parts(parts) => parts.iter().any(ContentPart::is_image),
        }
    }

    /// Text parts concatenated, images shown as `[image]`, other parts skipped.
    pub fn render_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => Some("[image]"),
                    ContentPart::Other(_) => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Content part (text, image reference, or anything else kept verbatim)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
    /// Part types the adapter does not interpret (`input_audio`, `file`, ...).
    #[serde(untagged)]
    Other(serde_json::Value),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: None,
            },
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentPart::ImageUrl { .. })
    }

    /// Where the image lives, or `None` for text parts.
    pub fn image_source(&self) -> Option<ImageSource<'_>> {
        match self {
            ContentPart::ImageUrl { image_url } => Some(ImageSource::classify(&image_url.url)),
            _ => None,
        }
    }
}

/// Image reference. Accepts both `{"url": ...}` and the bare-string shorthand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl<'de> Deserialize<'de> for ImageUrl {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            Url(String),
            Obj {
                #[serde(default)]
                url: String,
                #[serde(default)]
                detail: Option<String>,
            },
        }

        match Input::deserialize(deserializer)? {
            Input::Url(url) => Ok(ImageUrl { url, detail: None }),
            Input::Obj { url, detail } => Ok(ImageUrl { url, detail }),
        }
    }
}

/// Classified image location, borrowed from the part it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// Full data URL (`data:image/...`)
    Embedded(&'a str),
    /// `http`/`https` URL
    Remote(&'a str),
    /// Anything else
    Other(&'a str),
}

impl<'a> ImageSource<'a> {
    pub fn classify(url: &'a str) -> Self {
        if url.starts_with(EMBEDDED_IMAGE_PREFIX) {
            ImageSource::Embedded(url)
        } else if url.starts_with("http") {
            ImageSource::Remote(url)
        } else {
            ImageSource::Other(url)
        }
    }
}
