//! 类型系统模块：定义调用方协议中的核心数据类型。
//!
//! # Types Module
//!
//! Strongly-typed representations of the chat-completion request the adapter
//! receives and rewrites.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role, optional content and tool metadata |
//! | [`MessageRole`] | Message role (system, user, assistant, tool, or verbatim other) |
//! | [`MessageContent`] | Plain text or an ordered list of [`ContentPart`]s |
//! | [`ImageSource`] | Embedded / remote / other classification of an image part |
//! | [`ToolCall`] | Function call recorded on an assistant message |
//! | [`ChatRequest`] | Request envelope; `tools` and other fields pass through as JSON |
//!
//! ## Example
//!
//! ```rust
//! use hunyuan_adapter::types::{ChatRequest, ContentPart, Message, MessageContent, MessageRole};
//!
//! let request = ChatRequest::new(
//!     "gpt-4o",
//!     vec![
//!         Message::system("You are a helpful assistant"),
//!         Message::with_content(
//!             MessageRole::User,
//!             MessageContent::parts(vec![
//!                 ContentPart::text("What is in this picture?"),
//!                 ContentPart::image_url("https://example.com/cat.png"),
//!             ]),
//!         ),
//!     ],
//! );
//! assert!(request.has_images());
//! ```

pub mod message;
pub mod request;
pub mod tool;

pub use message::{
    ContentPart, ImageSource, ImageUrl, Message, MessageContent, MessageRole,
    EMBEDDED_IMAGE_PREFIX,
};
pub use request::ChatRequest;
pub use tool::{FunctionCall, ToolCall};
