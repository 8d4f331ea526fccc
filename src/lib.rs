//! # hunyuan-adapter
//!
//! 混元适配器：在通用聊天补全调用方与混元后端之间修正请求格式，并以视觉模型级联处理图片。
//!
//! Request normalization and vision cascade for Hunyuan chat-completion
//! backends.
//!
//! ## Overview
//!
//! Callers speak a generic, OpenAI-compatible chat API. The Hunyuan backend is
//! stricter: conversations must end on a user or tool message, a tool message
//! may not be followed directly by a user message, content may never be empty,
//! and the tool-capable text model cannot see images. This crate rewrites each
//! request so it satisfies those rules:
//!
//! 1. **Cascade**: images are described by a vision model (memoized in an
//!    LRU + TTL cache) and the descriptions are spliced into the conversation,
//!    which is then redirected to the text model.
//! 2. **Repair**: empty content is filled, assistant transitions are inserted
//!    between tool and user messages, and a trailing assistant turn gets a user
//!    continuation.
//! 3. **Cleanup**: parameters the backend rejects are removed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hunyuan_adapter::{AdapterConfig, AdapterHandler};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> hunyuan_adapter::Result<()> {
//!     let config = AdapterConfig::from_yaml_file("adapter.yaml")?.apply_env();
//!     let handler = AdapterHandler::from_config(config)?;
//!     handler.initialize()?;
//!
//!     let body = json!({
//!         "model": "gpt-4o",
//!         "messages": [{"role": "user", "content": [
//!             {"type": "text", "text": "What does this screenshot say?"},
//!             {"type": "image_url", "image_url": {"url": "https://example.com/shot.png"}}
//!         ]}]
//!     });
//!     match handler.process_request(body).await {
//!         Ok(rewritten) => println!("{}", rewritten),
//!         Err(err) => eprintln!("HTTP {}: {}", err.code(), err.error.message),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Messages, content parts, tool calls and the request envelope |
//! | [`cache`] | Image description cache and key derivation |
//! | [`repair`] | Message sequence repair |
//! | [`cascade`] | Vision cascade orchestration and the [`VisionClient`](cascade::VisionClient) seam |
//! | [`transport`] | HTTP vision client |
//! | [`pipeline`] | Per-request entry point |
//! | [`handler`] | Lifecycle, request ids, status and error bodies |
//! | [`config`] | Adapter configuration |

pub mod cache;
pub mod cascade;
pub mod config;
pub mod handler;
pub mod pipeline;
pub mod repair;
pub mod transport;
pub mod types;

pub use cache::{CacheStats, ImageCache};
pub use cascade::{CascadeOrchestrator, VisionClient, VisionRequest};
pub use config::AdapterConfig;
pub use handler::{AdapterHandler, ErrorResponse, HandlerStatus};
pub use pipeline::RequestPipeline;
pub use repair::repair_messages;
pub use types::{ChatRequest, ContentPart, Message, MessageContent, MessageRole};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
