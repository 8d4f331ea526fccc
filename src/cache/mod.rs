//! 图片缓存模块：为视觉模型的分析结果提供 LRU + TTL 缓存。
//!
//! # Image Description Cache
//!
//! Vision inference is the slowest and most expensive step of a cascade, so
//! its output is memoized per (images, question) pair.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ImageCache`] | Process-wide LRU store with TTL expiry and hit/miss/eviction counters |
//! | [`CacheStats`] | Snapshot of the store counters |
//! | [`key`] | Stable key derivation for embedded, remote and unknown image sources |
//! | [`Clock`] | Injectable time source used for expiry |
//!
//! ## Example
//!
//! ```rust
//! use hunyuan_adapter::cache::{key, ImageCache};
//! use hunyuan_adapter::types::ContentPart;
//! use std::time::Duration;
//!
//! let cache = ImageCache::new(1000, Duration::from_secs(3600));
//! let images = vec![ContentPart::image_url("https://example.com/chart.png?b=2&a=1")];
//! let k = key::cascade_key(&images, "What does the chart show?").unwrap();
//!
//! cache.set(&k, "A bar chart of monthly revenue.");
//! assert_eq!(cache.get(&k).as_deref(), Some("A bar chart of monthly revenue."));
//! assert_eq!(cache.stats().hits, 1);
//! ```
//!
//! Keys are SHA-256 based and therefore stable across restarts and machines,
//! even though the store itself is memory-only.

pub mod key;
mod store;

pub use store::{CacheStats, Clock, ImageCache, ManualClock, SystemClock};
