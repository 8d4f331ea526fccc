//! Benchmarks for the per-request hot path
//!
//! This benchmark measures:
//! - Message repair on short and long agent conversations
//! - Cache key derivation for remote and embedded images
//! - The full pipeline on a request with a cached image

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hunyuan_adapter::cache::key;
use hunyuan_adapter::cascade::NullVisionClient;
use hunyuan_adapter::types::{ContentPart, Message, MessageContent, MessageRole, ToolCall};
use hunyuan_adapter::{repair_messages, AdapterConfig, ChatRequest, RequestPipeline};
use serde_json::json;
use std::sync::Arc;

/// An agent loop of `turns` tool round trips ending on an assistant message.
fn conversation(turns: usize) -> Vec<Message> {
    let mut messages = vec![Message::system(""), Message::user("fix the failing test")];
    for i in 0..turns {
        let id = format!("call_{}", i);
        messages.push(
            Message::empty(MessageRole::Assistant)
                .with_tool_calls(vec![ToolCall::new("run_tests", json!("{}")).with_id(&id)]),
        );
        messages.push(Message::tool(&id, "test result: ".repeat(40)));
        messages.push(Message::user("keep going"));
    }
    messages.push(Message::assistant(""));
    messages
}

fn embedded_image(bytes: usize) -> String {
    format!("data:image/png;base64,{}", "QUJD".repeat(bytes / 3))
}

fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair_messages");

    for turns in [1usize, 10, 50] {
        let messages = conversation(turns);
        group.throughput(Throughput::Elements(messages.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(turns), &messages, |b, msgs| {
            b.iter(|| repair_messages(black_box(msgs)))
        });
    }

    group.finish();
}

fn bench_key_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_key");

    let remote = ContentPart::image_url("https://cdn.example.com/shots/a.png?w=800&h=600&sig=abc123");
    group.bench_function("remote_url", |b| b.iter(|| key::image_key(black_box(&remote))));

    for size in [1_024usize, 256 * 1024] {
        let part = ContentPart::image_url(embedded_image(size));
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("embedded", size), &part, |b, part| {
            b.iter(|| key::image_key(black_box(part)))
        });
    }

    let batch = vec![
        ContentPart::text("compare"),
        remote.clone(),
        ContentPart::image_url(embedded_image(4_096)),
    ];
    group.bench_function("cascade_key", |b| {
        b.iter(|| key::cascade_key(black_box(&batch), black_box("what changed between these?")))
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let pipeline = RequestPipeline::new(
        AdapterConfig::new().with_cache_logging(false),
        Arc::new(NullVisionClient::new()),
    );

    let images = vec![ContentPart::image_url("https://cdn.example.com/a.png")];
    let cache_key = key::cascade_key(&images, "describe").unwrap();
    pipeline.cache().set(&cache_key, "a bar chart");

    let mut messages = conversation(5);
    messages.push(Message::with_content(
        MessageRole::User,
        MessageContent::Parts(vec![ContentPart::text("describe"), images[0].clone()]),
    ));
    let request = ChatRequest::new("gpt-4o", messages);

    c.bench_function("pipeline_cached_image", |b| {
        b.to_async(&runtime)
            .iter(|| async { pipeline.process(black_box(request.clone())).await.unwrap() })
    });
}

criterion_group!(benches, bench_repair, bench_key_derivation, bench_pipeline);
criterion_main!(benches);
