//! HttpVisionClient against a mock HTTP server.

use hunyuan_adapter::cascade::{VisionClient, VisionRequest};
use hunyuan_adapter::transport::HttpVisionClient;
use hunyuan_adapter::types::{ContentPart, Message, MessageContent, MessageRole};
use hunyuan_adapter::Error;
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

fn request(api_base: &str, api_key: Option<&str>) -> VisionRequest {
    VisionRequest {
        model: "hunyuan-vision-1.5-instruct".to_string(),
        messages: vec![Message::with_content(
            MessageRole::User,
            MessageContent::Parts(vec![
                ContentPart::text("Describe this image"),
                ContentPart::image_url("https://example.com/cat.png"),
            ]),
        )],
        api_key: api_key.map(str::to_string),
        api_base: api_base.to_string(),
        max_tokens: 2000,
    }
}

fn client() -> HttpVisionClient {
    HttpVisionClient::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_describe_returns_message_content() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "hunyuan-vision-1.5-instruct",
            "max_tokens": 2000
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "A grey cat on a sofa."}}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let text = client()
        .describe(&request(&server.url(), Some("sk-test")))
        .await
        .unwrap();
    assert_eq!(text, "A grey cat on a sofa.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_trailing_slash_in_api_base() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":[{"type":"text","text":"ok"}]}}]}"#)
        .create_async()
        .await;

    let base = format!("{}/", server.url());
    let text = client().describe(&request(&base, None)).await.unwrap();
    assert_eq!(text, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_remote_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"rate limited"}}"#)
        .create_async()
        .await;

    let err = client()
        .describe(&request(&server.url(), Some("sk-test")))
        .await
        .unwrap_err();
    match err {
        Error::Remote { status, message } => {
            assert_eq!(status, 429);
            assert!(message.contains("rate limited"));
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_content_is_transport_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let err = client()
        .describe(&request(&server.url(), None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().contains("choices[0].message.content"));
}
