mod common;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crisis_coach::error::{is_truncation, CoachError};
use crisis_coach::providers::{
    BigModelClient, ChatMessage, CompletionClient, CompletionRequest, MISSING_API_KEY_MESSAGE,
};

use common::{completion_body, model_config};

const COMPLETIONS_PATH: &str = "/api/paas/v4/chat/completions";

fn request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system("You are a crisis-simulation client."),
            ChatMessage::user("How are you feeling tonight?"),
        ],
        temperature: 0.5,
        max_tokens: 1200,
    }
}

/// Bearer auth, model name and sampling settings reach the endpoint
#[tokio::test]
async fn test_complete_sends_expected_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "glm-test",
            "temperature": 0.5,
            "max_tokens": 1200,
            "messages": [
                {"role": "system", "content": "You are a crisis-simulation client."},
                {"role": "user", "content": "How are you feeling tonight?"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("  Numb, mostly.  ", "stop")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = BigModelClient::new(model_config(&server.uri(), Some("test-key"))).unwrap();
    let result = client.complete(&request()).await.unwrap();
    assert_eq!(result.text, "Numb, mostly.");
    assert_eq!(result.finish_reason, "stop");
    assert_eq!(client.endpoint(), format!("{}{}", server.uri(), COMPLETIONS_PATH));
}

/// Missing key fails before any request is sent
#[tokio::test]
async fn test_missing_key_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = BigModelClient::new(model_config(&server.uri(), Some("   "))).unwrap();
    assert!(!client.is_configured());
    let err = client.complete(&request()).await.unwrap_err();
    assert_eq!(err.to_string(), MISSING_API_KEY_MESSAGE);
}

#[tokio::test]
async fn test_error_status_uses_nested_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "rate limit reached"},
            "message": "ignored"
        })))
        .mount(&server)
        .await;

    let client = BigModelClient::new(model_config(&server.uri(), Some("k"))).unwrap();
    let err = client.complete(&request()).await.unwrap_err();
    assert_eq!(err.to_string(), "Model API error: rate limit reached");
    assert!(matches!(
        err.downcast_ref::<CoachError>(),
        Some(CoachError::Provider {
            status: Some(429),
            ..
        })
    ));
}

#[tokio::test]
async fn test_error_status_without_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = BigModelClient::new(model_config(&server.uri(), Some("k"))).unwrap();
    let err = client.complete(&request()).await.unwrap_err();
    assert_eq!(err.to_string(), "Model API request failed (HTTP 502)");
}

/// Empty content cut off by the budget is a truncation
#[tokio::test]
async fn test_empty_content_with_length_is_truncation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("   ", "length")))
        .mount(&server)
        .await;

    let client = BigModelClient::new(model_config(&server.uri(), Some("k"))).unwrap();
    let err = client.complete(&request()).await.unwrap_err();
    assert!(is_truncation(&err));
    assert_eq!(
        err.to_string(),
        "Model returned empty content (finish_reason: length)"
    );
}

#[tokio::test]
async fn test_content_parts_and_refusal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_partial_json(json!({"max_tokens": 1200})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"content": [{"type": "text", "text": "I keep "}, {"type": "text", "text": "replaying it."}]},
                "finish_reason": "stop"
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": null, "refusal": "I can't continue this."}}]
        })))
        .mount(&server)
        .await;

    let client = BigModelClient::new(model_config(&server.uri(), Some("k"))).unwrap();
    let first = client.complete(&request()).await.unwrap();
    assert_eq!(first.text, "I keep replaying it.");

    let second = client.complete(&request()).await.unwrap();
    assert_eq!(second.text, "Model refusal: I can't continue this.");
    assert_eq!(second.finish_reason, "unknown");
}
