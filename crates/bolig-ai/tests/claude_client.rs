//! Integration tests for `ClaudeClient` using wiremock HTTP mocks.

use bolig_ai::{ClaudeClient, ClaudeConfig, ContentBlock, MessageParam};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ClaudeClient {
    let config = ClaudeConfig::new("sk-ant-test")
        .with_base_url(base_url)
        .with_retry(2, 0);
    ClaudeClient::new(config).expect("client construction should not fail")
}

fn user_turn(text: &str) -> Vec<MessageParam> {
    vec![MessageParam::user(vec![ContentBlock::text(text)])]
}

#[tokio::test]
async fn create_message_parses_text_and_tool_use_blocks() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "id": "msg_1",
        "role": "assistant",
        "content": [
            {"type": "text", "text": "Jeg slår lige statistikken op."},
            {"type": "tool_use", "id": "tu_1", "name": "get_dst_subjects", "input": {}}
        ],
        "stop_reason": "tool_use"
    });

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(serde_json::json!({
            "model": "claude-3-5-sonnet-20240620",
            "max_tokens": 4096
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .create_message(&user_turn("analysér denne bolig"), &[])
        .await
        .expect("request should succeed");

    assert_eq!(response.content.len(), 2);
    assert!(response.requests_tools());
    assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
}

#[tokio::test]
async fn rate_limit_is_retried_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": [{"type": "text", "text": "{}"}],
            "stop_reason": "end_turn"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .create_message(&user_turn("prøv igen"), &[])
        .await
        .expect("one 429 must be retried transparently");

    assert_eq!(response.content.len(), 1);
}

#[tokio::test]
async fn persistent_rate_limit_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .create_message(&user_turn("prøv igen"), &[])
        .await
        .expect_err("exhausted retries must error");

    assert!(err.to_string().contains("rate limit"));
}

#[tokio::test]
async fn non_rate_limit_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("{\"error\": \"invalid_request\"}"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .create_message(&user_turn("dårlig request"), &[])
        .await
        .expect_err("400 must error immediately");

    assert!(err.to_string().contains("400"));
}
