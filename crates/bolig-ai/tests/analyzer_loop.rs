//! End-to-end tests of the tool-calling loop against mocked Claude and DST
//! APIs.

use bolig_ai::{AiAnalyzer, ClaudeClient, ClaudeConfig, DstClient, ToolRegistry};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn analyzer(claude_url: &str, dst_url: &str) -> AiAnalyzer {
    let client = ClaudeClient::new(
        ClaudeConfig::new("sk-ant-test")
            .with_base_url(claude_url)
            .with_retry(0, 0),
    )
    .expect("client");
    let registry = ToolRegistry::new(DstClient::with_base_url(dst_url).expect("dst client"));
    AiAnalyzer::new(client, registry)
}

fn final_report() -> serde_json::Value {
    json!({
        "summary": "Velholdt villa i attraktivt kvarter.",
        "property": {"address": "Byvej 1", "price": "3.495.000 kr."},
        "risks": [{
            "category": "Økonomi",
            "title": "Høj ejerudgift",
            "details": "Ejerudgiften ligger over gennemsnittet for området.",
            "excerpt": "Ejerudgift: 5.200 kr./md.",
            "recommendations": [
                {"promptTitle": "Spørg mægler", "prompt": "Hvad dækker ejerudgiften?"}
            ]
        }],
        "highlights": [{
            "icon": "map",
            "title": "God beliggenhed",
            "details": "Kort afstand til skole og indkøb."
        }]
    })
}

#[tokio::test]
async fn tool_round_trip_produces_validated_report() {
    let claude = MockServer::start().await;
    let dst = MockServer::start().await;

    // Turn 1: the model asks for statistics.
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "text", "text": ""},
                {"type": "tool_use", "id": "tu_1", "name": "get_dst_subjects", "input": {}}
            ],
            "stop_reason": "tool_use"
        })))
        .up_to_n_times(1)
        .mount(&claude)
        .await;

    // Turn 2: the model answers with the final JSON.
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": final_report().to_string()}],
            "stop_reason": "end_turn"
        })))
        .mount(&claude)
        .await;

    Mock::given(method("POST"))
        .and(path("/subjects"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id":"02"}]"#))
        .expect(1)
        .mount(&dst)
        .await;

    let analyzer = analyzer(&claude.uri(), &dst.uri());
    let result = analyzer
        .analyze_text("Byvej 1. Villa, 140 m², 3.495.000 kr.")
        .await
        .expect("analysis should succeed");

    assert_eq!(result["summary"], "Velholdt villa i attraktivt kvarter.");
    assert_eq!(result["risks"][0]["category"], "Økonomi");
}

#[tokio::test]
async fn failed_tool_call_feeds_error_back_and_analysis_still_completes() {
    let claude = MockServer::start().await;
    let dst = MockServer::start().await;

    // The model calls a tool that is not registered; the loop must feed an
    // error result back instead of aborting.
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "tool_use", "id": "tu_1", "name": "get_address_data", "input": {}}
            ],
            "stop_reason": "tool_use"
        })))
        .up_to_n_times(1)
        .mount(&claude)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": final_report().to_string()}],
            "stop_reason": "end_turn"
        })))
        .mount(&claude)
        .await;

    let analyzer = analyzer(&claude.uri(), &dst.uri());
    let result = analyzer
        .analyze_text("Byvej 1. Villa.")
        .await
        .expect("a single failed tool call must not abort the analysis");

    assert_eq!(result["summary"], "Velholdt villa i attraktivt kvarter.");
}

#[tokio::test]
async fn conversation_without_final_text_is_an_error() {
    let claude = MockServer::start().await;
    let dst = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "tool_use", "id": "tu_1", "name": "get_dst_subjects", "input": {}}
            ],
            "stop_reason": "tool_use"
        })))
        .up_to_n_times(1)
        .mount(&claude)
        .await;

    // Second turn: no tool calls, but no text either.
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [],
            "stop_reason": "end_turn"
        })))
        .mount(&claude)
        .await;

    Mock::given(method("POST"))
        .and(path("/subjects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&dst)
        .await;

    let analyzer = analyzer(&claude.uri(), &dst.uri());
    let err = analyzer
        .analyze_text("Byvej 1.")
        .await
        .expect_err("no final text must fail the analysis");

    assert!(err.to_string().contains("final text"));
}

#[tokio::test]
async fn report_failing_validation_is_an_error() {
    let claude = MockServer::start().await;
    let dst = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": r#"{"foo": "bar"}"#}],
            "stop_reason": "end_turn"
        })))
        .mount(&claude)
        .await;

    let analyzer = analyzer(&claude.uri(), &dst.uri());
    let err = analyzer
        .analyze_text("Byvej 1.")
        .await
        .expect_err("malformed report must fail the pipeline");

    assert!(err.to_string().contains("validation"));
}

#[tokio::test]
async fn empty_input_is_rejected_before_any_request() {
    let claude = MockServer::start().await;
    let dst = MockServer::start().await;

    let analyzer = analyzer(&claude.uri(), &dst.uri());
    let err = analyzer.analyze_text("   ").await.expect_err("blank input");
    assert!(err.to_string().contains("no text content"));
}
