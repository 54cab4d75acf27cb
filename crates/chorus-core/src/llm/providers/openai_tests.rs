//! Integration tests for the OpenAI provider with a mock server

use crate::config::ProviderConfig;
use crate::error::ChorusError;
use crate::llm::messages::{CompletionRequest, FinishReason, LlmMessage};
use crate::llm::providers::{CompletionProvider, OpenAiProvider};
use crate::llm::streaming;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_provider(base_url: &str) -> OpenAiProvider {
    let config = ProviderConfig::new()
        .with_api_key("test-api-key")
        .with_base_url(base_url)
        .with_max_retries(0);
    OpenAiProvider::new(config).expect("provider construction")
}

fn completion_response(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test123",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

fn user_request(content: &str) -> CompletionRequest {
    CompletionRequest::new(vec![LlmMessage::user(content)])
}

#[tokio::test]
async fn complete_maps_the_success_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("Hello!")))
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let result = provider.complete(&user_request("Hi")).await.unwrap();

    assert_eq!(result.content, "Hello!");
    assert_eq!(result.finish_reason, Some(FinishReason::Stop));
    assert_eq!(result.usage.unwrap().total_tokens, 15);
}

#[tokio::test]
async fn default_model_is_sent_when_no_override_given() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    provider.complete(&user_request("Hi")).await.unwrap();
}

#[tokio::test]
async fn request_model_override_wins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let request = user_request("Hi").with_model("gpt-4o");
    provider.complete(&request).await.unwrap();
}

#[tokio::test]
async fn auth_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Invalid API key"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    // a generous retry budget must not matter for a 401
    let config = ProviderConfig::new()
        .with_api_key("test-api-key")
        .with_base_url(server.uri())
        .with_max_retries(3);
    let provider = OpenAiProvider::new(config).unwrap();

    let err = provider.complete(&user_request("Hi")).await.unwrap_err();
    assert!(matches!(err, ChorusError::Auth { .. }));
}

#[tokio::test]
async fn rate_limit_exposes_the_retry_after_hint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "60")
                .set_body_json(json!({"error": {"message": "Rate limit exceeded"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let err = provider.complete(&user_request("Hi")).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(err.retry_after(), Some(60));
}

#[tokio::test]
async fn server_error_classifies_as_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "overloaded"})))
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let err = provider.complete(&user_request("Hi")).await.unwrap_err();

    assert!(matches!(err, ChorusError::Server { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn empty_messages_never_reach_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let err = provider
        .complete(&CompletionRequest::new(Vec::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, ChorusError::InvalidInput { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn stream_yields_chunks_until_done() {
    let sse_body = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"lo!\"}}]}\n\n\
                    data: [DONE]\n\n";

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"))
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let stream = provider.stream(&user_request("Hi")).await.unwrap();
    let content = streaming::collect(stream).await.unwrap();

    assert_eq!(content, "Hello!");
}

#[tokio::test]
async fn stream_setup_errors_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "bad key"}})),
        )
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let err = provider.stream(&user_request("Hi")).await.err().unwrap();
    assert!(matches!(err, ChorusError::Auth { .. }));
}
