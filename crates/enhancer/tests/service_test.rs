//! Tests for the enhancement service with a terminal recovery surface.
//!
//! The OpenAI API is served by a mock HTTP server and the terminal reads scripted answers.

use enhancer::{
    EnhancementRequest, Enhancer, EnhancerConfig, EnhancerErrorKind, OpenAiSettings,
    RateLimitConfig, RateLimitErrorKind, RecoveryErrorKind, RetryPolicy, TerminalRecovery,
};
use httpmock::{Method::POST, MockServer};
use serde_json::json;

fn config_for(server: &MockServer) -> EnhancerConfig {
    EnhancerConfig {
        retry: RetryPolicy {
            max_attempts: 2,
            ..RetryPolicy::default()
        }
        .without_backoff(),
        openai: OpenAiSettings {
            base_url: format!("{}/v1", server.base_url()),
            ..OpenAiSettings::default()
        },
        ..EnhancerConfig::default()
    }
}

fn answers(enhancer: &Enhancer, script: &'static str) -> TerminalRecovery {
    TerminalRecovery::new(
        enhancer.client().clone(),
        script.as_bytes(),
        tokio::io::sink(),
    )
}

fn request() -> EnhancementRequest {
    EnhancementRequest::new("summarize this article", None).unwrap()
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "model": "gpt-4o-mini",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
        "usage": {"total_tokens": 42}
    })
}

#[tokio::test]
async fn test_enhance_uses_default_budget() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion("Summarize the article in 3 bullets."));
        })
        .await;
    let enhancer = Enhancer::from_config(&config_for(&server))
        .unwrap()
        .with_api_key("sk-test");
    let recovery = answers(&enhancer, "");

    let outcome = enhancer.enhance(&request(), None, &recovery).await.unwrap();

    mock.assert_async().await;
    let result = outcome.result.expect("enhanced");
    assert_eq!(result.enhanced_text(), "Summarize the article in 3 bullets.");
    assert_eq!(*result.tokens_used(), 42);
    assert_eq!(outcome.budget, "openai-standard");
    assert_eq!(*outcome.session.calls(), 1);
    let status = enhancer.registry().require("openai-standard").unwrap().status();
    assert_eq!(*status.used(), 1);
}

#[tokio::test]
async fn test_unknown_budget_is_an_error() {
    let server = MockServer::start_async().await;
    let enhancer = Enhancer::from_config(&config_for(&server)).unwrap();
    let recovery = answers(&enhancer, "");

    let err = enhancer
        .enhance(&request(), Some("nope"), &recovery)
        .await
        .unwrap_err();

    match err.kind() {
        EnhancerErrorKind::RateLimit(e) => {
            assert_eq!(e.kind(), &RateLimitErrorKind::UnknownBudget("nope".to_string()))
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_key_entered_at_prompt() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-entered");
            then.status(200).json_body(completion("ok"));
        })
        .await;
    let enhancer = Enhancer::from_config(&config_for(&server)).unwrap();
    let recovery = answers(&enhancer, "k\nsk-entered\n");

    let outcome = enhancer.enhance(&request(), None, &recovery).await.unwrap();

    assert!(outcome.result.is_some());
    assert_eq!(*outcome.session.calls(), 2);
    assert_eq!(*outcome.session.credential_resets(), 1);
    assert_eq!(mock.hits_async().await, 1);
    assert!(enhancer.client().has_api_key());
}

#[tokio::test]
async fn test_settings_change_then_success() {
    let server = MockServer::start_async().await;
    let failing = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("\"model\":\"gpt-4o-mini\"");
            then.status(500).body("upstream exploded");
        })
        .await;
    let working = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("\"model\":\"gpt-4o\"");
            then.status(200).json_body(completion("ok"));
        })
        .await;
    let enhancer = Enhancer::from_config(&config_for(&server))
        .unwrap()
        .with_api_key("sk-test");
    // settings, new model, keep timeout, temperature and max tokens
    let recovery = answers(&enhancer, "s\ngpt-4o\n\n\n\n");

    let outcome = enhancer.enhance(&request(), None, &recovery).await.unwrap();

    assert!(outcome.result.is_some());
    assert_eq!(failing.hits_async().await, 1);
    assert_eq!(working.hits_async().await, 1);
    assert_eq!(enhancer.client().settings().model, "gpt-4o");
    assert_eq!(*outcome.session.attempt(), 1);
}

#[tokio::test]
async fn test_retry_until_exhausted_then_cancel() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(500).body("upstream exploded");
        })
        .await;
    let enhancer = Enhancer::from_config(&config_for(&server))
        .unwrap()
        .with_api_key("sk-test");
    // retry once, then cancel at the terminal prompt
    let recovery = answers(&enhancer, "r\nc\n");

    let outcome = enhancer.enhance(&request(), None, &recovery).await.unwrap();

    assert!(outcome.result.is_none());
    assert!(outcome.session.exhausted());
    assert_eq!(mock.hits_async().await, 2);
}

#[tokio::test]
async fn test_closed_input_propagates() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(500).body("upstream exploded");
        })
        .await;
    let enhancer = Enhancer::from_config(&config_for(&server))
        .unwrap()
        .with_api_key("sk-test");
    let recovery = answers(&enhancer, "");

    let err = enhancer
        .enhance(&request(), None, &recovery)
        .await
        .unwrap_err();

    match err.kind() {
        EnhancerErrorKind::Recovery(e) => assert_eq!(e.kind(), &RecoveryErrorKind::InputClosed),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_local_budget_denies_without_sending() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion("ok"));
        })
        .await;
    let mut config = config_for(&server);
    config
        .budgets
        .insert("single".to_string(), RateLimitConfig::new(1, 60_000));
    let enhancer = Enhancer::from_config(&config)
        .unwrap()
        .with_api_key("sk-test");

    let first = enhancer
        .enhance(&request(), Some("single"), &answers(&enhancer, ""))
        .await
        .unwrap();
    // the rate limit prompt is answered with cancel
    let second = enhancer
        .enhance(&request(), Some("single"), &answers(&enhancer, "c\n"))
        .await
        .unwrap();

    assert!(first.result.is_some());
    assert!(second.result.is_none());
    assert_eq!(*second.session.calls(), 0);
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn test_new_key_not_offered_for_server_failures() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(500).body("upstream exploded");
        })
        .await;
    let enhancer = Enhancer::from_config(&config_for(&server))
        .unwrap()
        .with_api_key("sk-test");
    // retry once; at the terminal prompt "k" is refused, then cancel
    let recovery = answers(&enhancer, "r\nk\nsk-other\nc\n");

    let outcome = enhancer.enhance(&request(), None, &recovery).await.unwrap();

    assert!(outcome.result.is_none());
    assert_eq!(*outcome.session.credential_resets(), 0);
    assert_eq!(mock.hits_async().await, 2);
}
