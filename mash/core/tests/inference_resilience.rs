//! Inference client behaviour against a scripted service

use mash_core::inference::{
    ConnectivityMode, ErrorKind, InferenceError, InferenceRequest, GENERATE_PATH, SHOW_PATH,
    TAGS_PATH,
};
use mash_core::inference::degraded::{OFFLINE_GREETING, OFFLINE_NOTICE};
use mash_core::test_utils::{scripted_client, ScriptedTransport};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn request(prompt: &str) -> InferenceRequest {
    InferenceRequest::new(prompt, "llama2:7b")
}

#[tokio::test]
async fn generation_succeeds_on_third_attempt() {
    let transport = ScriptedTransport::new()
        .fail_times(
            GENERATE_PATH,
            2,
            InferenceError::Connection("connection reset".into()),
        )
        .with_default_reply("third time lucky");
    let client = scripted_client(transport.clone());

    let result = assert_ok!(client.generate(request("hello model")).await);

    assert_eq!(result.text, "third time lucky");
    assert_eq!(result.retries, 2);
    assert!(result.authoritative);
    assert_eq!(transport.count(GENERATE_PATH), 3);
    assert_eq!(client.connectivity().mode(), ConnectivityMode::Online);
}

#[tokio::test]
async fn exhausted_retries_surface_classified_error() {
    let transport = ScriptedTransport::new().fail_path(
        GENERATE_PATH,
        InferenceError::Server {
            status: 500,
            message: "boom".into(),
        },
    );
    let client = scripted_client(transport.clone());

    let err = assert_err!(client.generate(request("x")).await);

    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert!(err.user_message("llama2:7b").contains("server encountered an error"));
    assert_eq!(transport.count(GENERATE_PATH), 3);
    assert!(!client.connectivity().is_degraded());
}

#[tokio::test]
async fn missing_model_is_not_retried() {
    let transport = ScriptedTransport::new()
        .fail_path(GENERATE_PATH, InferenceError::NotFound("model".into()));
    let client = scripted_client(transport.clone());

    let err = assert_err!(client.generate(request("x")).await);

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(transport.count(GENERATE_PATH), 1);
}

#[tokio::test]
async fn reasoning_calls_use_extended_timeout() {
    let transport = ScriptedTransport::new();
    let client = scripted_client(transport.clone());

    assert_ok!(client.generate(request("short")).await);
    assert_ok!(client.generate(request("long").reasoning(true)).await);

    let timeouts: Vec<Duration> = transport
        .requests()
        .iter()
        .filter(|r| r.path == GENERATE_PATH)
        .map(|r| r.timeout)
        .collect();
    assert_eq!(
        timeouts,
        vec![Duration::from_secs(30), Duration::from_secs(60)]
    );
}

#[tokio::test]
async fn session_check_runs_once_with_short_timeout() {
    let transport = ScriptedTransport::new();
    let client = scripted_client(transport.clone());

    assert_ok!(client.generate(request("a")).await);
    assert_ok!(client.generate(request("b")).await);

    let checks: Vec<_> = transport
        .requests()
        .into_iter()
        .filter(|r| r.path == TAGS_PATH)
        .collect();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].timeout, Duration::from_secs(3));
}

#[tokio::test]
async fn failed_check_enters_degraded_mode() {
    let transport = ScriptedTransport::unreachable();
    let client = scripted_client(transport.clone());

    let err = assert_err!(client.generate(request("hello")).await);
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.to_string().contains("Cannot connect to Ollama"));
    assert!(client.connectivity().is_degraded());
    assert_eq!(transport.count(GENERATE_PATH), 0);

    let before = transport.requests().len();
    let reply = assert_ok!(client.generate(request("hello")).await);
    assert_eq!(reply.text, OFFLINE_GREETING);
    assert!(!reply.authoritative);

    let reply = assert_ok!(client.generate(request("tell me a story")).await);
    assert_eq!(reply.text, OFFLINE_NOTICE);
    assert_eq!(transport.requests().len(), before);
}

#[tokio::test]
async fn degraded_mode_is_shared_across_clones() {
    let transport = ScriptedTransport::unreachable();
    let client = scripted_client(transport.clone());
    let other = client.clone();

    assert!(client.health_check().await.is_degraded());
    assert!(other.connectivity().is_degraded());

    let before = transport.requests().len();
    let health = other.health_check().await;
    assert!(health.is_healthy());
    assert!(health.is_degraded());
    assert_eq!(transport.requests().len(), before);
}

#[tokio::test]
async fn health_check_falls_back_to_alternate_paths() {
    let transport = ScriptedTransport::new()
        .fail_path(TAGS_PATH, InferenceError::Timeout(Duration::from_secs(3)));
    let client = scripted_client(transport.clone());

    let health = client.health_check().await;

    assert!(!health.is_degraded());
    let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
    // "/" is unscripted and answers 404, which still proves the service is up
    assert_eq!(paths, vec![TAGS_PATH.to_string(), "/".to_string()]);
}

#[tokio::test]
async fn forced_connection_check_leaves_degraded_mode() {
    let transport = ScriptedTransport::new().fail_times(
        TAGS_PATH,
        1,
        InferenceError::Connection("refused".into()),
    );
    let client = scripted_client(transport.clone());

    let status = client.check_connection(true).await;
    assert!(!status.connected);
    assert!(client.connectivity().is_degraded());

    // cached while degraded
    let cached = client.check_connection(false).await;
    assert!(!cached.connected);
    assert_eq!(transport.count(TAGS_PATH), 1);

    let status = client.check_connection(true).await;
    assert!(status.connected);
    assert_eq!(status.models, vec!["llama2:7b".to_string()]);
    assert!(!client.connectivity().is_degraded());
}

#[tokio::test]
async fn model_listing_normalises_tags_shape() {
    let models = json!([{ "name": "llama2:7b" }, { "name": "mistral:7b" }]);
    let by_models = scripted_client(
        ScriptedTransport::new().with_path_reply(TAGS_PATH, json!({ "models": models.clone() })),
    );
    let by_tags = scripted_client(
        ScriptedTransport::new().with_path_reply(TAGS_PATH, json!({ "tags": models })),
    );

    let listed = by_models.list_models().await;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed, by_tags.list_models().await);
}

#[tokio::test]
async fn model_listing_is_empty_on_failure() {
    let client = scripted_client(
        ScriptedTransport::new().fail_path(TAGS_PATH, InferenceError::Unknown("bad".into())),
    );
    assert!(client.list_models().await.is_empty());
}

#[tokio::test]
async fn model_info_not_found_message() {
    let transport = ScriptedTransport::new()
        .fail_path(SHOW_PATH, InferenceError::NotFound("missing".into()));
    let client = scripted_client(transport);

    let err = assert_err!(client.model_info("ghost:1b").await);
    assert_eq!(
        err,
        InferenceError::NotFound("Model 'ghost:1b' not found in your Ollama installation.".into())
    );
}

#[tokio::test]
async fn stream_default_emits_single_completion() {
    let transport = ScriptedTransport::new().with_default_reply("streamed");
    let client = scripted_client(transport);

    let mut rx = assert_ok!(client.generate_stream(request("s")).await);
    let mut tokens = Vec::new();
    while let Some(token) = rx.recv().await {
        tokens.push(token);
    }
    assert_eq!(
        tokens.last(),
        Some(&mash_core::inference::StreamingToken::Complete {
            message: "streamed".into()
        })
    );
}
