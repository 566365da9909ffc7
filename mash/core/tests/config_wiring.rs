//! Loaded configuration driving a client end to end

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use mash_core::config::{load_config_with_env, ConfigOverrides, ConfigSource};
use mash_core::inference::{InferenceClient, InferenceRequest, GENERATE_PATH, TAGS_PATH};
use mash_core::inference::degraded::OFFLINE_NOTICE;
use mash_core::test_utils::{NoDelay, ScriptedTransport};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn client_for(config: &mash_core::MashConfig, transport: &ScriptedTransport) -> InferenceClient {
    InferenceClient::new(Arc::new(transport.clone()))
        .with_settings(config.client_settings())
        .with_connectivity(config.connectivity())
        .with_delay(Arc::new(NoDelay))
}

#[tokio::test]
async fn file_timeouts_reach_the_transport() {
    let file = config_file(
        r#"
[inference]
model = "mistral:7b"
request_timeout_secs = 12
reasoning_timeout_secs = 45
liveness_timeout_secs = 2

[retry]
generate_retries = 0
"#,
    );
    let config = load_config_with_env(Some(file.path().to_path_buf()), |_| None).unwrap();
    assert_eq!(config.source(), ConfigSource::File);
    config.validate().unwrap();

    let transport = ScriptedTransport::new().with_default_reply("ok");
    let client = client_for(&config, &transport);

    client
        .generate(InferenceRequest::new("plain", &config.inference.model))
        .await
        .unwrap();
    client
        .generate(InferenceRequest::new("deep", &config.inference.model).reasoning(true))
        .await
        .unwrap();

    let timeouts: Vec<(String, Duration)> = transport
        .requests()
        .into_iter()
        .map(|r| (r.path, r.timeout))
        .collect();
    assert_eq!(
        timeouts,
        vec![
            (TAGS_PATH.to_string(), Duration::from_secs(2)),
            (GENERATE_PATH.to_string(), Duration::from_secs(12)),
            (GENERATE_PATH.to_string(), Duration::from_secs(45)),
        ]
    );
}

#[tokio::test]
async fn offline_flag_starts_degraded() {
    let mut config = load_config_with_env(None, |_| None).unwrap();
    ConfigOverrides::new().with_offline(true).apply(&mut config);
    assert_eq!(config.source(), ConfigSource::Cli);

    let transport = ScriptedTransport::new();
    let client = client_for(&config, &transport);

    let reply = client
        .generate(InferenceRequest::new("summarise my week", "llama2:7b"))
        .await
        .unwrap();

    assert_eq!(reply.text, OFFLINE_NOTICE);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn environment_beats_file_and_cli_beats_environment() {
    let file = config_file("[inference]\nmodel = \"from-file\"\nport = 1111\n");
    let env = |key: &str| match key {
        "MASH_MODEL" => Some("from-env".to_string()),
        "OLLAMA_PORT" => Some("2222".to_string()),
        _ => None,
    };

    let mut config = load_config_with_env(Some(file.path().to_path_buf()), env).unwrap();
    assert_eq!(config.inference.model, "from-env");
    assert_eq!(config.inference.port, 2222);
    assert_eq!(config.source(), ConfigSource::Env);

    ConfigOverrides::new().with_port(3333).apply(&mut config);
    assert_eq!(config.inference.model, "from-env");
    assert_eq!(config.inference.port, 3333);
    assert_eq!(config.transport().base_url(), format!("http://{}:3333", config.inference.host));
}
