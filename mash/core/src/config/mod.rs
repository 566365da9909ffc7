//! Agent Configuration
//!
//! Layered configuration for the agent and the `mash` binary.
//!
//! # Configuration Priority
//!
//! Settings are applied in this order (highest priority first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. Config file (`~/.config/mash/agent.toml`)
//! 4. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! [inference]
//! host = "localhost"
//! port = 11434
//! model = "llama2:7b"
//! request_timeout_secs = 30
//! reasoning_timeout_secs = 60
//! offline = false
//!
//! [retry]
//! generate_retries = 2
//! default_retries = 1
//! delay_ms = 1000
//! backoff_multiplier = 1.0
//!
//! [backend]
//! url = "http://localhost:8000"
//! timeout_secs = 10
//!
//! [agent]
//! history_limit = 10
//!
//! [generation]
//! template = "Card"
//! kind = "react"
//! ```
//!
//! # Environment Variables
//!
//! - `OLLAMA_HOST` / `OLLAMA_PORT`: inference service address
//! - `MASH_MODEL`: default model
//! - `MASH_BACKEND_URL`: action backend base URL
//! - `MASH_REASONING_TIMEOUT_SECS`, `MASH_REQUEST_TIMEOUT_SECS`: call timeouts
//! - `MASH_RETRY_DELAY_MS`: delay between retries
//! - `MASH_OFFLINE`: start in degraded mode (`1`/`true`)

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::inference::{ClientSettings, Connectivity, HttpTransport, RetryPolicy};
use crate::orchestrator::{HttpCollaborator, DEFAULT_BACKEND_URL, DEFAULT_HISTORY_LIMIT};
use crate::templates::TemplateKind;

// =============================================================================
// Error Types
// =============================================================================

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Which layer last changed the configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Command-line arguments
    Cli,
    /// Environment variables
    Env,
    /// Config file
    File,
    /// Built-in defaults
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Inference service settings
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
    /// Default model
    pub model: String,
    /// Timeout for ordinary calls
    pub request_timeout: Duration,
    /// Timeout for reasoning calls
    pub reasoning_timeout: Duration,
    /// Timeout for the tags check
    pub liveness_timeout: Duration,
    /// Timeout for each alternate liveness path
    pub alternate_liveness_timeout: Duration,
    /// Simulated latency of canned responses
    pub degraded_latency: Duration,
    /// Freshness window of the cached connection status
    pub status_ttl: Duration,
    /// Start in degraded mode without probing
    pub offline: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            host: "localhost".to_string(),
            port: 11434,
            model: client.model,
            request_timeout: client.request_timeout,
            reasoning_timeout: client.reasoning_timeout,
            liveness_timeout: client.liveness_timeout,
            alternate_liveness_timeout: client.alternate_liveness_timeout,
            degraded_latency: client.degraded_latency,
            status_ttl: client.status_ttl,
            offline: false,
        }
    }
}

/// Retry budgets and backoff
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Retries for generation calls
    pub generate_retries: u32,
    /// Retries for every other call
    pub default_retries: u32,
    /// Delay before the first retry
    pub delay_ms: u64,
    /// Backoff multiplier (1.0 keeps the delay constant)
    pub backoff_multiplier: f32,
    /// Add jitter to each delay
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            generate_retries: 2,
            default_retries: 1,
            delay_ms: policy.delay_ms,
            backoff_multiplier: policy.backoff_multiplier,
            use_jitter: policy.use_jitter,
        }
    }
}

impl RetryConfig {
    fn policy(&self, max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay_ms: self.delay_ms,
            backoff_multiplier: self.backoff_multiplier,
            use_jitter: self.use_jitter,
        }
    }
}

/// Action backend settings
#[derive(Clone, Debug, PartialEq)]
pub struct BackendConfig {
    /// Base URL
    pub url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Fully resolved agent configuration
#[derive(Clone, Debug)]
pub struct MashConfig {
    /// Inference service
    pub inference: InferenceConfig,
    /// Retry behaviour
    pub retry: RetryConfig,
    /// Action backend
    pub backend: BackendConfig,
    /// Conversation history kept by the orchestrator
    pub history_limit: usize,
    /// Template used when a request names none
    pub default_template: String,
    /// Template kind used when a request names none
    pub default_kind: TemplateKind,

    source: ConfigSource,
}

impl Default for MashConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            retry: RetryConfig::default(),
            backend: BackendConfig::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_template: "Card".to_string(),
            default_kind: TemplateKind::React,
            source: ConfigSource::Default,
        }
    }
}

impl MashConfig {
    /// Layer that last changed this configuration
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Record the layer that changed this configuration
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Reject values the agent cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("inference.request_timeout", self.inference.request_timeout),
            ("inference.reasoning_timeout", self.inference.reasoning_timeout),
            ("inference.liveness_timeout", self.inference.liveness_timeout),
            (
                "inference.alternate_liveness_timeout",
                self.inference.alternate_liveness_timeout,
            ),
            ("backend.timeout", self.backend.timeout),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, t)| t.is_zero()) {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be greater than zero"
            )));
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "retry.backoff_multiplier must be at least 1.0, got {}",
                self.retry.backoff_multiplier
            )));
        }

        if self.inference.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "inference.model must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Inference client settings derived from this configuration
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            model: self.inference.model.clone(),
            request_timeout: self.inference.request_timeout,
            reasoning_timeout: self.inference.reasoning_timeout,
            liveness_timeout: self.inference.liveness_timeout,
            alternate_liveness_timeout: self.inference.alternate_liveness_timeout,
            generate_retry: self.retry.policy(self.retry.generate_retries),
            default_retry: self.retry.policy(self.retry.default_retries),
            degraded_latency: self.inference.degraded_latency,
            status_ttl: self.inference.status_ttl,
        }
    }

    /// HTTP transport for the configured inference service
    pub fn transport(&self) -> HttpTransport {
        HttpTransport::new(self.inference.host.clone(), self.inference.port)
    }

    /// HTTP collaborator for the configured backend
    pub fn collaborator(&self) -> HttpCollaborator {
        HttpCollaborator::new(self.backend.url.clone(), self.backend.timeout)
    }

    /// Connectivity handle to start from; already degraded when offline
    pub fn connectivity(&self) -> Connectivity {
        if self.inference.offline {
            Connectivity::degraded()
        } else {
            Connectivity::new()
        }
    }
}

// =============================================================================
// TOML File Structures
// =============================================================================

/// Root of `agent.toml`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MashToml {
    /// `[inference]`
    pub inference: InferenceToml,
    /// `[retry]`
    pub retry: RetryToml,
    /// `[backend]`
    pub backend: BackendToml,
    /// `[agent]`
    pub agent: AgentToml,
    /// `[generation]`
    pub generation: GenerationToml,
}

/// `[inference]` section
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceToml {
    /// Service host
    pub host: Option<String>,
    /// Service port
    pub port: Option<u16>,
    /// Default model
    pub model: Option<String>,
    /// Ordinary call timeout (seconds)
    pub request_timeout_secs: Option<u64>,
    /// Reasoning call timeout (seconds)
    pub reasoning_timeout_secs: Option<u64>,
    /// Tags check timeout (seconds)
    pub liveness_timeout_secs: Option<u64>,
    /// Alternate liveness timeout (seconds)
    pub alternate_liveness_timeout_secs: Option<u64>,
    /// Simulated degraded latency (milliseconds)
    pub degraded_latency_ms: Option<u64>,
    /// Connection status freshness (seconds)
    pub status_ttl_secs: Option<u64>,
    /// Start offline
    pub offline: Option<bool>,
}

/// `[retry]` section
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryToml {
    /// Retries for generation
    pub generate_retries: Option<u32>,
    /// Retries for other calls
    pub default_retries: Option<u32>,
    /// Delay before the first retry
    pub delay_ms: Option<u64>,
    /// Backoff multiplier
    pub backoff_multiplier: Option<f32>,
    /// Jitter
    pub use_jitter: Option<bool>,
}

/// `[backend]` section
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendToml {
    /// Base URL
    pub url: Option<String>,
    /// Request timeout (seconds)
    pub timeout_secs: Option<u64>,
}

/// `[agent]` section
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentToml {
    /// Conversation history length
    pub history_limit: Option<usize>,
}

/// `[generation]` section
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationToml {
    /// Default template name
    pub template: Option<String>,
    /// Default template kind, e.g. `react`
    pub kind: Option<String>,
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Default config file path (`~/.config/mash/agent.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mash").join("agent.toml"))
}

/// Load configuration from the default path and the process environment
pub fn load_config() -> Result<MashConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from `path` and the process environment
///
/// A missing file is not an error; defaults are used instead.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<MashConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration from `path`, reading environment values through `env`
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<MashConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = MashConfig::default();

    if let Some(ref path) = path {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.clone(),
                source: e,
            })?;

            let toml_config: MashToml = toml::from_str(&content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.source = ConfigSource::File;

            tracing::info!(path = %path.display(), "Loaded agent config from file");
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        }
    }

    apply_env_config(&mut config, env);
    Ok(config)
}

/// Apply TOML values onto the config
fn apply_toml_config(config: &mut MashConfig, toml: &MashToml) -> Result<(), ConfigError> {
    // Inference settings
    let inference = &toml.inference;
    if let Some(ref host) = inference.host {
        config.inference.host = host.clone();
    }
    if let Some(port) = inference.port {
        config.inference.port = port;
    }
    if let Some(ref model) = inference.model {
        config.inference.model = model.clone();
    }
    if let Some(secs) = inference.request_timeout_secs {
        config.inference.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = inference.reasoning_timeout_secs {
        config.inference.reasoning_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = inference.liveness_timeout_secs {
        config.inference.liveness_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = inference.alternate_liveness_timeout_secs {
        config.inference.alternate_liveness_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = inference.degraded_latency_ms {
        config.inference.degraded_latency = Duration::from_millis(ms);
    }
    if let Some(secs) = inference.status_ttl_secs {
        config.inference.status_ttl = Duration::from_secs(secs);
    }
    if let Some(offline) = inference.offline {
        config.inference.offline = offline;
    }

    // Retry settings
    if let Some(n) = toml.retry.generate_retries {
        config.retry.generate_retries = n;
    }
    if let Some(n) = toml.retry.default_retries {
        config.retry.default_retries = n;
    }
    if let Some(ms) = toml.retry.delay_ms {
        config.retry.delay_ms = ms;
    }
    if let Some(m) = toml.retry.backoff_multiplier {
        config.retry.backoff_multiplier = m;
    }
    if let Some(jitter) = toml.retry.use_jitter {
        config.retry.use_jitter = jitter;
    }

    // Backend settings
    if let Some(ref url) = toml.backend.url {
        config.backend.url = url.clone();
    }
    if let Some(secs) = toml.backend.timeout_secs {
        config.backend.timeout = Duration::from_secs(secs);
    }

    if let Some(limit) = toml.agent.history_limit {
        config.history_limit = limit;
    }

    // Generation defaults
    if let Some(ref template) = toml.generation.template {
        config.default_template = template.clone();
    }
    if let Some(ref kind) = toml.generation.kind {
        config.default_kind = kind
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("generation.kind: {e}")))?;
    }

    Ok(())
}

/// Apply environment overrides; unparsable values are ignored with a warning
fn apply_env_config<F>(config: &mut MashConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    fn parsed<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
        let parsed = value.trim().parse().ok();
        if parsed.is_none() {
            tracing::warn!(key, value, "Ignoring unparsable environment override");
        }
        parsed
    }

    if let Some(host) = env("OLLAMA_HOST") {
        config.inference.host = host;
        config.source = ConfigSource::Env;
    }
    if let Some(port) = env("OLLAMA_PORT") {
        if let Some(port) = parsed::<u16>("OLLAMA_PORT", &port) {
            config.inference.port = port;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(model) = env("MASH_MODEL") {
        config.inference.model = model;
        config.source = ConfigSource::Env;
    }
    if let Some(url) = env("MASH_BACKEND_URL") {
        config.backend.url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(secs) = env("MASH_REASONING_TIMEOUT_SECS") {
        if let Some(secs) = parsed::<u64>("MASH_REASONING_TIMEOUT_SECS", &secs) {
            config.inference.reasoning_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(secs) = env("MASH_REQUEST_TIMEOUT_SECS") {
        if let Some(secs) = parsed::<u64>("MASH_REQUEST_TIMEOUT_SECS", &secs) {
            config.inference.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(ms) = env("MASH_RETRY_DELAY_MS") {
        if let Some(ms) = parsed::<u64>("MASH_RETRY_DELAY_MS", &ms) {
            config.retry.delay_ms = ms;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(offline) = env("MASH_OFFLINE") {
        config.inference.offline = offline != "0" && offline.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Command-line overrides, applied after [`load_config`]
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Inference host
    pub host: Option<String>,
    /// Inference port
    pub port: Option<u16>,
    /// Default model
    pub model: Option<String>,
    /// Backend URL
    pub backend_url: Option<String>,
    /// Start offline
    pub offline: Option<bool>,
}

impl ConfigOverrides {
    /// Empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set inference host override
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set inference port override
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set model override
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set backend URL override
    #[must_use]
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    /// Set offline override
    #[must_use]
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = Some(offline);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut MashConfig) {
        if self.host.is_some()
            || self.port.is_some()
            || self.model.is_some()
            || self.backend_url.is_some()
            || self.offline.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref host) = self.host {
            config.inference.host = host.clone();
        }
        if let Some(port) = self.port {
            config.inference.port = port;
        }
        if let Some(ref model) = self.model {
            config.inference.model = model.clone();
        }
        if let Some(ref url) = self.backend_url {
            config.backend.url = url.clone();
        }
        if let Some(offline) = self.offline {
            config.inference.offline = offline;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = MashConfig::default();

        assert_eq!(config.inference.host, "localhost");
        assert_eq!(config.inference.port, 11434);
        assert_eq!(config.inference.model, "llama2:7b");
        assert_eq!(config.backend.url, "http://localhost:8000");
        assert_eq!(config.backend.timeout, Duration::from_secs(10));
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.default_template, "Card");
        assert_eq!(config.default_kind, TemplateKind::React);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_client_settings_match() {
        assert_eq!(
            MashConfig::default().client_settings(),
            ClientSettings::default()
        );
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.ends_with("mash/agent.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
[inference]
host = "gpu-box"
port = 11500
model = "mistral:7b"
reasoning_timeout_secs = 120
offline = true

[retry]
generate_retries = 4
delay_ms = 50
backoff_multiplier = 2.0

[backend]
url = "http://backend:9000"
timeout_secs = 5

[agent]
history_limit = 4

[generation]
template = "Page"
kind = "html"
"#,
        );

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.inference.host, "gpu-box");
        assert_eq!(config.inference.port, 11500);
        assert_eq!(config.inference.model, "mistral:7b");
        assert_eq!(config.inference.reasoning_timeout, Duration::from_secs(120));
        assert!(config.inference.offline);
        assert_eq!(config.backend.url, "http://backend:9000");
        assert_eq!(config.history_limit, 4);
        assert_eq!(config.default_kind, TemplateKind::Html);
        assert_eq!(config.source(), ConfigSource::File);

        let settings = config.client_settings();
        assert_eq!(settings.generate_retry.max_retries, 4);
        assert_eq!(settings.generate_retry.delay_ms, 50);
        assert_eq!(settings.default_retry.max_retries, 1);
        assert_eq!(settings.default_retry.backoff_multiplier, 2.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let file = write_toml("[inference]\nmodel = \"phi3:mini\"\n");
        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.inference.model, "phi3:mini");
        assert_eq!(config.inference.port, 11434);
        assert_eq!(config.retry.generate_retries, 2);
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/agent.toml");
        let config = load_config_with_env(Some(path), no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_toml("[inference\nport = \"not a number\"\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_unknown_kind_is_validation_error() {
        let file = write_toml("[generation]\nkind = \"flash\"\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml("[inference]\nmodel = \"file-model\"\nport = 1\n");
        let env: HashMap<&str, &str> = [
            ("MASH_MODEL", "env-model"),
            ("OLLAMA_PORT", "not-a-port"),
            ("MASH_RETRY_DELAY_MS", "5"),
            ("MASH_OFFLINE", "true"),
        ]
        .into_iter()
        .collect();

        let config = load_config_with_env(Some(file.path().to_path_buf()), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.inference.model, "env-model");
        assert_eq!(config.inference.port, 1);
        assert_eq!(config.retry.delay_ms, 5);
        assert!(config.inference.offline);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_offline_env_false() {
        let config = load_config_with_env(None, |k| {
            (k == "MASH_OFFLINE").then(|| "0".to_string())
        })
        .unwrap();
        assert!(!config.inference.offline);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = MashConfig::default();
        config.inference.model = "env-model".to_string();
        config.set_source(ConfigSource::Env);

        ConfigOverrides::new()
            .with_model("cli-model")
            .with_port(12000)
            .apply(&mut config);

        assert_eq!(config.inference.model, "cli-model");
        assert_eq!(config.inference.port, 12000);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = MashConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_validation() {
        let mut config = MashConfig::default();
        config.inference.reasoning_timeout = Duration::ZERO;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("inference.reasoning_timeout"));

        let mut config = MashConfig::default();
        config.retry.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());

        let mut config = MashConfig::default();
        config.inference.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transport_and_collaborator_urls() {
        let mut config = MashConfig::default();
        config.backend.url = "http://backend:9000/".to_string();
        assert_eq!(config.transport().base_url(), "http://localhost:11434");
        assert_eq!(config.collaborator().base_url(), "http://backend:9000");
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ReadError {
            path: PathBuf::from("/test/path"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/test/path"));
        assert!(msg.contains("Failed to read"));
    }
}
