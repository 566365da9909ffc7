//! Resilient inference client
//!
//! Wraps a [`Transport`] with the session check, bounded retries, timeout
//! selection and the degraded-mode switch. Cheap to clone; clones share the
//! same connectivity state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::connectivity::{ConnectionStatus, Connectivity, HealthStatus};
use super::degraded;
use super::error::InferenceError;
use super::retry::{retry, Delay, RetryPolicy, TokioDelay};
use super::transport::{
    InferenceRequest, StreamingToken, Transport, GENERATE_PATH, PULL_PATH, SHOW_PATH, TAGS_PATH,
};

/// Liveness paths tried when the tags check fails
pub const ALTERNATE_LIVENESS_PATHS: &[&str] = &["/", "/api/version"];

/// Timeouts, retry budgets and degraded-mode tuning
#[derive(Clone, Debug, PartialEq)]
pub struct ClientSettings {
    /// Default model
    pub model: String,
    /// Timeout for ordinary calls
    pub request_timeout: Duration,
    /// Timeout for reasoning calls
    pub reasoning_timeout: Duration,
    /// Timeout for the session check
    pub liveness_timeout: Duration,
    /// Timeout for each alternate liveness path
    pub alternate_liveness_timeout: Duration,
    /// Retry policy for generation
    pub generate_retry: RetryPolicy,
    /// Retry policy for everything else
    pub default_retry: RetryPolicy,
    /// Simulated latency of canned responses
    pub degraded_latency: Duration,
    /// How long a cached connection status stays valid
    pub status_ttl: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            model: "llama2:7b".to_string(),
            request_timeout: Duration::from_secs(30),
            reasoning_timeout: Duration::from_secs(60),
            liveness_timeout: Duration::from_secs(3),
            alternate_liveness_timeout: Duration::from_secs(2),
            generate_retry: RetryPolicy::default().with_max_retries(2),
            default_retry: RetryPolicy::default().with_max_retries(1),
            degraded_latency: Duration::from_millis(250),
            status_ttl: Duration::from_secs(30),
        }
    }
}

/// Outcome of a generation call
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InferenceResult {
    /// Generated text
    pub text: String,
    /// Model that produced it
    pub model: String,
    /// Service timestamp, when reported
    pub created_at: Option<String>,
    /// Whether generation completed
    pub done: bool,
    /// Retries spent before success
    pub retries: u32,
    /// False for canned degraded-mode text
    pub authoritative: bool,
    /// Wall time of the call
    #[serde(skip)]
    pub latency: Duration,
}

/// One installed model
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model identifier, e.g. `llama2:7b`
    pub name: String,
    /// Model family, when reported
    pub family: Option<String>,
    /// Size on disk in bytes
    pub size: Option<u64>,
    /// Parameter count label, e.g. `7B`
    pub parameter_size: Option<String>,
}

/// Resilient client for the inference service
#[derive(Clone)]
pub struct InferenceClient {
    transport: Arc<dyn Transport>,
    delay: Arc<dyn Delay>,
    connectivity: Connectivity,
    settings: ClientSettings,
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("transport", &self.transport.name())
            .field("mode", &self.connectivity.mode())
            .field("settings", &self.settings)
            .finish()
    }
}

impl InferenceClient {
    /// Create a client with default settings and a real timer
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            delay: Arc::new(TokioDelay),
            connectivity: Connectivity::new(),
            settings: ClientSettings::default(),
        }
    }

    /// Replace the settings
    #[must_use]
    pub fn with_settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the delay used between retries and for simulated latency
    #[must_use]
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Share an existing connectivity handle
    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Current settings
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Default model
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Shared connectivity handle
    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    fn timeout_for(&self, request: &InferenceRequest) -> Duration {
        if request.reasoning {
            self.settings.reasoning_timeout
        } else {
            self.settings.request_timeout
        }
    }

    async fn canned(&self, request: &InferenceRequest) -> InferenceResult {
        let started = Instant::now();
        self.delay.wait(self.settings.degraded_latency).await;
        InferenceResult {
            text: degraded::canned_response(&request.prompt),
            model: request.model.clone(),
            created_at: None,
            done: true,
            retries: 0,
            authoritative: false,
            latency: started.elapsed(),
        }
    }

    /// Check the tags endpoint once and record the outcome
    async fn check_tags(&self, timeout: Duration) -> Result<ConnectionStatus, InferenceError> {
        let started = Instant::now();
        let value = self.transport.get(TAGS_PATH, timeout).await?;
        let models = normalize_models(&value)
            .into_iter()
            .map(|m| m.name)
            .collect();
        let status = ConnectionStatus::connected(started.elapsed(), models);
        self.connectivity.record(status.clone());
        Ok(status)
    }

    async fn ensure_session_check(&self) -> Result<(), InferenceError> {
        if self.connectivity.is_checked() {
            return Ok(());
        }

        match self.check_tags(self.settings.liveness_timeout).await {
            Ok(status) => {
                tracing::debug!(
                    transport = self.transport.name(),
                    models = status.models.len(),
                    "Inference service reachable"
                );
                Ok(())
            }
            Err(e) => {
                let hint = e.user_message(self.model());
                tracing::warn!(error = %e, "Inference connectivity check failed");
                self.connectivity.record(ConnectionStatus::disconnected(hint.clone()));
                self.connectivity.enter_degraded(&hint);
                Err(InferenceError::Connection(hint))
            }
        }
    }

    /// Generate a completion
    ///
    /// In degraded mode this returns canned, non-authoritative text without
    /// touching the transport. The first call of a session runs a short
    /// connectivity check; a failed check switches to degraded mode and is
    /// reported as a connection error.
    pub async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResult, InferenceError> {
        if self.connectivity.is_degraded() {
            return Ok(self.canned(&request).await);
        }

        self.ensure_session_check().await?;

        let timeout = self.timeout_for(&request);
        let payload = request.clone().with_stream(false).to_payload();
        let started = Instant::now();

        tracing::debug!(
            model = %request.model,
            reasoning = request.reasoning,
            timeout_ms = timeout.as_millis() as u64,
            "Generating completion"
        );

        let outcome = retry(&self.settings.generate_retry, self.delay.as_ref(), |_| {
            self.transport.post(GENERATE_PATH, &payload, timeout)
        })
        .await;

        match outcome {
            Ok(retried) => {
                let value = retried.value;
                Ok(InferenceResult {
                    text: value
                        .get("response")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    model: value
                        .get("model")
                        .and_then(Value::as_str)
                        .map(String::from)
                        .unwrap_or_else(|| request.model.clone()),
                    created_at: value
                        .get("created_at")
                        .and_then(Value::as_str)
                        .map(String::from),
                    done: value.get("done").and_then(Value::as_bool).unwrap_or(true),
                    retries: retried.retries,
                    authoritative: true,
                    latency: started.elapsed(),
                })
            }
            Err(failure) => {
                tracing::error!(
                    model = %request.model,
                    attempts = failure.attempts,
                    kind = %failure.error.kind(),
                    "Generation failed: {}",
                    failure.error.user_message(&request.model)
                );
                if matches!(failure.error, InferenceError::Connection(_)) {
                    self.connectivity
                        .enter_degraded(&failure.error.user_message(&request.model));
                }
                Err(failure.error)
            }
        }
    }

    /// Generate a completion as a token stream
    pub async fn generate_stream(
        &self,
        request: InferenceRequest,
    ) -> Result<mpsc::Receiver<StreamingToken>, InferenceError> {
        if self.connectivity.is_degraded() {
            let result = self.canned(&request).await;
            let (tx, rx) = mpsc::channel(2);
            let _ = tx.send(StreamingToken::Token(result.text.clone())).await;
            let _ = tx
                .send(StreamingToken::Complete {
                    message: result.text,
                })
                .await;
            return Ok(rx);
        }

        self.ensure_session_check().await?;

        let timeout = self.timeout_for(&request);
        let payload = request.with_stream(true).to_payload();
        self.transport
            .post_stream(GENERATE_PATH, &payload, timeout)
            .await
    }

    /// Check service health
    ///
    /// Never fails: when nothing answers, the client switches to degraded
    /// mode and reports [`HealthStatus::Degraded`].
    pub async fn health_check(&self) -> HealthStatus {
        if self.connectivity.is_degraded() {
            return HealthStatus::Degraded;
        }

        if self.check_tags(self.settings.liveness_timeout).await.is_ok() {
            return HealthStatus::Healthy;
        }

        for path in ALTERNATE_LIVENESS_PATHS {
            let started = Instant::now();
            let result = self
                .transport
                .get(path, self.settings.alternate_liveness_timeout)
                .await;
            if answered(&result) {
                tracing::debug!(path, "Inference service answered alternate liveness path");
                self.connectivity
                    .record(ConnectionStatus::connected(started.elapsed(), Vec::new()));
                return HealthStatus::Healthy;
            }
        }

        self.connectivity
            .enter_degraded("inference service did not answer any liveness path");
        HealthStatus::Degraded
    }

    /// Connection status, re-probing when stale or when `force` is set
    ///
    /// A forced check that succeeds leaves degraded mode.
    pub async fn check_connection(&self, force: bool) -> ConnectionStatus {
        let cached = self.connectivity.status();
        if !force && (self.connectivity.is_degraded() || cached.is_fresh(self.settings.status_ttl))
        {
            return cached;
        }

        match self.check_tags(self.settings.liveness_timeout).await {
            Ok(status) => {
                if force {
                    self.connectivity.leave_degraded();
                }
                status
            }
            Err(e) => {
                let status = ConnectionStatus::disconnected(e.user_message(self.model()));
                self.connectivity.record(status.clone());
                self.connectivity.enter_degraded(&e.to_string());
                status
            }
        }
    }

    /// Installed models; empty on any failure or while degraded
    pub async fn list_models(&self) -> Vec<ModelSummary> {
        if self.connectivity.is_degraded() {
            return Vec::new();
        }

        let timeout = self.settings.request_timeout;
        match retry(&self.settings.default_retry, self.delay.as_ref(), |_| {
            self.transport.get(TAGS_PATH, timeout)
        })
        .await
        {
            Ok(retried) => normalize_models(&retried.value),
            Err(failure) => {
                tracing::warn!(error = %failure.error, "Failed to list models");
                Vec::new()
            }
        }
    }

    /// Details of one model
    pub async fn model_info(&self, name: &str) -> Result<Value, InferenceError> {
        if self.connectivity.is_degraded() {
            return Err(InferenceError::Connection(
                degraded::OFFLINE_NOTICE.to_string(),
            ));
        }

        let body = json!({ "name": name });
        let timeout = self.settings.request_timeout;
        retry(&self.settings.default_retry, self.delay.as_ref(), |_| {
            self.transport.post(SHOW_PATH, &body, timeout)
        })
        .await
        .map(|retried| retried.value)
        .map_err(|failure| match failure.error {
            InferenceError::NotFound(_) => InferenceError::NotFound(format!(
                "Model '{name}' not found in your Ollama installation."
            )),
            other => other,
        })
    }

    /// Pull a model from the registry
    pub async fn pull_model(&self, name: &str) -> Result<Value, InferenceError> {
        if self.connectivity.is_degraded() {
            return Err(InferenceError::Connection(
                degraded::OFFLINE_NOTICE.to_string(),
            ));
        }

        tracing::info!(model = name, "Pulling model");
        let body = json!({ "name": name, "stream": false });
        let timeout = self.settings.reasoning_timeout;
        retry(&self.settings.default_retry, self.delay.as_ref(), |_| {
            self.transport.post(PULL_PATH, &body, timeout)
        })
        .await
        .map(|retried| retried.value)
        .map_err(|failure| failure.error)
    }
}

/// Whether a liveness request got any answer from the service
fn answered(result: &Result<Value, InferenceError>) -> bool {
    match result {
        Ok(_) => true,
        Err(InferenceError::Connection(_) | InferenceError::Timeout(_)) => false,
        Err(_) => true,
    }
}

/// Normalise a `models` or `tags` listing into summaries
pub fn normalize_models(value: &Value) -> Vec<ModelSummary> {
    let entries = value
        .get("models")
        .or_else(|| value.get("tags"))
        .and_then(Value::as_array);

    let Some(entries) = entries else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let name = entry
                .get("name")
                .or_else(|| entry.get("model"))
                .and_then(Value::as_str)?;
            let details = entry.get("details");
            Some(ModelSummary {
                name: name.to_string(),
                family: details
                    .and_then(|d| d.get("family"))
                    .and_then(Value::as_str)
                    .map(String::from),
                size: entry.get("size").and_then(Value::as_u64),
                parameter_size: details
                    .and_then(|d| d.get("parameter_size"))
                    .and_then(Value::as_str)
                    .map(String::from),
            })
        })
        .collect()
}
