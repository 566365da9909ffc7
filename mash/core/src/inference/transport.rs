//! Inference Transport
//!
//! The seam between the inference client and the network. The client owns
//! resilience (retries, probing, degraded mode); a transport only moves one
//! request and classifies what went wrong.
//!
//! # Endpoints
//!
//! The HTTP transport speaks the Ollama REST API:
//! - `/api/generate` - completions (batch or newline-delimited stream)
//! - `/api/tags` - installed models, also the cheapest liveness check
//! - `/api/show` - model details
//! - `/api/pull` - fetch a model from the registry

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::error::InferenceError;

/// Generation endpoint path
pub const GENERATE_PATH: &str = "/api/generate";
/// Model listing endpoint path
pub const TAGS_PATH: &str = "/api/tags";
/// Model details endpoint path
pub const SHOW_PATH: &str = "/api/show";
/// Model pull endpoint path
pub const PULL_PATH: &str = "/api/pull";

/// Token events from a streaming generation
#[derive(Clone, Debug, PartialEq)]
pub enum StreamingToken {
    /// A fragment of the response
    Token(String),
    /// Response finished; carries the full text
    Complete {
        /// The complete message
        message: String,
    },
    /// Stream failed part way
    Error(String),
}

/// A single generation request
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceRequest {
    /// Full prompt text
    pub prompt: String,
    /// Model identifier
    pub model: String,
    /// Whether the caller wants a token stream
    pub stream: bool,
    /// Sampling temperature, `None` keeps the model default
    pub temperature: Option<f32>,
    /// Token limit (`num_predict`), `None` keeps the model default
    pub max_tokens: Option<u32>,
    /// Long-running reasoning call: uses the extended timeout
    pub reasoning: bool,
}

impl InferenceRequest {
    /// Create a request with prompt and model
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            stream: false,
            temperature: None,
            max_tokens: None,
            reasoning: false,
        }
    }

    /// Set streaming mode
    #[must_use]
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 1.0));
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Mark as a reasoning call (extended timeout)
    #[must_use]
    pub fn reasoning(mut self, reasoning: bool) -> Self {
        self.reasoning = reasoning;
        self
    }

    /// Wire payload: `{model, prompt, stream, options}`
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let mut options = serde_json::Map::new();
        if let Some(temperature) = self.temperature {
            options.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = self.max_tokens {
            options.insert("num_predict".to_string(), json!(max_tokens));
        }

        json!({
            "model": self.model,
            "prompt": self.prompt,
            "stream": self.stream,
            "options": options,
        })
    }
}

/// Network seam for the inference client
///
/// Implementations perform exactly one attempt per call and return a
/// classified [`InferenceError`] on failure.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logs (e.g. "ollama-http")
    fn name(&self) -> &str;

    /// GET a JSON document
    async fn get(&self, path: &str, timeout: Duration) -> Result<Value, InferenceError>;

    /// POST a JSON body and read a JSON document back
    async fn post(&self, path: &str, body: &Value, timeout: Duration)
        -> Result<Value, InferenceError>;

    /// POST a JSON body and stream `response` fragments back
    ///
    /// The default buffers the whole reply and emits a single completion.
    async fn post_stream(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<mpsc::Receiver<StreamingToken>, InferenceError> {
        let value = self.post(path, body, timeout).await?;
        let message = value
            .get("response")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let (tx, rx) = mpsc::channel(2);
        let _ = tx.send(StreamingToken::Token(message.clone())).await;
        let _ = tx.send(StreamingToken::Complete { message }).await;
        Ok(rx)
    }
}

/// Ollama transport over HTTP
#[derive(Clone, Debug)]
pub struct HttpTransport {
    host: String,
    port: u16,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for `http://{host}:{port}`
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            http_client: reqwest::Client::new(),
        }
    }

    /// Base URL of the service
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    async fn read_json(
        response: reqwest::Response,
        timeout: Duration,
    ) -> Result<Value, InferenceError> {
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| format!("inference request failed with status {}", status.as_u16()));
            return Err(InferenceError::from_status(status.as_u16(), message));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| classify_reqwest(&e, timeout))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new("localhost", 11434)
    }
}

/// Map a reqwest failure onto the inference taxonomy
fn classify_reqwest(error: &reqwest::Error, timeout: Duration) -> InferenceError {
    if error.is_timeout() {
        InferenceError::Timeout(timeout)
    } else if error.is_connect() {
        InferenceError::Connection(error.to_string())
    } else if let Some(status) = error.status() {
        InferenceError::from_status(status.as_u16(), error.to_string())
    } else {
        InferenceError::Unknown(error.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "ollama-http"
    }

    async fn get(&self, path: &str, timeout: Duration) -> Result<Value, InferenceError> {
        let response = self
            .http_client
            .get(self.url(path))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest(&e, timeout))?;

        Self::read_json(response, timeout).await
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, InferenceError> {
        let response = self
            .http_client
            .post(self.url(path))
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest(&e, timeout))?;

        Self::read_json(response, timeout).await
    }

    async fn post_stream(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<mpsc::Receiver<StreamingToken>, InferenceError> {
        let response = self
            .http_client
            .post(self.url(path))
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest(&e, timeout))?;

        if !response.status().is_success() {
            return Err(Self::read_json(response, timeout)
                .await
                .err()
                .unwrap_or_else(|| InferenceError::Unknown("unexpected stream status".into())));
        }

        let (tx, rx) = mpsc::channel(100);
        let mut stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut buffer = String::new();
            let mut full_response = String::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(StreamingToken::Error(e.to_string())).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(pos) = buffer.find('\n') {
                    let line: String = buffer.drain(..=pos).collect();
                    match parse_stream_line(line.trim()) {
                        Some(StreamLine::Token(token)) => {
                            full_response.push_str(&token);
                            if tx.send(StreamingToken::Token(token)).await.is_err() {
                                return;
                            }
                        }
                        Some(StreamLine::Done(token)) => {
                            full_response.push_str(&token);
                            let _ = tx
                                .send(StreamingToken::Complete {
                                    message: full_response,
                                })
                                .await;
                            return;
                        }
                        None => {}
                    }
                }
            }

            // Stream ended without a done marker
            if !full_response.is_empty() {
                let _ = tx
                    .send(StreamingToken::Complete {
                        message: full_response,
                    })
                    .await;
            }
        });

        Ok(rx)
    }
}

enum StreamLine {
    Token(String),
    Done(String),
}

fn parse_stream_line(line: &str) -> Option<StreamLine> {
    if line.is_empty() {
        return None;
    }
    let data: Value = serde_json::from_str(line).ok()?;
    let token = data
        .get("response")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if data.get("done").and_then(Value::as_bool).unwrap_or(false) {
        Some(StreamLine::Done(token))
    } else {
        Some(StreamLine::Token(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_payload() {
        let request = InferenceRequest::new("Hello", "llama2:7b")
            .with_temperature(1.7)
            .with_max_tokens(64);

        assert_eq!(
            request.to_payload(),
            json!({
                "model": "llama2:7b",
                "prompt": "Hello",
                "stream": false,
                "options": { "temperature": 1.0, "num_predict": 64 },
            })
        );
    }

    #[test]
    fn test_payload_without_options() {
        let payload = InferenceRequest::new("p", "m").with_stream(true).to_payload();
        assert_eq!(payload["options"], json!({}));
        assert_eq!(payload["stream"], json!(true));
    }

    #[test]
    fn test_base_url() {
        let transport = HttpTransport::new("example.com", 8080);
        assert_eq!(transport.base_url(), "http://example.com:8080");
        assert_eq!(transport.url(TAGS_PATH), "http://example.com:8080/api/tags");
    }

    #[test]
    fn test_parse_stream_lines() {
        assert!(parse_stream_line("").is_none());
        assert!(parse_stream_line("not json").is_none());

        match parse_stream_line(r#"{"response":"Hel","done":false}"#) {
            Some(StreamLine::Token(t)) => assert_eq!(t, "Hel"),
            _ => panic!("expected token"),
        }
        match parse_stream_line(r#"{"response":"","done":true}"#) {
            Some(StreamLine::Done(t)) => assert_eq!(t, ""),
            _ => panic!("expected done"),
        }
    }
}
