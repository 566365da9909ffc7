//! Inference error taxonomy
//!
//! Every failure the transport can produce is classified into one of six
//! kinds. The kind drives retry decisions and selects the user-facing
//! message shown when retries are exhausted.

use std::time::Duration;

use thiserror::Error;

/// Classified failure from the inference service
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InferenceError {
    /// The service could not be reached
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request did not complete within its timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success status that is neither 404 nor 5xx
    #[error("inference API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error text returned by the service
        message: String,
    },

    /// Model or endpoint does not exist (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// The service failed internally (5xx)
    #[error("inference server error {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error text returned by the service
        message: String,
    },

    /// Anything else (malformed payloads, unexpected transport failures)
    #[error("{0}")]
    Unknown(String),
}

/// Discriminant of [`InferenceError`] without payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`InferenceError::Connection`]
    Connection,
    /// See [`InferenceError::Timeout`]
    Timeout,
    /// See [`InferenceError::Api`]
    ApiError,
    /// See [`InferenceError::NotFound`]
    NotFound,
    /// See [`InferenceError::Server`]
    ServerError,
    /// See [`InferenceError::Unknown`]
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Connection => "connection",
            Self::Timeout => "timeout",
            Self::ApiError => "api_error",
            Self::NotFound => "not_found",
            Self::ServerError => "server_error",
            Self::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

impl InferenceError {
    /// Classify an HTTP status into the matching error
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound(message),
            s if s >= 500 => Self::Server { status, message },
            _ => Self::Api { status, message },
        }
    }

    /// The payload-free kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) => ErrorKind::Connection,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Api { .. } => ErrorKind::ApiError,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Server { .. } => ErrorKind::ServerError,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Whether another attempt could plausibly succeed
    ///
    /// A missing model or a rejected request will fail the same way again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::Api { .. })
    }

    /// Message suitable for showing to the person using the agent
    #[must_use]
    pub fn user_message(&self, model: &str) -> String {
        match self {
            Self::NotFound(_) => format!(
                "Model '{model}' not found. Please ensure it's available in your Ollama installation."
            ),
            Self::Connection(_) => {
                "Cannot connect to Ollama. Please check if Ollama is running properly.".to_string()
            }
            Self::Timeout(_) => "Ollama took too long to respond. This might happen with large models or complex prompts.".to_string(),
            Self::Server { .. } => "Ollama server encountered an error. Please check the logs and restart if necessary.".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(InferenceError::from_status(404, "x").kind(), ErrorKind::NotFound);
        assert_eq!(InferenceError::from_status(500, "x").kind(), ErrorKind::ServerError);
        assert_eq!(InferenceError::from_status(503, "x").kind(), ErrorKind::ServerError);
        assert_eq!(InferenceError::from_status(400, "x").kind(), ErrorKind::ApiError);
        assert_eq!(InferenceError::from_status(429, "x").kind(), ErrorKind::ApiError);
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(InferenceError::Connection("refused".into()).is_retryable());
        assert!(InferenceError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(InferenceError::from_status(502, "bad gateway").is_retryable());
        assert!(!InferenceError::NotFound("model".into()).is_retryable());
        assert!(!InferenceError::from_status(400, "bad").is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let msg = InferenceError::NotFound("x".into()).user_message("llama2:7b");
        assert!(msg.contains("Model 'llama2:7b' not found"));

        let msg = InferenceError::Connection("x".into()).user_message("m");
        assert!(msg.contains("check if Ollama is running"));

        let msg = InferenceError::Unknown("weird".into()).user_message("m");
        assert_eq!(msg, "weird");
    }
}
