//! Inference Client
//!
//! Resilient access to a local language-model service.
//!
//! # Layers
//!
//! ```text
//! InferenceClient   session check, retries, timeouts, degraded mode
//!       |
//!   Transport       one request, classified errors
//!       |
//!  HttpTransport    Ollama REST over reqwest
//! ```
//!
//! Degraded mode is held in a [`Connectivity`] handle injected into the
//! client. Any task can trigger the switch and every clone of the handle
//! sees it immediately.

mod client;
mod connectivity;
pub mod degraded;
mod error;
mod retry;
mod transport;

pub use client::{
    normalize_models, ClientSettings, InferenceClient, InferenceResult, ModelSummary,
    ALTERNATE_LIVENESS_PATHS,
};
pub use connectivity::{ConnectionStatus, Connectivity, ConnectivityMode, HealthStatus};
pub use error::{ErrorKind, InferenceError};
pub use retry::{retry, Delay, NoDelay, Retried, RetryFailure, RetryPolicy, TokioDelay};
pub use transport::{
    HttpTransport, InferenceRequest, StreamingToken, Transport, GENERATE_PATH, PULL_PATH,
    SHOW_PATH, TAGS_PATH,
};
