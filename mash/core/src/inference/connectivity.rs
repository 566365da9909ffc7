//! Shared connectivity state
//!
//! One [`Connectivity`] handle is created per client and cloned into anything
//! that needs to observe the inference service's reachability. All clones
//! share the same state, so a transition made by one task is visible to every
//! other task on its next read.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

/// Whether calls reach the network
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityMode {
    /// Calls go to the inference service
    #[default]
    Online,
    /// Calls are answered locally with canned text
    Degraded,
}

impl std::fmt::Display for ConnectivityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Degraded => write!(f, "degraded"),
        }
    }
}

/// Last observed state of the inference service
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConnectionStatus {
    /// Whether the last check succeeded
    pub connected: bool,
    /// Round-trip time of the last successful check
    #[serde(with = "latency_ms")]
    pub latency: Option<Duration>,
    /// Error text of the last failed check
    pub error: Option<String>,
    /// Models reported by the last successful check
    pub models: Vec<String>,
    #[serde(skip)]
    checked_at: Option<Instant>,
}

impl ConnectionStatus {
    /// Status after a successful check
    pub fn connected(latency: Duration, models: Vec<String>) -> Self {
        Self {
            connected: true,
            latency: Some(latency),
            error: None,
            models,
            checked_at: Some(Instant::now()),
        }
    }

    /// Status after a failed check
    pub fn disconnected(error: impl Into<String>) -> Self {
        Self {
            connected: false,
            latency: None,
            error: Some(error.into()),
            models: Vec::new(),
            checked_at: Some(Instant::now()),
        }
    }

    /// Whether this status was checked within `max_age`
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.checked_at
            .map(|at| at.elapsed() <= max_age)
            .unwrap_or(false)
    }
}

mod latency_ms {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }
}

/// Result of a health check
///
/// Degraded still counts as healthy: callers proceed and receive canned
/// responses instead of blocking on an unreachable service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// The service answered
    Healthy,
    /// The service is unreachable; degraded mode is active
    Degraded,
}

impl HealthStatus {
    /// Always true; see the type docs
    pub fn is_healthy(&self) -> bool {
        true
    }

    /// Whether canned responses are being served
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded)
    }
}

#[derive(Debug, Default)]
struct ConnectivityState {
    mode: ConnectivityMode,
    status: ConnectionStatus,
    checked: bool,
}

/// Cloneable handle to shared connectivity state
#[derive(Clone, Debug, Default)]
pub struct Connectivity {
    inner: Arc<RwLock<ConnectivityState>>,
}

impl Connectivity {
    /// New handle in online mode, not yet checked
    pub fn new() -> Self {
        Self::default()
    }

    /// New handle already in degraded mode
    pub fn degraded() -> Self {
        let handle = Self::default();
        handle.enter_degraded("started offline");
        handle
    }

    /// Current mode
    pub fn mode(&self) -> ConnectivityMode {
        self.inner.read().mode
    }

    /// Whether degraded mode is active
    pub fn is_degraded(&self) -> bool {
        self.mode() == ConnectivityMode::Degraded
    }

    /// Snapshot of the cached status
    pub fn status(&self) -> ConnectionStatus {
        self.inner.read().status.clone()
    }

    /// Whether the session check has run
    pub fn is_checked(&self) -> bool {
        self.inner.read().checked
    }

    /// Record a check outcome
    pub fn record(&self, status: ConnectionStatus) {
        let mut state = self.inner.write();
        state.checked = true;
        state.status = status;
    }

    /// Switch to degraded mode
    pub fn enter_degraded(&self, reason: &str) {
        let mut state = self.inner.write();
        state.checked = true;
        if state.mode != ConnectivityMode::Degraded {
            tracing::warn!(reason, "Inference service unreachable, entering degraded mode");
            state.mode = ConnectivityMode::Degraded;
        }
        if state.status.connected || state.status.error.is_none() {
            state.status = ConnectionStatus::disconnected(reason);
        }
    }

    /// Return to online mode
    pub fn leave_degraded(&self) {
        let mut state = self.inner.write();
        if state.mode == ConnectivityMode::Degraded {
            tracing::info!("Inference service reachable again, leaving degraded mode");
            state.mode = ConnectivityMode::Online;
        }
    }
}
