//! Test Utilities
//!
//! Scripted doubles for driving the agent without a network:
//!
//! - [`ScriptedTransport`] answers inference calls from per-path and
//!   per-prompt scripts, injects failures and records every request.
//! - [`RecordingCollaborator`] answers backend calls from canned data,
//!   fails chosen operations and logs every call.
//!
//! # Usage
//!
//! ```ignore
//! use mash_core::test_utils::{scripted_client, ScriptedTransport};
//!
//! let transport = ScriptedTransport::new()
//!     .reply_when("classify this request", "Dataset management")
//!     .with_default_reply("ok");
//! let client = scripted_client(transport.clone());
//!
//! // ... run the engine ...
//! assert_eq!(transport.count(GENERATE_PATH), 4);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::inference::{
    ClientSettings, InferenceClient, InferenceError, RetryPolicy, Transport, GENERATE_PATH,
    TAGS_PATH,
};
use crate::orchestrator::{
    ActionCollaborator, BackendModel, CollaboratorError, Dataset, Deployment, FineTuningJob,
    JobRequest, NewDataset,
};

pub use crate::inference::NoDelay;

// ============================================================================
// Scripted Transport
// ============================================================================

/// One request seen by a [`ScriptedTransport`]
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    /// `GET` or `POST`
    pub method: &'static str,
    /// Request path
    pub path: String,
    /// Body of a POST
    pub body: Option<Value>,
    /// Timeout the client chose
    pub timeout: Duration,
}

impl RecordedRequest {
    /// Prompt text of a generation request
    pub fn prompt(&self) -> Option<&str> {
        self.body.as_ref()?.get("prompt")?.as_str()
    }
}

#[derive(Debug, Default)]
struct Script {
    /// Failures consumed before anything else, per path
    queued_failures: HashMap<String, VecDeque<InferenceError>>,
    /// Permanent failures per path
    failing_paths: HashMap<String, InferenceError>,
    /// `(substring, reply)` for generation prompts, first match wins
    prompt_replies: Vec<(String, Result<String, InferenceError>)>,
    /// Fixed JSON per path
    path_replies: HashMap<String, Value>,
    default_reply: String,
    history: Vec<RecordedRequest>,
}

/// In-memory [`Transport`] answering from a script
///
/// Clones share the script and the request history. A fresh transport
/// answers the tags check with one installed model and every generation
/// with an empty reply.
#[derive(Clone, Debug)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    /// Transport with a reachable service
    pub fn new() -> Self {
        let mut script = Script::default();
        script.path_replies.insert(
            TAGS_PATH.to_string(),
            json!({ "models": [{ "name": "llama2:7b", "details": { "family": "llama" } }] }),
        );
        Self {
            script: Arc::new(Mutex::new(script)),
        }
    }

    /// Transport whose every call is refused
    pub fn unreachable() -> Self {
        let transport = Self::new();
        for path in [TAGS_PATH, GENERATE_PATH, "/", "/api/version"] {
            transport.script.lock().failing_paths.insert(
                path.to_string(),
                InferenceError::Connection("connection refused".to_string()),
            );
        }
        transport
    }

    /// Answer generations whose prompt contains `needle` with `text`
    #[must_use]
    pub fn reply_when(self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.script
            .lock()
            .prompt_replies
            .push((needle.into(), Ok(text.into())));
        self
    }

    /// Fail generations whose prompt contains `needle`
    #[must_use]
    pub fn fail_when(self, needle: impl Into<String>, error: InferenceError) -> Self {
        self.script
            .lock()
            .prompt_replies
            .push((needle.into(), Err(error)));
        self
    }

    /// Reply used when no prompt rule matches
    #[must_use]
    pub fn with_default_reply(self, text: impl Into<String>) -> Self {
        self.script.lock().default_reply = text.into();
        self
    }

    /// Answer `path` with a fixed JSON document
    #[must_use]
    pub fn with_path_reply(self, path: impl Into<String>, value: Value) -> Self {
        self.script.lock().path_replies.insert(path.into(), value);
        self
    }

    /// Fail the next `times` calls to `path`, then behave normally
    #[must_use]
    pub fn fail_times(self, path: impl Into<String>, times: usize, error: InferenceError) -> Self {
        {
            let mut script = self.script.lock();
            let queue = script.queued_failures.entry(path.into()).or_default();
            queue.extend(std::iter::repeat(error).take(times));
        }
        self
    }

    /// Fail every call to `path`
    #[must_use]
    pub fn fail_path(self, path: impl Into<String>, error: InferenceError) -> Self {
        self.script.lock().failing_paths.insert(path.into(), error);
        self
    }

    /// Every request seen so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script.lock().history.clone()
    }

    /// Number of requests made to `path`
    pub fn count(&self, path: &str) -> usize {
        self.script
            .lock()
            .history
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    /// Prompts of every generation request, in order
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.prompt().map(String::from))
            .collect()
    }

    fn answer(&self, request: RecordedRequest) -> Result<Value, InferenceError> {
        let mut script = self.script.lock();
        let path = request.path.clone();
        let prompt = request.prompt().map(String::from);
        script.history.push(request);

        if let Some(error) = script
            .queued_failures
            .get_mut(&path)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        if let Some(error) = script.failing_paths.get(&path) {
            return Err(error.clone());
        }

        if path == GENERATE_PATH {
            let prompt = prompt.unwrap_or_default();
            let text = script
                .prompt_replies
                .iter()
                .find(|(needle, _)| prompt.contains(needle.as_str()))
                .map(|(_, reply)| reply.clone())
                .unwrap_or_else(|| Ok(script.default_reply.clone()))?;
            return Ok(json!({
                "model": "llama2:7b",
                "response": text,
                "created_at": "2026-01-01T00:00:00Z",
                "done": true,
            }));
        }

        script
            .path_replies
            .get(&path)
            .cloned()
            .ok_or_else(|| InferenceError::NotFound(format!("no script for {path}")))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn get(&self, path: &str, timeout: Duration) -> Result<Value, InferenceError> {
        self.answer(RecordedRequest {
            method: "GET",
            path: path.to_string(),
            body: None,
            timeout,
        })
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, InferenceError> {
        self.answer(RecordedRequest {
            method: "POST",
            path: path.to_string(),
            body: Some(body.clone()),
            timeout,
        })
    }
}

/// Client over `transport` that never sleeps
///
/// Retry delays and the simulated degraded latency go through [`NoDelay`].
pub fn scripted_client(transport: ScriptedTransport) -> InferenceClient {
    let settings = ClientSettings {
        generate_retry: RetryPolicy::default().with_max_retries(2).immediate(),
        default_retry: RetryPolicy::default().with_max_retries(1).immediate(),
        ..ClientSettings::default()
    };
    InferenceClient::new(Arc::new(transport))
        .with_settings(settings)
        .with_delay(Arc::new(NoDelay))
}

// ============================================================================
// Recording Collaborator
// ============================================================================

#[derive(Debug, Default)]
struct CollaboratorScript {
    backend_connected: bool,
    datasets: Vec<Dataset>,
    jobs: Vec<FineTuningJob>,
    deployments: Vec<Deployment>,
    models: Vec<BackendModel>,
    failures: HashMap<&'static str, CollaboratorError>,
    calls: Vec<&'static str>,
}

/// In-memory [`ActionCollaborator`] with a call log
///
/// Operations are identified by their method name, e.g. `"list_datasets"`.
#[derive(Clone, Debug)]
pub struct RecordingCollaborator {
    script: Arc<Mutex<CollaboratorScript>>,
}

impl Default for RecordingCollaborator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCollaborator {
    /// Connected backend with no data
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(CollaboratorScript {
                backend_connected: true,
                ..CollaboratorScript::default()
            })),
        }
    }

    /// Set what the health check reports
    #[must_use]
    pub fn with_backend_connected(self, connected: bool) -> Self {
        self.script.lock().backend_connected = connected;
        self
    }

    /// Datasets returned by `list_datasets`
    #[must_use]
    pub fn with_datasets(self, datasets: Vec<Dataset>) -> Self {
        self.script.lock().datasets = datasets;
        self
    }

    /// Jobs returned by `list_fine_tuning_jobs`
    #[must_use]
    pub fn with_jobs(self, jobs: Vec<FineTuningJob>) -> Self {
        self.script.lock().jobs = jobs;
        self
    }

    /// Deployments returned by the deployment listings
    #[must_use]
    pub fn with_deployments(self, deployments: Vec<Deployment>) -> Self {
        self.script.lock().deployments = deployments;
        self
    }

    /// Models returned by `list_models`
    #[must_use]
    pub fn with_models(self, models: Vec<BackendModel>) -> Self {
        self.script.lock().models = models;
        self
    }

    /// Make `operation` fail with `error`
    #[must_use]
    pub fn failing(self, operation: &'static str, error: CollaboratorError) -> Self {
        self.script.lock().failures.insert(operation, error);
        self
    }

    /// Operations called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.script.lock().calls.clone()
    }

    /// Number of times `operation` was called
    pub fn count(&self, operation: &str) -> usize {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    fn record<T>(
        &self,
        operation: &'static str,
        answer: impl FnOnce(&mut CollaboratorScript) -> T,
    ) -> Result<T, CollaboratorError> {
        let mut script = self.script.lock();
        script.calls.push(operation);
        if let Some(error) = script.failures.get(operation) {
            return Err(error.clone());
        }
        Ok(answer(&mut *script))
    }
}

#[async_trait]
impl ActionCollaborator for RecordingCollaborator {
    async fn check_backend_connection(&self) -> Result<bool, CollaboratorError> {
        self.record("check_backend_connection", |s| s.backend_connected)
    }

    async fn list_datasets(&self) -> Result<Vec<Dataset>, CollaboratorError> {
        self.record("list_datasets", |s| s.datasets.clone())
    }

    async fn upload_dataset(&self, dataset: NewDataset) -> Result<Dataset, CollaboratorError> {
        self.record("upload_dataset", |s| {
            let created = Dataset {
                id: format!("ds-{}", s.datasets.len() + 1),
                name: dataset.name,
                description: None,
                records: Some(dataset.content.lines().count() as u64),
                format: Some(dataset.format),
            };
            s.datasets.push(created.clone());
            created
        })
    }

    async fn delete_dataset(&self, id: &str) -> Result<(), CollaboratorError> {
        self.record("delete_dataset", |s| s.datasets.retain(|d| d.id != id))
    }

    async fn list_fine_tuning_jobs(&self) -> Result<Vec<FineTuningJob>, CollaboratorError> {
        self.record("list_fine_tuning_jobs", |s| s.jobs.clone())
    }

    async fn create_fine_tuning_job(
        &self,
        request: JobRequest,
    ) -> Result<FineTuningJob, CollaboratorError> {
        self.record("create_fine_tuning_job", |s| {
            let job = FineTuningJob {
                id: format!("job-{}", s.jobs.len() + 1),
                name: None,
                status: "queued".to_string(),
                model: Some(request.model_name),
                dataset_id: Some(request.dataset_id),
            };
            s.jobs.push(job.clone());
            job
        })
    }

    async fn cancel_job(&self, id: &str) -> Result<(), CollaboratorError> {
        self.record("cancel_job", |s| {
            for job in s.jobs.iter_mut().filter(|j| j.id == id) {
                job.status = "cancelled".to_string();
            }
        })
    }

    async fn list_deployments(&self) -> Result<Vec<Deployment>, CollaboratorError> {
        self.record("list_deployments", |s| s.deployments.clone())
    }

    async fn deploy_model(
        &self,
        job_id: &str,
        model_name: &str,
    ) -> Result<Deployment, CollaboratorError> {
        self.record("deploy_model", |s| {
            let deployment = Deployment {
                id: format!("dep-{job_id}"),
                name: Some(model_name.to_string()),
                status: Some("running".to_string()),
                model: Some(model_name.to_string()),
                endpoint: None,
            };
            s.deployments.push(deployment.clone());
            deployment
        })
    }

    async fn undeploy_model(&self, id: &str) -> Result<(), CollaboratorError> {
        self.record("undeploy_model", |s| s.deployments.retain(|d| d.id != id))
    }

    async fn list_models(&self) -> Result<Vec<BackendModel>, CollaboratorError> {
        self.record("list_models", |s| s.models.clone())
    }

    async fn available_deployments(&self) -> Result<Vec<Deployment>, CollaboratorError> {
        self.record("available_deployments", |s| {
            s.deployments
                .iter()
                .filter(|d| d.status.as_deref() == Some("running"))
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prompt_rules_first_match() {
        let transport = ScriptedTransport::new()
            .reply_when("alpha", "A")
            .reply_when("alpha beta", "B")
            .with_default_reply("D");

        let reply = transport
            .post(GENERATE_PATH, &json!({ "prompt": "alpha beta" }), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(reply["response"], json!("A"));

        let reply = transport
            .post(GENERATE_PATH, &json!({ "prompt": "gamma" }), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(reply["response"], json!("D"));
        assert_eq!(transport.prompts(), vec!["alpha beta", "gamma"]);
    }

    #[tokio::test]
    async fn test_queued_failures_then_success() {
        let transport = ScriptedTransport::new().fail_times(
            TAGS_PATH,
            1,
            InferenceError::Connection("refused".into()),
        );
        assert!(transport.get(TAGS_PATH, Duration::ZERO).await.is_err());
        assert!(transport.get(TAGS_PATH, Duration::ZERO).await.is_ok());
        assert_eq!(transport.count(TAGS_PATH), 2);
    }

    #[tokio::test]
    async fn test_unscripted_path_is_not_found() {
        let transport = ScriptedTransport::new();
        let err = transport.get("/api/version", Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, InferenceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_collaborator_log_and_failures() {
        let collaborator = RecordingCollaborator::new()
            .failing("list_datasets", CollaboratorError::Unavailable);

        assert!(collaborator.list_datasets().await.is_err());
        let job = collaborator
            .create_fine_tuning_job(JobRequest {
                dataset_id: "ds-1".into(),
                model_name: "llama2:7b".into(),
                parameters: None,
            })
            .await
            .unwrap();
        collaborator.cancel_job(&job.id).await.unwrap();

        assert_eq!(
            collaborator.calls(),
            vec!["list_datasets", "create_fine_tuning_job", "cancel_job"]
        );
        let jobs = collaborator.list_fine_tuning_jobs().await.unwrap();
        assert_eq!(jobs[0].status, "cancelled");
    }
}
