//! Action collaborators
//!
//! The orchestrator reaches the dataset, fine-tuning and deployment backend
//! through [`ActionCollaborator`]. [`HttpCollaborator`] talks to the REST
//! backend; [`OfflineCollaborator`] fails every call and is used when no
//! backend is configured.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Default backend base URL
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Collaborator failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// No backend to talk to
    #[error("Backend service is unavailable")]
    Unavailable,

    /// Could not connect or the request timed out
    #[error("Backend API is unavailable ({0}). Please check your connection or try again later.")]
    Connection(String),

    /// Non-success status
    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status
        status: u16,
        /// `detail` field of the body, or a generic message
        message: String,
    },

    /// Body did not have the expected shape
    #[error("Unexpected response from backend: {0}")]
    Decode(String),
}

/// A dataset held by the backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset id
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Record count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<u64>,
    /// File format, e.g. `jsonl`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Dataset to upload
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewDataset {
    /// Display name
    pub name: String,
    /// File format, e.g. `jsonl`
    pub format: String,
    /// Raw file contents
    pub content: String,
}

/// A fine-tuning job
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FineTuningJob {
    /// Job id
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Job status as reported by the backend
    #[serde(default)]
    pub status: String,
    /// Base model
    #[serde(default, alias = "model_name", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Training dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
}

/// Fine-tuning job to create
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JobRequest {
    /// Training dataset
    pub dataset_id: String,
    /// Base model
    pub model_name: String,
    /// Hyperparameters passed through to the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// A model deployment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Deployment id
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Deployment status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Deployed model
    #[serde(default, alias = "model_name", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Serving endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// A model in the backend catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendModel {
    /// Model id
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Side effects the orchestrator can request
#[async_trait]
pub trait ActionCollaborator: Send + Sync {
    /// Whether the backend answers its health check
    async fn check_backend_connection(&self) -> Result<bool, CollaboratorError>;

    /// All datasets
    async fn list_datasets(&self) -> Result<Vec<Dataset>, CollaboratorError>;

    /// Upload a dataset
    async fn upload_dataset(&self, dataset: NewDataset) -> Result<Dataset, CollaboratorError>;

    /// Delete a dataset
    async fn delete_dataset(&self, id: &str) -> Result<(), CollaboratorError>;

    /// All fine-tuning jobs
    async fn list_fine_tuning_jobs(&self) -> Result<Vec<FineTuningJob>, CollaboratorError>;

    /// Start a fine-tuning job
    async fn create_fine_tuning_job(
        &self,
        request: JobRequest,
    ) -> Result<FineTuningJob, CollaboratorError>;

    /// Cancel a fine-tuning job
    async fn cancel_job(&self, id: &str) -> Result<(), CollaboratorError>;

    /// All model deployments
    async fn list_deployments(&self) -> Result<Vec<Deployment>, CollaboratorError>;

    /// Deploy the model produced by a job
    async fn deploy_model(&self, job_id: &str, model_name: &str)
        -> Result<Deployment, CollaboratorError>;

    /// Remove a deployment
    async fn undeploy_model(&self, id: &str) -> Result<(), CollaboratorError>;

    /// Backend model catalog
    async fn list_models(&self) -> Result<Vec<BackendModel>, CollaboratorError>;

    /// Deployments that accept inference requests
    async fn available_deployments(&self) -> Result<Vec<Deployment>, CollaboratorError>;
}

/// Collaborator with no backend behind it
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineCollaborator;

#[async_trait]
impl ActionCollaborator for OfflineCollaborator {
    async fn check_backend_connection(&self) -> Result<bool, CollaboratorError> {
        Ok(false)
    }

    async fn list_datasets(&self) -> Result<Vec<Dataset>, CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    async fn upload_dataset(&self, _dataset: NewDataset) -> Result<Dataset, CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    async fn delete_dataset(&self, _id: &str) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    async fn list_fine_tuning_jobs(&self) -> Result<Vec<FineTuningJob>, CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    async fn create_fine_tuning_job(
        &self,
        _request: JobRequest,
    ) -> Result<FineTuningJob, CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    async fn cancel_job(&self, _id: &str) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    async fn list_deployments(&self) -> Result<Vec<Deployment>, CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    async fn deploy_model(
        &self,
        _job_id: &str,
        _model_name: &str,
    ) -> Result<Deployment, CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    async fn undeploy_model(&self, _id: &str) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    async fn list_models(&self) -> Result<Vec<BackendModel>, CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    async fn available_deployments(&self) -> Result<Vec<Deployment>, CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }
}

const HEALTH_PATH: &str = "/api/v1/health";
const DATASETS_PATH: &str = "/api/v1/datasets/";
const DATASET_UPLOAD_PATH: &str = "/api/v1/datasets/upload";
const FINETUNE_PATH: &str = "/api/v1/finetune/";
const DEPLOYMENTS_PATH: &str = "/api/v1/models/deployments";
const DEPLOY_PATH: &str = "/api/v1/models/deploy";
const MODELS_PATH: &str = "/api/v1/models/";
const AVAILABLE_DEPLOYMENTS_PATH: &str = "/api/v1/inference/available-deployments";

/// Health checks use a shorter timeout than regular calls
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// REST backend client
#[derive(Clone, Debug)]
pub struct HttpCollaborator {
    base_url: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl Default for HttpCollaborator {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL, Duration::from_secs(10))
    }
}

impl HttpCollaborator {
    /// Client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            http_client: reqwest::Client::new(),
        }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, CollaboratorError> {
        let response = request
            .timeout(self.timeout)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CollaboratorError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("detail")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("API request failed with status {}", status.as_u16()));
            return Err(CollaboratorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CollaboratorError::Connection(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| CollaboratorError::Decode(e.to_string()))
    }

    async fn get(&self, path: &str) -> Result<Value, CollaboratorError> {
        self.send(self.http_client.get(self.url(path))).await
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<Value, CollaboratorError> {
        self.send(self.http_client.post(self.url(path)).json(body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<(), CollaboratorError> {
        self.send(self.http_client.delete(self.url(path))).await?;
        Ok(())
    }

    async fn list<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<Vec<T>, CollaboratorError> {
        decode_list(self.get(path).await?, key)
    }
}

/// Accept either a bare array or an object wrapping one under `key`
fn decode_list<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, CollaboratorError> {
    let items = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map.remove(key).unwrap_or_else(|| json!([])),
        Value::Null => json!([]),
        other => {
            return Err(CollaboratorError::Decode(format!(
                "expected a list of {key}, got {other}"
            )))
        }
    };
    serde_json::from_value(items).map_err(|e| CollaboratorError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, CollaboratorError> {
    serde_json::from_value(value).map_err(|e| CollaboratorError::Decode(e.to_string()))
}

#[async_trait]
impl ActionCollaborator for HttpCollaborator {
    async fn check_backend_connection(&self) -> Result<bool, CollaboratorError> {
        let reachable = self
            .http_client
            .get(self.url(HEALTH_PATH))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false);

        if !reachable {
            tracing::warn!(base_url = %self.base_url, "Backend health check failed");
        }
        Ok(reachable)
    }

    async fn list_datasets(&self) -> Result<Vec<Dataset>, CollaboratorError> {
        self.list(DATASETS_PATH, "datasets").await
    }

    async fn upload_dataset(&self, dataset: NewDataset) -> Result<Dataset, CollaboratorError> {
        decode(self.post(DATASET_UPLOAD_PATH, &dataset).await?)
    }

    async fn delete_dataset(&self, id: &str) -> Result<(), CollaboratorError> {
        self.delete(&format!("{DATASETS_PATH}{id}")).await
    }

    async fn list_fine_tuning_jobs(&self) -> Result<Vec<FineTuningJob>, CollaboratorError> {
        self.list(FINETUNE_PATH, "jobs").await
    }

    async fn create_fine_tuning_job(
        &self,
        request: JobRequest,
    ) -> Result<FineTuningJob, CollaboratorError> {
        decode(self.post(FINETUNE_PATH, &request).await?)
    }

    async fn cancel_job(&self, id: &str) -> Result<(), CollaboratorError> {
        self.delete(&format!("{FINETUNE_PATH}{id}")).await
    }

    async fn list_deployments(&self) -> Result<Vec<Deployment>, CollaboratorError> {
        self.list(DEPLOYMENTS_PATH, "deployments").await
    }

    async fn deploy_model(
        &self,
        job_id: &str,
        model_name: &str,
    ) -> Result<Deployment, CollaboratorError> {
        let body = json!({ "job_id": job_id, "model_name": model_name });
        decode(self.post(DEPLOY_PATH, &body).await?)
    }

    async fn undeploy_model(&self, id: &str) -> Result<(), CollaboratorError> {
        self.delete(&format!("{DEPLOYMENTS_PATH}/{id}")).await
    }

    async fn list_models(&self) -> Result<Vec<BackendModel>, CollaboratorError> {
        self.list(MODELS_PATH, "models").await
    }

    async fn available_deployments(&self) -> Result<Vec<Deployment>, CollaboratorError> {
        self.list(AVAILABLE_DEPLOYMENTS_PATH, "deployments").await
    }
}
