//! Task Orchestrator
//!
//! Top-level per-message state machine:
//!
//! ```text
//! pending -> in_progress -> complete
//!                       \-> error
//! ```
//!
//! Trivial messages (greetings, "list my datasets") short-circuit without
//! reasoning. Everything else runs the reasoning stages, the collaborator
//! calls for the resolved task type and response formulation. A failed
//! collaborator call is recorded and the task carries on; a failed
//! formulation falls back to an answer built from the recorded calls.

mod collaborators;
mod task;

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::inference::degraded::is_greeting;
use crate::reasoning::{fallback_response, KnowledgeTopic, ReasoningEngine, TaskType};

pub use collaborators::{
    ActionCollaborator, BackendModel, CollaboratorError, Dataset, Deployment, FineTuningJob,
    HttpCollaborator, JobRequest, NewDataset, OfflineCollaborator, DEFAULT_BACKEND_URL,
};
pub use task::{
    call_names, CallOutcome, CallRecord, PipelineError, ReasoningRecord, SystemStatus, TaskId,
    TaskState, TaskStatus, RESPONSE_STEP,
};

/// Default number of history messages kept
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Default number of finished tasks kept in the store
pub const DEFAULT_TASK_LIMIT: usize = 100;

const GREETING_NOTE: &str =
    "User sent a simple greeting. Responding conversationally without system checks.";

/// Reply to a greeting
pub const WELCOME_RESPONSE: &str = "Hello! Welcome to Artintel. I can help you discover, fine-tune, and deploy language models. If you need more advanced assistance with model selection or fine-tuning workflows, consider switching to agent mode. How can I help you today?";

const DATASET_LIST_PHRASES: &[&str] = &[
    "list datasets",
    "show datasets",
    "what datasets",
    "my datasets",
    "available datasets",
    "all datasets",
    "show my datasets",
    "list my datasets",
    "get datasets",
];

fn is_dataset_list_request(message: &str) -> bool {
    let message = message.to_lowercase();
    DATASET_LIST_PHRASES.iter().any(|p| message.contains(p))
}

/// Who wrote a history message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person talking to the agent
    User,
    /// The agent
    Assistant,
    /// System notes
    System,
}

impl Role {
    fn speaker(&self) -> &'static str {
        match self {
            Self::User => "Human",
            Self::Assistant => "Assistant",
            Self::System => "System",
        }
    }
}

/// One conversation history entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// Author
    pub role: Role,
    /// Text
    pub content: String,
}

/// Routes each message through reasoning, side effects and response
pub struct TaskOrchestrator {
    engine: ReasoningEngine,
    collaborator: Arc<dyn ActionCollaborator>,
    tasks: DashMap<TaskId, TaskState>,
    order: Mutex<VecDeque<TaskId>>,
    history: Mutex<VecDeque<HistoryMessage>>,
    history_limit: usize,
    task_limit: usize,
}

impl std::fmt::Debug for TaskOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskOrchestrator")
            .field("tasks", &self.tasks.len())
            .field("history_limit", &self.history_limit)
            .field("task_limit", &self.task_limit)
            .finish_non_exhaustive()
    }
}

impl TaskOrchestrator {
    /// Orchestrator over `engine` and `collaborator`
    pub fn new(engine: ReasoningEngine, collaborator: Arc<dyn ActionCollaborator>) -> Self {
        Self {
            engine,
            collaborator,
            tasks: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            history: Mutex::new(VecDeque::new()),
            history_limit: DEFAULT_HISTORY_LIMIT,
            task_limit: DEFAULT_TASK_LIMIT,
        }
    }

    /// Keep at most `limit` history messages
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Keep at most `limit` finished tasks, evicting the oldest
    #[must_use]
    pub fn with_task_limit(mut self, limit: usize) -> Self {
        self.task_limit = limit;
        self
    }

    /// The reasoning engine
    pub fn engine(&self) -> &ReasoningEngine {
        &self.engine
    }

    /// Append to the conversation history, dropping the oldest entries
    pub fn add_to_history(&self, role: Role, content: impl Into<String>) {
        let mut history = self.history.lock();
        history.push_back(HistoryMessage {
            role,
            content: content.into(),
        });
        while history.len() > self.history_limit {
            history.pop_front();
        }
    }

    /// History, oldest first
    pub fn history(&self) -> Vec<HistoryMessage> {
        self.history.lock().iter().cloned().collect()
    }

    /// History rendered as `Human:` / `Assistant:` / `System:` lines
    pub fn conversation_context(&self) -> String {
        self.history
            .lock()
            .iter()
            .map(|m| format!("{}: {}", m.role.speaker(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Task by id
    pub fn task(&self, id: &TaskId) -> Option<TaskState> {
        self.tasks.get(id).map(|t| t.value().clone())
    }

    /// Most recently processed task
    pub fn latest_task(&self) -> Option<TaskState> {
        let id = self.order.lock().back().cloned()?;
        self.task(&id)
    }

    /// Every task, oldest first
    pub fn tasks(&self) -> Vec<TaskState> {
        let order = self.order.lock().clone();
        order.iter().filter_map(|id| self.task(id)).collect()
    }

    /// Final answer of a task
    pub fn response_text(&self, id: &TaskId) -> Option<String> {
        self.tasks.get(id).map(|t| t.response_text().to_string())
    }

    /// Process one user message to a finished task
    pub async fn process(&self, message: &str) -> TaskState {
        let mut task = TaskState::new(TaskId::generate());
        let context = self.conversation_context();
        let context = (!context.is_empty()).then_some(context.as_str());

        if let Err(e) = self.run(&mut task, message, context).await {
            tracing::error!(task_id = %task.id(), error = %e, "Task pipeline failed");
            if let Err(sealed) = task.fail(e.to_string()) {
                tracing::warn!(error = %sealed, "Could not mark task as failed");
            }
        }

        self.add_to_history(Role::User, message);
        if task.status() == TaskStatus::Complete {
            self.add_to_history(Role::Assistant, task.response_text());
        }

        tracing::info!(
            task_id = %task.id(),
            task_type = %task.task_type(),
            status = %task.status(),
            calls = task.calls().len(),
            "Task finished"
        );

        self.store(&task);
        task
    }

    fn store(&self, task: &TaskState) {
        let mut order = self.order.lock();
        order.push_back(task.id().clone());
        self.tasks.insert(task.id().clone(), task.clone());
        while order.len() > self.task_limit {
            if let Some(evicted) = order.pop_front() {
                self.tasks.remove(&evicted);
            }
        }
    }

    async fn run(
        &self,
        task: &mut TaskState,
        message: &str,
        context: Option<&str>,
    ) -> Result<(), PipelineError> {
        task.start()?;

        if is_greeting(message) {
            tracing::debug!(task_id = %task.id(), "Greeting fast path");
            task.set_task_type(TaskType::Conversation)?;
            task.push_reasoning(ReasoningRecord::new("direct_greeting", GREETING_NOTE))?;
            task.push_reasoning(ReasoningRecord::new(RESPONSE_STEP, WELCOME_RESPONSE))?;
            return task.complete();
        }

        if is_dataset_list_request(message) {
            tracing::debug!(task_id = %task.id(), "Dataset list fast path");
            task.set_task_type(TaskType::DatasetManagement)?;
            self.execute_calls(task, message).await?;
            task.push_reasoning(ReasoningRecord::new(
                "direct_request",
                "User directly requested to list datasets. Fetched dataset information from the API.",
            ))?;
            let response = dataset_list_response(task.calls());
            task.push_reasoning(ReasoningRecord::new(RESPONSE_STEP, response))?;
            return task.complete();
        }

        let engine = match KnowledgeTopic::detect(message) {
            Some(topic) => {
                tracing::debug!(task_id = %task.id(), topic = %topic, "Knowledge topic detected");
                self.engine.clone().with_system_prompt(topic.system_prompt())
            }
            None => self.engine.clone(),
        };

        let mut process = engine.think(message, context).await;
        task.set_task_type(process.task_type())?;
        for step in process.steps() {
            task.push_reasoning(ReasoningRecord::new(step.stage.label(), step.reasoning.clone()))?;
        }

        self.execute_calls(task, message).await?;

        let response = match engine
            .formulate_response(&mut process, task.calls(), context)
            .await
        {
            Ok(step) => step.reasoning,
            Err(e) => {
                tracing::warn!(task_id = %task.id(), error = %e, "Using fallback response");
                fallback_response(task.task_type(), task.calls())
            }
        };

        task.push_reasoning(ReasoningRecord::new(RESPONSE_STEP, response))?;
        task.attach_thinking(process)?;
        task.complete()
    }

    /// Cached while fresh or degraded, so a degraded client stays offline
    async fn system_status(&self) -> SystemStatus {
        let ai = self.engine.client().check_connection(false).await;
        let backend = match self.collaborator.check_backend_connection().await {
            Ok(connected) => connected,
            Err(e) => {
                tracing::warn!(error = %e, "Backend connection check failed");
                false
            }
        };
        SystemStatus {
            ai_service_connected: ai.connected,
            backend_connected: backend,
        }
    }

    /// Run the collaborator calls for the task's type
    async fn execute_calls(&self, task: &mut TaskState, message: &str) -> Result<(), PipelineError> {
        let status = self.system_status().await;
        task.record_call(CallRecord::success(
            call_names::CHECK_SYSTEM_STATUS,
            serde_json::to_value(status).unwrap_or_default(),
        ))?;

        let c = &self.collaborator;
        match task.task_type() {
            TaskType::Conversation => {}
            TaskType::SystemCheck => {
                if status.backend_connected {
                    record_list(task, call_names::LIST_MODELS, "models", c.list_models()).await?;
                }
            }
            TaskType::DatasetManagement => {
                record_list(task, call_names::LIST_DATASETS, "datasets", c.list_datasets()).await?;
            }
            TaskType::ModelTraining => {
                record_list(task, call_names::LIST_DATASETS, "datasets", c.list_datasets()).await?;
                record_list(task, call_names::LIST_FINE_TUNING_JOBS, "jobs", c.list_fine_tuning_jobs())
                    .await?;
                if status.ai_service_connected {
                    self.record_ai_models(task).await?;
                }
            }
            TaskType::ModelDeployment => {
                record_list(task, call_names::LIST_FINE_TUNING_JOBS, "jobs", c.list_fine_tuning_jobs())
                    .await?;
                record_list(task, call_names::LIST_DEPLOYMENTS, "deployments", c.list_deployments())
                    .await?;
                record_list(task, call_names::LIST_MODELS, "models", c.list_models()).await?;
            }
            TaskType::ModelInference => {
                if status.ai_service_connected {
                    self.record_ai_models(task).await?;
                }
                if status.backend_connected {
                    record_list(task, call_names::LIST_DEPLOYMENTS, "deployments", c.list_deployments())
                        .await?;
                    record_list(
                        task,
                        call_names::AVAILABLE_DEPLOYMENTS,
                        "deployments",
                        c.available_deployments(),
                    )
                    .await?;
                }
            }
            TaskType::Unknown => {
                let lower = message.to_lowercase();
                if ["dataset", "data", "upload", "list"].iter().any(|k| lower.contains(k)) {
                    record_list(task, call_names::LIST_DATASETS, "datasets", c.list_datasets()).await?;
                    task.set_task_type(TaskType::DatasetManagement)?;
                }
                if ["model", "inference", "generate", "predict"].iter().any(|k| lower.contains(k)) {
                    if status.ai_service_connected {
                        self.record_ai_models(task).await?;
                    }
                    if task.task_type() == TaskType::Unknown {
                        task.set_task_type(TaskType::ModelInference)?;
                    }
                }
            }
        }

        tracing::debug!(task_id = %task.id(), calls = task.calls().len(), "Collaborator calls done");
        Ok(())
    }

    async fn record_ai_models(&self, task: &mut TaskState) -> Result<(), PipelineError> {
        let models = self.engine.client().list_models().await;
        task.record_call(CallRecord::success(
            call_names::LIST_AI_MODELS,
            wrap_list("models", &models),
        ))
    }
}

fn wrap_list<T: Serialize>(key: &str, items: &[T]) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(key.to_string(), serde_json::to_value(items).unwrap_or_default());
    Value::Object(map)
}

/// Await one collaborator listing and record it either way
async fn record_list<T, F>(
    task: &mut TaskState,
    name: &str,
    key: &str,
    call: F,
) -> Result<(), PipelineError>
where
    T: Serialize,
    F: Future<Output = Result<Vec<T>, CollaboratorError>>,
{
    let record = match call.await {
        Ok(items) => CallRecord::success(name, wrap_list(key, &items)),
        Err(e) => CallRecord::failure(name, e),
    };
    task.record_call(record)
}

fn dataset_list_response(calls: &[CallRecord]) -> String {
    let Some(call) = calls.iter().find(|c| c.name == call_names::LIST_DATASETS) else {
        return "I've processed your request and gathered the information you asked for.".to_string();
    };

    let datasets = match &call.outcome {
        CallOutcome::Success(value) => value
            .get("datasets")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        CallOutcome::Failure { error } => {
            return format!(
                "I couldn't reach the dataset service right now ({error}). Please try again once the backend is available."
            )
        }
    };

    if datasets.is_empty() {
        return "I checked our system and you don't have any datasets available yet. Would you like to upload a new dataset?".to_string();
    }

    let list = datasets
        .iter()
        .map(|ds| {
            let name = ds.get("name").and_then(Value::as_str).filter(|n| !n.is_empty());
            let id = ds.get("id").and_then(Value::as_str).unwrap_or("unknown");
            format!("- {} (ID: {})", name.unwrap_or("Unnamed dataset"), id)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Here are your datasets:\n{list}\n\nIs there anything specific you'd like to know about these datasets?"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_dataset_phrases() {
        assert!(is_dataset_list_request("Can you LIST DATASETS please"));
        assert!(is_dataset_list_request("what datasets do I have"));
        assert!(!is_dataset_list_request("delete the dataset"));
    }

    #[test]
    fn test_dataset_list_response() {
        let calls = vec![CallRecord::success(
            call_names::LIST_DATASETS,
            json!({ "datasets": [{ "id": "d1", "name": "faq" }, { "id": "d2", "name": "" }] }),
        )];
        assert_eq!(
            dataset_list_response(&calls),
            "Here are your datasets:\n- faq (ID: d1)\n- Unnamed dataset (ID: d2)\n\nIs there anything specific you'd like to know about these datasets?"
        );

        let empty = vec![CallRecord::success(call_names::LIST_DATASETS, json!({ "datasets": [] }))];
        assert!(dataset_list_response(&empty).contains("don't have any datasets"));

        let failed = vec![CallRecord::failure(call_names::LIST_DATASETS, "refused")];
        assert!(dataset_list_response(&failed).contains("(refused)"));
    }

    #[test]
    fn test_wrap_list() {
        let value = wrap_list("jobs", &["a", "b"]);
        assert_eq!(value, json!({ "jobs": ["a", "b"] }));
    }
}
