//! Task state
//!
//! One [`TaskState`] per user message. The orchestrator owns it while the
//! pipeline runs; once it reaches a terminal status every mutation is
//! rejected, so a finished task reads the same forever.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::reasoning::{TaskType, ThinkingProcess};

/// Task identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a task ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique task ID
    pub fn generate() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};

        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let count = COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp = Utc::now().timestamp_millis();

        Self(format!("task-{timestamp}-{count}"))
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a task
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, not started
    #[default]
    Pending,
    /// Pipeline running
    InProgress,
    /// Finished with a response
    Complete,
    /// Pipeline and every fallback failed
    Error,
}

impl TaskStatus {
    /// Lowercase label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Whether no further transitions are possible
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Pipeline failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Mutation attempted on a finished task
    #[error("Task {id} is already {status}")]
    TaskSealed {
        /// Task
        id: TaskId,
        /// Its terminal status
        status: TaskStatus,
    },
}

/// Names recorded for collaborator calls
pub mod call_names {
    /// Inference and backend connectivity
    pub const CHECK_SYSTEM_STATUS: &str = "check_system_status";
    /// Backend datasets
    pub const LIST_DATASETS: &str = "list_datasets";
    /// Backend fine-tuning jobs
    pub const LIST_FINE_TUNING_JOBS: &str = "list_fine_tuning_jobs";
    /// Backend model deployments
    pub const LIST_DEPLOYMENTS: &str = "list_deployments";
    /// Backend model catalog
    pub const LIST_MODELS: &str = "list_models";
    /// Models installed on the inference service
    pub const LIST_AI_MODELS: &str = "list_ai_models";
    /// Deployments available for inference
    pub const AVAILABLE_DEPLOYMENTS: &str = "available_deployments";
}

/// Connectivity of both services at the time of a task
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Inference service reachable
    pub ai_service_connected: bool,
    /// Action backend reachable
    pub backend_connected: bool,
}

/// Result of one collaborator call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    /// Payload returned by the call
    Success(Value),
    /// The call failed; the task carries on
    Failure {
        /// Error text
        error: String,
    },
}

/// A named collaborator call and its outcome
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Call name, see [`call_names`]
    pub name: String,
    /// What happened
    pub outcome: CallOutcome,
}

impl CallRecord {
    /// Successful call
    pub fn success(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            outcome: CallOutcome::Success(value),
        }
    }

    /// Failed call
    pub fn failure(name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            name: name.into(),
            outcome: CallOutcome::Failure {
                error: error.to_string(),
            },
        }
    }

    /// Whether the call failed
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, CallOutcome::Failure { .. })
    }
}

/// One entry in a task's reasoning log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningRecord {
    /// Step name, e.g. `intent_understanding` or `direct_greeting`
    pub step: String,
    /// Step output
    pub output: String,
}

impl ReasoningRecord {
    /// Build a record
    pub fn new(step: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            output: output.into(),
        }
    }
}

/// Step name carrying the final answer
pub const RESPONSE_STEP: &str = "response_formulation";

/// Execution state of one user message
#[derive(Clone, Debug, Serialize)]
pub struct TaskState {
    id: TaskId,
    task_type: TaskType,
    status: TaskStatus,
    message: Option<String>,
    reasoning: Vec<ReasoningRecord>,
    calls: Vec<CallRecord>,
    thinking: Option<ThinkingProcess>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TaskState {
    /// New pending task
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            task_type: TaskType::Unknown,
            status: TaskStatus::Pending,
            message: None,
            reasoning: Vec::new(),
            calls: Vec::new(),
            thinking: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Task id
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Resolved task type
    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Current status
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Error message when the task failed
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Reasoning log in order
    pub fn reasoning(&self) -> &[ReasoningRecord] {
        &self.reasoning
    }

    /// Collaborator calls in order
    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    /// Detailed thinking trace, when reasoning ran
    pub fn thinking(&self) -> Option<&ThinkingProcess> {
        self.thinking.as_ref()
    }

    /// Start time
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Completion time, once terminal
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// The answer: the response step, else the last step
    pub fn response_text(&self) -> &str {
        self.reasoning
            .iter()
            .find(|r| r.step == RESPONSE_STEP)
            .or_else(|| self.reasoning.last())
            .map_or("No response available", |r| r.output.as_str())
    }

    fn guard(&self) -> Result<(), PipelineError> {
        if self.status.is_terminal() {
            return Err(PipelineError::TaskSealed {
                id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    /// Pending to in-progress
    pub fn start(&mut self) -> Result<(), PipelineError> {
        self.guard()?;
        self.status = TaskStatus::InProgress;
        Ok(())
    }

    /// Set the task type
    pub fn set_task_type(&mut self, task_type: TaskType) -> Result<(), PipelineError> {
        self.guard()?;
        self.task_type = task_type;
        Ok(())
    }

    /// Append to the reasoning log
    pub fn push_reasoning(&mut self, record: ReasoningRecord) -> Result<(), PipelineError> {
        self.guard()?;
        self.reasoning.push(record);
        Ok(())
    }

    /// Record a collaborator call
    pub fn record_call(&mut self, call: CallRecord) -> Result<(), PipelineError> {
        self.guard()?;
        if let CallOutcome::Failure { error } = &call.outcome {
            tracing::warn!(task_id = %self.id, call = %call.name, error = %error, "Collaborator call failed");
        }
        self.calls.push(call);
        Ok(())
    }

    /// Attach the thinking trace
    pub fn attach_thinking(&mut self, process: ThinkingProcess) -> Result<(), PipelineError> {
        self.guard()?;
        self.thinking = Some(process);
        Ok(())
    }

    /// Finish successfully
    pub fn complete(&mut self) -> Result<(), PipelineError> {
        self.guard()?;
        self.status = TaskStatus::Complete;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Finish with an error
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), PipelineError> {
        self.guard()?;
        self.status = TaskStatus::Error;
        self.message = Some(message.into());
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_task_id_unique() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("task-"));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
        assert!(TaskStatus::Error.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        let json = serde_json::to_value(TaskStatus::InProgress).unwrap();
        assert_eq!(json, json!("in_progress"));
    }

    #[test]
    fn test_sealed_after_complete() {
        let mut task = TaskState::new(TaskId::new("t1"));
        task.start().unwrap();
        task.push_reasoning(ReasoningRecord::new(RESPONSE_STEP, "done"))
            .unwrap();
        task.complete().unwrap();

        let err = task
            .record_call(CallRecord::success(call_names::LIST_DATASETS, json!({})))
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::TaskSealed {
                id: TaskId::new("t1"),
                status: TaskStatus::Complete
            }
        );
        assert!(task.calls().is_empty());
        assert!(task.fail("late").is_err());
        assert_eq!(task.status(), TaskStatus::Complete);
        assert!(task.completed_at().is_some());
    }

    #[test]
    fn test_response_text_prefers_response_step() {
        let mut task = TaskState::new(TaskId::generate());
        assert_eq!(task.response_text(), "No response available");

        task.push_reasoning(ReasoningRecord::new("direct_request", "a")).unwrap();
        assert_eq!(task.response_text(), "a");

        task.push_reasoning(ReasoningRecord::new(RESPONSE_STEP, "b")).unwrap();
        task.push_reasoning(ReasoningRecord::new("extra", "c")).unwrap();
        assert_eq!(task.response_text(), "b");
    }

    #[test]
    fn test_call_record_serialization() {
        let ok = CallRecord::success(call_names::LIST_MODELS, json!({ "models": [] }));
        let failed = CallRecord::failure(call_names::LIST_MODELS, "refused");
        assert!(!ok.is_failure());
        assert!(failed.is_failure());

        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(
            json,
            json!({ "name": "list_models", "outcome": { "failure": { "error": "refused" } } })
        );
    }
}
