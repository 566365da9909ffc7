//! Task classification

use serde::{Deserialize, Serialize};

/// What kind of work a request asks for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Chat or a general question
    Conversation,
    /// List, upload or remove datasets
    DatasetManagement,
    /// Train or fine-tune a model
    ModelTraining,
    /// Deploy or undeploy a model
    ModelDeployment,
    /// Use a model for generation or prediction
    ModelInference,
    /// System status and connectivity
    SystemCheck,
    /// Not yet classified
    #[default]
    Unknown,
}

impl TaskType {
    /// Short label used in prompts and logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::DatasetManagement => "dataset",
            Self::ModelTraining => "training",
            Self::ModelDeployment => "deployment",
            Self::ModelInference => "inference",
            Self::SystemCheck => "system_check",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

const GREETING_PHRASES: &[&str] = &[
    "just saying hi",
    "just greeting",
    "simple greeting",
    "saying hello",
    "greeting the assistant",
    "just a greeting",
];

/// Ordered keyword rules; the first rule with a matching keyword wins
const KEYWORD_RULES: &[(&[&str], TaskType)] = &[
    (GREETING_PHRASES, TaskType::Conversation),
    (
        &["conversation", "general question", "chat"],
        TaskType::Conversation,
    ),
    (&["dataset", "data"], TaskType::DatasetManagement),
    (&["train", "fine-tune", "finetune"], TaskType::ModelTraining),
    (&["deploy", "serve", "publish"], TaskType::ModelDeployment),
    (&["inference", "generat", "predict"], TaskType::ModelInference),
    (
        &["status", "system", "check", "connection"],
        TaskType::SystemCheck,
    ),
];

/// Resolve a task type from classification text
///
/// Never returns [`TaskType::Unknown`]; unmatched text is a conversation.
pub fn resolve_task_type(classification: &str) -> TaskType {
    let text = classification.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, task_type)| *task_type)
        .unwrap_or(TaskType::Conversation)
}
