//! Reasoning traces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task_type::TaskType;

/// A stage of the reasoning sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkingStage {
    /// What the user wants
    IntentUnderstanding,
    /// Which kind of task it is
    TaskClassification,
    /// How to carry it out
    ExecutionPlanning,
    /// What to answer, after side effects ran
    ResponseFormulation,
    /// Recovery after a failed stage
    ErrorRecovery,
}

impl ThinkingStage {
    /// Stable snake_case label
    pub fn label(&self) -> &'static str {
        match self {
            Self::IntentUnderstanding => "intent_understanding",
            Self::TaskClassification => "task_classification",
            Self::ExecutionPlanning => "execution_planning",
            Self::ResponseFormulation => "response_formulation",
            Self::ErrorRecovery => "error_recovery",
        }
    }
}

impl std::fmt::Display for ThinkingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Output of one stage
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThinkingStepResult {
    /// Stage that produced this step
    pub stage: ThinkingStage,
    /// Stage instruction sent to the model
    pub prompt: String,
    /// Raw model output
    pub reasoning: String,
    /// Shape-derived confidence in `[0, 1]`
    pub confidence: f32,
}

impl ThinkingStepResult {
    /// Build a step, clamping confidence into range
    pub fn new(
        stage: ThinkingStage,
        prompt: impl Into<String>,
        reasoning: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            stage,
            prompt: prompt.into(),
            reasoning: reasoning.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Ordered record of the stages run for one request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThinkingProcess {
    /// Message that started the run
    pub user_message: String,
    steps: Vec<ThinkingStepResult>,
    task_type: TaskType,
    /// Planning output, when planning ran
    pub task_plan: Option<String>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run was last sealed
    pub ended_at: Option<DateTime<Utc>>,
}

impl ThinkingProcess {
    /// Start an empty process
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            steps: Vec::new(),
            task_type: TaskType::Unknown,
            task_plan: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Steps in the order they ran
    pub fn steps(&self) -> &[ThinkingStepResult] {
        &self.steps
    }

    /// First step of `stage`, if it ran
    pub fn step(&self, stage: ThinkingStage) -> Option<&ThinkingStepResult> {
        self.steps.iter().find(|s| s.stage == stage)
    }

    /// Resolved task type
    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Set the task type; `Unknown` never replaces a resolved type
    pub fn set_task_type(&mut self, task_type: TaskType) {
        if task_type != TaskType::Unknown {
            self.task_type = task_type;
        }
    }

    /// Whether the run hit a failure and recovered
    pub fn has_error_recovery(&self) -> bool {
        self.step(ThinkingStage::ErrorRecovery).is_some()
    }

    /// Whether an end time is set
    pub fn is_sealed(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Wall time between start and seal
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }

    pub(crate) fn push(&mut self, step: ThinkingStepResult) {
        tracing::debug!(
            stage = %step.stage,
            confidence = step.confidence,
            chars = step.reasoning.len(),
            "Thinking step recorded"
        );
        self.steps.push(step);
    }

    pub(crate) fn seal(&mut self) {
        self.ended_at = Some(Utc::now());
    }
}
