//! Reasoning Engine
//!
//! Turns a user message into a scored, staged reasoning trace:
//!
//! ```text
//! IntentUnderstanding -> TaskClassification -> ExecutionPlanning
//!                                                   |
//!                     (collaborator calls run here) |
//!                                                   v
//!                                         ResponseFormulation
//! ```
//!
//! Any failing stage short-circuits to a single `ErrorRecovery` step.

mod confidence;
mod engine;
mod knowledge;
mod process;
mod prompt;
mod response;
mod task_type;

pub use confidence::{confidence, ConfidenceProfile};
pub use engine::{ReasoningEngine, RECOVERY_FAILED, RECOVERY_UNAVAILABLE};
pub use knowledge::KnowledgeTopic;
pub use process::{ThinkingProcess, ThinkingStage, ThinkingStepResult};
pub use prompt::{compose_prompt, compose_response_prompt, SYSTEM_PREAMBLE};
pub use response::{fallback_response, format_call_results};
pub use task_type::{resolve_task_type, TaskType};
