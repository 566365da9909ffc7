//! Mash Core - LLM orchestration for the Mash agent
//!
//! Turns a natural-language message into a staged reasoning trace, runs the
//! backend calls the message asks for, and answers. The same reasoning feeds
//! a condition-driven UI generator that adapts component templates to what
//! the user needs (dark mode, screen readers, small screens, ...).
//!
//! # Architecture
//!
//! ```text
//!                    user message
//!                         |
//!                 ┌───────┴────────┐
//!                 │TaskOrchestrator│──── ActionCollaborator (datasets,
//!                 └───────┬────────┘      fine-tuning, deployments)
//!                         |
//!                 ┌───────┴────────┐
//!                 │ReasoningEngine │  intent -> classification -> plan
//!                 └───────┬────────┘          -> response
//!                         |
//!    ┌────────────────────┼─────────────────────┐
//!    |                    |                     |
//! ConditionExtractor -> mapping -> TemplateEngine   (UiGenerator)
//!    |
//! ┌──┴──────────────┐
//! │ InferenceClient │  check, retries, timeouts, degraded mode
//! └──┬──────────────┘
//!    |
//! Transport (Ollama over HTTP)
//! ```
//!
//! # Key Types
//!
//! - [`InferenceClient`]: resilient model access with a degraded mode
//! - [`ReasoningEngine`]: staged reasoning producing a [`ThinkingProcess`]
//! - [`ConditionExtractor`]: mines [`UiCondition`]s from reasoning output
//! - [`map_conditions`]: pure condition to modification rules
//! - [`TemplateEngine`]: applies modifications to component templates
//! - [`UiGenerator`]: the whole UI pipeline for one message
//! - [`TaskOrchestrator`]: per-message task state machine
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mash_core::{load_config, InferenceClient, ReasoningEngine, TaskOrchestrator};
//!
//! let config = load_config()?;
//! let client = InferenceClient::new(Arc::new(config.transport()))
//!     .with_settings(config.client_settings());
//! let orchestrator = TaskOrchestrator::new(
//!     ReasoningEngine::new(client),
//!     Arc::new(config.collaborator()),
//! );
//!
//! let task = orchestrator.process("show me my datasets").await;
//! println!("{}", task.response_text());
//! ```
//!
//! # Module Overview
//!
//! - [`inference`]: transport seam, retries and degraded mode
//! - [`reasoning`]: stages, prompts, confidence and task types
//! - [`conditions`]: condition types, parsing and merging
//! - [`mapping`]: condition to modification rule tables
//! - [`templates`]: template registry and modification passes
//! - [`generation`]: end-to-end UI generation
//! - [`orchestrator`]: tasks, history and backend collaborators
//! - [`config`]: layered configuration

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod conditions;
pub mod config;
pub mod generation;
pub mod inference;
pub mod mapping;
pub mod orchestrator;
pub mod reasoning;
pub mod templates;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Inference exports
pub use inference::{
    ClientSettings, ConnectionStatus, Connectivity, ConnectivityMode, HealthStatus, HttpTransport,
    InferenceClient, InferenceError, InferenceRequest, InferenceResult, ModelSummary, RetryPolicy,
    Transport,
};

// Reasoning exports
pub use reasoning::{
    ReasoningEngine, TaskType, ThinkingProcess, ThinkingStage, ThinkingStepResult,
};

// Condition and mapping exports
pub use conditions::{ConditionCategory, ConditionExtractor, UiCondition, UiConditionSet};
pub use mapping::{map_condition, map_conditions, UiModification, UiModificationSet};

// Template exports
pub use templates::{GeneratedArtifact, Template, TemplateEngine, TemplateKind, TemplateRegistry};

// Generation exports
pub use generation::{ComponentRequest, GeneratedUi, UiGenerator};

// Orchestrator exports
pub use orchestrator::{
    ActionCollaborator, HttpCollaborator, OfflineCollaborator, TaskId, TaskOrchestrator,
    TaskState, TaskStatus,
};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, MashConfig,
};
