//! Staged reasoning over the inference client

use super::confidence::{confidence, ConfidenceProfile};
use super::process::{ThinkingProcess, ThinkingStage, ThinkingStepResult};
use super::prompt::{self, compose_prompt, compose_response_prompt, SYSTEM_PREAMBLE};
use super::response::format_call_results;
use super::task_type::resolve_task_type;
use crate::inference::{InferenceClient, InferenceError, InferenceRequest};
use crate::orchestrator::CallRecord;

/// Placeholder when a stage returns no text
const EMPTY_STAGE_OUTPUT: &str = "Unable to generate reasoning.";

/// Placeholder when response formulation returns no text
const EMPTY_RESPONSE: &str =
    "I apologize, but I'm having trouble formulating a response right now. Could you please try again?";

/// Recovery note when the recovery call itself fails
pub const RECOVERY_FAILED: &str = "After encountering an error, I couldn't complete the reasoning process. The best approach is to apologize to the user for the technical issue and suggest trying again with a simpler request.";

/// Recovery note when no recovery reasoning could be produced
pub const RECOVERY_UNAVAILABLE: &str = "Unable to process due to system error. The best course of action is to provide a simple response acknowledging the issue and asking the user to try again.";

/// Runs the thinking stages for a request
#[derive(Clone, Debug)]
pub struct ReasoningEngine {
    client: InferenceClient,
    system_prompt: String,
    model: Option<String>,
}

impl ReasoningEngine {
    /// Create an engine with the default system preamble
    pub fn new(client: InferenceClient) -> Self {
        Self {
            client,
            system_prompt: SYSTEM_PREAMBLE.to_string(),
            model: None,
        }
    }

    /// Replace the default system prompt
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Use a model other than the client's default
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Underlying inference client
    pub fn client(&self) -> &InferenceClient {
        &self.client
    }

    /// Default system prompt
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn model(&self) -> &str {
        self.model.as_deref().unwrap_or_else(|| self.client.model())
    }

    async fn generate_text(&self, prompt: String) -> Result<String, InferenceError> {
        let request = InferenceRequest::new(prompt, self.model()).reasoning(true);
        Ok(self.client.generate(request).await?.text)
    }

    async fn run_stage(
        &self,
        stage: ThinkingStage,
        user_message: &str,
        context: Option<&str>,
        system: &str,
        instruction: String,
    ) -> Result<ThinkingStepResult, InferenceError> {
        let prompt = compose_prompt(system, context, user_message, &instruction);
        let text = self.generate_text(prompt).await.map_err(|e| {
            tracing::warn!(stage = %stage, error = %e, "Thinking stage failed");
            e
        })?;

        let reasoning = if text.trim().is_empty() {
            EMPTY_STAGE_OUTPUT.to_string()
        } else {
            text
        };
        let score = confidence(&reasoning, ConfidenceProfile::Reasoning);
        Ok(ThinkingStepResult::new(stage, instruction, reasoning, score))
    }

    /// Run intent, classification and planning with the default system prompt
    pub async fn think(&self, user_message: &str, context: Option<&str>) -> ThinkingProcess {
        self.think_with_system(user_message, context, &self.system_prompt)
            .await
    }

    /// Run intent, classification and planning with an explicit system prompt
    ///
    /// Never fails. A failing stage ends the sequence with a single
    /// error-recovery step, and the process is sealed either way.
    pub async fn think_with_system(
        &self,
        user_message: &str,
        context: Option<&str>,
        system: &str,
    ) -> ThinkingProcess {
        let mut process = ThinkingProcess::new(user_message);

        if let Err(error) = self
            .run_sequence(&mut process, user_message, context, system)
            .await
        {
            let step = self.recover(user_message, &error, context, system).await;
            process.push(step);
        }

        process.seal();
        tracing::debug!(
            task_type = %process.task_type(),
            steps = process.steps().len(),
            recovered = process.has_error_recovery(),
            "Thinking process complete"
        );
        process
    }

    async fn run_sequence(
        &self,
        process: &mut ThinkingProcess,
        user_message: &str,
        context: Option<&str>,
        system: &str,
    ) -> Result<(), InferenceError> {
        let intent = self
            .run_stage(
                ThinkingStage::IntentUnderstanding,
                user_message,
                context,
                system,
                prompt::intent_instruction(user_message),
            )
            .await?;
        let classification_instruction = prompt::classification_instruction(&intent.reasoning);
        process.push(intent);

        let classification = self
            .run_stage(
                ThinkingStage::TaskClassification,
                user_message,
                context,
                system,
                classification_instruction,
            )
            .await?;
        process.set_task_type(resolve_task_type(&classification.reasoning));
        process.push(classification);

        let planning = self
            .run_stage(
                ThinkingStage::ExecutionPlanning,
                user_message,
                context,
                system,
                prompt::planning_instruction(process.task_type()),
            )
            .await?;
        process.task_plan = Some(planning.reasoning.clone());
        process.push(planning);

        Ok(())
    }

    async fn recover(
        &self,
        user_message: &str,
        error: &InferenceError,
        context: Option<&str>,
        system: &str,
    ) -> ThinkingStepResult {
        tracing::info!(error = %error, "Attempting error recovery");
        let instruction = prompt::recovery_instruction(&error.to_string(), user_message);
        let full_prompt = compose_prompt(system, context, user_message, &instruction);

        match self.generate_text(full_prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                ThinkingStepResult::new(ThinkingStage::ErrorRecovery, instruction, text, 0.6)
            }
            Ok(_) => ThinkingStepResult::new(
                ThinkingStage::ErrorRecovery,
                instruction,
                RECOVERY_UNAVAILABLE,
                0.3,
            ),
            Err(e) => {
                tracing::error!(error = %e, "Error recovery generation failed");
                ThinkingStepResult::new(
                    ThinkingStage::ErrorRecovery,
                    instruction,
                    RECOVERY_FAILED,
                    0.4,
                )
            }
        }
    }

    /// Formulate the final answer once collaborator calls have run
    ///
    /// Appends a response-formulation step and reseals the process. Errors
    /// are returned so the caller can fall back to a locally built answer.
    pub async fn formulate_response(
        &self,
        process: &mut ThinkingProcess,
        calls: &[CallRecord],
        context: Option<&str>,
    ) -> Result<ThinkingStepResult, InferenceError> {
        let summary = format_call_results(calls);
        let instruction = prompt::formulation_instruction(&process.user_message, &summary);
        let full_prompt = compose_response_prompt(&self.system_prompt, context, &instruction);

        let text = self.generate_text(full_prompt).await.map_err(|e| {
            tracing::warn!(error = %e, "Response formulation failed");
            e
        })?;

        let reasoning = if text.trim().is_empty() {
            EMPTY_RESPONSE.to_string()
        } else {
            text
        };
        let score = confidence(&reasoning, ConfidenceProfile::Reasoning);
        let step = ThinkingStepResult::new(
            ThinkingStage::ResponseFormulation,
            instruction,
            reasoning,
            score,
        );

        process.push(step.clone());
        process.seal();
        Ok(step)
    }
}
