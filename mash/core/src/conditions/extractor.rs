//! Condition extraction over reasoning output

use super::merge::merge_conditions;
use super::parse::valid_conditions;
use super::types::{UiCondition, UiConditionSet};
use crate::inference::{InferenceClient, InferenceRequest};
use crate::reasoning::{ThinkingProcess, ThinkingStage, ThinkingStepResult};

const ANALYZER_SYSTEM_PROMPT: &str = "You are a UI requirement analyzer. Your task is to analyze user requests and identify specific UI conditions and requirements that should be considered when generating UI code.

Your analysis should identify conditions in these categories:
- Accessibility needs (screen reader support, color blindness, motor impairment, etc.)
- Device type preferences (mobile, tablet, desktop, TV, wearable)
- User preferences (dark mode, light mode, reduced animations, etc.)
- Branding styles (modern, corporate, playful, etc.)
- Performance needs (low bandwidth, offline support, etc.)
- Legacy support (older browsers, no JavaScript, etc.)
- Content density (data heavy, text heavy, media rich, etc.)

For each condition identified, provide:
1. The category
2. The specific value
3. A priority score (1-10, with 10 being highest priority)
4. A confidence score (0-1, indicating how certain you are of this condition)
5. A brief description of why this condition is relevant";

fn extraction_prompt(user_message: &str, reasoning: &str) -> String {
    format!(
        "{ANALYZER_SYSTEM_PROMPT}

Based on the user message: \"{user_message}\"

And the thinking step reasoning: \"{reasoning}\"

Identify all UI conditions/requirements that should be considered when generating UI code for this user.

Return your analysis in JSON format as an array of condition objects:
[
  {{
    \"category\": \"category_name\",
    \"value\": \"specific_value\",
    \"priority\": priority_score,
    \"confidence\": confidence_score,
    \"description\": \"why this condition is relevant\"
  }}
]

Be specific and precise. Only include conditions that are explicitly stated or strongly implied.
If no conditions of a particular category are detected, don't include that category."
    )
}

/// Mines UI conditions out of reasoning steps
#[derive(Clone, Debug)]
pub struct ConditionExtractor {
    client: InferenceClient,
    model: Option<String>,
}

impl ConditionExtractor {
    /// Create an extractor over `client`
    pub fn new(client: InferenceClient) -> Self {
        Self {
            client,
            model: None,
        }
    }

    /// Use a model other than the client's default
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Conditions found in one reasoning step
    ///
    /// Inference failures and unparseable output both yield an empty list.
    pub async fn extract(&self, step: &ThinkingStepResult, user_message: &str) -> Vec<UiCondition> {
        let model = self.model.as_deref().unwrap_or_else(|| self.client.model());
        let request =
            InferenceRequest::new(extraction_prompt(user_message, &step.reasoning), model)
                .reasoning(true);

        match self.client.generate(request).await {
            Ok(result) => valid_conditions(&result.text),
            Err(e) => {
                tracing::warn!(stage = %step.stage, error = %e, "Condition extraction failed");
                Vec::new()
            }
        }
    }

    /// Finalized conditions for a thinking process
    ///
    /// Extracts from the intent and planning steps concurrently, merges the
    /// two, then filters and sorts. Without an intent step the set is empty.
    pub async fn analyze(&self, process: &ThinkingProcess) -> UiConditionSet {
        let source = Some(process.user_message.clone());

        let Some(intent) = process.step(ThinkingStage::IntentUnderstanding) else {
            tracing::warn!("No intent step in thinking process, no conditions extracted");
            return UiConditionSet::empty(source);
        };

        let (intended, planned) = match process.step(ThinkingStage::ExecutionPlanning) {
            Some(planning) => {
                let (a, b) = tokio::join!(
                    self.extract(intent, &process.user_message),
                    self.extract(planning, &process.user_message)
                );
                (a, b)
            }
            None => (self.extract(intent, &process.user_message).await, Vec::new()),
        };

        // merging into an empty list also collapses repeats within one pass
        let mut conditions = Vec::with_capacity(intended.len() + planned.len());
        merge_conditions(&mut conditions, &intended);
        merge_conditions(&mut conditions, &planned);
        let set = UiConditionSet::from_conditions(conditions, source);
        tracing::debug!(conditions = set.len(), "Conditions extracted");
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_shape() {
        let prompt = extraction_prompt("dark dashboard", "they want dark mode");
        assert!(prompt.starts_with("You are a UI requirement analyzer."));
        assert!(prompt.contains("Based on the user message: \"dark dashboard\""));
        assert!(prompt.contains("\"category\": \"category_name\""));
    }
}
