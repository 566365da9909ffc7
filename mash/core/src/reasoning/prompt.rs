//! Prompt composition
//!
//! Every stage prompt has the same frame:
//!
//! ```text
//! {system}
//!
//! {context}            (only when there is conversation history)
//!
//! User Message: "{message}"
//!
//! {instruction}
//!
//! Thinking:
//! ```
//!
//! The response-formulation prompt drops the user-message line and ends with
//! `Response:` instead.

use super::task_type::TaskType;

/// Default system preamble
pub const SYSTEM_PREAMBLE: &str = "You are Mash, an AI assistant specialized in machine learning tasks.
You analyze user requests carefully, understand intent, and take immediate action.
When a user asks about data, models, or system status, prioritize direct retrieval of information.
Avoid asking clarifying questions when you can reasonably infer what the user wants.
Aim to provide concrete, helpful responses that directly address the user's needs.";

/// Characters of intent output quoted in the classification instruction
pub const INTENT_EXCERPT_CHARS: usize = 200;

/// Compose a thinking-stage prompt
pub fn compose_prompt(
    system: &str,
    context: Option<&str>,
    user_message: &str,
    instruction: &str,
) -> String {
    let mut prompt = format!("{system}\n\n");
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(context);
        prompt.push_str("\n\n");
    }
    prompt.push_str(&format!(
        "User Message: \"{user_message}\"\n\n{instruction}\n\nThinking:"
    ));
    prompt
}

/// Compose the response-formulation prompt
pub fn compose_response_prompt(system: &str, context: Option<&str>, instruction: &str) -> String {
    let mut prompt = format!("{system}\n\n");
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(context);
        prompt.push_str("\n\n");
    }
    prompt.push_str(instruction);
    prompt.push_str("\n\nResponse:");
    prompt
}

pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub(crate) fn intent_instruction(user_message: &str) -> String {
    format!(
        "Analyze the user's message: \"{user_message}\"
Identify their primary intent and what specific action they want taken.
Assume they want direct information rather than clarification when reasonable.
For example, if they ask about datasets, assume they want to see their datasets.
What does the user want me to do? What information do they need?"
    )
}

pub(crate) fn classification_instruction(intent: &str) -> String {
    format!(
        "Based on your understanding of the user's intent: \"{}...\", classify this request into one of these categories:
1. General conversation - the user wants to chat or ask a general question
2. Dataset management - the user wants to work with datasets (list, create, upload, etc.)
3. Model training - the user wants to train or fine-tune a model
4. Model deployment - the user wants to deploy a model
5. Model inference - the user wants to use a model to generate text or get predictions
6. System check - the user is asking about system status or connections

Which category best fits this request? Choose the most specific category that matches their intent.
DON'T default to general conversation if a more specific category applies.
If they mention datasets, models, or system status, always choose the corresponding specific category.",
        excerpt(intent, INTENT_EXCERPT_CHARS)
    )
}

pub(crate) fn planning_instruction(task_type: TaskType) -> String {
    format!(
        "Now that we've classified this as a {task_type} task, develop a detailed plan to fulfill the user's request.
What API calls or operations will we need? What data do we need to gather? What potential issues might arise?

Create a step-by-step plan with clear actions, prioritizing:
1. Direct API calls to get the information immediately
2. Clear presentation of results without unnecessary explanations
3. Immediate responses with data rather than asking clarifying questions

For example, if the user asked about datasets, your plan should include immediately listing their datasets."
    )
}

pub(crate) fn formulation_instruction(user_message: &str, results_summary: &str) -> String {
    format!(
        "Based on the user's request: \"{user_message}\" and the information we've gathered:

API Results:
{results_summary}

Formulate a direct, informative response that presents the requested information immediately.
Your response should:
1. Start with the most relevant data or results rather than explanations
2. Present lists, tables, or structured data when available
3. Be conversational but prioritize information over chat
4. AVOID asking clarifying questions when data is available
5. Only ask for clarification if absolutely no relevant data was found

For dataset requests: Show the list of datasets directly.
For model requests: Display available models with key details.
For status requests: Present system status immediately."
    )
}

pub(crate) fn recovery_instruction(error: &str, user_message: &str) -> String {
    format!(
        "An error occurred while processing: \"{error}\".
How can I recover from this error and still provide a helpful response to the user's request: \"{user_message}\"?
What's the most graceful way to handle this situation?"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compose_without_context() {
        let prompt = compose_prompt("SYS", None, "hi", "Do it");
        assert_eq!(prompt, "SYS\n\nUser Message: \"hi\"\n\nDo it\n\nThinking:");
    }

    #[test]
    fn test_compose_with_context() {
        let prompt = compose_prompt("SYS", Some("Human: a\nAssistant: b"), "hi", "Do it");
        assert_eq!(
            prompt,
            "SYS\n\nHuman: a\nAssistant: b\n\nUser Message: \"hi\"\n\nDo it\n\nThinking:"
        );

        // Blank history is treated as no history
        assert_eq!(
            compose_prompt("SYS", Some("  "), "hi", "Do it"),
            compose_prompt("SYS", None, "hi", "Do it")
        );
    }

    #[test]
    fn test_response_prompt_suffix() {
        let prompt = compose_response_prompt("SYS", None, "Summarise");
        assert_eq!(prompt, "SYS\n\nSummarise\n\nResponse:");
    }

    #[test]
    fn test_classification_truncates_intent() {
        let intent = "é".repeat(500);
        let instruction = classification_instruction(&intent);
        assert!(instruction.contains(&format!("\"{}...\"", "é".repeat(200))));
        assert!(!instruction.contains(&"é".repeat(201)));
    }

    #[test]
    fn test_planning_names_task_type() {
        assert!(planning_instruction(TaskType::ModelDeployment)
            .starts_with("Now that we've classified this as a deployment task"));
    }
}
