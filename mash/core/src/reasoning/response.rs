//! Call-result rendering and the offline fallback answer
//!
//! Both functions are pure: they read recorded collaborator calls and never
//! touch the network, so the fallback still works when inference is down.

use std::fmt::Write as _;

use serde_json::Value;

use super::task_type::TaskType;
use crate::orchestrator::{call_names, CallOutcome, CallRecord, SystemStatus};

/// Characters of raw JSON shown for calls without a dedicated format
const RAW_RESULT_CHARS: usize = 200;

fn find<'a>(calls: &'a [CallRecord], name: &str) -> Option<&'a CallRecord> {
    calls.iter().find(|c| c.name == name)
}

fn items<'a>(call: &'a CallRecord, key: &str) -> &'a [Value] {
    match &call.outcome {
        CallOutcome::Success(value) => value
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        CallOutcome::Failure { .. } => &[],
    }
}

fn field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}

fn display_name<'a>(item: &'a Value, fallback: &'a str) -> &'a str {
    field(item, "name")
        .or_else(|| field(item, "id"))
        .unwrap_or(fallback)
}

/// Connectivity as recorded by the status call, if it succeeded
fn recorded_status(calls: &[CallRecord]) -> Option<SystemStatus> {
    match &find(calls, call_names::CHECK_SYSTEM_STATUS)?.outcome {
        CallOutcome::Success(value) => serde_json::from_value(value.clone()).ok(),
        CallOutcome::Failure { .. } => Some(SystemStatus::default()),
    }
}

/// Render recorded calls for the response-formulation prompt
pub fn format_call_results(calls: &[CallRecord]) -> String {
    if calls.is_empty() {
        return "No API calls were made or all calls failed.".to_string();
    }

    let mut out = String::new();
    let mut backend_down = false;

    if let Some(status) = recorded_status(calls) {
        if status.ai_service_connected && !status.backend_connected {
            backend_down = true;
            out.push_str("IMPORTANT: Backend service is disconnected, but AI service is available. This means local AI models are working, but cloud features (datasets, deployments, etc.) are unavailable.\n\n");
        } else if !status.ai_service_connected {
            out.push_str("IMPORTANT: AI service is disconnected. Local AI models are unavailable.\n\n");
        }
    }

    let unavailable = |what: &str| {
        if backend_down {
            format!("No {what} available because backend service is disconnected.\n")
        } else {
            format!("No {what} available.\n")
        }
    };

    for call in calls {
        let _ = writeln!(out, "API Call: {}", call.name);

        if let CallOutcome::Failure { error } = &call.outcome {
            let _ = writeln!(out, "Call failed: {error}");
            out.push('\n');
            continue;
        }

        match call.name.as_str() {
            call_names::LIST_DATASETS => {
                let datasets = items(call, "datasets");
                let _ = writeln!(out, "Found {} datasets.", datasets.len());
                if datasets.is_empty() {
                    out.push_str(&unavailable("datasets"));
                }
                for (i, ds) in datasets.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "Dataset {}: {} (ID: {})",
                        i + 1,
                        field(ds, "name").unwrap_or("Unnamed"),
                        field(ds, "id").unwrap_or("unknown")
                    );
                    if let Some(description) = field(ds, "description") {
                        let _ = writeln!(out, "Description: {description}");
                    }
                    if let Some(records) = ds.get("records").and_then(Value::as_u64) {
                        let _ = writeln!(out, "Records: {records}");
                    }
                }
            }
            call_names::LIST_AI_MODELS => {
                let models = items(call, "models");
                let _ = writeln!(out, "Found {} AI models.", models.len());
                if models.is_empty() {
                    out.push_str("No AI models available.\n");
                }
                for (i, model) in models.iter().enumerate() {
                    let _ = writeln!(out, "Model {}: {}", i + 1, field(model, "name").unwrap_or("Unnamed"));
                }
            }
            call_names::LIST_FINE_TUNING_JOBS => {
                let jobs = items(call, "jobs");
                let _ = writeln!(out, "Found {} fine-tuning jobs.", jobs.len());
                if jobs.is_empty() {
                    out.push_str(&unavailable("fine-tuning jobs"));
                }
                for (i, job) in jobs.iter().enumerate() {
                    let _ = writeln!(out, "Job {}: {}", i + 1, display_name(job, "Unnamed"));
                    if let Some(status) = field(job, "status") {
                        let _ = writeln!(out, "Status: {status}");
                    }
                    if let Some(model) = field(job, "model") {
                        let _ = writeln!(out, "Model: {model}");
                    }
                }
            }
            call_names::LIST_DEPLOYMENTS => {
                let deployments = items(call, "deployments");
                let _ = writeln!(out, "Found {} model deployments.", deployments.len());
                if deployments.is_empty() {
                    out.push_str(&unavailable("model deployments"));
                }
                for (i, deployment) in deployments.iter().enumerate() {
                    let _ = writeln!(out, "Deployment {}: {}", i + 1, display_name(deployment, "Unnamed"));
                    if let Some(status) = field(deployment, "status") {
                        let _ = writeln!(out, "Status: {status}");
                    }
                    if let Some(model) = field(deployment, "model") {
                        let _ = writeln!(out, "Model: {model}");
                    }
                }
            }
            call_names::CHECK_SYSTEM_STATUS => {
                let status = recorded_status(calls).unwrap_or_default();
                let yes_no = |b: bool| if b { "Yes" } else { "No" };
                let _ = writeln!(out, "AI service connected: {}", yes_no(status.ai_service_connected));
                let _ = writeln!(out, "Backend connected: {}", yes_no(status.backend_connected));
            }
            _ => {
                if let CallOutcome::Success(value) = &call.outcome {
                    let raw: String = value.to_string().chars().take(RAW_RESULT_CHARS).collect();
                    let _ = writeln!(out, "Result: {raw}...");
                }
            }
        }

        out.push('\n');
    }

    out
}

fn numbered(items: &[Value], fallback: &str) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}\n", i + 1, field(item, "name").unwrap_or(fallback)))
        .collect()
}

/// Connectivity-aware answer built only from recorded calls
///
/// Used when response formulation fails. Missing status information is
/// read as "everything connected".
pub fn fallback_response(task_type: TaskType, calls: &[CallRecord]) -> String {
    let status = recorded_status(calls).unwrap_or(SystemStatus {
        ai_service_connected: true,
        backend_connected: true,
    });
    let ai = status.ai_service_connected;
    let backend = status.backend_connected;

    if ai && !backend {
        let mut response = String::from("I'm currently experiencing connection issues with the cloud backend, but I can still help you with local AI tasks. ");
        match task_type {
            TaskType::DatasetManagement => response.push_str("Unfortunately, I can't access your datasets at the moment due to the backend connection issue. You can still use me for conversation and text generation."),
            TaskType::ModelTraining => response.push_str("I can't access training features at the moment due to the backend connection issue. However, you can still use the local models that are already available on your system."),
            TaskType::ModelDeployment => response.push_str("I can't access deployment features at the moment due to the backend connection issue. However, you can still use the local models available through Ollama."),
            TaskType::ModelInference => {
                let models = find(calls, call_names::LIST_AI_MODELS)
                    .map(|c| items(c, "models"))
                    .unwrap_or_default();
                if models.is_empty() {
                    response.push_str("You can still use local AI models for text generation, though I couldn't retrieve the list of available models.");
                } else {
                    response.push_str("I can still help you with text generation using your local AI models. Here are the available models:\n\n");
                    response.push_str(&numbered(models, "Unnamed model"));
                }
            }
            _ => response.push_str("While cloud features like datasets and deployments are unavailable, I can still help answer questions and generate text using local models."),
        }
        return response;
    }

    if !ai {
        return "I'm currently unable to connect to the AI service, which means I can't generate responses. Please check your connection and try again.".to_string();
    }

    match task_type {
        TaskType::DatasetManagement => match find(calls, call_names::LIST_DATASETS) {
            Some(call) => {
                let datasets = items(call, "datasets");
                if datasets.is_empty() {
                    "You don't have any datasets available yet. Would you like to upload one?"
                        .to_string()
                } else {
                    format!(
                        "Here are your datasets:\n\n{}",
                        numbered(datasets, "Unnamed dataset")
                    )
                }
            }
            None => "Here's the information you requested:".to_string(),
        },
        TaskType::ModelInference => match find(calls, call_names::LIST_AI_MODELS) {
            Some(call) => {
                let models = items(call, "models");
                if models.is_empty() {
                    "There are no models available for inference. Please check your AI service connection.".to_string()
                } else {
                    format!(
                        "Here are the available models:\n\n{}",
                        numbered(models, "Unnamed model")
                    )
                }
            }
            None => "Here's the information you requested:".to_string(),
        },
        TaskType::SystemCheck => {
            "System Status:\n\nAI service: ✅ Connected\nBackend service: ✅ Connected\n\n".to_string()
        }
        _ => generic_fallback(calls),
    }
}

fn generic_fallback(calls: &[CallRecord]) -> String {
    let relevant: Vec<&CallRecord> = calls
        .iter()
        .filter(|c| c.name != call_names::CHECK_SYSTEM_STATUS)
        .collect();

    if relevant.is_empty() {
        return if calls.is_empty() {
            "I processed your request but couldn't find any relevant information.".to_string()
        } else {
            "I processed your request but couldn't find any specific information to share."
                .to_string()
        };
    }

    let mut response = String::from("Here's what I've gathered based on your request:\n\n");
    for call in relevant {
        if call.name == call_names::LIST_AI_MODELS {
            let models = items(call, "models");
            if !models.is_empty() {
                response.push_str("Available AI models:\n");
                for model in models.iter().take(5) {
                    let _ = writeln!(response, "- {}", field(model, "name").unwrap_or("Unnamed"));
                }
                if models.len() > 5 {
                    let _ = writeln!(response, "- And {} more...", models.len() - 5);
                }
            }
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(ai: bool, backend: bool) -> CallRecord {
        CallRecord::success(
            call_names::CHECK_SYSTEM_STATUS,
            json!({ "ai_service_connected": ai, "backend_connected": backend }),
        )
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(
            format_call_results(&[]),
            "No API calls were made or all calls failed."
        );
    }

    #[test]
    fn test_format_backend_down_note() {
        let calls = vec![
            status(true, false),
            CallRecord::success(call_names::LIST_DATASETS, json!({ "datasets": [] })),
        ];
        let text = format_call_results(&calls);
        assert!(text.starts_with("IMPORTANT: Backend service is disconnected"));
        assert!(text.contains("API Call: list_datasets\nFound 0 datasets."));
        assert!(text.contains("because backend service is disconnected"));
        assert!(text.contains("Backend connected: No"));
    }

    #[test]
    fn test_format_lists_and_failures() {
        let calls = vec![
            CallRecord::success(
                call_names::LIST_DATASETS,
                json!({ "datasets": [{ "id": "d1", "name": "reviews", "records": 1200 }] }),
            ),
            CallRecord::failure(call_names::LIST_DEPLOYMENTS, "connection refused"),
            CallRecord::success("custom", json!({ "blob": "x".repeat(400) })),
        ];
        let text = format_call_results(&calls);
        assert!(text.contains("Dataset 1: reviews (ID: d1)\nRecords: 1200"));
        assert!(text.contains("API Call: list_deployments\nCall failed: connection refused"));
        let raw_line = text.lines().find(|l| l.starts_with("Result: ")).unwrap();
        assert_eq!(raw_line.len(), "Result: ".len() + 200 + 3);
    }

    #[test]
    fn test_fallback_ai_down() {
        let text = fallback_response(TaskType::DatasetManagement, &[status(false, true)]);
        assert!(text.starts_with("I'm currently unable to connect to the AI service"));
    }

    #[test]
    fn test_fallback_backend_down_inference_lists_models() {
        let calls = vec![
            status(true, false),
            CallRecord::success(
                call_names::LIST_AI_MODELS,
                json!({ "models": [{ "name": "llama2:7b" }, { "name": "phi3" }] }),
            ),
        ];
        let text = fallback_response(TaskType::ModelInference, &calls);
        assert!(text.contains("connection issues with the cloud backend"));
        assert!(text.ends_with("1. llama2:7b\n2. phi3\n"));
    }

    #[test]
    fn test_fallback_datasets() {
        let calls = vec![
            status(true, true),
            CallRecord::success(
                call_names::LIST_DATASETS,
                json!({ "datasets": [{ "name": "a" }, {}] }),
            ),
        ];
        assert_eq!(
            fallback_response(TaskType::DatasetManagement, &calls),
            "Here are your datasets:\n\n1. a\n2. Unnamed dataset\n"
        );
    }

    #[test]
    fn test_fallback_generic_caps_models() {
        let models: Vec<Value> = (0..7).map(|i| json!({ "name": format!("m{i}") })).collect();
        let calls = vec![CallRecord::success(
            call_names::LIST_AI_MODELS,
            json!({ "models": models }),
        )];
        let text = fallback_response(TaskType::Conversation, &calls);
        assert!(text.contains("- m4\n- And 2 more...\n"));
        assert!(!text.contains("m5"));
    }

    #[test]
    fn test_failed_status_call_reads_as_disconnected() {
        let calls = vec![CallRecord::failure(call_names::CHECK_SYSTEM_STATUS, "boom")];
        let text = fallback_response(TaskType::Conversation, &calls);
        assert!(text.contains("unable to connect to the AI service"));
    }
}
