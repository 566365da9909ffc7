//! Canned responses for degraded mode
//!
//! When the inference service is unreachable the client answers from here.
//! Every reply is a pure function of the prompt so runs stay reproducible.

use once_cell::sync::Lazy;
use regex::Regex;

static USER_MESSAGE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?:User Message|the user's request): "(.*?)""#).ok());

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hi there",
    "hello there",
    "greetings",
    "howdy",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Reply to a greeting while offline
pub const OFFLINE_GREETING: &str = "Hello! I'm running in offline mode right now because the AI service can't be reached, so my answers are limited. I can still show you what's available locally.";

/// Canned classification; resolves to a conversation task
pub const OFFLINE_CLASSIFICATION: &str =
    "This request is best handled as general conversation while the AI service is offline.";

/// Canned condition extraction: no conditions
pub const OFFLINE_CONDITIONS: &str = "[]";

/// Generic reply when nothing more specific applies
pub const OFFLINE_NOTICE: &str =
    "I'm currently unable to connect to the AI service. Please check your connection and try again.";

/// Whether `message` is one of the recognised greetings
pub fn is_greeting(message: &str) -> bool {
    let normalized = message.trim().to_lowercase();
    GREETINGS.contains(&normalized.as_str())
}

/// Quoted user message embedded in a composed prompt, if any
pub fn embedded_user_message(prompt: &str) -> Option<String> {
    USER_MESSAGE
        .as_ref()?
        .captures(prompt)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Deterministic reply for `prompt` while degraded
pub fn canned_response(prompt: &str) -> String {
    if prompt.contains("UI requirement analyzer") {
        return OFFLINE_CONDITIONS.to_string();
    }

    if prompt.contains("classify this request into one of these categories") {
        return OFFLINE_CLASSIFICATION.to_string();
    }

    let message = embedded_user_message(prompt);

    if prompt.trim_end().ends_with("Response:") {
        return match message {
            Some(m) if !m.is_empty() => format!(
                "I can't reach the AI service right now, so I couldn't fully process \"{m}\". {OFFLINE_NOTICE}"
            ),
            _ => OFFLINE_NOTICE.to_string(),
        };
    }

    let greeting = match &message {
        Some(m) => is_greeting(m),
        None => is_greeting(prompt),
    };
    if greeting {
        return OFFLINE_GREETING.to_string();
    }

    OFFLINE_NOTICE.to_string()
}
