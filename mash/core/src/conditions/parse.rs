//! Permissive parsing of model output into conditions
//!
//! Model output is untrusted prose that may contain a JSON array somewhere
//! in the middle. Locating the array is fuzzy; validating each element is
//! strict. Nothing here returns an error: unusable input yields fewer
//! conditions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::types::{ConditionCategory, UiCondition};

static ARRAY_START: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\[\s*\{").ok());

/// Outcome of validating one candidate object
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedCondition {
    /// A well-formed condition
    Valid(UiCondition),
    /// Dropped, with the reason
    Invalid {
        /// What was wrong
        reason: String,
    },
}

/// Length of the bracket-balanced region starting at `text[0]`
///
/// Brackets inside JSON strings are ignored.
fn balanced_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// First balanced `[ { ... } ]` region of `text` that parses as a JSON array
pub fn find_condition_array(text: &str) -> Option<&str> {
    let start_pattern = ARRAY_START.as_ref()?;

    start_pattern.find_iter(text).find_map(|m| {
        let candidate = &text[m.start()..];
        let len = balanced_len(candidate)?;
        let slice = &candidate[..len];
        serde_json::from_str::<Vec<Value>>(slice).ok().map(|_| slice)
    })
}

/// Validate one candidate object
pub fn validate_condition(value: &Value) -> ParsedCondition {
    let invalid = |reason: &str| ParsedCondition::Invalid {
        reason: reason.to_string(),
    };

    let Some(object) = value.as_object() else {
        return invalid("not an object");
    };
    let Some(category) = object.get("category").and_then(Value::as_str) else {
        return invalid("category must be a string");
    };
    let Some(text) = object.get("value").and_then(Value::as_str) else {
        return invalid("value must be a string");
    };
    let Some(priority) = object.get("priority").and_then(Value::as_f64) else {
        return invalid("priority must be a number");
    };
    let Some(confidence) = object.get("confidence").and_then(Value::as_f64) else {
        return invalid("confidence must be a number");
    };

    let mut condition = UiCondition::new(
        ConditionCategory::from_label(category),
        text,
        priority.clamp(1.0, 10.0).round() as u8,
        confidence.clamp(0.0, 1.0) as f32,
    );
    condition.description = object
        .get("description")
        .and_then(Value::as_str)
        .map(String::from);

    ParsedCondition::Valid(condition)
}

/// Parse every candidate in `text`
pub fn parse_conditions(text: &str) -> Vec<ParsedCondition> {
    let Some(array) = find_condition_array(text) else {
        return Vec::new();
    };
    let Ok(items) = serde_json::from_str::<Vec<Value>>(array) else {
        return Vec::new();
    };
    items.iter().map(validate_condition).collect()
}

/// Valid conditions in `text`, invalid ones dropped
pub fn valid_conditions(text: &str) -> Vec<UiCondition> {
    parse_conditions(text)
        .into_iter()
        .filter_map(|parsed| match parsed {
            ParsedCondition::Valid(condition) => Some(condition),
            ParsedCondition::Invalid { reason } => {
                tracing::debug!(reason, "Dropping invalid condition");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_finds_array_in_prose() {
        let text = r#"Sure! Here you go:
[
  {"category": "user_preference", "value": "dark_mode", "priority": 8, "confidence": 0.9}
]
Hope that helps [really]."#;
        let array = find_condition_array(text).unwrap();
        assert!(array.starts_with('['));
        assert!(array.ends_with(']'));
        assert!(!array.contains("really"));
    }

    #[test]
    fn test_brackets_inside_strings() {
        let text = r#"[{"category":"a","value":"x]","priority":1,"confidence":1,"description":"{not [closed"}] tail ]"#;
        let array = find_condition_array(text).unwrap();
        assert!(array.ends_with("closed\"}]"));
    }

    #[test]
    fn test_no_array() {
        assert_eq!(find_condition_array("nothing here"), None);
        assert_eq!(find_condition_array("[1, 2, 3]"), None);
        assert_eq!(find_condition_array("[{ unterminated"), None);
        assert!(parse_conditions("[]").is_empty());
    }

    #[test]
    fn test_skips_unparseable_candidate() {
        let text = r#"[{bad}] then [{"category":"device","value":"tv","priority":3,"confidence":0.7}]"#;
        let conditions = valid_conditions(text);
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].category, ConditionCategory::DeviceType);
    }

    #[test]
    fn test_validation() {
        let ok = validate_condition(&json!({
            "category": "brand", "value": "modern", "priority": 14.2, "confidence": 1.3,
            "description": "startup"
        }));
        match ok {
            ParsedCondition::Valid(c) => {
                assert_eq!(c.category, ConditionCategory::BrandingStyle);
                assert_eq!(c.priority, 10);
                assert_eq!(c.confidence, 1.0);
                assert_eq!(c.description.as_deref(), Some("startup"));
            }
            other => panic!("expected valid, got {other:?}"),
        }

        let missing = validate_condition(&json!({ "category": "x", "value": "y", "priority": 2 }));
        assert!(matches!(missing, ParsedCondition::Invalid { .. }));

        let wrong_type = validate_condition(&json!({
            "category": "x", "value": 3, "priority": 2, "confidence": 0.5
        }));
        assert!(matches!(wrong_type, ParsedCondition::Invalid { .. }));

        assert!(matches!(validate_condition(&json!("str")), ParsedCondition::Invalid { .. }));
    }

    #[test]
    fn test_mixed_validity() {
        let text = r#"[
            {"category": "accessibility", "value": "screen_reader", "priority": 9, "confidence": 0.95},
            {"category": "accessibility", "priority": 9, "confidence": 0.95},
            {"category": "mystery", "value": "pastel", "priority": 0, "confidence": 0.5}
        ]"#;
        let parsed = parse_conditions(text);
        assert_eq!(parsed.len(), 3);

        let valid = valid_conditions(text);
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[1].category, ConditionCategory::UserPreference);
        assert_eq!(valid[1].priority, 1);
    }
}
