//! Confidence heuristics
//!
//! Confidence is a deterministic function of the shape of model output, not
//! a measure of whether the output is right.

/// Which heuristic to score text with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfidenceProfile {
    /// Free-form reasoning text
    #[default]
    Reasoning,
    /// Generated source code
    Code,
}

/// Score `text` in `[0, 1]`
pub fn confidence(text: &str, profile: ConfidenceProfile) -> f32 {
    let length = text.chars().count();

    if length < 50 {
        return 0.3;
    }
    if length < 200 {
        return 0.6;
    }

    match profile {
        ConfidenceProfile::Reasoning => 0.9,
        ConfidenceProfile::Code => {
            if text.contains("```") && length > 500 {
                0.9
            } else if text.contains("import ") && text.contains("export ") {
                0.8
            } else {
                0.6
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_thresholds() {
        assert_eq!(confidence("", ConfidenceProfile::Reasoning), 0.3);
        assert_eq!(confidence(&"a".repeat(49), ConfidenceProfile::Reasoning), 0.3);
        assert_eq!(confidence(&"a".repeat(50), ConfidenceProfile::Reasoning), 0.6);
        assert_eq!(confidence(&"a".repeat(199), ConfidenceProfile::Code), 0.6);
        assert_eq!(confidence(&"a".repeat(200), ConfidenceProfile::Reasoning), 0.9);
    }

    #[test]
    fn test_code_markers() {
        let fenced = format!("```tsx\n{}\n```", "x".repeat(600));
        assert_eq!(confidence(&fenced, ConfidenceProfile::Code), 0.9);

        let module = format!("import React from 'react';\n{}\nexport default Card;", "x".repeat(200));
        assert_eq!(confidence(&module, ConfidenceProfile::Code), 0.8);

        assert_eq!(confidence(&"y".repeat(300), ConfidenceProfile::Code), 0.6);
    }

    #[test]
    fn test_always_in_unit_range() {
        for len in [0, 10, 49, 50, 120, 199, 200, 501, 5000] {
            for profile in [ConfidenceProfile::Reasoning, ConfidenceProfile::Code] {
                let c = confidence(&"z".repeat(len), profile);
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }
}
