//! Condition Extractor
//!
//! Asks the model to describe UI requirements as a JSON array, then parses,
//! validates, merges and filters what comes back. The model is untrusted:
//! malformed output shrinks the result and never fails the request.

mod extractor;
mod merge;
mod parse;
mod types;

pub use extractor::ConditionExtractor;
pub use merge::{finalize_conditions, merge_conditions, CONFIDENCE_THRESHOLD};
pub use parse::{
    find_condition_array, parse_conditions, valid_conditions, validate_condition,
    ParsedCondition,
};
pub use types::{ConditionCategory, UiCondition, UiConditionSet};
