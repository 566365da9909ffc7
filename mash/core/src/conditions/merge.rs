//! Merging and finalizing extracted conditions

use super::types::UiCondition;

/// Conditions at or below this confidence are discarded
pub const CONFIDENCE_THRESHOLD: f32 = 0.4;

fn description_len(description: &Option<String>) -> usize {
    description.as_ref().map_or(0, |d| d.chars().count())
}

/// Merge `source` into `target` by `(category, value)`
///
/// On collision the higher priority and higher confidence win, and the
/// longer description is kept.
pub fn merge_conditions(target: &mut Vec<UiCondition>, source: &[UiCondition]) {
    for incoming in source {
        match target
            .iter_mut()
            .find(|existing| existing.identity() == incoming.identity())
        {
            Some(existing) => {
                existing.priority = existing.priority.max(incoming.priority);
                existing.confidence = existing.confidence.max(incoming.confidence);
                if description_len(&incoming.description) > description_len(&existing.description) {
                    existing.description = incoming.description.clone();
                }
            }
            None => target.push(incoming.clone()),
        }
    }
}

/// Drop low-confidence conditions and sort by priority, highest first
///
/// The sort is stable: equal priorities keep their encounter order.
pub fn finalize_conditions(mut conditions: Vec<UiCondition>) -> Vec<UiCondition> {
    conditions.retain(|c| c.confidence > CONFIDENCE_THRESHOLD);
    conditions.sort_by(|a, b| b.priority.cmp(&a.priority));
    conditions
}
