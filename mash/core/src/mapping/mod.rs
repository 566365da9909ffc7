//! Condition to Modification Mapper
//!
//! A pure function from conditions to ranked UI modifications. Each
//! condition category has a static rule table; a condition's lowercased
//! value is tested against every rule's keywords and each firing rule emits
//! its modifications at the condition's priority.
//!
//! No I/O, no clocks in the mapping itself, no shared state: the same
//! condition always yields the same modifications.

mod rules;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conditions::{UiCondition, UiConditionSet};

/// Broad area a modification touches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationKind {
    /// Accessibility
    A11y,
    /// Page structure and spacing
    Layout,
    /// Input handling
    Interaction,
    /// Textual content
    Content,
    /// Color scheme and contrast
    Theme,
    /// Motion
    Animation,
    /// Type sizes and readability
    Typography,
    /// General visual design
    Design,
    /// Brand style
    Branding,
    /// Loading and rendering cost
    Performance,
    /// Legacy environments
    Compatibility,
    /// Images, galleries, print
    Media,
}

impl ModificationKind {
    /// Lowercase label, e.g. `a11y`
    pub fn label(&self) -> &'static str {
        match self {
            Self::A11y => "a11y",
            Self::Layout => "layout",
            Self::Interaction => "interaction",
            Self::Content => "content",
            Self::Theme => "theme",
            Self::Animation => "animation",
            Self::Typography => "typography",
            Self::Design => "design",
            Self::Branding => "branding",
            Self::Performance => "performance",
            Self::Compatibility => "compatibility",
            Self::Media => "media",
        }
    }
}

impl std::fmt::Display for ModificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One concrete change derived from a condition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiModification {
    /// Area the change touches
    #[serde(rename = "type")]
    pub kind: ModificationKind,
    /// What it applies to, e.g. `images`
    pub target: String,
    /// Modification key, e.g. `theme-mode`
    pub modification: String,
    /// Modification value, e.g. `dark`
    pub value: String,
    /// Priority inherited from the condition
    pub priority: u8,
    /// Human-readable rationale
    pub reasoning: String,
}

impl UiModification {
    /// Build a modification
    pub fn new(
        kind: ModificationKind,
        target: impl Into<String>,
        modification: impl Into<String>,
        value: impl Into<String>,
        priority: u8,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            target: target.into(),
            modification: modification.into(),
            value: value.into(),
            priority,
            reasoning: reasoning.into(),
        }
    }

    /// Whether this is `modification = value`
    pub fn is(&self, modification: &str, value: &str) -> bool {
        self.modification == modification && self.value == value
    }
}

/// Ranked modifications plus the conditions that produced them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiModificationSet {
    /// Set identifier
    pub id: Uuid,
    /// Modifications, priority descending
    pub modifications: Vec<UiModification>,
    /// Conditions that contributed at least one modification
    pub applied_conditions: Vec<UiCondition>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl UiModificationSet {
    /// Set with nothing in it
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            modifications: Vec::new(),
            applied_conditions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Set holding `modifications` as given
    pub fn from_modifications(modifications: Vec<UiModification>) -> Self {
        Self {
            modifications,
            ..Self::empty()
        }
    }

    /// Whether there is nothing to apply
    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }
}

/// Modifications for one condition, in rule-table order
pub fn map_condition(condition: &UiCondition) -> Vec<UiModification> {
    let value = condition.value.to_lowercase();

    rules::chains_for(condition.category)
        .iter()
        .flat_map(|chain| chain.fire(&value))
        .map(|spec| {
            UiModification::new(
                spec.kind,
                spec.target,
                spec.modification,
                spec.value,
                condition.priority,
                spec.reasoning,
            )
        })
        .collect()
}

/// Map every condition and rank the result
///
/// Conditions that map to nothing are left out of `applied_conditions`.
/// The only ordering guarantee is priority descending, stable on ties.
pub fn map_conditions(set: &UiConditionSet) -> UiModificationSet {
    let mut result = UiModificationSet::empty();

    for condition in &set.conditions {
        let modifications = map_condition(condition);
        if modifications.is_empty() {
            tracing::debug!(
                category = %condition.category,
                value = %condition.value,
                "Condition produced no modifications"
            );
            continue;
        }
        result.modifications.extend(modifications);
        result.applied_conditions.push(condition.clone());
    }

    result
        .modifications
        .sort_by(|a, b| b.priority.cmp(&a.priority));
    result
}
