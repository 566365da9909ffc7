//! Condition types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed set of condition categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCategory {
    /// Screen readers, color blindness, motor or vision needs
    Accessibility,
    /// Mobile, tablet, desktop, TV, wearable
    DeviceType,
    /// Dark mode, large text, density and similar
    UserPreference,
    /// Visual brand style
    BrandingStyle,
    /// Bandwidth, hardware and offline constraints
    PerformanceNeeds,
    /// Old browsers, no JavaScript, print
    LegacySupport,
    /// Data, text or media heavy content
    ContentDensity,
}

impl ConditionCategory {
    /// All categories in declaration order
    pub const ALL: [ConditionCategory; 7] = [
        Self::Accessibility,
        Self::DeviceType,
        Self::UserPreference,
        Self::BrandingStyle,
        Self::PerformanceNeeds,
        Self::LegacySupport,
        Self::ContentDensity,
    ];

    /// Map a free-form label onto a category by substring
    ///
    /// Unrecognised labels become [`ConditionCategory::UserPreference`].
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("access") {
            Self::Accessibility
        } else if label.contains("device") {
            Self::DeviceType
        } else if label.contains("preference") {
            Self::UserPreference
        } else if label.contains("brand") {
            Self::BrandingStyle
        } else if label.contains("performance") {
            Self::PerformanceNeeds
        } else if label.contains("legacy") {
            Self::LegacySupport
        } else if label.contains("content") || label.contains("density") {
            Self::ContentDensity
        } else {
            Self::UserPreference
        }
    }

    /// Stable snake_case label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accessibility => "accessibility",
            Self::DeviceType => "device_type",
            Self::UserPreference => "user_preference",
            Self::BrandingStyle => "branding_style",
            Self::PerformanceNeeds => "performance_needs",
            Self::LegacySupport => "legacy_support",
            Self::ContentDensity => "content_density",
        }
    }
}

impl std::fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A typed requirement that should shape generated UI
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiCondition {
    /// Category
    pub category: ConditionCategory,
    /// Free-text value, e.g. `dark_mode`
    pub value: String,
    /// Priority in `[1, 10]`
    pub priority: u8,
    /// Confidence in `[0, 1]`
    pub confidence: f32,
    /// Why the condition applies
    pub description: Option<String>,
}

impl UiCondition {
    /// Build a condition, clamping priority and confidence into range
    pub fn new(
        category: ConditionCategory,
        value: impl Into<String>,
        priority: u8,
        confidence: f32,
    ) -> Self {
        Self {
            category,
            value: value.into(),
            priority: priority.clamp(1, 10),
            confidence: confidence.clamp(0.0, 1.0),
            description: None,
        }
    }

    /// Attach a description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Deduplication identity
    pub fn identity(&self) -> (ConditionCategory, &str) {
        (self.category, self.value.as_str())
    }
}

/// Finalized conditions for one generation request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiConditionSet {
    /// Set identifier
    pub id: Uuid,
    /// Unique conditions, priority descending
    pub conditions: Vec<UiCondition>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Message the conditions were extracted from
    pub extracted_from: Option<String>,
}

impl UiConditionSet {
    /// Set with no conditions
    pub fn empty(extracted_from: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conditions: Vec::new(),
            created_at: Utc::now(),
            extracted_from,
        }
    }

    /// Finalize `conditions` into a set
    pub fn from_conditions(conditions: Vec<UiCondition>, extracted_from: Option<String>) -> Self {
        Self {
            conditions: super::merge::finalize_conditions(conditions),
            ..Self::empty(extracted_from)
        }
    }

    /// Whether no condition survived
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }
}
