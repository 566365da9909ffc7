//! Template Modification Engine
//!
//! Applies a ranked modification set to a static base template and produces
//! the generated artifact: code, stylesheet, script and the list of
//! modifications that actually influenced the result.
//!
//! # Passes
//!
//! ```text
//! theme  ->  layout  ->  a11y  ->  everything else
//! ```
//!
//! A named variation replaces the running code wholesale, so attribute
//! injection runs after the passes that can swap variations in.

mod builtin;
mod engine;
mod styles;
mod transforms;

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::mapping::UiModification;

pub use engine::{apply_modifications, TemplateEngine, TemplateRegistry};

/// Target ecosystem of a template
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// React component
    #[default]
    React,
    /// Next.js page or component
    #[serde(rename = "nextjs")]
    NextJs,
    /// Vue single-file component
    Vue,
    /// Angular component
    Angular,
    /// Plain HTML
    Html,
    /// Svelte component
    Svelte,
}

impl TemplateKind {
    /// Every kind, in declaration order
    pub const ALL: [TemplateKind; 6] = [
        Self::React,
        Self::NextJs,
        Self::Vue,
        Self::Angular,
        Self::Html,
        Self::Svelte,
    ];

    /// Lowercase label, e.g. `nextjs`
    pub fn label(&self) -> &'static str {
        match self {
            Self::React => "react",
            Self::NextJs => "nextjs",
            Self::Vue => "vue",
            Self::Angular => "angular",
            Self::Html => "html",
            Self::Svelte => "svelte",
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TemplateKind {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == wanted)
            .ok_or_else(|| TemplateError::UnknownKind(s.to_string()))
    }
}

/// Template lookup failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// No template with this name and kind is registered
    #[error("Template not found: {name} ({kind})")]
    NotFound {
        /// Requested name
        name: String,
        /// Requested kind
        kind: TemplateKind,
    },

    /// Kind label not recognised
    #[error("Unknown template kind: {0}")]
    UnknownKind(String),
}

/// Pre-built replacement for a template's bodies
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    /// Replacement code
    pub code: String,
    /// Replacement stylesheet; the running one is kept when absent
    pub style: Option<String>,
    /// Replacement script; the running one is kept when absent
    pub script: Option<String>,
}

impl Variation {
    /// Variation replacing only the code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            style: None,
            script: None,
        }
    }

    /// Also replace the stylesheet
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Also replace the script
    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }
}

/// Named base artifact with optional variations
///
/// Variations are keyed by modification signature: `dark-theme`,
/// `high-contrast`, `{device}-layout`, `{style}-style` or
/// `{modification}-{value}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Stable identifier, e.g. `react-card`
    pub id: String,
    /// Display name, matched case-insensitively
    pub name: String,
    /// One-line description
    pub description: String,
    /// Target ecosystem
    pub kind: TemplateKind,
    /// Base code
    pub code: String,
    /// Base stylesheet
    pub style: Option<String>,
    /// Base script
    pub script: Option<String>,
    /// Variations by signature
    pub variations: BTreeMap<String, Variation>,
}

impl Template {
    /// Template with just a code body
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: TemplateKind,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind,
            code: code.into(),
            style: None,
            script: None,
            variations: BTreeMap::new(),
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the base stylesheet
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Set the base script
    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Add a variation under `key`
    #[must_use]
    pub fn with_variation(mut self, key: impl Into<String>, variation: Variation) -> Self {
        self.variations.insert(key.into(), variation);
        self
    }

    /// Variation registered under `key`
    pub fn variation(&self, key: &str) -> Option<&Variation> {
        self.variations.get(key)
    }

    /// Whether this template answers to `name` and `kind`
    pub fn matches(&self, name: &str, kind: TemplateKind) -> bool {
        self.kind == kind && self.name.eq_ignore_ascii_case(name.trim())
    }

    /// Listing entry for this template
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind,
        }
    }
}

/// Listing entry for a registered template
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    /// Template id
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Target ecosystem
    #[serde(rename = "type")]
    pub kind: TemplateKind,
}

/// Output of applying modifications to a template
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Artifact identifier
    pub id: Uuid,
    /// Source template name
    pub name: String,
    /// Target ecosystem
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    /// Final code
    pub code: String,
    /// Final stylesheet, if any
    pub style: Option<String>,
    /// Final script, if any
    pub script: Option<String>,
    /// Modifications that changed the result, in application order
    pub applied_modifications: Vec<UiModification>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("React".parse::<TemplateKind>(), Ok(TemplateKind::React));
        assert_eq!(" nextjs ".parse::<TemplateKind>(), Ok(TemplateKind::NextJs));
        assert_eq!(
            "flutter".parse::<TemplateKind>(),
            Err(TemplateError::UnknownKind("flutter".into()))
        );
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&TemplateKind::NextJs).unwrap();
        assert_eq!(json, "\"nextjs\"");
        let kind: TemplateKind = serde_json::from_str("\"html\"").unwrap();
        assert_eq!(kind, TemplateKind::Html);
    }

    #[test]
    fn test_matches_ignores_case() {
        let t = Template::new("x", "Card", TemplateKind::React, "");
        assert!(t.matches("card", TemplateKind::React));
        assert!(t.matches(" CARD ", TemplateKind::React));
        assert!(!t.matches("card", TemplateKind::Vue));
    }

    #[test]
    fn test_not_found_message() {
        let err = TemplateError::NotFound {
            name: "Modal".into(),
            kind: TemplateKind::Vue,
        };
        assert_eq!(err.to_string(), "Template not found: Modal (vue)");
    }
}
