//! Condition-driven UI generation
//!
//! Wires the pipeline end to end:
//!
//! ```text
//! message -> ReasoningEngine -> ConditionExtractor -> map_conditions -> TemplateEngine
//! ```
//!
//! Generated results are kept in memory so callers can fetch the latest one
//! or look one up by id.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::conditions::{ConditionExtractor, UiConditionSet};
use crate::mapping::{map_conditions, UiModificationSet};
use crate::reasoning::{confidence, ConfidenceProfile, ReasoningEngine, ThinkingProcess};
use crate::templates::{GeneratedArtifact, TemplateEngine, TemplateError, TemplateKind, TemplateSummary};

/// Default number of generated results kept in memory
pub const DEFAULT_RESULT_LIMIT: usize = 50;

/// Template to render
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentRequest {
    /// Template name, any case
    pub name: String,
    /// Template ecosystem
    pub kind: TemplateKind,
}

impl ComponentRequest {
    /// Request the template `name` of `kind`
    pub fn new(name: impl Into<String>, kind: TemplateKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl Default for ComponentRequest {
    fn default() -> Self {
        Self::new("Card", TemplateKind::React)
    }
}

/// An artifact and how plausible its code looks
#[derive(Clone, Debug, Serialize)]
pub struct ScoredArtifact {
    /// The artifact
    pub artifact: GeneratedArtifact,
    /// Code-shape confidence in [0, 1]
    pub confidence: f32,
}

/// Everything produced for one generation request
#[derive(Clone, Debug, Serialize)]
pub struct GeneratedUi {
    /// Result identifier
    pub id: Uuid,
    /// Message the conditions were drawn from
    pub user_message: String,
    /// Finalized conditions
    pub conditions: UiConditionSet,
    /// Ranked modifications derived from them
    pub modifications: UiModificationSet,
    /// One entry per template that resolved
    pub artifacts: Vec<ScoredArtifact>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Runs the generation pipeline and remembers its results
#[derive(Clone, Debug)]
pub struct UiGenerator {
    engine: ReasoningEngine,
    extractor: ConditionExtractor,
    templates: TemplateEngine,
    generated: Arc<RwLock<Vec<Arc<GeneratedUi>>>>,
    result_limit: usize,
}

impl UiGenerator {
    /// Generator over the built-in templates
    pub fn new(engine: ReasoningEngine) -> Self {
        Self::with_templates(engine, TemplateEngine::default())
    }

    /// Generator over a specific template engine
    pub fn with_templates(engine: ReasoningEngine, templates: TemplateEngine) -> Self {
        let extractor = ConditionExtractor::new(engine.client().clone());
        Self {
            engine,
            extractor,
            templates,
            generated: Arc::new(RwLock::new(Vec::new())),
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }

    /// Use a specific extractor, e.g. one bound to another model
    #[must_use]
    pub fn with_extractor(mut self, extractor: ConditionExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Keep at most `limit` results, evicting the oldest
    #[must_use]
    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    /// Reason about `message`, then render `request`
    ///
    /// The template is resolved before any inference so an unknown
    /// template fails fast.
    pub async fn generate_from_message(
        &self,
        message: &str,
        request: &ComponentRequest,
    ) -> Result<Arc<GeneratedUi>, TemplateError> {
        if self.templates.registry().find(&request.name, request.kind).is_none() {
            return Err(TemplateError::NotFound {
                name: request.name.clone(),
                kind: request.kind,
            });
        }

        let process = self.engine.think(message, None).await;
        Ok(self
            .generate_from_thinking(&process, std::slice::from_ref(request))
            .await)
    }

    /// Render every request against the conditions found in `process`
    ///
    /// Requests naming an unknown template are skipped.
    pub async fn generate_from_thinking(
        &self,
        process: &ThinkingProcess,
        requests: &[ComponentRequest],
    ) -> Arc<GeneratedUi> {
        let conditions = self.extractor.analyze(process).await;
        let modifications = map_conditions(&conditions);

        let artifacts = requests
            .iter()
            .filter_map(|request| {
                match self.templates.generate(&request.name, request.kind, &modifications) {
                    Ok(artifact) => {
                        let confidence = confidence(&artifact.code, ConfidenceProfile::Code);
                        Some(ScoredArtifact {
                            artifact,
                            confidence,
                        })
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping component");
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(
            conditions = conditions.len(),
            modifications = modifications.modifications.len(),
            artifacts = artifacts.len(),
            "UI generated"
        );

        let generated = Arc::new(GeneratedUi {
            id: Uuid::new_v4(),
            user_message: process.user_message.clone(),
            conditions,
            modifications,
            artifacts,
            created_at: Utc::now(),
        });
        let mut store = self.generated.write();
        store.push(Arc::clone(&generated));
        let excess = store.len().saturating_sub(self.result_limit);
        store.drain(..excess);
        drop(store);
        generated
    }

    /// Templates that can be requested
    pub fn available_templates(&self) -> Vec<TemplateSummary> {
        self.templates.available_templates()
    }

    /// Most recent result
    pub fn latest(&self) -> Option<Arc<GeneratedUi>> {
        self.generated.read().last().cloned()
    }

    /// Result with `id`
    pub fn get(&self, id: Uuid) -> Option<Arc<GeneratedUi>> {
        self.generated.read().iter().find(|ui| ui.id == id).cloned()
    }

    /// Every result, oldest first
    pub fn all(&self) -> Vec<Arc<GeneratedUi>> {
        self.generated.read().clone()
    }
}
