use std::sync::Arc;

use uuid::Uuid;

use super::{builtin, styles, transforms};
use super::{GeneratedArtifact, Template, TemplateError, TemplateKind, TemplateSummary, Variation};
use crate::mapping::{ModificationKind, UiModification, UiModificationSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    Theme,
    Layout,
    Accessibility,
    Other,
}

impl Pass {
    const ORDER: [Pass; 4] = [Self::Theme, Self::Layout, Self::Accessibility, Self::Other];

    fn of(modification: &UiModification) -> Self {
        if modification.kind == ModificationKind::Theme || modification.is("contrast", "high") {
            return Self::Theme;
        }
        match modification.kind {
            ModificationKind::Layout => Self::Layout,
            ModificationKind::A11y => Self::Accessibility,
            _ => Self::Other,
        }
    }
}

/// Variation key by naming convention, before `{modification}-{value}`
fn conventional_key(modification: &UiModification) -> Option<String> {
    match (modification.modification.as_str(), modification.value.as_str()) {
        ("theme-mode", mode) => Some(format!("{mode}-theme")),
        ("contrast", "high") => Some("high-contrast".to_string()),
        ("layout-type", layout) => Some(format!("{layout}-layout")),
        ("visual-style", style) => Some(format!("{style}-style")),
        _ => None,
    }
}

fn find_variation<'t>(template: &'t Template, modification: &UiModification) -> Option<&'t Variation> {
    conventional_key(modification)
        .and_then(|key| template.variation(&key))
        .or_else(|| {
            template.variation(&format!("{}-{}", modification.modification, modification.value))
        })
}

/// Running result while passes are applied
struct Draft {
    code: String,
    style: String,
    script: String,
}

impl Draft {
    fn from_template(template: &Template) -> Self {
        Self {
            code: template.code.clone(),
            style: template.style.clone().unwrap_or_default(),
            script: template.script.clone().unwrap_or_default(),
        }
    }

    fn replace_with(&mut self, variation: &Variation) {
        self.code = variation.code.clone();
        if let Some(style) = &variation.style {
            self.style = style.clone();
        }
        if let Some(script) = &variation.script {
            self.script = script.clone();
        }
    }

    fn append_style(&mut self, block: &str) -> bool {
        self.style = styles::append(&self.style, block);
        true
    }

    fn rewrite_code(&mut self, f: fn(&str) -> String) -> bool {
        self.code = f(&self.code);
        true
    }

    /// Apply one modification; false when nothing handles it
    fn apply(&mut self, template: &Template, pass: Pass, m: &UiModification) -> bool {
        if let Some(variation) = find_variation(template, m) {
            self.replace_with(variation);
            return true;
        }

        match pass {
            Pass::Theme => self.apply_theme(m),
            Pass::Layout => self.apply_layout(m),
            Pass::Accessibility => self.apply_accessibility(m),
            Pass::Other => self.apply_other(m),
        }
    }

    fn apply_theme(&mut self, m: &UiModification) -> bool {
        if m.is("theme-mode", "dark") {
            return self.append_style(styles::DARK_THEME);
        }
        if m.is("contrast", "high") {
            return self.append_style(styles::HIGH_CONTRAST);
        }
        false
    }

    fn apply_layout(&mut self, m: &UiModification) -> bool {
        match (m.modification.as_str(), m.value.as_str()) {
            ("layout-type", "mobile-first") => self.append_style(styles::MOBILE_FIRST),
            ("spacing", "generous") => self.append_style(styles::GENEROUS_SPACING),
            ("spacing", "compact") => self.append_style(styles::COMPACT_SPACING),
            ("content-density", "high") => self.append_style(styles::HIGH_DENSITY),
            _ => false,
        }
    }

    fn apply_accessibility(&mut self, m: &UiModification) -> bool {
        match (m.modification.as_str(), m.value.as_str()) {
            ("aria", "true") => self.rewrite_code(transforms::add_aria_attributes),
            ("alt-text", "required") => self.rewrite_code(transforms::ensure_image_alt_text),
            ("keyboard-nav", "enhanced") => self.rewrite_code(transforms::add_keyboard_navigation),
            _ => false,
        }
    }

    fn apply_other(&mut self, m: &UiModification) -> bool {
        let media = matches!(m.kind, ModificationKind::Performance | ModificationKind::Media);
        if media && m.is("lazy-loading", "true") {
            return self.rewrite_code(transforms::add_lazy_loading);
        }
        if m.kind == ModificationKind::Performance && m.is("image-optimization", "aggressive") {
            return self.rewrite_code(transforms::add_image_dimensions);
        }
        false
    }

    fn finish(self, template: &Template, applied: Vec<UiModification>) -> GeneratedArtifact {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        GeneratedArtifact {
            id: Uuid::new_v4(),
            name: template.name.clone(),
            kind: template.kind,
            code: self.code,
            style: non_empty(self.style),
            script: non_empty(self.script),
            applied_modifications: applied,
        }
    }
}

/// Apply `set` to `template` in theme, layout, accessibility, other order
///
/// The template is only read. Modifications nothing handles are dropped and
/// left out of `applied_modifications`.
pub fn apply_modifications(template: &Template, set: &UiModificationSet) -> GeneratedArtifact {
    let mut draft = Draft::from_template(template);
    let mut applied = Vec::new();

    for pass in Pass::ORDER {
        for m in set.modifications.iter().filter(|m| Pass::of(m) == pass) {
            if draft.apply(template, pass, m) {
                applied.push(m.clone());
            } else {
                tracing::trace!(
                    template = %template.name,
                    modification = %m.modification,
                    value = %m.value,
                    "No handler for modification, dropped"
                );
            }
        }
    }

    tracing::debug!(
        template = %template.name,
        kind = %template.kind,
        requested = set.modifications.len(),
        applied = applied.len(),
        "Applied modifications to template"
    );

    draft.finish(template, applied)
}

/// Read-only set of templates, built once at startup
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

impl TemplateRegistry {
    /// Registry with no templates
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in templates
    pub fn builtin() -> Self {
        Self {
            templates: builtin::templates(),
        }
    }

    /// Add a template; lookups return the first one registered under a
    /// given name and kind
    #[must_use]
    pub fn with_template(mut self, template: Template) -> Self {
        self.templates.push(template);
        self
    }

    /// Template named `name` (any case) of `kind`
    pub fn find(&self, name: &str, kind: TemplateKind) -> Option<&Template> {
        self.templates.iter().find(|t| t.matches(name, kind))
    }

    /// All registered templates
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Listing entries in registration order
    pub fn summaries(&self) -> Vec<TemplateSummary> {
        self.templates.iter().map(Template::summary).collect()
    }
}

/// Generates artifacts from a shared registry
#[derive(Clone, Debug)]
pub struct TemplateEngine {
    registry: Arc<TemplateRegistry>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(TemplateRegistry::builtin())
    }
}

impl TemplateEngine {
    /// Engine over `registry`
    pub fn new(registry: TemplateRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Engine sharing an existing registry
    pub fn shared(registry: Arc<TemplateRegistry>) -> Self {
        Self { registry }
    }

    /// The registry
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Apply `set` to the template named `name` of `kind`
    pub fn generate(
        &self,
        name: &str,
        kind: TemplateKind,
        set: &UiModificationSet,
    ) -> Result<GeneratedArtifact, TemplateError> {
        let template = self
            .registry
            .find(name, kind)
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
                kind,
            })?;
        Ok(apply_modifications(template, set))
    }

    /// Listing of every template
    pub fn available_templates(&self) -> Vec<TemplateSummary> {
        self.registry.summaries()
    }
}
