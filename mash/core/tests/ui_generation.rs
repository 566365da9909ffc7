//! Message to component generation over a scripted model

use mash_core::generation::{ComponentRequest, UiGenerator};
use mash_core::inference::GENERATE_PATH;
use mash_core::reasoning::ReasoningEngine;
use mash_core::templates::{TemplateError, TemplateKind};
use mash_core::test_utils::{scripted_client, ScriptedTransport};
use pretty_assertions::assert_eq;

const EXTRACT: &str = "UI requirement analyzer";

const DARK_AND_SCREEN_READER: &str = r#"[
    {"category": "user_preference", "value": "dark_mode", "priority": 8, "confidence": 0.9, "description": "prefers dark UI"},
    {"category": "accessibility", "value": "screen_reader", "priority": 9, "confidence": 0.85}
]"#;

fn generator(transport: &ScriptedTransport) -> UiGenerator {
    UiGenerator::new(ReasoningEngine::new(scripted_client(transport.clone())))
}

fn scripted() -> ScriptedTransport {
    // extraction prompts quote the user message, so they are matched first
    ScriptedTransport::new()
        .reply_when(EXTRACT, DARK_AND_SCREEN_READER)
        .with_default_reply("The user wants a card that works in the dark with a screen reader.")
}

#[tokio::test]
async fn dark_mode_and_screen_reader_adapt_the_card() {
    let transport = scripted();
    let generator = generator(&transport);

    let ui = generator
        .generate_from_message(
            "I use a screen reader and prefer dark mode",
            &ComponentRequest::default(),
        )
        .await
        .unwrap();

    assert_eq!(ui.artifacts.len(), 1);
    let artifact = &ui.artifacts[0].artifact;
    assert_eq!(artifact.name, "Card");
    assert_eq!(artifact.kind, TemplateKind::React);
    assert!(artifact.code.contains("card dark"));
    assert!(artifact.code.contains("tabIndex={0}"));

    let applied: Vec<(&str, &str)> = artifact
        .applied_modifications
        .iter()
        .map(|m| (m.modification.as_str(), m.value.as_str()))
        .collect();
    assert!(applied.contains(&("theme-mode", "dark")));
    assert!(applied.contains(&("aria", "true")));

    let priorities: Vec<u8> = ui.modifications.modifications.iter().map(|m| m.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(priorities, sorted);
    assert_eq!(ui.user_message, "I use a screen reader and prefer dark mode");
}

#[tokio::test]
async fn unknown_template_fails_before_inference() {
    let transport = scripted();
    let generator = generator(&transport);

    let err = generator
        .generate_from_message("anything", &ComponentRequest::new("Carousel", TemplateKind::Vue))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TemplateError::NotFound {
            name: "Carousel".into(),
            kind: TemplateKind::Vue,
        }
    );
    assert_eq!(transport.count(GENERATE_PATH), 0);
    assert!(generator.latest().is_none());
}

#[tokio::test]
async fn unknown_templates_are_skipped_from_thinking() {
    let transport = scripted();
    let client = scripted_client(transport.clone());
    let generator = UiGenerator::new(ReasoningEngine::new(client.clone()));
    let process = ReasoningEngine::new(client).think("dark card please", None).await;

    let ui = generator
        .generate_from_thinking(
            &process,
            &[
                ComponentRequest::new("Carousel", TemplateKind::Vue),
                ComponentRequest::new("page", TemplateKind::Html),
            ],
        )
        .await;

    let names: Vec<&str> = ui.artifacts.iter().map(|a| a.artifact.name.as_str()).collect();
    assert_eq!(names, vec!["Page"]);
    assert!(ui.artifacts[0].confidence > 0.0);
}

#[tokio::test]
async fn no_conditions_renders_the_base_template() {
    let transport = ScriptedTransport::new()
        .reply_when(EXTRACT, "[]")
        .with_default_reply("Nothing in particular was requested by the user here.");
    let generator = generator(&transport);

    let ui = generator
        .generate_from_message("show me a card", &ComponentRequest::default())
        .await
        .unwrap();

    assert!(ui.conditions.is_empty());
    assert!(ui.modifications.modifications.is_empty());
    let artifact = &ui.artifacts[0].artifact;
    assert!(artifact.applied_modifications.is_empty());
    assert!(!artifact.code.contains("card dark"));
}

#[tokio::test]
async fn results_are_remembered_in_order() {
    let transport = scripted();
    let generator = generator(&transport);

    let first = generator
        .generate_from_message("first", &ComponentRequest::default())
        .await
        .unwrap();
    let second = generator
        .generate_from_message("second", &ComponentRequest::default())
        .await
        .unwrap();

    assert_eq!(generator.latest().map(|ui| ui.id), Some(second.id));
    assert_eq!(generator.get(first.id).map(|ui| ui.user_message.clone()), Some("first".into()));
    let ids: Vec<_> = generator.all().iter().map(|ui| ui.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(!generator.available_templates().is_empty());
}

#[tokio::test]
async fn result_store_evicts_the_oldest_results() {
    let transport = scripted();
    let generator = generator(&transport).with_result_limit(1);

    let first = generator
        .generate_from_message("first", &ComponentRequest::default())
        .await
        .unwrap();
    let second = generator
        .generate_from_message("second", &ComponentRequest::default())
        .await
        .unwrap();

    assert!(generator.get(first.id).is_none());
    let ids: Vec<_> = generator.all().iter().map(|ui| ui.id).collect();
    assert_eq!(ids, vec![second.id]);
}
