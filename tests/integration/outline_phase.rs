//! Outline workflow: phase detection and clarification replies.

use super::support::{orchestrator, ScriptedGateway};
use kcl_compose::outline::TurnRole;
use kcl_compose::{
    ComposeAction, ConversationTurn, GenerateRequest, GenerationContext, OutlinePhase,
    OutlinePhaseDetector, MAX_RETRIES,
};

const OUTLINE: &str = "Here is a plan.\n\n## Proposed Outline\n\n\
1. **Title** - Company overview\n\
2. **Problem** - What customers struggle with\n\
3. **Traction** - Revenue and growth\n\nShall I go ahead?";

const FRAME: &str = "<kcl-slide><kcl-text level=\"h1\">Title</kcl-text></kcl-slide>";

fn history_with_outline() -> Vec<ConversationTurn> {
    vec![
        ConversationTurn::user("Build a seed pitch deck"),
        ConversationTurn::assistant(OUTLINE),
    ]
}

fn phase(history: &[ConversationTurn], prompt: &str) -> OutlinePhase {
    OutlinePhaseDetector::default().detect(history, prompt).phase
}

#[test]
fn test_conversation_phases_follow_the_reply() {
    let history = history_with_outline();
    assert_eq!(phase(&[], "Build a seed pitch deck"), OutlinePhase::NeedsOutline);
    assert_eq!(phase(&history, "Looks good, go ahead"), OutlinePhase::OutlineConfirmed);
    assert_eq!(
        phase(&history, "Change slide 2 to focus on pricing"),
        OutlinePhase::OutlineRevision
    );
    assert_eq!(phase(&history, "yes but add a team slide"), OutlinePhase::OutlineRevision);
    assert_eq!(phase(&history, "skip the outline"), OutlinePhase::SkipOutline);
}

#[test]
fn test_confirmed_phase_returns_the_latest_outline() {
    let mut history = history_with_outline();
    history.push(ConversationTurn::user("rename slide 3"));
    let revised = OUTLINE.replace("Traction", "Momentum");
    history.push(ConversationTurn::assistant(revised.clone()));

    let result = OutlinePhaseDetector::default().detect(&history, "perfect");
    assert_eq!(result.phase, OutlinePhase::OutlineConfirmed);
    assert_eq!(result.confirmed_outline_text.as_deref(), Some(revised.as_str()));
    assert!(result.previous_outline_text.is_none());
}

#[test]
fn test_history_deserializes_from_json() {
    let json = r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]"#;
    let turns: Vec<ConversationTurn> = serde_json::from_str(json).unwrap();
    assert_eq!(turns[1].role, TurnRole::Assistant);
}

#[tokio::test]
async fn test_outline_proposal_comes_back_as_clarification() {
    let gateway = ScriptedGateway::new(&[OUTLINE]);
    let request = GenerateRequest::new(ComposeAction::Generate, "Build a seed pitch deck")
        .allow_clarification(true);
    let result = orchestrator(gateway.clone())
        .generate(&GenerationContext::new("deck-1"), &request)
        .await
        .unwrap();

    assert_eq!(gateway.call_count(), 1);
    assert!(result.is_clarification);
    assert!(result.frames.is_empty());
    assert!(result.validation.valid);
    assert_eq!(result.retries_used, 0);
    assert_eq!(result.is_outline, Some(true));
    assert_eq!(result.outline_phase, Some(OutlinePhase::NeedsOutline));
    assert!(result.clarification_message.unwrap().contains("## Proposed Outline"));
    assert!(gateway.calls()[0].system_prompt.contains("## Outline first"));
}

#[tokio::test]
async fn test_confirmed_outline_is_handed_to_the_model() {
    let gateway = ScriptedGateway::new(&[FRAME]);
    let context = GenerationContext::new("deck-1").with_history(history_with_outline());
    let request = GenerateRequest::new(ComposeAction::Generate, "looks great").allow_clarification(true);
    let result = orchestrator(gateway.clone())
        .generate(&context, &request)
        .await
        .unwrap();

    assert!(!result.is_clarification);
    assert_eq!(result.outline_phase, Some(OutlinePhase::OutlineConfirmed));
    let system = &gateway.calls()[0].system_prompt;
    assert!(system.contains("The user approved this outline"));
    assert!(system.contains("2. **Problem**"));
}

#[tokio::test]
async fn test_plain_question_is_a_non_outline_clarification() {
    let gateway = ScriptedGateway::new(&["Who is the audience for this deck?"]);
    let request = GenerateRequest::new(ComposeAction::Generate, "skip outline, make a deck")
        .allow_clarification(true);
    let result = orchestrator(gateway)
        .generate(&GenerationContext::new("deck-1"), &request)
        .await
        .unwrap();

    assert!(result.is_clarification);
    assert_eq!(result.is_outline, Some(false));
    assert_eq!(result.outline_phase, Some(OutlinePhase::SkipOutline));
}

#[tokio::test]
async fn test_clarification_disallowed_means_text_is_parsed_as_a_frame() {
    let gateway = ScriptedGateway::new(&["Who is the audience?"]);
    let result = orchestrator(gateway.clone())
        .generate(
            &GenerationContext::new("deck-1"),
            &GenerateRequest::new(ComposeAction::Generate, "make a deck"),
        )
        .await
        .unwrap();

    assert!(!result.is_clarification);
    assert!(result.outline_phase.is_none());
    assert!(!result.validation.valid);
    assert_eq!(gateway.call_count(), 3);
}

#[tokio::test]
async fn test_clarification_is_only_accepted_on_the_first_attempt() {
    let invalid = "<kcl-slide><kcl-foo></kcl-foo></kcl-slide>";
    let gateway = ScriptedGateway::new(&[invalid, "Could you tell me more about the audience?"]);
    let request = GenerateRequest::new(ComposeAction::Generate, "skip the outline, make a deck")
        .allow_clarification(true);
    let result = orchestrator(gateway.clone())
        .generate(&GenerationContext::new("deck-1"), &request)
        .await
        .unwrap();

    assert!(!result.is_clarification);
    assert!(result.clarification_message.is_none());
    assert_eq!(result.retries_used, MAX_RETRIES);
    assert_eq!(gateway.call_count(), MAX_RETRIES + 1);
    assert_eq!(result.frames.len(), 1);
    assert!(!result.validation.valid);
}
