//! End-to-end behavior of the generate, validate and retry loop.

use super::support::{orchestrator, FailingGateway, ScriptedGateway};
use kcl_compose::error::ApiError;
use kcl_compose::generation::ResponseCallback;
use kcl_compose::validation::IssueKind;
use kcl_compose::{ComposeAction, GenerateRequest, GenerationContext, MAX_RETRIES};
use parking_lot::Mutex;
use std::sync::Arc;

const VALID: &str = r#"<kcl-slide>
  <kcl-text level="h1">Q3 Results</kcl-text>
  <kcl-metric value="42%" label="Growth"></kcl-metric>
</kcl-slide>"#;

const UNKNOWN_TAG: &str = "<kcl-slide><kcl-foo>x</kcl-foo></kcl-slide>";

fn context() -> GenerationContext {
    GenerationContext::new("deck-1")
}

#[tokio::test]
async fn test_valid_first_response_needs_no_retry() {
    let gateway = ScriptedGateway::new(&[VALID]);
    let result = orchestrator(gateway.clone())
        .generate(&context(), &GenerateRequest::new(ComposeAction::Generate, "Q3 results"))
        .await
        .unwrap();

    assert_eq!(gateway.call_count(), 1);
    assert_eq!(result.retries_used, 0);
    assert!(result.validation.valid);
    assert_eq!(result.frames.len(), 1);
    assert_eq!(result.frames[0].title.as_deref(), Some("Q3 Results"));
    assert!(!result.is_clarification);
    assert_eq!(result.provider, "scripted");
}

#[tokio::test]
async fn test_persistent_errors_stop_after_retry_budget() {
    let gateway = ScriptedGateway::new(&[UNKNOWN_TAG]);
    let result = orchestrator(gateway.clone())
        .generate(&context(), &GenerateRequest::new(ComposeAction::Generate, "a slide"))
        .await
        .unwrap();

    assert_eq!(gateway.call_count(), MAX_RETRIES + 1);
    assert_eq!(result.retries_used, MAX_RETRIES);
    assert!(!result.validation.valid);
    assert_eq!(result.frames.len(), 1);
    assert!(result.validation.has_kind(IssueKind::InvalidTag));
}

#[tokio::test]
async fn test_retry_prompt_carries_previous_errors() {
    let gateway = ScriptedGateway::new(&[UNKNOWN_TAG, VALID]);
    let result = orchestrator(gateway.clone())
        .generate(&context(), &GenerateRequest::new(ComposeAction::Generate, "a slide"))
        .await
        .unwrap();

    assert_eq!(result.retries_used, 1);
    assert!(result.validation.valid);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    assert!(!calls[0].prompt.contains("RETRY"));
    assert!(calls[1].prompt.contains("RETRY 1:"));
    assert!(calls[1].prompt.contains("Frame 1: Unknown component <kcl-foo>"));
    assert!(calls[1].system_prompt.contains("This is retry 1"));
}

#[tokio::test]
async fn test_warnings_alone_never_trigger_a_retry() {
    let missing_alt = "<kcl-slide><kcl-image src=\"a.png\"></kcl-image></kcl-slide>";
    let gateway = ScriptedGateway::new(&[missing_alt]);
    let result = orchestrator(gateway.clone())
        .generate(&context(), &GenerateRequest::new(ComposeAction::Generate, "photo"))
        .await
        .unwrap();

    assert_eq!(gateway.call_count(), 1);
    assert!(result.validation.valid);
    assert_eq!(result.validation.warnings.len(), 1);
    assert_eq!(result.validation.warnings[0].kind, IssueKind::MissingAlt);
}

#[tokio::test]
async fn test_callback_sees_every_attempt_in_order() {
    let seen: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: ResponseCallback = Arc::new(move |attempt: usize, text: &str| {
        sink.lock().push((attempt, text.to_string()));
    });

    let gateway = ScriptedGateway::new(&[UNKNOWN_TAG, UNKNOWN_TAG, VALID]);
    let request = GenerateRequest::new(ComposeAction::Generate, "a slide").on_response(callback);
    let result = orchestrator(gateway)
        .generate(&context(), &request)
        .await
        .unwrap();

    assert!(result.validation.valid);
    let seen = seen.lock();
    let attempts: Vec<usize> = seen.iter().map(|(attempt, _)| *attempt).collect();
    assert_eq!(attempts, vec![0, 1, 2]);
    assert_eq!(seen[2].1, VALID);
}

#[tokio::test]
async fn test_empty_response_is_a_blocking_parse_error() {
    let gateway = ScriptedGateway::new(&[""]);
    let result = orchestrator(gateway.clone())
        .generate(&context(), &GenerateRequest::new(ComposeAction::Generate, "a slide"))
        .await
        .unwrap();

    assert_eq!(gateway.call_count(), MAX_RETRIES + 1);
    assert!(result.frames.is_empty());
    assert!(!result.is_clarification);
    assert!(!result.validation.valid);
    assert!(result.validation.has_kind(IssueKind::ParseError));
}

#[tokio::test]
async fn test_edit_requires_existing_code() {
    let gateway = ScriptedGateway::new(&[VALID]);
    let result = orchestrator(gateway.clone())
        .generate(&context(), &GenerateRequest::new(ComposeAction::Edit, "shorter"))
        .await;

    assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_style_sends_existing_code_to_the_model() {
    let gateway = ScriptedGateway::new(&[VALID]);
    let request = GenerateRequest::new(ComposeAction::Style, "make it bolder")
        .with_existing_code("<kcl-slide><kcl-text>Old</kcl-text></kcl-slide>");
    let result = orchestrator(gateway.clone())
        .generate(&context(), &request)
        .await
        .unwrap();

    assert_eq!(result.action, ComposeAction::Style);
    let calls = gateway.calls();
    assert!(calls[0].prompt.starts_with("Action: style\n"));
    assert!(calls[0].prompt.contains("<kcl-text>Old</kcl-text>"));
    assert!(calls[0].system_prompt.contains("Restyle the existing frame"));
}

#[tokio::test]
async fn test_model_options_reach_the_gateway() {
    let gateway = ScriptedGateway::new(&[VALID]);
    let mut ctx = context();
    ctx.model_options.provider = Some("local".to_string());
    ctx.model_options.seed = Some(11);
    orchestrator(gateway.clone())
        .generate(&ctx, &GenerateRequest::new(ComposeAction::Generate, "a slide"))
        .await
        .unwrap();

    let calls = gateway.calls();
    assert_eq!(calls[0].options.provider.as_deref(), Some("local"));
    assert_eq!(calls[0].options.seed, Some(11));
}

#[tokio::test]
async fn test_gateway_errors_propagate_unchanged() {
    let result = orchestrator(Arc::new(FailingGateway))
        .generate(&context(), &GenerateRequest::new(ComposeAction::Generate, "a slide"))
        .await;
    assert!(matches!(result, Err(ApiError::ProviderRateLimit(_))));
}
