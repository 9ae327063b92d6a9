//! Property-based tests for determinism guarantees

use kcl_compose::frame::compute_fingerprint;
use kcl_compose::outline::OutlinePhaseDetector;
use kcl_compose::{ConversationTurn, Frame, OutlinePhase, ResponseParser, StructuralValidator};
use proptest::prelude::*;

/// Small markup fragments, valid and invalid, to build frames from.
fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{0,12}".prop_map(|text| format!("<kcl-text>{}</kcl-text>", text)),
        "[a-z]{1,6}".prop_map(|name| format!("<kcl-{}></kcl-{}>", name, name)),
        Just("<kcl-image src=\"a.png\">".to_string()),
        Just("<kcl-chart id=\"c\"></kcl-chart>".to_string()),
        Just("<script type=\"application/json\" data-for=\"c\">{\"v\": 1}</script>".to_string()),
        Just("<!-- speaker-notes: hi -->".to_string()),
        "[a-z{}\\[\\]\":, ]{0,10}".prop_map(|json| format!(
            "<script type=\"application/json\" data-for=\"c\">{}</script>",
            json
        )),
    ]
}

fn frame_code() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..6)
        .prop_map(|parts| format!("<kcl-slide>{}</kcl-slide>", parts.concat()))
}

proptest! {
    #[test]
    fn test_fingerprint_depends_only_on_code(code in frame_code()) {
        let a = Frame::from_code(code.clone());
        let b = Frame::with_narrative(code.clone(), Some("<p>context</p>".to_string()));
        prop_assert_eq!(&a.fingerprint, &b.fingerprint);
        prop_assert_eq!(a.fingerprint, compute_fingerprint(&code));
    }

    #[test]
    fn test_fingerprint_is_whitespace_sensitive(code in frame_code()) {
        let padded = format!("{} ", code);
        prop_assert_ne!(compute_fingerprint(&code), compute_fingerprint(&padded));
    }

    #[test]
    fn test_derived_metadata_is_stable(code in frame_code()) {
        let a = Frame::from_code(code.clone());
        let b = Frame::from_code(code);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_validation_is_deterministic(code in frame_code()) {
        let validator = StructuralValidator::default();
        let first = validator.validate(&code);
        let second = validator.validate(&code);
        prop_assert_eq!(first.valid, first.errors.is_empty());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_warnings_never_block(code in frame_code()) {
        let result = StructuralValidator::default().validate(&code);
        prop_assert!(result.warnings.iter().all(|w| !w.kind.is_blocking()));
        prop_assert!(result.errors.iter().all(|e| e.kind.is_blocking()));
    }

    #[test]
    fn test_parsing_preserves_frame_count(codes in prop::collection::vec(frame_code(), 1..5)) {
        let raw = codes.join("\n<!-- FRAME_SEPARATOR -->\n");
        let frames = ResponseParser::default().parse(&raw);
        prop_assert_eq!(frames.len(), codes.len());
        for (frame, code) in frames.iter().zip(&codes) {
            prop_assert_eq!(&frame.code, code);
        }
    }

    #[test]
    fn test_empty_history_always_needs_an_outline(prompt in "[a-z ,.]{0,40}") {
        prop_assume!(!prompt.contains("skip") && !prompt.contains("just") && !prompt.contains("without")
            && !prompt.contains("no outline") && !prompt.contains("go straight") && !prompt.contains("directly"));
        let history: Vec<ConversationTurn> = Vec::new();
        let phase = OutlinePhaseDetector::default().detect(&history, &prompt).phase;
        prop_assert_eq!(phase, OutlinePhase::NeedsOutline);
    }
}
