//! Response parsing: separators, fences, narrative and frame metadata.

use kcl_compose::frame::{compute_fingerprint, FrameMarkers, ResponseParser};
use kcl_compose::Frame;

fn parse(raw: &str) -> Vec<Frame> {
    ResponseParser::default().parse(raw)
}

#[test]
fn test_whole_response_fence_is_stripped() {
    let raw = "```html\n<kcl-slide><kcl-text level=\"h1\">Hello</kcl-text></kcl-slide>\n```";
    let frames = parse(raw);
    assert_eq!(frames.len(), 1);
    assert!(frames[0].code.starts_with("<kcl-slide>"));
    assert!(!frames[0].code.contains("```"));
    assert_eq!(frames[0].title.as_deref(), Some("Hello"));
}

#[test]
fn test_separators_split_frames_in_order() {
    let raw = "<kcl-slide><kcl-text level=\"h1\">One</kcl-text></kcl-slide>\n\
               <!-- FRAME_SEPARATOR -->\n\
               <kcl-slide><kcl-text level=\"h1\">Two</kcl-text></kcl-slide>\n\
               <!-- FRAME_SEPARATOR -->\n";
    let titles: Vec<_> = parse(raw)
        .into_iter()
        .map(|frame| frame.title.unwrap_or_default())
        .collect();
    assert_eq!(titles, vec!["One", "Two"]);
}

#[test]
fn test_narrative_before_the_root_is_extracted() {
    let raw = "<!-- NARRATIVE_START --><p>Why this matters</p><!-- NARRATIVE_END -->\n\
               <kcl-slide><kcl-text>Body</kcl-text></kcl-slide>";
    let frames = parse(raw);
    assert_eq!(frames[0].narrative_html.as_deref(), Some("<p>Why this matters</p>"));
    assert_eq!(frames[0].code, "<kcl-slide><kcl-text>Body</kcl-text></kcl-slide>");
}

#[test]
fn test_speaker_notes_come_from_the_comment() {
    let raw = "<kcl-slide><!-- speaker-notes: Mention the pilot. --><kcl-text>x</kcl-text></kcl-slide>";
    assert_eq!(parse(raw)[0].speaker_notes.as_deref(), Some("Mention the pilot."));
}

#[test]
fn test_fingerprint_tracks_exact_code() {
    let frames = parse("<kcl-slide></kcl-slide>");
    assert_eq!(frames[0].fingerprint, compute_fingerprint("<kcl-slide></kcl-slide>"));
    assert_ne!(frames[0].fingerprint, compute_fingerprint("<kcl-slide> </kcl-slide>"));
}

#[test]
fn test_empty_response_has_no_frames() {
    assert!(parse("").is_empty());
}

#[test]
fn test_separator_only_response_falls_back_to_one_frame() {
    let frames = parse("<!-- FRAME_SEPARATOR -->\n<!-- FRAME_SEPARATOR -->");
    assert_eq!(frames.len(), 1);
    assert!(frames[0].code.contains("FRAME_SEPARATOR"));
}

#[test]
fn test_custom_separator_is_honored() {
    let markers = FrameMarkers {
        separator: "---8<---".to_string(),
        ..FrameMarkers::default()
    };
    let frames = ResponseParser::new(markers).parse("<kcl-slide>a</kcl-slide>---8<---<kcl-slide>b</kcl-slide>");
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].code, "<kcl-slide>b</kcl-slide>");
}

#[test]
fn test_frames_serialize_for_the_cli() {
    let frames = parse("<kcl-slide><kcl-text level=\"h1\">T</kcl-text></kcl-slide>");
    let json = kcl_compose::cli::format_frames_json(&frames).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["title"], "T");
    assert!(value[0].get("narrative_html").is_none());
}
