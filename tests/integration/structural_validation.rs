//! Structural and density validation over realistic frames.

use kcl_compose::frame::ResponseParser;
use kcl_compose::validation::IssueKind;
use kcl_compose::{ComponentLibrary, DensityValidator, StructuralValidator, ValidationResult};

const RICH_FRAME: &str = r#"<kcl-slide>
  <!-- speaker-notes: Pause after the growth number. -->
  <kcl-text level="h1">Revenue</kcl-text>
  <kcl-layout columns="2">
    <kcl-chart id="rev" type="bar"></kcl-chart>
    <script type="application/json" data-for="rev">
      {"labels": ["Q1", "Q2"], "values": [10, 14]}
    </script>
    <kcl-list><li>Up 40%</li></kcl-list>
  </kcl-layout>
  <kcl-metric value="$14M" label="Q2"></kcl-metric>
  <kcl-image src="chart.png" alt="Bar chart"></kcl-image>
</kcl-slide>"#;

fn validate(code: &str) -> ValidationResult {
    StructuralValidator::default().validate(code)
}

#[test]
fn test_rich_frame_passes_without_findings() {
    let result = validate(RICH_FRAME);
    assert!(result.valid, "unexpected errors: {:?}", result.errors);
    assert!(result.warnings.is_empty());
    assert!(DensityValidator::default().check(RICH_FRAME, 0).is_none());
}

#[test]
fn test_wrong_root_is_blocking() {
    let result = validate("<div><kcl-text>Hi</kcl-text></div>");
    assert!(!result.valid);
    assert_eq!(result.errors[0].kind, IssueKind::InvalidNesting);
    assert!(result.errors[0].message.contains("<kcl-slide>"));
}

#[test]
fn test_independent_errors_are_reported_in_one_pass() {
    let code = r#"<kcl-slide>
  <kcl-foo></kcl-foo>
  <script type="application/json" data-for="ghost">{"a": 1}</script>
</kcl-slide>"#;
    let result = validate(code);
    assert!(!result.valid);
    assert!(result.has_kind(IssueKind::InvalidTag));
    assert!(result.has_kind(IssueKind::MissingDataScript));
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_chart_without_data_is_only_a_warning() {
    let result = validate(r#"<kcl-slide><kcl-chart id="c1"></kcl-chart></kcl-slide>"#);
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, IssueKind::EmptyContent);
    assert!(result.warnings[0].message.contains("kcl-chart"));
}

#[test]
fn test_malformed_json_reports_its_line() {
    let code = "<kcl-slide>\n<kcl-table id=\"t\"></kcl-table>\n<script type=\"application/json\" data-for=\"t\">\n{\"rows\": [1, 2,]}\n</script>\n</kcl-slide>";
    let result = validate(code);
    assert!(!result.valid);
    let error = &result.errors[0];
    assert_eq!(error.kind, IssueKind::ParseError);
    assert_eq!(error.line, Some(4));
}

#[test]
fn test_tags_inside_code_blocks_are_ignored() {
    let code = "<kcl-slide><kcl-code lang=\"html\"><kcl-fake></kcl-fake><html></kcl-code></kcl-slide>";
    assert!(validate(code).valid);
}

#[test]
fn test_document_wrappers_are_rejected() {
    let code = "<kcl-slide><body><kcl-text>x</kcl-text></body></kcl-slide>";
    let result = validate(code);
    assert!(!result.valid);
    assert!(result.errors[0].message.contains("<body>"));
}

#[test]
fn test_validation_is_idempotent() {
    let code = "<kcl-slide><kcl-foo></kcl-foo><kcl-image src=\"x\"></kcl-image></kcl-slide>";
    assert_eq!(validate(code), validate(code));
}

#[test]
fn test_oversized_frames_warn() {
    let validator = StructuralValidator::new(ComponentLibrary::default()).with_max_chars(50);
    let code = format!("<kcl-slide><kcl-text>{}</kcl-text></kcl-slide>", "a".repeat(60));
    let result = validator.validate(&code);
    assert!(result.valid);
    assert!(result.has_kind(IssueKind::LargeOutput));
}

#[test]
fn test_merged_results_prefix_frame_numbers() {
    let raw = "<kcl-slide><kcl-text>ok</kcl-text></kcl-slide>\n<!-- FRAME_SEPARATOR -->\n<kcl-slide><kcl-bad></kcl-bad></kcl-slide>";
    let frames = ResponseParser::default().parse(raw);
    let validator = StructuralValidator::default();
    let merged = ValidationResult::merge_frames(frames.iter().map(|f| validator.validate(&f.code)));
    assert!(!merged.valid);
    assert_eq!(merged.errors[0].message, "Frame 2: Unknown component <kcl-bad>");
}

#[test]
fn test_density_flags_sparse_frames() {
    let density = DensityValidator::default();
    let sparse = "<kcl-slide><kcl-text level=\"h1\">Title</kcl-text><kcl-text>Body</kcl-text></kcl-slide>";
    let report = density.measure(sparse, 0);
    assert_eq!(report.components, 2);
    assert_eq!(report.data_components, 0);

    let issue = density.check(sparse, 0).unwrap();
    assert_eq!(issue.kind, IssueKind::EmptyContent);
    assert!(!issue.kind.is_blocking());
}
