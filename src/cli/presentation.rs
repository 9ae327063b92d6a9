//! CLI presentation: text and json formatters per command.

use crate::error::ApiError;
use crate::frame::Frame;
use crate::generation::{GenerationResult, ProofSummary};
use crate::outline::OutlinePhaseResult;
use crate::validation::{DensityReport, ValidationIssue, ValidationResult};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;

fn issue_rows(table: &mut Table, severity: &str, issues: &[ValidationIssue]) {
    for issue in issues {
        table.add_row(vec![
            severity.to_string(),
            issue.kind.to_string(),
            issue
                .line
                .map(|line| line.to_string())
                .unwrap_or_else(|| "-".to_string()),
            issue.message.clone(),
        ]);
    }
}

pub fn format_validation_text(
    frames: &[Frame],
    validation: &ValidationResult,
    density: Option<&[DensityReport]>,
) -> String {
    let mut out = if validation.valid {
        format!("Validation passed: {} frame(s)\n", frames.len())
    } else {
        format!(
            "Validation failed: {} frame(s), {} error(s)\n",
            frames.len(),
            validation.errors.len()
        )
    };

    for (index, frame) in frames.iter().enumerate() {
        out.push_str(&format!(
            "  {}  {}\n",
            &frame.fingerprint[..12.min(frame.fingerprint.len())],
            frame.summary(index)
        ));
    }

    if !validation.errors.is_empty() || !validation.warnings.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Severity", "Kind", "Line", "Message"]);
        issue_rows(&mut table, "error", &validation.errors);
        issue_rows(&mut table, "warning", &validation.warnings);
        out.push_str(&format!("\n{}\n", table));
    }

    if let Some(reports) = density {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Frame", "Components", "Data components"]);
        for report in reports {
            table.add_row(vec![
                (report.frame_index + 1).to_string(),
                report.components.to_string(),
                report.data_components.to_string(),
            ]);
        }
        out.push_str(&format!("\nDensity\n{}\n", table));
    }
    out
}

pub fn format_validation_json(
    frames: &[Frame],
    validation: &ValidationResult,
    density: Option<&[DensityReport]>,
) -> Result<String, ApiError> {
    let frame_list: Vec<_> = frames
        .iter()
        .map(|frame| {
            json!({
                "fingerprint": frame.fingerprint,
                "title": frame.title,
            })
        })
        .collect();
    let mut out = json!({
        "valid": validation.valid,
        "frames": frame_list,
        "errors": validation.errors,
        "warnings": validation.warnings,
    });
    if let Some(reports) = density {
        out["density"] = json!(reports);
    }
    Ok(serde_json::to_string_pretty(&out)?)
}

pub fn format_frames_json(frames: &[Frame]) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(frames)?)
}

pub fn format_phase_text(result: &OutlinePhaseResult) -> String {
    let mut out = format!("Phase: {}\n", result.phase.as_str());
    if let Some(outline) = &result.confirmed_outline_text {
        out.push_str(&format!("\nConfirmed outline:\n{}\n", outline));
    }
    if let Some(outline) = &result.previous_outline_text {
        out.push_str(&format!("\nOutline under revision:\n{}\n", outline));
    }
    out
}

pub fn format_generation_json(
    result: &GenerationResult,
    proof: &ProofSummary,
) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(&json!({
        "result": result,
        "proof": proof,
    }))?)
}
