//! Generation results and the audit summary derived from them.

use crate::frame::{Fingerprint, Frame};
use crate::generation::ComposeAction;
use crate::outline::OutlinePhase;
use crate::validation::{DensityValidator, ValidationResult};
use serde::{Deserialize, Serialize};

/// Outcome of one orchestrator call.
///
/// `frames` is empty exactly when `is_clarification` is set, except when the model
/// returned an empty body on every attempt; that case carries a blocking
/// `parse_error` and `validation.valid == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub action: ComposeAction,
    pub frames: Vec<Frame>,
    pub provider: String,
    pub model: String,
    pub raw_response: String,
    pub validation: ValidationResult,
    pub retries_used: usize,
    pub is_clarification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_message: Option<String>,
    /// Set on clarifications: whether the reply is an outline proposal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_outline: Option<bool>,
    /// Phase detected for this call, when outline detection ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_phase: Option<OutlinePhase>,
}

impl GenerationResult {
    /// Run the density heuristic over the accepted frames and append its warnings.
    /// Never changes `validation.valid`. Returns the number of warnings added.
    pub fn apply_density(&mut self, validator: &DensityValidator) -> usize {
        if self.is_clarification {
            return 0;
        }
        validator.append_warnings(&self.frames, &mut self.validation)
    }

    pub fn fingerprints(&self) -> Vec<Fingerprint> {
        self.frames
            .iter()
            .map(|frame| frame.fingerprint.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofInput {
    pub action: ComposeAction,
    /// Hex BLAKE3 of the caller's instruction.
    pub prompt_hash: String,
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOutput {
    pub frame_fingerprints: Vec<Fingerprint>,
    pub frame_count: usize,
    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub retries_used: usize,
    pub is_clarification: bool,
}

/// Minimal `{input, output}` record describing one generation, for callers that keep
/// audit trails. Building it performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSummary {
    pub input: ProofInput,
    pub output: ProofOutput,
}

fn prompt_hash(prompt: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"prompt:");
    hasher.update(prompt.as_bytes());
    hex::encode(hasher.finalize().as_bytes())
}

pub fn build_proof_summary(prompt: &str, result: &GenerationResult) -> ProofSummary {
    ProofSummary {
        input: ProofInput {
            action: result.action,
            prompt_hash: prompt_hash(prompt),
            provider: result.provider.clone(),
            model: result.model.clone(),
        },
        output: ProofOutput {
            frame_fingerprints: result.fingerprints(),
            frame_count: result.frames.len(),
            valid: result.validation.valid,
            error_count: result.validation.errors.len(),
            warning_count: result.validation.warnings.len(),
            retries_used: result.retries_used,
            is_clarification: result.is_clarification,
        },
    }
}
