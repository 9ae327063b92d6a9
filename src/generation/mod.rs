//! Generation Pipeline
//!
//! Outline-aware, validated frame generation: one [`RetryOrchestrator`] call turns an
//! instruction into a [`GenerationResult`], re-prompting the model with validation
//! errors until the frames pass or the retry budget runs out.

pub mod context;
pub mod orchestrator;
pub mod result;

pub use context::GenerationContext;
pub use orchestrator::{GenerateRequest, ResponseCallback, RetryOrchestrator, MAX_RETRIES};
pub use result::{build_proof_summary, GenerationResult, ProofInput, ProofOutput, ProofSummary};

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the caller asked the model to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposeAction {
    /// Create new frames.
    Generate,
    /// Rewrite an existing frame according to the instruction.
    Edit,
    /// Restyle an existing frame without changing its content.
    Style,
}

impl ComposeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ComposeAction::Generate => "generate",
            ComposeAction::Edit => "edit",
            ComposeAction::Style => "style",
        }
    }

    /// Edit and style operate on existing frame code.
    pub fn needs_existing_code(self) -> bool {
        !matches!(self, ComposeAction::Generate)
    }
}

impl fmt::Display for ComposeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
