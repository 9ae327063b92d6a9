//! KCL Compose: Generation, Validation and Retry for KCL Frames
//!
//! Turns a natural-language instruction into validated KCL component frames. A model
//! provider writes markup, the response parser splits it into frames, the structural
//! validator checks it against the component library, and the retry orchestrator
//! feeds blocking errors back to the model until the output passes or the retry
//! budget runs out. Multi-slide requests can first go through an outline phase.

pub mod cli;
pub mod component;
pub mod config;
pub mod error;
pub mod frame;
pub mod generation;
pub mod logging;
pub mod outline;
pub mod prompt;
pub mod provider;
pub mod validation;

pub use component::ComponentLibrary;
pub use error::ApiError;
pub use frame::{Frame, ResponseParser};
pub use generation::{
    ComposeAction, GenerateRequest, GenerationContext, GenerationResult, RetryOrchestrator,
    MAX_RETRIES,
};
pub use outline::{ConversationTurn, OutlinePhase, OutlinePhaseDetector, OutlinePhaseResult};
pub use provider::{ComposeOptions, ComposeResponse, ModelGateway, ProviderGateway};
pub use validation::{DensityValidator, StructuralValidator, ValidationIssue, ValidationResult};
