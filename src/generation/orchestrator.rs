//! Retry Orchestrator
//!
//! The generate → parse → validate control loop. Each call makes at most
//! `MAX_RETRIES + 1` gateway calls and always returns exactly one result; only model
//! transport failures surface as errors.

use crate::error::ApiError;
use crate::frame::ResponseParser;
use crate::generation::context::GenerationContext;
use crate::generation::result::GenerationResult;
use crate::generation::ComposeAction;
use crate::outline::{OutlinePhaseDetector, OutlinePhaseResult};
use crate::prompt::{PromptBuilder, PromptContext, RetryFeedback, UserPromptParams};
use crate::provider::{ComposeResponse, ModelGateway};
use crate::validation::{IssueKind, StructuralValidator, ValidationIssue, ValidationResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Retries after the first attempt.
pub const MAX_RETRIES: usize = 2;

/// Invoked once per attempt with the attempt index and the full response text.
pub type ResponseCallback = Arc<dyn Fn(usize, &str) + Send + Sync>;

/// One generation request.
#[derive(Clone)]
pub struct GenerateRequest {
    pub action: ComposeAction,
    pub prompt: String,
    /// Frame being edited or restyled.
    pub existing_code: Option<String>,
    /// Accept a plain-text reply on the first attempt instead of frames.
    pub allow_clarification: bool,
    pub on_response: Option<ResponseCallback>,
}

impl GenerateRequest {
    pub fn new(action: ComposeAction, prompt: impl Into<String>) -> Self {
        Self {
            action,
            prompt: prompt.into(),
            existing_code: None,
            allow_clarification: false,
            on_response: None,
        }
    }

    pub fn with_existing_code(mut self, code: impl Into<String>) -> Self {
        self.existing_code = Some(code.into());
        self
    }

    pub fn allow_clarification(mut self, allow: bool) -> Self {
        self.allow_clarification = allow;
        self
    }

    pub fn on_response(mut self, callback: ResponseCallback) -> Self {
        self.on_response = Some(callback);
        self
    }
}

impl std::fmt::Debug for GenerateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateRequest")
            .field("action", &self.action)
            .field("prompt", &self.prompt)
            .field("existing_code", &self.existing_code.as_ref().map(String::len))
            .field("allow_clarification", &self.allow_clarification)
            .field("on_response", &self.on_response.is_some())
            .finish()
    }
}

/// Stateless across calls; one instance may serve concurrent requests.
pub struct RetryOrchestrator {
    gateway: Arc<dyn ModelGateway>,
    prompts: Arc<dyn PromptBuilder>,
    parser: ResponseParser,
    validator: StructuralValidator,
    detector: OutlinePhaseDetector,
}

impl RetryOrchestrator {
    pub fn new(gateway: Arc<dyn ModelGateway>, prompts: Arc<dyn PromptBuilder>) -> Self {
        Self {
            gateway,
            prompts,
            parser: ResponseParser::default(),
            validator: StructuralValidator::default(),
            detector: OutlinePhaseDetector::default(),
        }
    }

    pub fn with_parser(mut self, parser: ResponseParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_validator(mut self, validator: StructuralValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_detector(mut self, detector: OutlinePhaseDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Outline detection applies only to new-frame requests that accept a plain-text
    /// reply.
    pub fn detect_phase(
        &self,
        context: &GenerationContext,
        request: &GenerateRequest,
    ) -> Option<OutlinePhaseResult> {
        if request.action != ComposeAction::Generate || !request.allow_clarification {
            return None;
        }
        Some(
            self.detector
                .detect(&context.conversation_history, &request.prompt),
        )
    }

    fn validate_frames(&self, frames: &[crate::frame::Frame]) -> ValidationResult {
        let mut validation = ValidationResult::merge_frames(
            frames
                .iter()
                .map(|frame| self.validator.validate(&frame.code)),
        );
        if frames.is_empty() {
            validation.push(ValidationIssue::new(
                IssueKind::ParseError,
                "Response contained no frames",
            ));
        }
        validation
    }

    fn clarification(
        &self,
        action: ComposeAction,
        response: ComposeResponse,
        outline: Option<&OutlinePhaseResult>,
    ) -> GenerationResult {
        let is_outline = outline.is_some_and(|o| o.phase.expects_outline());
        GenerationResult {
            action,
            frames: Vec::new(),
            provider: response.provider,
            model: response.model,
            clarification_message: Some(response.text.trim().to_string()),
            raw_response: response.text,
            validation: ValidationResult::new(),
            retries_used: 0,
            is_clarification: true,
            is_outline: Some(is_outline),
            outline_phase: outline.map(|o| o.phase),
        }
    }

    /// Run the generate → parse → validate loop for one request.
    pub async fn generate(
        &self,
        context: &GenerationContext,
        request: &GenerateRequest,
    ) -> Result<GenerationResult, ApiError> {
        if request.action.needs_existing_code() && request.existing_code.is_none() {
            return Err(ApiError::InvalidRequest(format!(
                "The {} action requires existing frame code",
                request.action
            )));
        }

        let outline = self.detect_phase(context, request);
        if let Some(outline) = &outline {
            info!(phase = outline.phase.as_str(), "Outline phase detected");
        }
        let root_marker = self.validator.library().root_marker();
        let started = Instant::now();

        let mut feedback: Option<RetryFeedback> = None;
        let mut attempt = 0;
        loop {
            let prompt_context = PromptContext {
                library: self.validator.library(),
                library_version: &context.library_version,
                markers: self.parser.markers(),
                composition_mode: &context.composition_mode,
                brand_guidelines: context.brand_guidelines.as_deref(),
                memory_context: context.memory_context.as_deref(),
                outline: outline.as_ref(),
                retry: feedback.as_ref(),
            };
            let system_prompt = self
                .prompts
                .build_system_prompt(request.action, &prompt_context);
            let user_prompt = self.prompts.build_user_prompt(&UserPromptParams {
                action: request.action,
                prompt: &request.prompt,
                title: context.title.as_deref(),
                existing_frames: &context.existing_frames,
                existing_code: request.existing_code.as_deref(),
                retry: feedback.as_ref(),
            });

            debug!(attempt, surface = %context.surface_id, "Calling model");
            let response = self
                .gateway
                .compose(&user_prompt, &system_prompt, &context.model_options)
                .await?;
            if let Some(callback) = &request.on_response {
                callback(attempt, &response.text);
            }

            if attempt == 0 && request.allow_clarification && !response.text.contains(&root_marker)
            {
                info!(
                    provider = %response.provider,
                    model = %response.model,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Model replied with a clarification"
                );
                return Ok(self.clarification(request.action, response, outline.as_ref()));
            }

            let frames = self.parser.parse(&response.text);
            let validation = self.validate_frames(&frames);
            info!(
                attempt,
                frames = frames.len(),
                errors = validation.errors.len(),
                warnings = validation.warnings.len(),
                "Attempt validated"
            );

            if validation.valid || attempt == MAX_RETRIES {
                if !validation.valid {
                    warn!(
                        attempts = attempt + 1,
                        errors = validation.errors.len(),
                        "Retries exhausted; returning invalid frames"
                    );
                }
                info!(
                    retries_used = attempt,
                    valid = validation.valid,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Generation finished"
                );
                return Ok(GenerationResult {
                    action: request.action,
                    frames,
                    provider: response.provider,
                    model: response.model,
                    raw_response: response.text,
                    validation,
                    retries_used: attempt,
                    is_clarification: false,
                    clarification_message: None,
                    is_outline: None,
                    outline_phase: outline.as_ref().map(|o| o.phase),
                });
            }

            attempt += 1;
            warn!(
                next_attempt = attempt,
                errors = validation.errors.len(),
                "Validation failed; retrying with feedback"
            );
            feedback = Some(RetryFeedback {
                attempt,
                errors: validation.error_messages(),
            });
        }
    }
}
