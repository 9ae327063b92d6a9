//! CLI route: single route table and run context.

use crate::cli::parse::{command_name, Commands};
use crate::cli::presentation::{
    format_frames_json, format_generation_json, format_phase_text, format_validation_json,
    format_validation_text,
};
use crate::component::ComponentLibrary;
use crate::config::{ComposeConfig, ConfigLoader};
use crate::error::ApiError;
use crate::frame::ResponseParser;
use crate::generation::{
    build_proof_summary, ComposeAction, GenerateRequest, GenerationContext, RetryOrchestrator,
};
use crate::outline::{ConversationTurn, OutlinePhaseDetector};
use crate::prompt::DefaultPromptBuilder;
use crate::provider::{ComposeOptions, ProviderGateway};
use crate::validation::{DensityReport, DensityValidator, StructuralValidator, ValidationResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Runtime context for CLI execution: workspace and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: ComposeConfig,
}

impl RunContext {
    /// Load configuration for the workspace, or from an explicit file.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        config.ensure_valid()?;
        Ok(Self::from_config(workspace_root, config))
    }

    pub fn from_config(workspace_root: PathBuf, config: ComposeConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = match command {
            Commands::Validate {
                file,
                format,
                density,
            } => self.handle_validate(file, format, *density),
            Commands::Parse { file } => self.handle_parse(file),
            Commands::Phase { prompt, history } => self.handle_phase(prompt, history.as_deref()),
            Commands::Generate {
                prompt,
                provider,
                model,
                seed,
                max_tokens,
                title,
                mode,
                surface,
                history,
                allow_clarification,
            } => {
                let options = ComposeOptions {
                    provider: provider.clone(),
                    model: model.clone(),
                    seed: *seed,
                    max_tokens: *max_tokens,
                    api_key: None,
                };
                let mut context = GenerationContext::new(surface.clone())
                    .with_model_options(options)
                    .with_history(self.read_history(history.as_deref())?);
                context.title = title.clone();
                context.library_version = self.config.generation.library_version.clone();
                if let Some(mode) = mode {
                    context.composition_mode = mode.clone();
                }
                self.handle_generate(prompt, &context, *allow_clarification)
            }
            Commands::Config => self.config.to_redacted_toml(),
        };
        debug!(
            command = command_name(command),
            workspace = %self.workspace_root.display(),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn library(&self) -> ComponentLibrary {
        ComponentLibrary::with_version(self.config.generation.library_version.clone())
    }

    fn structural_validator(&self) -> StructuralValidator {
        StructuralValidator::new(self.library())
            .with_max_chars(self.config.generation.max_frame_chars)
    }

    fn density_validator(&self) -> DensityValidator {
        DensityValidator::new(self.library()).with_thresholds(
            self.config.generation.min_components,
            self.config.generation.min_data_components,
        )
    }

    fn read_input(path: &Path) -> Result<String, ApiError> {
        std::fs::read_to_string(path).map_err(|e| {
            ApiError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read {}: {}", path.display(), e),
            ))
        })
    }

    fn read_history(&self, path: Option<&Path>) -> Result<Vec<ConversationTurn>, ApiError> {
        match path {
            Some(path) => Ok(serde_json::from_str(&Self::read_input(path)?)?),
            None => Ok(Vec::new()),
        }
    }

    fn handle_validate(&self, file: &Path, format: &str, density: bool) -> Result<String, ApiError> {
        let raw = Self::read_input(file)?;
        let frames = ResponseParser::default().parse(&raw);
        let validator = self.structural_validator();
        let mut validation =
            ValidationResult::merge_frames(frames.iter().map(|frame| validator.validate(&frame.code)));

        let reports: Option<Vec<DensityReport>> = density.then(|| {
            let density = self.density_validator();
            density.append_warnings(&frames, &mut validation);
            frames
                .iter()
                .enumerate()
                .map(|(index, frame)| density.measure(&frame.code, index))
                .collect()
        });

        match format {
            "json" => format_validation_json(&frames, &validation, reports.as_deref()),
            "text" => Ok(format_validation_text(&frames, &validation, reports.as_deref())),
            other => Err(ApiError::InvalidRequest(format!(
                "Unknown format '{}' (expected 'text' or 'json')",
                other
            ))),
        }
    }

    fn handle_parse(&self, file: &Path) -> Result<String, ApiError> {
        let frames = ResponseParser::default().parse(&Self::read_input(file)?);
        format_frames_json(&frames)
    }

    fn handle_phase(&self, prompt: &str, history: Option<&Path>) -> Result<String, ApiError> {
        let history = self.read_history(history)?;
        let result = OutlinePhaseDetector::default().detect(&history, prompt);
        Ok(format_phase_text(&result))
    }

    fn handle_generate(
        &self,
        prompt: &str,
        context: &GenerationContext,
        allow_clarification: bool,
    ) -> Result<String, ApiError> {
        let gateway = Arc::new(ProviderGateway::from_config(&self.config));
        let prompts = Arc::new(DefaultPromptBuilder::with_preamble(
            self.config.generation.system_prompt_preamble.clone(),
        ));
        let orchestrator =
            RetryOrchestrator::new(gateway, prompts).with_validator(self.structural_validator());
        let request = GenerateRequest::new(ComposeAction::Generate, prompt)
            .allow_clarification(allow_clarification);

        let runtime = tokio::runtime::Runtime::new()?;
        let mut result = runtime.block_on(orchestrator.generate(context, &request))?;
        result.apply_density(&self.density_validator());

        let proof = build_proof_summary(prompt, &result);
        format_generation_json(&result, &proof)
    }
}
