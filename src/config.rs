//! Configuration System
//!
//! Layered configuration for provider profiles, generation defaults and logging.
//! Sources, lowest to highest precedence: built-in defaults, the global file
//! (`$XDG_CONFIG_HOME/kcl-compose/config.toml`), the workspace `config/config.toml`,
//! `config/{KCL_ENV}.toml`, then `KCL__*` environment variables.

use crate::component::DEFAULT_LIBRARY_VERSION;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::validation::density::{MIN_COMPONENTS, MIN_DATA_COMPONENTS};
use crate::validation::structural::MAX_FRAME_CHARS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Model provider profiles keyed by name
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults applied to every generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Provider used when a call names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// Component library version advertised to the model
    #[serde(default = "default_library_version")]
    pub library_version: String,

    #[serde(default = "default_min_components")]
    pub min_components: usize,

    #[serde(default = "default_min_data_components")]
    pub min_data_components: usize,

    #[serde(default = "default_max_frame_chars")]
    pub max_frame_chars: usize,

    /// Replaces the built-in opening of the system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_preamble: Option<String>,
}

fn default_library_version() -> String {
    DEFAULT_LIBRARY_VERSION.to_string()
}

fn default_min_components() -> usize {
    MIN_COMPONENTS
}

fn default_min_data_components() -> usize {
    MIN_DATA_COMPONENTS
}

fn default_max_frame_chars() -> usize {
    MAX_FRAME_CHARS
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            default_provider: None,
            default_max_tokens: None,
            library_version: default_library_version(),
            min_components: default_min_components(),
            min_data_components: default_min_data_components(),
            max_frame_chars: default_max_frame_chars(),
            system_prompt_preamble: None,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    Provider(String, String),
    Generation(String),
    Logging(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValidationError::Provider(name, msg) => write!(f, "Provider '{}': {}", name, msg),
            ConfigValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ConfigValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

impl ComposeConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        for (name, provider) in &self.providers {
            if let Err(e) = provider.validate() {
                errors.push(ConfigValidationError::Provider(name.clone(), e));
            }
        }

        if let Some(default) = &self.generation.default_provider {
            if !self.providers.contains_key(default) {
                errors.push(ConfigValidationError::Generation(format!(
                    "default_provider '{}' is not defined under [providers]",
                    default
                )));
            }
        }
        if self.generation.library_version.trim().is_empty() {
            errors.push(ConfigValidationError::Generation(
                "library_version cannot be empty".to_string(),
            ));
        }
        if self.generation.max_frame_chars == 0 {
            errors.push(ConfigValidationError::Generation(
                "max_frame_chars must be greater than zero".to_string(),
            ));
        }
        if self.generation.default_max_tokens == Some(0) {
            errors.push(ConfigValidationError::Generation(
                "default_max_tokens must be greater than zero".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            errors.push(ConfigValidationError::Logging(format!(
                "format '{}' must be 'text' or 'json'",
                self.logging.format
            )));
        }
        if !matches!(self.logging.output.as_str(), "stdout" | "stderr" | "file") {
            errors.push(ConfigValidationError::Logging(format!(
                "output '{}' must be 'stdout', 'stderr' or 'file'",
                self.logging.output
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one `ApiError::ConfigError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })
    }

    /// Render as TOML, with provider keys masked.
    pub fn to_redacted_toml(&self) -> Result<String, ApiError> {
        let mut redacted = self.clone();
        for provider in redacted.providers.values_mut() {
            if provider.api_key.is_some() {
                provider.api_key = Some("********".to_string());
            }
        }
        toml::to_string_pretty(&redacted)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
    }
}
