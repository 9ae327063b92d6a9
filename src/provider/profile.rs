//! Provider profiles: the `[providers.<name>]` configuration tables.

use crate::error::ApiError;
use crate::provider::CompletionOptions;
use serde::{Deserialize, Serialize};

pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Anthropic,
    Ollama,
    Local,
}

impl ProviderType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Ollama => "ollama",
            ProviderType::Local => "local",
        }
    }

    /// Environment variable consulted when the profile carries no key.
    fn key_env(self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAI => Some(OPENAI_KEY_ENV),
            ProviderType::Anthropic => Some(ANTHROPIC_KEY_ENV),
            ProviderType::Ollama | ProviderType::Local => None,
        }
    }
}

/// Fully resolved connection details for one vendor client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelProvider {
    OpenAI {
        model: String,
        api_key: String,
        base_url: Option<String>, // Azure OpenAI and other hosted variants
    },
    Anthropic {
        model: String,
        api_key: String,
        base_url: Option<String>,
    },
    Ollama {
        model: String,
        base_url: Option<String>, // Default: http://localhost:11434
    },
    LocalCustom {
        model: String,
        endpoint: String, // e.g. http://localhost:8080/v1
        api_key: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Filled from the table key when loaded through the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    pub provider_type: ProviderType,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub default_options: CompletionOptions,
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!(
                    "Endpoint must start with http:// or https:// (got '{}')",
                    endpoint
                ));
            }
        }
        if self.provider_type == ProviderType::Local && self.endpoint.is_none() {
            return Err("Local providers require an endpoint".to_string());
        }
        if let Some(temperature) = self.default_options.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!("Temperature {} is outside 0.0-2.0", temperature));
            }
        }
        Ok(())
    }

    /// Key precedence: per-call override, then the profile, then the vendor env var.
    fn resolve_api_key(&self, api_key_override: Option<&str>) -> Option<String> {
        api_key_override
            .map(str::to_string)
            .or_else(|| self.api_key.clone())
            .or_else(|| {
                self.provider_type
                    .key_env()
                    .and_then(|var| std::env::var(var).ok())
            })
            .filter(|key| !key.is_empty())
    }

    fn required_api_key(&self, api_key_override: Option<&str>) -> Result<String, ApiError> {
        self.resolve_api_key(api_key_override).ok_or_else(|| {
            ApiError::ProviderNotConfigured(format!(
                "No API key for {} provider '{}'; set api_key or {}",
                self.provider_type.as_str(),
                self.provider_name.as_deref().unwrap_or("unnamed"),
                self.provider_type.key_env().unwrap_or("an api key"),
            ))
        })
    }

    pub fn to_model_provider(
        &self,
        api_key_override: Option<&str>,
    ) -> Result<ModelProvider, ApiError> {
        let model = self.model.clone();
        match self.provider_type {
            ProviderType::OpenAI => Ok(ModelProvider::OpenAI {
                model,
                api_key: self.required_api_key(api_key_override)?,
                base_url: self.endpoint.clone(),
            }),
            ProviderType::Anthropic => Ok(ModelProvider::Anthropic {
                model,
                api_key: self.required_api_key(api_key_override)?,
                base_url: self.endpoint.clone(),
            }),
            ProviderType::Ollama => Ok(ModelProvider::Ollama {
                model,
                base_url: self.endpoint.clone(),
            }),
            ProviderType::Local => {
                let endpoint = self.endpoint.clone().ok_or_else(|| {
                    ApiError::ConfigError("Local providers require an endpoint".to_string())
                })?;
                Ok(ModelProvider::LocalCustom {
                    model,
                    endpoint,
                    api_key: self.resolve_api_key(api_key_override),
                })
            }
        }
    }
}
