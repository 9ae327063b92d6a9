//! Registry-backed [`ModelGateway`].

use crate::config::ComposeConfig;
use crate::error::ApiError;
use crate::provider::{
    ChatMessage, ComposeOptions, ComposeResponse, ModelGateway, ModelProviderClient,
    ProviderConfig, ProviderFactory, ProviderRegistry,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

type ClientKey = (String, String);

/// Resolves per-call overrides against configured providers and performs the call.
///
/// Clients built from profile credentials are cached per provider and model. Clients
/// built with a caller-supplied key are used for one call and dropped.
pub struct ProviderGateway {
    registry: ProviderRegistry,
    default_provider: Option<String>,
    default_max_tokens: Option<u32>,
    clients: Mutex<HashMap<ClientKey, Arc<dyn ModelProviderClient>>>,
}

impl ProviderGateway {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            default_provider: None,
            default_max_tokens: None,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &ComposeConfig) -> Self {
        Self::new(ProviderRegistry::from_providers(&config.providers))
            .with_default_provider(config.generation.default_provider.clone())
            .with_default_max_tokens(config.generation.default_max_tokens)
    }

    pub fn with_default_provider(mut self, provider: Option<String>) -> Self {
        self.default_provider = provider;
        self
    }

    pub fn with_default_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn cached_clients(&self) -> usize {
        self.clients.lock().len()
    }

    /// Pick the provider profile for a call and apply the model override.
    fn select_provider(&self, options: &ComposeOptions) -> Result<ProviderConfig, ApiError> {
        let name = options
            .provider
            .as_deref()
            .or(self.default_provider.as_deref())
            .or_else(|| self.registry.sole_provider())
            .ok_or_else(|| {
                ApiError::ProviderNotConfigured(
                    "No provider requested and no default provider configured".to_string(),
                )
            })?;

        let mut config = self.registry.get_or_error(name)?.clone();
        if let Some(model) = &options.model {
            config.model = model.clone();
        }
        Ok(config)
    }

    fn client_for(
        &self,
        config: &ProviderConfig,
        api_key: Option<&str>,
    ) -> Result<Arc<dyn ModelProviderClient>, ApiError> {
        if api_key.is_some() {
            let provider = config.to_model_provider(api_key)?;
            return Ok(Arc::from(ProviderFactory::create_client(&provider)?));
        }

        let key = (
            config.provider_name.clone().unwrap_or_default(),
            config.model.clone(),
        );
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&key) {
            return Ok(Arc::clone(client));
        }
        let provider = config.to_model_provider(None)?;
        let client: Arc<dyn ModelProviderClient> =
            Arc::from(ProviderFactory::create_client(&provider)?);
        debug!(provider = %key.0, model = %key.1, "Cached provider client");
        clients.insert(key, Arc::clone(&client));
        Ok(client)
    }
}

#[async_trait]
impl ModelGateway for ProviderGateway {
    async fn compose(
        &self,
        prompt: &str,
        system_prompt: &str,
        options: &ComposeOptions,
    ) -> Result<ComposeResponse, ApiError> {
        let config = self.select_provider(options)?;
        let client = self.client_for(&config, options.api_key.as_deref())?;
        let provider = config
            .provider_name
            .clone()
            .unwrap_or_else(|| client.provider_name().to_string());

        let mut completion = config.default_options.clone();
        if let Some(max_tokens) = options.max_tokens.or(self.default_max_tokens) {
            completion.max_tokens = Some(max_tokens);
        }
        if let Some(seed) = options.seed {
            completion.seed = Some(seed);
        }

        let messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(prompt)];
        let started = Instant::now();
        let response = client.complete(messages, completion).await?;

        info!(
            provider = %provider,
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            duration_ms = started.elapsed().as_millis() as u64,
            "Model call completed"
        );

        Ok(ComposeResponse {
            text: response.content,
            provider,
            model: response.model,
        })
    }
}
