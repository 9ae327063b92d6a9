//! Shared helpers: a scripted model gateway and environment isolation.

use async_trait::async_trait;
use kcl_compose::error::ApiError;
use kcl_compose::prompt::DefaultPromptBuilder;
use kcl_compose::provider::{ComposeOptions, ComposeResponse, ModelGateway};
use kcl_compose::RetryOrchestrator;
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded gateway call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub system_prompt: String,
    pub options: ComposeOptions,
}

/// Replays canned responses in order; the last one repeats once the script runs out.
pub struct ScriptedGateway {
    responses: Vec<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub fn new(responses: &[&str]) -> Arc<Self> {
        assert!(!responses.is_empty(), "script needs at least one response");
        Arc::new(Self {
            responses: responses.iter().map(|r| r.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn compose(
        &self,
        prompt: &str,
        system_prompt: &str,
        options: &ComposeOptions,
    ) -> Result<ComposeResponse, ApiError> {
        let mut calls = self.calls.lock();
        let index = calls.len().min(self.responses.len() - 1);
        calls.push(RecordedCall {
            prompt: prompt.to_string(),
            system_prompt: system_prompt.to_string(),
            options: options.clone(),
        });
        Ok(ComposeResponse {
            text: self.responses[index].clone(),
            provider: "scripted".to_string(),
            model: "script-1".to_string(),
        })
    }
}

/// Gateway that always fails, for error propagation checks.
pub struct FailingGateway;

#[async_trait]
impl ModelGateway for FailingGateway {
    async fn compose(
        &self,
        _prompt: &str,
        _system_prompt: &str,
        _options: &ComposeOptions,
    ) -> Result<ComposeResponse, ApiError> {
        Err(ApiError::ProviderRateLimit("slow down".to_string()))
    }
}

pub fn orchestrator(gateway: Arc<dyn ModelGateway>) -> RetryOrchestrator {
    RetryOrchestrator::new(gateway, Arc::new(DefaultPromptBuilder::new()))
}

/// Serializes tests that touch process environment variables.
pub static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Environment variables to restore after a test.
pub struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            saved: keys
                .iter()
                .map(|key| (key.to_string(), std::env::var(key).ok()))
                .collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}
