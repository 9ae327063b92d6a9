//! Caller-supplied generation context.

use crate::component::DEFAULT_LIBRARY_VERSION;
use crate::outline::ConversationTurn;
use crate::provider::ComposeOptions;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPOSITION_MODE: &str = "deck";

/// Everything the caller knows about the target surface, fixed for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    /// Surface the frames are generated for.
    pub surface_id: String,
    #[serde(default = "default_composition_mode")]
    pub composition_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_library_version")]
    pub library_version: String,
    /// One-line summaries of frames already on the surface.
    #[serde(default)]
    pub existing_frames: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_guidelines: Option<String>,
    /// Provider, model, seed, token budget and bring-your-own key overrides.
    #[serde(default)]
    pub model_options: ComposeOptions,
    /// Pre-rendered memory-graph context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_context: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
}

fn default_composition_mode() -> String {
    DEFAULT_COMPOSITION_MODE.to_string()
}

fn default_library_version() -> String {
    DEFAULT_LIBRARY_VERSION.to_string()
}

impl GenerationContext {
    pub fn new(surface_id: impl Into<String>) -> Self {
        Self {
            surface_id: surface_id.into(),
            composition_mode: default_composition_mode(),
            title: None,
            library_version: default_library_version(),
            existing_frames: Vec::new(),
            brand_guidelines: None,
            model_options: ComposeOptions::default(),
            memory_context: None,
            conversation_history: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.conversation_history = history;
        self
    }

    pub fn with_model_options(mut self, options: ComposeOptions) -> Self {
        self.model_options = options;
        self
    }
}
