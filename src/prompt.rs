//! Prompt construction.
//!
//! The orchestrator calls a [`PromptBuilder`] once per attempt for each of the system
//! and user prompts. Builders are pure string functions.

use crate::component::ComponentLibrary;
use crate::frame::FrameMarkers;
use crate::generation::ComposeAction;
use crate::outline::{OutlinePhase, OutlinePhaseResult};
use serde::{Deserialize, Serialize};

const DEFAULT_PREAMBLE: &str = "You are a presentation composer. You write slides as KCL \
component markup that a browser renderer turns into finished frames.";

/// Validation feedback carried into a retry attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryFeedback {
    /// Retry number, starting at 1.
    pub attempt: usize,
    /// Blocking error messages from the previous attempt. Warnings are never included.
    pub errors: Vec<String>,
}

impl RetryFeedback {
    pub fn render(&self) -> String {
        let mut block = format!(
            "RETRY {}: your previous response failed validation. Fix every error below and \
             return the complete corrected response.\n",
            self.attempt
        );
        for error in &self.errors {
            block.push_str("- ");
            block.push_str(error);
            block.push('\n');
        }
        block
    }
}

/// Inputs to the system prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub library: &'a ComponentLibrary,
    pub library_version: &'a str,
    pub markers: &'a FrameMarkers,
    pub composition_mode: &'a str,
    pub brand_guidelines: Option<&'a str>,
    pub memory_context: Option<&'a str>,
    /// Present only when outline detection ran for this call.
    pub outline: Option<&'a OutlinePhaseResult>,
    pub retry: Option<&'a RetryFeedback>,
}

/// Inputs to the user prompt.
#[derive(Debug, Clone, Copy)]
pub struct UserPromptParams<'a> {
    pub action: ComposeAction,
    pub prompt: &'a str,
    pub title: Option<&'a str>,
    pub existing_frames: &'a [String],
    pub existing_code: Option<&'a str>,
    pub retry: Option<&'a RetryFeedback>,
}

pub trait PromptBuilder: Send + Sync {
    fn build_system_prompt(&self, action: ComposeAction, context: &PromptContext<'_>) -> String;

    fn build_user_prompt(&self, params: &UserPromptParams<'_>) -> String;
}

/// Built-in templates.
#[derive(Debug, Clone, Default)]
pub struct DefaultPromptBuilder {
    preamble: Option<String>,
}

impl DefaultPromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the opening paragraph of every system prompt.
    pub fn with_preamble(preamble: Option<String>) -> Self {
        Self { preamble }
    }

    fn vocabulary_section(context: &PromptContext<'_>) -> String {
        let library = context.library;
        let names = |set: &std::collections::BTreeSet<String>| {
            set.iter()
                .map(|name| format!("<{}>", name))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "## Component library v{version}\n\
             Allowed components: {all}\n\
             Data components: {data}. When one of them has an id, follow it with \
             <script type=\"application/json\" {binding}=\"ID\"> holding valid JSON.\n",
            version = context.library_version,
            all = names(&library.components),
            data = names(&library.data_required),
            binding = crate::component::BINDING_ATTRIBUTE,
        )
    }

    fn rules_section(context: &PromptContext<'_>) -> String {
        let library = context.library;
        let markers = context.markers;
        let images = library
            .image_components
            .iter()
            .map(|name| format!("<{}>", name))
            .collect::<Vec<_>>()
            .join(", ");
        let wrappers = library
            .forbidden_wrappers
            .iter()
            .map(|name| format!("<{}>", name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "## Rules\n\
             - Every frame starts with <{root}> and ends with </{root}>.\n\
             - Never emit document wrappers ({wrappers}).\n\
             - Every {images} carries an alt attribute.\n\
             - Separate frames with a line containing exactly {separator}\n\
             - Optional narrative for a frame goes before it, between {start} and {end}.\n\
             - Speaker notes go in an <!-- speaker-notes: ... --> comment inside the frame.\n\
             - Aim for at least five components per frame, including one data component.\n",
            root = library.root_tag,
            wrappers = wrappers,
            images = images,
            separator = markers.separator,
            start = markers.narrative_start,
            end = markers.narrative_end,
        )
    }

    fn outline_section(outline: &OutlinePhaseResult) -> String {
        match outline.phase {
            OutlinePhase::NeedsOutline => "## Outline first\n\
                 Do not write any markup yet. Reply in plain text with a heading \
                 \"## Proposed Outline\" followed by numbered items in the form \
                 \"1. **Frame title** - one-line summary\", then ask the user to confirm \
                 or adjust it.\n"
                .to_string(),
            OutlinePhase::OutlineRevision => format!(
                "## Revise the outline\n\
                 The user wants changes to the outline below. Do not write any markup. \
                 Reply with the full revised outline in the same format and ask for \
                 confirmation again.\n\nCurrent outline:\n{}\n",
                outline.previous_outline_text.as_deref().unwrap_or("(not available)")
            ),
            OutlinePhase::OutlineConfirmed => format!(
                "## Confirmed outline\n\
                 The user approved this outline. Generate one frame per item, in order.\n\n{}\n",
                outline.confirmed_outline_text.as_deref().unwrap_or("")
            ),
            OutlinePhase::SkipOutline => {
                "## No outline\nThe user asked to skip the outline. Generate frames directly.\n"
                    .to_string()
            }
        }
    }

    fn action_section(action: ComposeAction) -> &'static str {
        match action {
            ComposeAction::Generate => "## Task\nCreate new frames for the instruction.\n",
            ComposeAction::Edit => {
                "## Task\nRewrite the existing frame to apply the instruction. Return the \
                 whole frame, not a diff.\n"
            }
            ComposeAction::Style => {
                "## Task\nRestyle the existing frame. Keep its text and data unchanged; \
                 change only layout, emphasis and visual treatment. Return the whole frame.\n"
            }
        }
    }
}

impl PromptBuilder for DefaultPromptBuilder {
    fn build_system_prompt(&self, action: ComposeAction, context: &PromptContext<'_>) -> String {
        let mut sections = vec![
            format!("{}\n", self.preamble.as_deref().unwrap_or(DEFAULT_PREAMBLE)),
            Self::vocabulary_section(context),
            Self::rules_section(context),
            format!("## Composition mode\n{}\n", context.composition_mode),
            Self::action_section(action).to_string(),
        ];
        if let Some(outline) = context.outline {
            sections.push(Self::outline_section(outline));
        }
        if let Some(brand) = context.brand_guidelines.filter(|b| !b.trim().is_empty()) {
            sections.push(format!("## Brand guidelines\n{}\n", brand.trim()));
        }
        if let Some(memory) = context.memory_context.filter(|m| !m.trim().is_empty()) {
            sections.push(format!("## Known context\n{}\n", memory.trim()));
        }
        if let Some(retry) = context.retry {
            sections.push(format!(
                "## Retry\nThis is retry {}. The previous response had {} blocking error(s).\n",
                retry.attempt,
                retry.errors.len()
            ));
        }
        sections.join("\n")
    }

    fn build_user_prompt(&self, params: &UserPromptParams<'_>) -> String {
        let mut prompt = format!("Action: {}\n", params.action);
        if let Some(title) = params.title {
            prompt.push_str(&format!("Title: {}\n", title));
        }
        if !params.existing_frames.is_empty() {
            prompt.push_str("\nExisting frames:\n");
            for summary in params.existing_frames {
                prompt.push_str(&format!("- {}\n", summary));
            }
        }
        if let Some(code) = params.existing_code {
            prompt.push_str(&format!("\nCurrent frame:\n```html\n{}\n```\n", code.trim()));
        }
        prompt.push_str(&format!("\nInstruction:\n{}\n", params.prompt.trim()));
        if let Some(retry) = params.retry {
            prompt.push('\n');
            prompt.push_str(&retry.render());
        }
        prompt
    }
}
