//! Outline Phase Detection
//!
//! Decides where a conversation stands in the outline-then-generate workflow: does the
//! model still need to propose an outline, has the user accepted one, asked to change
//! it, or asked to skip the outline altogether. Pure; no I/O.
//!
//! Known limitation: modification words override confirmation unconditionally, so a
//! reply such as "actually, looks good" is read as a revision request.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Replies shorter than this are treated as quick acknowledgements in logs.
pub const SHORT_REPLY_CHARS: usize = 40;

const SKIP_PHRASES: &[&str] = &[
    "skip the outline",
    "skip outline",
    "skip outlining",
    "no outline",
    "without an outline",
    "without outline",
    "don't need an outline",
    "just generate",
    "just build",
    "just create",
    "just make",
    "generate directly",
    "go straight to",
];

const CONFIRMATION_PHRASES: &[&str] = &[
    "yes",
    "yep",
    "yeah",
    "yup",
    "sure",
    "ok",
    "okay",
    "looks good",
    "look good",
    "sounds good",
    "looks great",
    "perfect",
    "great",
    "go ahead",
    "go for it",
    "proceed",
    "approve",
    "approved",
    "confirm",
    "confirmed",
    "lgtm",
    "do it",
    "let's go",
    "ship it",
    "that works",
    "good to go",
    "generate it",
    "generate them",
    "build it",
];

const MODIFICATION_PHRASES: &[&str] = &[
    "but",
    "change",
    "add",
    "remove",
    "instead",
    "replace",
    "modify",
    "adjust",
    "actually",
    "however",
    "except",
    "swap",
    "rename",
    "reorder",
    "drop",
    "delete",
    "update",
    "tweak",
    "without",
];

const OUTLINE_HEADING_LABELS: &[&str] = &["outline"];

/// Who said a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlinePhase {
    NeedsOutline,
    OutlineConfirmed,
    OutlineRevision,
    SkipOutline,
}

impl OutlinePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            OutlinePhase::NeedsOutline => "needs_outline",
            OutlinePhase::OutlineConfirmed => "outline_confirmed",
            OutlinePhase::OutlineRevision => "outline_revision",
            OutlinePhase::SkipOutline => "skip_outline",
        }
    }

    /// Phases where the expected model reply is an outline, not frames.
    pub fn expects_outline(self) -> bool {
        matches!(self, OutlinePhase::NeedsOutline | OutlinePhase::OutlineRevision)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlinePhaseResult {
    pub phase: OutlinePhase,
    /// The accepted outline, set only for `outline_confirmed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_outline_text: Option<String>,
    /// The outline being revised, set only for `outline_revision`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_outline_text: Option<String>,
}

impl OutlinePhaseResult {
    fn bare(phase: OutlinePhase) -> Self {
        Self {
            phase,
            confirmed_outline_text: None,
            previous_outline_text: None,
        }
    }
}

/// Words of `text`, lowercased, split on anything that is not alphanumeric or an
/// apostrophe. Typographic apostrophes are folded to ASCII.
fn normalize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|word| word.trim_matches('\''))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// A list of words and multi-word phrases matched on whole-word boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseList {
    phrases: Vec<Vec<String>>,
}

impl PhraseList {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|phrase| normalize_words(phrase.as_ref()))
                .filter(|words| !words.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let words = normalize_words(text);
        self.phrases
            .iter()
            .any(|phrase| words.windows(phrase.len()).any(|window| window == phrase.as_slice()))
    }
}

/// Word tables driving phase detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLexicon {
    pub skip: PhraseList,
    pub confirmation: PhraseList,
    pub modification: PhraseList,
    /// Labels that make a heading line an outline heading.
    pub heading_labels: PhraseList,
}

impl Default for OutlineLexicon {
    fn default() -> Self {
        Self {
            skip: PhraseList::new(SKIP_PHRASES),
            confirmation: PhraseList::new(CONFIRMATION_PHRASES),
            modification: PhraseList::new(MODIFICATION_PHRASES),
            heading_labels: PhraseList::new(OUTLINE_HEADING_LABELS),
        }
    }
}

/// `1. **Title**` or `2) **Title**`.
fn is_numbered_bold_item(line: &str) -> bool {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return false;
    }
    let rest = &line[digits..];
    let Some(after_mark) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) else {
        return false;
    };
    after_mark.starts_with(char::is_whitespace) && after_mark.trim_start().starts_with("**")
}

#[derive(Debug, Clone, Default)]
pub struct OutlinePhaseDetector {
    lexicon: OutlineLexicon,
}

impl OutlinePhaseDetector {
    pub fn new(lexicon: OutlineLexicon) -> Self {
        Self { lexicon }
    }

    /// Whether an assistant message reads as an outline proposal.
    pub fn is_outline(&self, text: &str) -> bool {
        text.lines().map(str::trim_start).any(|line| {
            if is_numbered_bold_item(line) {
                return true;
            }
            let heading = if line.starts_with('#') || line.starts_with("**") {
                Some(line)
            } else {
                line.split_once(':').map(|(label, _)| label)
            };
            heading.is_some_and(|heading| self.lexicon.heading_labels.matches(heading))
        })
    }

    /// Classify the conversation.
    pub fn detect(&self, history: &[ConversationTurn], prompt: &str) -> OutlinePhaseResult {
        if self.lexicon.skip.matches(prompt) {
            debug!(phase = "skip_outline", "Outline skipped by request");
            return OutlinePhaseResult::bare(OutlinePhase::SkipOutline);
        }
        if history.is_empty() {
            return OutlinePhaseResult::bare(OutlinePhase::NeedsOutline);
        }

        let Some(outline) = history
            .iter()
            .rev()
            .find(|turn| turn.role == TurnRole::Assistant && self.is_outline(&turn.content))
        else {
            return OutlinePhaseResult::bare(OutlinePhase::NeedsOutline);
        };

        let confirms = self.lexicon.confirmation.matches(prompt);
        let modifies = self.lexicon.modification.matches(prompt);
        let prompt_chars = prompt.trim().chars().count();
        debug!(
            confirms,
            modifies,
            short_reply = prompt_chars < SHORT_REPLY_CHARS,
            "Outline reply classified"
        );

        if confirms && !modifies {
            OutlinePhaseResult {
                phase: OutlinePhase::OutlineConfirmed,
                confirmed_outline_text: Some(outline.content.clone()),
                previous_outline_text: None,
            }
        } else {
            OutlinePhaseResult {
                phase: OutlinePhase::OutlineRevision,
                confirmed_outline_text: None,
                previous_outline_text: Some(outline.content.clone()),
            }
        }
    }
}
