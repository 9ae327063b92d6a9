//! Frames
//!
//! One frame is one unit of generated markup (one slide). Frames are built once by the
//! response parser and never mutated; the fingerprint always matches the code.

pub mod id;
pub mod parse;

pub use id::{compute_fingerprint, Fingerprint};
pub use parse::{strip_outer_fence, FrameMarkers, ResponseParser};

use crate::component::is_standard_verbatim;
use crate::validation::tokenizer::{tokenize, StartTag, Token};
use serde::{Deserialize, Serialize};

const SPEAKER_NOTES_PREFIX: &str = "speaker-notes:";

/// A parsed frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub code: String,
    pub fingerprint: Fingerprint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative_html: Option<String>,
}

impl Frame {
    /// Build a frame from final code with no narrative.
    pub fn from_code(code: String) -> Self {
        Self::with_narrative(code, None)
    }

    /// Build a frame from final code, deriving fingerprint, title and speaker notes.
    pub fn with_narrative(code: String, narrative_html: Option<String>) -> Self {
        let tokens = tokenize(&code, is_standard_verbatim);
        let title = extract_title(&tokens);
        let speaker_notes = extract_speaker_notes(&tokens);
        Frame {
            fingerprint: compute_fingerprint(&code),
            code,
            title,
            speaker_notes,
            narrative_html,
        }
    }

    /// Short description used when telling the model about frames that already exist.
    pub fn summary(&self, index: usize) -> String {
        match &self.title {
            Some(title) => format!("Frame {}: {}", index + 1, title),
            None => format!("Frame {}: (untitled)", index + 1),
        }
    }
}

fn is_level_one_heading(tag: &StartTag) -> bool {
    match tag.name.as_str() {
        "h1" => true,
        "kcl-text" => tag
            .attribute("level")
            .is_some_and(|level| level.eq_ignore_ascii_case("h1") || level == "1"),
        _ => false,
    }
}

/// Text of the first level-1 heading, whitespace collapsed.
fn extract_title(tokens: &[Token<'_>]) -> Option<String> {
    let (start, heading) = tokens.iter().enumerate().find_map(|(i, token)| match token {
        Token::Start(tag) if is_level_one_heading(tag) => Some((i, tag)),
        _ => None,
    })?;
    if heading.self_closing {
        return None;
    }

    let mut text = String::new();
    let mut depth = 0usize;
    for token in &tokens[start + 1..] {
        match token {
            Token::Text { text: chunk, .. } => {
                text.push_str(chunk);
                text.push(' ');
            }
            Token::Start(tag) if tag.name == heading.name && !tag.self_closing => depth += 1,
            Token::End { name, .. } if *name == heading.name => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    let title = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

/// Body of the first `<!-- speaker-notes: ... -->` comment.
fn extract_speaker_notes(tokens: &[Token<'_>]) -> Option<String> {
    tokens.iter().find_map(|token| {
        let Token::Comment { body, .. } = token else {
            return None;
        };
        let body = body.trim();
        if !body.to_ascii_lowercase().starts_with(SPEAKER_NOTES_PREFIX) {
            return None;
        }
        let notes = body[SPEAKER_NOTES_PREFIX.len()..].trim();
        (!notes.is_empty()).then(|| notes.to_string())
    })
}
