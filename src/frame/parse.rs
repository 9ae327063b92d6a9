//! Response parser: raw model output → ordered frames.
//!
//! Pure and deterministic. The parser never rejects input; anything that is not a
//! well-formed frame is left for the structural validator to report.

use crate::component::ROOT_TAG;
use crate::frame::Frame;

pub const FRAME_SEPARATOR: &str = "<!-- FRAME_SEPARATOR -->";
pub const NARRATIVE_START: &str = "<!-- NARRATIVE_START -->";
pub const NARRATIVE_END: &str = "<!-- NARRATIVE_END -->";

const FENCE: &str = "```";

/// Literal markers the parser splits and extracts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMarkers {
    pub separator: String,
    pub narrative_start: String,
    pub narrative_end: String,
    /// Opening of the root container; narrative must appear before it.
    pub root_marker: String,
}

impl Default for FrameMarkers {
    fn default() -> Self {
        Self {
            separator: FRAME_SEPARATOR.to_string(),
            narrative_start: NARRATIVE_START.to_string(),
            narrative_end: NARRATIVE_END.to_string(),
            root_marker: format!("<{}", ROOT_TAG),
        }
    }
}

/// Strip one fenced block when the whole text is exactly one fenced block.
///
/// The opening fence line (including any language tag) and the closing fence are
/// removed. Text with additional fences inside is returned unchanged.
pub fn strip_outer_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.len() < 2 * FENCE.len() || !trimmed.starts_with(FENCE) || !trimmed.ends_with(FENCE)
    {
        return text;
    }
    let Some(newline) = trimmed.find('\n') else {
        return text;
    };
    let close = trimmed.len() - FENCE.len();
    if newline >= close {
        return text;
    }
    let inner = &trimmed[newline + 1..close];
    if inner.contains(FENCE) {
        return text;
    }
    inner
}

#[derive(Debug, Clone, Default)]
pub struct ResponseParser {
    markers: FrameMarkers,
}

impl ResponseParser {
    pub fn new(markers: FrameMarkers) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &FrameMarkers {
        &self.markers
    }

    /// Split a raw response into frames, preserving order.
    pub fn parse(&self, raw: &str) -> Vec<Frame> {
        let body = strip_outer_fence(raw);
        let mut frames: Vec<Frame> = body
            .split(self.markers.separator.as_str())
            .map(str::trim)
            .filter(|candidate| !candidate.is_empty())
            .map(|candidate| self.parse_candidate(candidate))
            .collect();

        if frames.is_empty() && !raw.is_empty() {
            frames.push(self.parse_candidate(body.trim()));
        }
        frames
    }

    fn parse_candidate(&self, candidate: &str) -> Frame {
        let unfenced = strip_outer_fence(candidate);
        let (narrative_html, rest) = self.extract_narrative(unfenced);
        let code = strip_outer_fence(&rest).trim().to_string();
        Frame::with_narrative(code, narrative_html)
    }

    /// Pull a leading narrative block out of the candidate. The block only counts when
    /// both markers are present and the start marker precedes the frame's root element.
    fn extract_narrative(&self, text: &str) -> (Option<String>, String) {
        let start_marker = self.markers.narrative_start.as_str();
        let end_marker = self.markers.narrative_end.as_str();

        let Some(start) = text.find(start_marker) else {
            return (None, text.to_string());
        };
        if text
            .find(self.markers.root_marker.as_str())
            .is_some_and(|root| root < start)
        {
            return (None, text.to_string());
        }
        let content_start = start + start_marker.len();
        let Some(end) = text[content_start..].find(end_marker).map(|i| content_start + i) else {
            return (None, text.to_string());
        };

        let narrative = text[content_start..end].trim();
        let rest = format!("{}{}", &text[..start], &text[end + end_marker.len()..]);
        let narrative = (!narrative.is_empty()).then(|| narrative.to_string());
        (narrative, rest.trim().to_string())
    }
}
