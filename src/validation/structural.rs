//! Structural validator for a single frame.
//!
//! Every check runs on every call and findings accumulate, so one pass reports all
//! problems the model needs to fix on retry.

use crate::component::{ComponentLibrary, BINDING_ATTRIBUTE};
use crate::validation::tokenizer::{start_tags, tokenize, StartTag, Token};
use crate::validation::{IssueKind, ValidationIssue, ValidationResult};
use std::collections::HashSet;

/// Frames longer than this (in characters) draw a `large_output` warning.
pub const MAX_FRAME_CHARS: usize = 20_000;

/// A `data-for` binding found in the frame.
struct Binding<'a> {
    target: String,
    line: usize,
    /// JSON body, present only for `<script data-for>` blocks.
    payload: Option<&'a str>,
    payload_line: usize,
}

#[derive(Debug, Clone)]
pub struct StructuralValidator {
    library: ComponentLibrary,
    max_chars: usize,
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self::new(ComponentLibrary::default())
    }
}

impl StructuralValidator {
    pub fn new(library: ComponentLibrary) -> Self {
        Self {
            library,
            max_chars: MAX_FRAME_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn library(&self) -> &ComponentLibrary {
        &self.library
    }

    /// Validate one frame's markup.
    pub fn validate(&self, code: &str) -> ValidationResult {
        let mut result = ValidationResult::new();
        let tokens = tokenize(code, |name| self.library.is_verbatim(name));
        let bindings = collect_bindings(&tokens);
        let ids: HashSet<&str> = start_tags(&tokens)
            .filter_map(|tag| tag.attribute("id"))
            .filter(|id| !id.is_empty())
            .collect();

        self.check_root(code, &tokens, &mut result);
        self.check_forbidden_wrappers(&tokens, &mut result);
        self.check_whitelist(&tokens, &mut result);
        check_references(&bindings, &ids, &mut result);
        self.check_required_bindings(&tokens, &bindings, &mut result);
        check_payloads(&bindings, &mut result);
        self.check_alt_text(&tokens, &mut result);
        self.check_size(code, &mut result);

        result
    }

    fn check_root(&self, code: &str, tokens: &[Token<'_>], result: &mut ValidationResult) {
        let marker = self.library.root_marker();
        let trimmed = code.trim_start();
        let starts_with_root = trimmed.starts_with(&marker)
            && trimmed[marker.len()..]
                .chars()
                .next()
                .map_or(true, |c| c.is_whitespace() || c == '>' || c == '/');
        if starts_with_root {
            return;
        }

        let found = tokens.iter().find_map(|token| match token {
            Token::Start(tag) => Some(format!("<{}>", tag.name)),
            Token::Declaration { name, .. } => Some(format!("<{}>", name)),
            Token::Text { text, .. } if !text.trim().is_empty() => Some("text".to_string()),
            _ => None,
        });
        let message = match found {
            Some(found) => format!(
                "Frame must start with <{}> as its root element, found {}",
                self.library.root_tag, found
            ),
            None => format!(
                "Frame must start with <{}> as its root element",
                self.library.root_tag
            ),
        };
        result.push(ValidationIssue::new(IssueKind::InvalidNesting, message).at_line(1));
    }

    fn check_forbidden_wrappers(&self, tokens: &[Token<'_>], result: &mut ValidationResult) {
        for token in tokens {
            let (name, line) = match token {
                Token::Start(tag) => (tag.name.as_str(), tag.line),
                Token::Declaration { name, line } => (name.as_str(), *line),
                _ => continue,
            };
            if self.library.is_forbidden_wrapper(name) {
                result.push(
                    ValidationIssue::new(
                        IssueKind::InvalidTag,
                        format!(
                            "Document wrapper <{}> is not allowed inside a frame",
                            name.trim_start_matches('!')
                        ),
                    )
                    .at_line(line),
                );
            }
        }
    }

    fn check_whitelist(&self, tokens: &[Token<'_>], result: &mut ValidationResult) {
        for tag in start_tags(tokens) {
            if self.library.is_custom_tag(&tag.name) && !self.library.is_known(&tag.name) {
                result.push(
                    ValidationIssue::new(
                        IssueKind::InvalidTag,
                        format!("Unknown component <{}>", tag.name),
                    )
                    .at_line(tag.line),
                );
            }
        }
    }

    fn check_required_bindings(
        &self,
        tokens: &[Token<'_>],
        bindings: &[Binding<'_>],
        result: &mut ValidationResult,
    ) {
        // Only script blocks carry data; a `data-for` on any other element binds nothing.
        let bound: HashSet<&str> = bindings
            .iter()
            .filter(|b| b.payload.is_some())
            .map(|b| b.target.as_str())
            .collect();
        for tag in start_tags(tokens).filter(|tag| self.library.requires_data(&tag.name)) {
            let Some(id) = tag.attribute("id").filter(|id| !id.is_empty()) else {
                continue;
            };
            if !bound.contains(id) {
                result.push(
                    ValidationIssue::new(
                        IssueKind::EmptyContent,
                        format!(
                            "<{} id=\"{}\"> has no <script {}=\"{}\"> data block",
                            tag.name, id, BINDING_ATTRIBUTE, id
                        ),
                    )
                    .at_line(tag.line),
                );
            }
        }
    }

    fn check_alt_text(&self, tokens: &[Token<'_>], result: &mut ValidationResult) {
        for tag in start_tags(tokens) {
            if self.library.is_image(&tag.name) && !tag.has_attribute("alt") {
                result.push(
                    ValidationIssue::new(
                        IssueKind::MissingAlt,
                        format!("<{}> is missing an alt attribute", tag.name),
                    )
                    .at_line(tag.line),
                );
            }
        }
    }

    fn check_size(&self, code: &str, result: &mut ValidationResult) {
        let chars = code.chars().count();
        if chars > self.max_chars {
            result.push(ValidationIssue::new(
                IssueKind::LargeOutput,
                format!(
                    "Frame is {} characters, above the {} character limit",
                    chars, self.max_chars
                ),
            ));
        }
    }
}

fn is_script(tag: &StartTag) -> bool {
    tag.name == "script"
}

fn collect_bindings<'a>(tokens: &[Token<'a>]) -> Vec<Binding<'a>> {
    let mut bindings = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        let Token::Start(tag) = token else {
            continue;
        };
        let Some(target) = tag.attribute(BINDING_ATTRIBUTE) else {
            continue;
        };
        let (payload, payload_line) = if is_script(tag) && !tag.self_closing {
            match tokens.get(index + 1) {
                Some(Token::Raw { text, line }) => (Some(*text), *line),
                _ => (Some(""), tag.line),
            }
        } else {
            (None, tag.line)
        };
        bindings.push(Binding {
            target: target.trim().to_string(),
            line: tag.line,
            payload,
            payload_line,
        });
    }
    bindings
}

fn check_references(bindings: &[Binding<'_>], ids: &HashSet<&str>, result: &mut ValidationResult) {
    for binding in bindings {
        if !ids.contains(binding.target.as_str()) {
            result.push(
                ValidationIssue::new(
                    IssueKind::MissingDataScript,
                    format!(
                        "{}=\"{}\" references an id that does not exist in this frame",
                        BINDING_ATTRIBUTE, binding.target
                    ),
                )
                .at_line(binding.line),
            );
        }
    }
}

fn check_payloads(bindings: &[Binding<'_>], result: &mut ValidationResult) {
    for binding in bindings {
        let Some(payload) = binding.payload else {
            continue;
        };
        let body = payload.trim();
        if let Err(err) = serde_json::from_str::<serde_json::Value>(body) {
            let line = if body.is_empty() {
                binding.payload_line
            } else {
                let leading = &payload[..payload.len() - payload.trim_start().len()];
                binding.payload_line + leading.matches('\n').count() + err.line().saturating_sub(1)
            };
            result.push(
                ValidationIssue::new(
                    IssueKind::ParseError,
                    format!(
                        "Data block for \"{}\" is not valid JSON: {}",
                        binding.target, err
                    ),
                )
                .at_line(line),
            );
        }
    }
}
