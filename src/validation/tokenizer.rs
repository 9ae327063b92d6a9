//! Markup tokenizer for frame code.
//!
//! Not an HTML parser. It recognises tags, comments and declarations well enough for
//! the structural checks, and it treats the body of verbatim elements (`<kcl-code>`,
//! `<script>`, `<style>`) as opaque text so example snippets inside a code block are
//! never mistaken for real components.

/// One attribute of a start tag. Values are kept verbatim, without entity decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// A start tag such as `<kcl-chart id="c1">`. Names are lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub self_closing: bool,
    pub line: usize,
}

impl StartTag {
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }

    /// Value of the first attribute with this name; `Some("")` for a bare attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Start(StartTag),
    End { name: String, line: usize },
    /// `<!DOCTYPE html>` and friends; the name keeps its `!` prefix.
    Declaration { name: String, line: usize },
    Comment { body: &'a str, line: usize },
    Text { text: &'a str, line: usize },
    /// Body of a verbatim element, emitted between its start and end tags.
    Raw { text: &'a str, line: usize },
}

/// Byte offsets of every newline, for offset → line lookups.
struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        Self {
            newlines: source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i)
                .collect(),
        }
    }

    fn line_at(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn find_from(source: &str, from: usize, needle: &str) -> Option<usize> {
    source[from..].find(needle).map(|i| from + i)
}

fn find_closing_tag(source: &str, from: usize, name: &str) -> Option<usize> {
    let needle = format!("</{}", name);
    source[from..]
        .to_ascii_lowercase()
        .find(&needle)
        .map(|i| from + i)
}

fn read_name(bytes: &[u8], mut i: usize) -> (usize, usize) {
    let start = i;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    (start, i)
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Parse a start tag whose `<` sits at `start`. Returns the tag and the offset just
/// past its `>`, or `None` when the tag never terminates.
fn parse_start_tag(source: &str, start: usize, line: usize) -> Option<(StartTag, usize)> {
    let bytes = source.as_bytes();
    let (name_start, name_end) = read_name(bytes, start + 1);
    let name = source[name_start..name_end].to_ascii_lowercase();
    let mut attributes = Vec::new();
    let mut i = name_end;

    loop {
        i = skip_whitespace(bytes, i);
        match bytes.get(i).copied()? {
            b'>' => {
                let tag = StartTag {
                    name,
                    attributes,
                    self_closing: false,
                    line,
                };
                return Some((tag, i + 1));
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                let tag = StartTag {
                    name,
                    attributes,
                    self_closing: true,
                    line,
                };
                return Some((tag, i + 2));
            }
            b'/' => i += 1,
            _ => {
                let attr_start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'=' | b'>' | b'/')
                {
                    i += 1;
                }
                if i == attr_start {
                    // Stray '=' with no name.
                    i += 1;
                    continue;
                }
                let attr_name = source[attr_start..i].to_ascii_lowercase();
                let after_name = skip_whitespace(bytes, i);
                if bytes.get(after_name) != Some(&b'=') {
                    attributes.push(Attribute {
                        name: attr_name,
                        value: None,
                    });
                    i = after_name;
                    continue;
                }
                i = skip_whitespace(bytes, after_name + 1);
                let value = match bytes.get(i).copied()? {
                    quote @ (b'"' | b'\'') => {
                        let quote = char::from(quote).to_string();
                        let close = find_from(source, i + 1, &quote)?;
                        let value = source[i + 1..close].to_string();
                        i = close + 1;
                        value
                    }
                    _ => {
                        let value_start = i;
                        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                        {
                            i += 1;
                        }
                        source[value_start..i].to_string()
                    }
                };
                attributes.push(Attribute {
                    name: attr_name,
                    value: Some(value),
                });
            }
        }
    }
}

fn push_text<'a>(
    tokens: &mut Vec<Token<'a>>,
    source: &'a str,
    lines: &LineIndex,
    from: usize,
    to: usize,
) {
    if from < to {
        tokens.push(Token::Text {
            text: &source[from..to],
            line: lines.line_at(from),
        });
    }
}

/// Split `source` into tokens. `is_verbatim` decides which elements have opaque bodies.
pub fn tokenize<'a>(source: &'a str, is_verbatim: impl Fn(&str) -> bool) -> Vec<Token<'a>> {
    let bytes = source.as_bytes();
    let lines = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }
        let line = lines.line_at(pos);
        let next = bytes.get(pos + 1).copied();

        if source[pos..].starts_with("<!--") {
            push_text(&mut tokens, source, &lines, text_start, pos);
            let (body_end, resume) = match find_from(source, pos + 4, "-->") {
                Some(end) => (end, end + 3),
                None => (bytes.len(), bytes.len()),
            };
            tokens.push(Token::Comment {
                body: &source[pos + 4..body_end],
                line,
            });
            pos = resume;
            text_start = pos;
        } else if next == Some(b'!') && bytes.get(pos + 2).is_some_and(u8::is_ascii_alphabetic) {
            push_text(&mut tokens, source, &lines, text_start, pos);
            let (name_start, name_end) = read_name(bytes, pos + 2);
            tokens.push(Token::Declaration {
                name: format!("!{}", source[name_start..name_end].to_ascii_lowercase()),
                line,
            });
            pos = find_from(source, name_end, ">").map_or(bytes.len(), |end| end + 1);
            text_start = pos;
        } else if next == Some(b'/') && bytes.get(pos + 2).is_some_and(u8::is_ascii_alphabetic) {
            push_text(&mut tokens, source, &lines, text_start, pos);
            let (name_start, name_end) = read_name(bytes, pos + 2);
            tokens.push(Token::End {
                name: source[name_start..name_end].to_ascii_lowercase(),
                line,
            });
            pos = find_from(source, name_end, ">").map_or(bytes.len(), |end| end + 1);
            text_start = pos;
        } else if next.is_some_and(|b| b.is_ascii_alphabetic()) {
            let Some((tag, after)) = parse_start_tag(source, pos, line) else {
                // Unterminated tag: the remainder is text.
                break;
            };
            push_text(&mut tokens, source, &lines, text_start, pos);
            let verbatim = !tag.self_closing && is_verbatim(&tag.name);
            let name = tag.name.clone();
            tokens.push(Token::Start(tag));
            pos = after;
            if verbatim {
                let close = find_closing_tag(source, after, &name).unwrap_or(bytes.len());
                if close > after {
                    tokens.push(Token::Raw {
                        text: &source[after..close],
                        line: lines.line_at(after),
                    });
                }
                pos = close;
            }
            text_start = pos;
        } else {
            pos += 1;
        }
    }

    push_text(&mut tokens, source, &lines, text_start, bytes.len());
    tokens
}

/// Start tags only, in document order.
pub fn start_tags<'t>(tokens: &'t [Token<'_>]) -> impl Iterator<Item = &'t StartTag> {
    tokens.iter().filter_map(|token| match token {
        Token::Start(tag) => Some(tag),
        _ => None,
    })
}
