//! Response sanitizer
//!
//! Recovers a JSON object from free-form model output. The model is asked for
//! JSON but regularly wraps it in prose or writes literal quotes inside
//! string values (`the "Capital of Chocolate"`). Extraction takes the span
//! between the object's braces, then two scans escape quotes that cannot be
//! structural: the first over key strings, the second over value strings.
//!
//! A quote inside a key is treated as closing only when the next
//! non-whitespace character is `:`. A quote inside a value is closing when it
//! is followed by `}`, `]`, the end of the text, or a `,` that introduces
//! another JSON token. Everything else is escaped.
//!
//! Known false positive: a value containing a quote, a comma and another
//! quote (`he said "stop", "go" now`) reads like two fields and gets split at
//! the comma. The result then fails to parse or carries a wrong value; no
//! further repair is attempted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{Result, TravelerError};

/// How the object span is located inside the raw text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryRule {
    /// First `{` to last `}`. Over-captures if the model appends a second
    /// example object after its answer.
    #[default]
    Outermost,
    /// First `{` to its matching `}`, ignoring braces inside strings. Falls
    /// back to [`BoundaryRule::Outermost`] when the braces never balance.
    Balanced,
}

/// Extracts and repairs model output into JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer {
    boundary: BoundaryRule,
}

impl Sanitizer {
    #[must_use]
    pub fn new(boundary: BoundaryRule) -> Self {
        Self { boundary }
    }

    /// Extract the object span, escape stray quotes and parse it
    pub fn sanitize_and_extract(&self, raw: &str) -> Result<Value> {
        let span = extract_object_span(raw, self.boundary)?;
        let repaired = repair_quotes(span);
        if repaired.len() != span.len() {
            debug!(
                escaped = repaired.len() - span.len(),
                "Escaped inner quotes in model response"
            );
        }

        serde_json::from_str(&repaired).map_err(|source| {
            debug!(error = %source, "Repaired model response is still not valid JSON");
            TravelerError::UnparseableJson { source }
        })
    }
}

/// Sanitize with the default [`BoundaryRule::Outermost`] rule
pub fn sanitize_and_extract(raw: &str) -> Result<Value> {
    Sanitizer::default().sanitize_and_extract(raw)
}

/// Locate the `{ ... }` span in `raw`, inclusive of both braces
pub fn extract_object_span(raw: &str, rule: BoundaryRule) -> Result<&str> {
    let start = raw
        .find('{')
        .ok_or_else(|| TravelerError::no_object_boundary("no opening brace"))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| TravelerError::no_object_boundary("no closing brace"))?;
    if end < start {
        return Err(TravelerError::no_object_boundary(
            "closing brace appears before the opening brace",
        ));
    }

    let end = match rule {
        BoundaryRule::Outermost => end,
        BoundaryRule::Balanced => matching_brace(raw, start).unwrap_or(end),
    };
    Ok(&raw[start..=end])
}

/// Byte index of the `}` closing the object that opens at `start`
fn matching_brace(raw: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + idx);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Key,
    Value,
}

/// Escape quotes nested inside keys, then inside values
#[must_use]
pub fn repair_quotes(span: &str) -> String {
    let keys_repaired = escape_inner_quotes(span, Role::Key);
    escape_inner_quotes(&keys_repaired, Role::Value)
}

/// One scan over `text`, escaping inner quotes of strings in the `target` role.
/// Strings of the other role are still walked with their own closing rule so
/// structure stays in sync, but are copied verbatim.
fn escape_inner_quotes(text: &str, target: Role) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut containers: Vec<char> = Vec::new();
    let mut previous: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            let role = role_at(previous, containers.last().copied());
            i = copy_string(&chars, i, role, role == target, &mut out);
            previous = Some('"');
            continue;
        }

        match c {
            '{' | '[' => containers.push(c),
            '}' | ']' => {
                containers.pop();
            }
            _ => {}
        }
        if !c.is_whitespace() {
            previous = Some(c);
        }
        out.push(c);
        i += 1;
    }
    out
}

fn role_at(previous: Option<char>, container: Option<char>) -> Role {
    match previous {
        Some('{') => Role::Key,
        Some(',') if container == Some('{') => Role::Key,
        _ => Role::Value,
    }
}

/// Copy the string opening at `open` into `out`; returns the index after it
fn copy_string(chars: &[char], open: usize, role: Role, escape: bool, out: &mut String) -> usize {
    out.push('"');
    let mut j = open + 1;

    while j < chars.len() {
        match chars[j] {
            '\\' => {
                out.push('\\');
                if let Some(&next) = chars.get(j + 1) {
                    out.push(next);
                }
                j += 2;
            }
            '"' if closes(chars, j + 1, role) => {
                out.push('"');
                return j + 1;
            }
            '"' => {
                if escape {
                    out.push('\\');
                }
                out.push('"');
                j += 1;
            }
            c => {
                out.push(c);
                j += 1;
            }
        }
    }
    // unterminated, left for the parser to reject
    chars.len()
}

/// Whether a quote followed by `chars[from..]` ends a string of `role`
fn closes(chars: &[char], from: usize, role: Role) -> bool {
    let Some(next) = next_significant(chars, from) else {
        return true;
    };
    match (role, chars[next]) {
        (Role::Key, ':') => true,
        (Role::Key, _) => false,
        (Role::Value, '}' | ']') => true,
        (Role::Value, ',') => {
            next_significant(chars, next + 1).is_none_or(|k| starts_token(chars[k]))
        }
        (Role::Value, _) => false,
    }
}

fn next_significant(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len()).find(|&k| !chars[k].is_whitespace())
}

fn starts_token(c: char) -> bool {
    matches!(c, '"' | '{' | '[' | ']' | '}' | '-' | 't' | 'f' | 'n') || c.is_ascii_digit()
}
