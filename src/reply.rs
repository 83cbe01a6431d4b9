//! Parsing of agent replies into display text and quick-reply suggestions.
//!
//! Agents may end a reply with a directive of the form
//! `BUTTONS: first, second, third`. The marker is case-insensitive and the
//! directive runs from the first marker to the end of the reply.

use once_cell::sync::Lazy;
use regex::Regex;

static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)BUTTONS:(.*)\z").expect("directive pattern is valid"));

/// A reply split into the text to render and the offered suggestions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedReply {
    pub display_text: String,
    pub suggestions: Vec<String>,
}

impl ParsedReply {
    pub fn has_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }
}

/// Split a raw reply into display text and suggestion labels.
///
/// Never fails: a missing or empty directive yields no suggestions.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let Some(captures) = DIRECTIVE.captures(raw) else {
        return ParsedReply {
            display_text: raw.to_string(),
            suggestions: Vec::new(),
        };
    };

    let directive = captures.get(0).map_or(raw.len(), |m| m.start());
    let labels = captures.get(1).map_or("", |m| m.as_str());

    ParsedReply {
        display_text: raw[..directive].trim().to_string(),
        suggestions: split_labels(labels),
    }
}

// Stray commas would otherwise produce blank buttons.
fn split_labels(labels: &str) -> Vec<String> {
    labels
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}
