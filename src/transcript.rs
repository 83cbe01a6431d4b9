//! Transcript entry types and the append-only transcript log.

use chrono::{DateTime, Utc};

/// Who an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Agent,
}

/// Tag of an entry's content, for callers that do not need the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    PlainText,
    RenderedMarkup,
    SuggestionSet,
}

/// Payload of a transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    /// Raw text, displayed verbatim
    PlainText(String),
    /// Safe markup produced from agent Markdown
    RenderedMarkup(String),
    /// Ordered quick-reply labels offered by the agent
    SuggestionSet(Vec<String>),
}

impl EntryContent {
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryContent::PlainText(_) => EntryKind::PlainText,
            EntryContent::RenderedMarkup(_) => EntryKind::RenderedMarkup,
            EntryContent::SuggestionSet(_) => EntryKind::SuggestionSet,
        }
    }

    /// Text payload, if this is not a suggestion set
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EntryContent::PlainText(text) | EntryContent::RenderedMarkup(text) => Some(text),
            EntryContent::SuggestionSet(_) => None,
        }
    }

    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            EntryContent::SuggestionSet(labels) => Some(labels),
            _ => None,
        }
    }
}

/// A single immutable record in the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub content: EntryContent,
    /// Dispatch number of the turn this entry belongs to
    pub turn: u64,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(sender: Sender, content: EntryContent, turn: u64) -> Self {
        Self {
            sender,
            content,
            turn,
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.content.kind()
    }
}

/// Ordered, append-only conversation log.
///
/// Entries can only be added through the crate-private `push`; nothing hands
/// out mutable access to an entry once it is stored.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TranscriptEntry> {
        self.entries.iter()
    }

    /// Entries appended by the given turn
    pub fn turn(&self, turn: u64) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter().filter(move |entry| entry.turn == turn)
    }
}
