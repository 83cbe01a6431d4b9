use uuid::Uuid;

use crate::transcript::{EntryContent, Sender, Transcript, TranscriptEntry};

/// State of one chat session, discarded when the process exits
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    transcript: Transcript,
    draft: String,
    request_in_flight: bool,
    turns: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: Transcript::new(),
            draft: String::new(),
            request_in_flight: false,
            turns: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn request_in_flight(&self) -> bool {
        self.request_in_flight
    }

    pub(crate) fn set_request_in_flight(&mut self, in_flight: bool) {
        self.request_in_flight = in_flight;
    }

    pub(crate) fn clear_draft(&mut self) {
        self.draft.clear();
    }

    /// Record the user's side of a new turn and return its number
    pub(crate) fn begin_turn(&mut self, text: String) -> u64 {
        self.turns += 1;
        self.transcript.push(TranscriptEntry::new(
            Sender::User,
            EntryContent::PlainText(text),
            self.turns,
        ));
        self.turns
    }

    pub(crate) fn push_agent(&mut self, turn: u64, content: EntryContent) {
        self.transcript
            .push(TranscriptEntry::new(Sender::Agent, content, turn));
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
