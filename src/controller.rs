//! Conversation controller: single-flight request lifecycle over a chat session.
//!
//! Every user action becomes exactly one outbound request. The request runs on
//! the tokio runtime as a task; its result is folded back into the transcript
//! by [`ConversationController::poll_settlement`] (once per UI tick) or
//! [`ConversationController::wait_for_settlement`] (headless callers).

use std::sync::Arc;

use futures::FutureExt;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{BackendError, ChatBackend};
use crate::markup::render_markdown;
use crate::reply::parse_reply;
use crate::session::ChatSession;
use crate::transcript::{EntryContent, Transcript};

/// What happened to a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Request is in flight and will settle later
    Sent,
    /// Text was blank; nothing happened
    Blank,
    /// A request is already in flight; nothing happened
    Busy,
    /// No backend address; the configuration error is already in the transcript
    NotConfigured,
}

struct PendingRequest {
    turn: u64,
    handle: JoinHandle<Result<String, BackendError>>,
}

/// Owns the session and turns user actions into backend requests
pub struct ConversationController {
    session: ChatSession,
    backend: Option<Arc<dyn ChatBackend>>,
    pending: Option<PendingRequest>,
}

impl ConversationController {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>) -> Self {
        Self {
            session: ChatSession::new(),
            backend,
            pending: None,
        }
    }

    pub fn with_backend(backend: impl ChatBackend + 'static) -> Self {
        Self::new(Some(Arc::new(backend)))
    }

    /// Controller whose backend address is unknown
    pub fn unconfigured() -> Self {
        Self::new(None)
    }

    pub fn session_id(&self) -> Uuid {
        self.session.id()
    }

    pub fn transcript(&self) -> &Transcript {
        self.session.transcript()
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.session.request_in_flight()
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn draft(&self) -> &str {
        self.session.draft()
    }

    pub fn draft_mut(&mut self) -> &mut String {
        self.session.draft_mut()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        *self.session.draft_mut() = text.into();
    }

    /// Labels of the suggestion set ending the transcript, if any
    pub fn latest_suggestions(&self) -> Option<&[String]> {
        self.transcript()
            .last()
            .and_then(|entry| entry.content.suggestions())
    }

    /// Send typed text. Must be called from within a tokio runtime.
    pub fn submit_typed_message(&mut self, text: &str) -> DispatchStatus {
        self.submit(text, true)
    }

    /// Send the current draft as typed text
    pub fn submit_draft(&mut self) -> DispatchStatus {
        let text = self.session.draft().to_string();
        self.submit_typed_message(&text)
    }

    /// Send a suggestion label as if typed; the draft is left alone
    pub fn select_suggestion(&mut self, label: &str) -> DispatchStatus {
        self.submit(label, false)
    }

    /// Apply the in-flight request's outcome if it has finished.
    ///
    /// Returns true when a request settled during this call.
    pub fn poll_settlement(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let Some(joined) = (&mut pending.handle).now_or_never() else {
            return false;
        };
        let turn = pending.turn;
        self.pending = None;
        self.settle(turn, flatten(joined));
        true
    }

    /// Wait for the in-flight request, if any, and apply its outcome
    pub async fn wait_for_settlement(&mut self) -> bool {
        let joined = match self.pending.as_mut() {
            Some(pending) => (&mut pending.handle).await,
            None => return false,
        };
        if let Some(pending) = self.pending.take() {
            self.settle(pending.turn, flatten(joined));
        }
        true
    }

    fn submit(&mut self, text: &str, from_draft: bool) -> DispatchStatus {
        let text = text.trim();
        if text.is_empty() {
            return DispatchStatus::Blank;
        }
        if self.session.request_in_flight() {
            debug!(session = %self.session.id(), "submission rejected, request in flight");
            return DispatchStatus::Busy;
        }

        let turn = self.session.begin_turn(text.to_string());
        if from_draft {
            self.session.clear_draft();
        }
        self.dispatch(turn, text.to_string())
    }

    fn dispatch(&mut self, turn: u64, query: String) -> DispatchStatus {
        self.session.set_request_in_flight(true);

        let Some(backend) = self.backend.clone() else {
            warn!(session = %self.session.id(), turn, "backend URL is not set, skipping request");
            self.settle(turn, Err(BackendError::NotConfigured));
            return DispatchStatus::NotConfigured;
        };

        info!(
            session = %self.session.id(),
            turn,
            chars = query.chars().count(),
            "dispatching chat request"
        );
        let handle = tokio::spawn(async move { backend.send(&query).await });
        self.pending = Some(PendingRequest { turn, handle });
        DispatchStatus::Sent
    }

    fn settle(&mut self, turn: u64, outcome: Result<String, BackendError>) {
        let session_id = self.session.id();
        let mut guard = InFlightGuard(&mut self.session);

        match outcome {
            Ok(reply) => {
                let parsed = parse_reply(&reply);
                debug!(
                    session = %session_id,
                    turn,
                    suggestions = parsed.suggestions.len(),
                    "chat request settled"
                );
                let markup = render_markdown(&parsed.display_text);
                guard.0.push_agent(turn, EntryContent::RenderedMarkup(markup));
                if parsed.has_suggestions() {
                    guard
                        .0
                        .push_agent(turn, EntryContent::SuggestionSet(parsed.suggestions));
                }
            }
            Err(err) => {
                warn!(session = %session_id, turn, error = %err, "chat request failed");
                guard
                    .0
                    .push_agent(turn, EntryContent::PlainText(err.transcript_message()));
            }
        }
    }
}

/// Clears the in-flight flag on every exit path, unwinding included
struct InFlightGuard<'a>(&'a mut ChatSession);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.set_request_in_flight(false);
    }
}

fn flatten(
    joined: Result<Result<String, BackendError>, JoinError>,
) -> Result<String, BackendError> {
    joined.unwrap_or_else(|err| Err(BackendError::Aborted(err.to_string())))
}
