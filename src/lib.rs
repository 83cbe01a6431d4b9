//! Terminal chat client for a document-grounded poetry agent.
//!
//! The [`controller`] owns the chat session and the single-flight request
//! lifecycle; [`reply`] splits agent replies into display text and quick-reply
//! suggestions; [`backend`] talks to the remote chat service.

pub mod backend;
pub mod commands;
pub mod config;
pub mod controller;
pub mod logging;
pub mod markup;
pub mod reply;
pub mod session;
pub mod transcript;
pub mod ui;

pub use backend::{BackendError, ChatBackend, HttpBackend};
pub use controller::{ConversationController, DispatchStatus};
pub use reply::{ParsedReply, parse_reply};
pub use transcript::{EntryContent, EntryKind, Sender, Transcript, TranscriptEntry};
