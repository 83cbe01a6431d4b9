use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Notify;
use versechat::backend::{BackendError, ChatBackend};
use versechat::controller::ConversationController;

/// Scripted outcome for one backend call
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Scripted {
    Reply(String),
    ServerError(Option<String>),
    Unreachable,
    Panic,
}

/// Fake backend that replays scripted outcomes and records every query
#[derive(Clone, Default)]
pub struct BackendSpy {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    queries: Arc<Mutex<Vec<String>>>,
    gate: Option<Arc<Notify>>,
}

#[allow(dead_code)]
impl BackendSpy {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            ..Self::default()
        }
    }

    /// Each call waits for one `notify_one` on the returned gate before replying
    pub fn gated(script: Vec<Scripted>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let spy = Self {
            gate: Some(gate.clone()),
            ..Self::new(script)
        };
        (spy, gate)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl ChatBackend for BackendSpy {
    async fn send(&self, query: &str) -> Result<String, BackendError> {
        self.queries.lock().expect("queries lock").push(query.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .expect("backend called more often than scripted");

        match next {
            Scripted::Reply(text) => Ok(text),
            Scripted::ServerError(message) => Err(BackendError::Server {
                status: StatusCode::TOO_MANY_REQUESTS,
                message,
            }),
            Scripted::Unreachable => {
                let err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
                Err(BackendError::Decode(err))
            }
            Scripted::Panic => panic!("backend blew up"),
        }
    }
}

/// Poll the controller the way the UI loop does until the request settles
#[allow(dead_code)]
pub async fn settle_by_polling(controller: &mut ConversationController) {
    for _ in 0..1000 {
        if controller.poll_settlement() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("request never settled");
}
