use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Duration;
use tracing::debug;

/// Shown when the backend address is unknown
pub const CONFIGURATION_ERROR_MESSAGE: &str = "Configuration error: Backend URL is not set.";
/// Shown when the backend signals failure without a message
pub const SERVER_ERROR_MESSAGE: &str = "Server responded with an error.";
/// Shown when no usable response could be obtained
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection or try again later.";

const CHAT_PATH: &str = "/api/chat";

/// Failure outcomes of a single chat request
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend URL is not set")]
    NotConfigured,

    #[error("backend returned HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unreadable response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request task ended abnormally: {0}")]
    Aborted(String),
}

impl BackendError {
    /// Text to put in front of the user for this failure.
    ///
    /// Transport details are never surfaced; only structured server messages are.
    pub fn transcript_message(&self) -> String {
        match self {
            BackendError::NotConfigured => CONFIGURATION_ERROR_MESSAGE.to_string(),
            BackendError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            BackendError::Server { message: None, .. } => SERVER_ERROR_MESSAGE.to_string(),
            BackendError::Transport(_) | BackendError::Decode(_) | BackendError::Aborted(_) => {
                NETWORK_ERROR_MESSAGE.to_string()
            }
        }
    }
}

/// Request body sent to the backend
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub query: String,
}

/// Success body returned by the backend
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
}

/// Failure body returned by the backend
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// The error message, if the backend sent a non-blank string
    pub fn message(&self) -> Option<String> {
        self.error
            .as_ref()
            .and_then(|value| value.as_str())
            .filter(|message| !message.trim().is_empty())
            .map(str::to_string)
    }
}

/// Remote text-generation service: one query in, one reply out
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, query: &str) -> Result<String, BackendError>;
}

/// HTTP client for the chat backend
#[derive(Clone)]
pub struct HttpBackend {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: chat_endpoint(base_url),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send(&self, query: &str) -> Result<String, BackendError> {
        let request = ChatRequest {
            query: query.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "chat backend responded");

        if status.is_success() {
            let payload: ChatResponse = serde_json::from_slice(&body)?;
            return Ok(payload.response.unwrap_or_default());
        }

        let payload: ErrorResponse = serde_json::from_slice(&body)?;
        Err(BackendError::Server {
            status,
            message: payload.message(),
        })
    }
}

/// Join the chat path onto a base address
pub fn chat_endpoint(base_url: &str) -> String {
    format!("{}{}", base_url.trim().trim_end_matches('/'), CHAT_PATH)
}
