//! HTTP backend tests against a mock chat service.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use versechat::backend::{
    BackendError, ChatBackend, HttpBackend, NETWORK_ERROR_MESSAGE, SERVER_ERROR_MESSAGE,
};
use versechat::controller::{ConversationController, DispatchStatus};
use versechat::transcript::{EntryContent, Sender};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&server.uri(), Duration::from_secs(5)).expect("client should build")
}

async fn chat_server(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_success_reply_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "query": "Who wrote it?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "A young poet. BUTTONS: More poems"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend_for(&server)
        .send("Who wrote it?")
        .await
        .expect("request should succeed");
    assert_eq!(reply, "A young poet. BUTTONS: More poems");
}

#[tokio::test]
async fn test_trailing_slash_in_base_url_is_ignored() {
    let server =
        chat_server(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" }))).await;

    let backend = HttpBackend::new(&format!("{}/", server.uri()), Duration::from_secs(5))
        .expect("client should build");
    assert_eq!(backend.endpoint(), format!("{}/api/chat", server.uri()));
    assert_eq!(backend.send("hi").await.expect("request should succeed"), "ok");
}

#[tokio::test]
async fn test_missing_response_field_is_empty_reply() {
    let server = chat_server(ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let reply = backend_for(&server).send("hi").await.expect("request should succeed");
    assert_eq!(reply, "");
}

#[tokio::test]
async fn test_structured_error_carries_message() {
    let server =
        chat_server(ResponseTemplate::new(429).set_body_json(json!({ "error": "rate limited" })))
            .await;

    let err = backend_for(&server).send("hi").await.unwrap_err();
    match &err {
        BackendError::Server { status, message } => {
            assert_eq!(*status, StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(message.as_deref(), Some("rate limited"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
    assert_eq!(err.transcript_message(), "rate limited");
}

#[tokio::test]
async fn test_error_without_message_uses_generic_text() {
    let server = chat_server(ResponseTemplate::new(500).set_body_json(json!({}))).await;

    let err = backend_for(&server).send("hi").await.unwrap_err();
    assert!(matches!(err, BackendError::Server { message: None, .. }));
    assert_eq!(err.transcript_message(), SERVER_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_non_json_body_is_a_network_failure() {
    let server =
        chat_server(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>")).await;

    let err = backend_for(&server).send("hi").await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)), "got {err:?}");
    assert_eq!(err.transcript_message(), NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let backend = HttpBackend::new(&format!("http://127.0.0.1:{port}"), Duration::from_secs(5))
        .expect("client should build");
    let err = backend.send("hi").await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)), "got {err:?}");
    assert_eq!(err.transcript_message(), NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_controller_round_trip_over_http() {
    let server = chat_server(ResponseTemplate::new(200).set_body_json(json!({
        "response": "It's a *poetry* collection. BUTTONS: Tell me more, Who wrote it"
    })))
    .await;

    let mut controller = ConversationController::with_backend(backend_for(&server));
    assert_eq!(
        controller.submit_typed_message("What is this book about?"),
        DispatchStatus::Sent
    );
    assert!(controller.wait_for_settlement().await);
    assert!(!controller.is_request_in_flight());

    let entries = controller.transcript().entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].sender, Sender::User);
    assert_eq!(
        entries[1].content,
        EntryContent::RenderedMarkup("<p>It's a <em>poetry</em> collection.</p>".to_string())
    );
    assert_eq!(
        entries[2].content,
        EntryContent::SuggestionSet(vec!["Tell me more".to_string(), "Who wrote it".to_string()])
    );
}
