//! Conversation store end-to-end tests over HTTP
//!
//! Drives `ConversationStore` through `HttpChatService` against a `wiremock`
//! server, covering a full streamed exchange and deletion of the active
//! conversation.

mod common;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatline::{ChatlineError, Role};

use common::{http_store, sse_body};

async fn mount_list(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_hello_exchange_streams_and_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[
                r#"{"type":"chunk","content":"Hi"}"#,
                r#"{"type":"chunk","content":" there"}"#,
                r#"{"type":"chunk","content":"!"}"#,
                r#"{"type":"done","conversationId":"c1"}"#,
            ]),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(
        &server,
        json!([{"conversationId": "c1", "title": "hello", "updatedAt": "2026-03-01T10:00:00Z"}]),
    )
    .await;

    let mut store = http_store(&server.uri());
    let mut seen = Vec::new();
    let outcome = store
        .send("hello", &CancellationToken::new(), |chunk| {
            seen.push(chunk.to_string())
        })
        .await
        .unwrap();

    assert_eq!(seen, vec!["Hi", " there", "!"]);
    assert_eq!(outcome.conversation_id, "c1");
    assert_eq!(outcome.message.content, "Hi there!");
    assert_eq!(store.active_conversation_id(), Some("c1"));

    let messages = store.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "hello");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Hi there!");

    assert_eq!(store.summaries().len(), 1);
    assert!(!store.session().is_busy());
}

#[tokio::test]
async fn test_stream_dropped_before_done_keeps_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[r#"{"type":"chunk","content":"Hi"}"#]),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let mut store = http_store(&server.uri());
    let err = store
        .send("hello", &CancellationToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(ChatlineError::classify(&err).is_some_and(|e| e.is_transient()));
    assert_eq!(store.messages().len(), 1);
    assert_eq!(store.messages()[0].role, Role::User);
    assert!(!store.session().is_busy());
}

#[tokio::test]
async fn test_delete_active_conversation_starts_new() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        json!([
            {"conversationId": "c1", "title": "First", "updatedAt": "2026-03-01T10:00:00Z"},
            {"conversationId": "c2", "title": "Second", "updatedAt": "2026-03-02T10:00:00Z"}
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/conversations/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversationId": "c1",
            "messages": [{"id": "m1", "role": "user", "content": "hello"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/conversations/c1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = http_store(&server.uri());
    store.list_summaries().await.unwrap();
    store.load_detail("c1").await.unwrap();
    assert_eq!(store.messages().len(), 1);

    store.remove("c1").await.unwrap();
    assert_eq!(store.active_conversation_id(), None);
    assert!(store.messages().is_empty());
    let ids: Vec<_> = store
        .summaries()
        .iter()
        .map(|s| s.conversation_id.as_str())
        .collect();
    assert_eq!(ids, vec!["c2"]);
}

#[tokio::test]
async fn test_failed_delete_changes_nothing() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        json!([{"conversationId": "c1", "title": "First", "updatedAt": "2026-03-01T10:00:00Z"}]),
    )
    .await;
    Mock::given(method("DELETE"))
        .and(path("/conversations/c1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut store = http_store(&server.uri());
    store.list_summaries().await.unwrap();
    assert!(store.remove("c1").await.is_err());
    assert_eq!(store.summaries().len(), 1);
}
