//! Remote chat service abstraction
//!
//! This module defines the seams between the chat core and the remote
//! service:
//!
//! - [`ChatService`] -- conversation listing, detail, deletion and the
//!   streaming exchange.
//! - [`SharedConversationService`] -- read-only access to shared links.
//!
//! Concrete implementations live in submodules:
//!
//! - [`http::HttpChatService`] -- `reqwest` client speaking JSON plus
//!   Server-Sent Events for the streaming exchange.
//! - `fake::FakeChatService` -- scripted in-process fake (cfg(test) only).
//!
//! # Canonical Import Path
//!
//! ```no_run
//! use chatline::service::{ChatService, StreamEvent};
//! ```

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ConversationDetail, ConversationSummary, SharedConversation};

pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::HttpChatService;

/// One event delivered during a streaming exchange.
///
/// On the wire each event is a JSON object tagged by `type`:
///
/// ```text
/// {"type":"chunk","content":"Hi"}
/// {"type":"done","conversationId":"c1"}
/// {"type":"error","message":"model overloaded"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental fragment of assistant text
    Chunk { content: String },
    /// Exchange finished; carries the server-assigned conversation id
    Done {
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
    /// Exchange failed on the service side
    Error { message: String },
}

/// Ordered stream of events for a single exchange.
///
/// Transport failures surface as `Err` items. The stream may end without a
/// terminal event if the connection drops; consumers treat that as a failure.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Conversation operations offered by the remote chat service.
///
/// Used polymorphically through `Arc<dyn ChatService>` by the
/// [`crate::store::ConversationStore`].
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Fetch every conversation summary, in the order the service returns.
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>>;

    /// Fetch the full message sequence of one conversation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ChatlineError::NotFound`] when the service has
    /// no such conversation.
    async fn get_conversation(&self, conversation_id: &str) -> Result<ConversationDetail>;

    /// Delete a conversation on the service.
    async fn delete_conversation(&self, conversation_id: &str) -> Result<()>;

    /// Open a streaming exchange for `text`.
    ///
    /// `conversation_id` is `None` when the message starts a new
    /// conversation.
    async fn stream_chat(&self, text: &str, conversation_id: Option<&str>)
        -> Result<EventStream>;
}

/// Read-only access to shared conversation snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SharedConversationService: Send + Sync {
    /// Fetch the shared conversation addressed by `share_id`.
    ///
    /// # Errors
    ///
    /// [`crate::error::ChatlineError::NotFound`] for unknown or expired links,
    /// [`crate::error::ChatlineError::Forbidden`] when the viewer lacks
    /// permission, anything else for transient failures.
    async fn fetch_shared(&self, share_id: &str) -> Result<SharedConversation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_event_chunk_wire_format() {
        let event: StreamEvent = serde_json::from_str(r#"{"type":"chunk","content":"Hi"}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Chunk {
                content: "Hi".into()
            }
        );
    }

    #[test]
    fn test_stream_event_done_uses_camel_case_id() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"type":"done","conversationId":"c1"}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Done {
                conversation_id: "c1".into()
            }
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"conversationId\":\"c1\""));
    }

    #[test]
    fn test_stream_event_unknown_type_rejected() {
        assert!(serde_json::from_str::<StreamEvent>(r#"{"type":"tool_call"}"#).is_err());
    }
}
