//! Conversation data model
//!
//! Records exchanged with the remote chat service. Field names are
//! camelCase on the wire and datetimes are RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person using the client
    User,
    /// Produced by the remote assistant
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A finalized chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque identifier
    pub id: String,
    /// Who wrote the message
    pub role: Role,
    /// Message text
    pub content: String,
    /// When the message was created, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a user message with a fresh id and the current time
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::types::{Message, Role};
    ///
    /// let msg = Message::user("hello");
    /// assert_eq!(msg.role, Role::User);
    /// assert_eq!(msg.content, "hello");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message with a fresh id and the current time
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Some(Utc::now()),
        }
    }
}

/// Lightweight conversation metadata shown in the history list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

/// A conversation with its full ordered message sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    /// Some services omit the id in the body; the requested id is used then
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Read-only snapshot of a conversation exposed through a share link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedConversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub shared_at: DateTime<Utc>,
    pub shared_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_conversation_id: Option<String>,
}
