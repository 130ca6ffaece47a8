//! Scripted in-process chat service for unit tests
//!
//! [`FakeChatService`] keeps conversations in memory and replays scripted
//! event sequences for each streaming exchange. Every call is recorded so
//! tests can assert on what reached the "network" and in which order.
//!
//! # Example
//!
//! ```ignore
//! let service = FakeChatService::new();
//! service.script_stream(vec![
//!     Ok(StreamEvent::Chunk { content: "Hi".into() }),
//!     Ok(StreamEvent::Done { conversation_id: "c1".into() }),
//! ]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{ChatlineError, Result};
use crate::service::{ChatService, EventStream, StreamEvent};
use crate::types::{ConversationDetail, ConversationSummary, Message};

/// One scripted stream item; `Err` strings become transient failures.
pub type ScriptedEvent = std::result::Result<StreamEvent, String>;

/// A call observed by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Get(String),
    Delete(String),
    Stream {
        text: String,
        conversation_id: Option<String>,
    },
}

#[derive(Debug, Default)]
struct FakeState {
    summaries: Vec<ConversationSummary>,
    details: HashMap<String, Vec<Message>>,
    scripts: VecDeque<Vec<ScriptedEvent>>,
    calls: Vec<Call>,
    fail_list: bool,
    fail_delete: bool,
    fail_stream_open: bool,
}

/// In-memory [`ChatService`] driven by test scripts.
#[derive(Debug, Default)]
pub struct FakeChatService {
    state: Mutex<FakeState>,
}

impl FakeChatService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a conversation so it appears in listings and can be loaded.
    pub fn insert_conversation(&self, id: &str, title: &str, messages: Vec<Message>) {
        let mut state = self.state.lock().unwrap();
        state.summaries.retain(|s| s.conversation_id != id);
        state.summaries.insert(
            0,
            ConversationSummary {
                conversation_id: id.to_string(),
                title: title.to_string(),
                updated_at: Utc::now(),
            },
        );
        state.details.insert(id.to_string(), messages);
    }

    /// Queue the events replayed by the next `stream_chat` call.
    pub fn script_stream(&self, events: Vec<ScriptedEvent>) {
        self.state.lock().unwrap().scripts.push_back(events);
    }

    pub fn fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }

    pub fn fail_stream_open(&self, fail: bool) {
        self.state.lock().unwrap().fail_stream_open = fail;
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl ChatService for FakeChatService {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        self.record(Call::List);
        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(ChatlineError::Transient("list unavailable".into()).into());
        }
        Ok(state.summaries.clone())
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<ConversationDetail> {
        self.record(Call::Get(conversation_id.to_string()));
        let state = self.state.lock().unwrap();
        match state.details.get(conversation_id) {
            Some(messages) => Ok(ConversationDetail {
                conversation_id: conversation_id.to_string(),
                messages: messages.clone(),
            }),
            None => Err(ChatlineError::NotFound(format!("conversation {}", conversation_id)).into()),
        }
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        self.record(Call::Delete(conversation_id.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(ChatlineError::Transient("delete unavailable".into()).into());
        }
        if state.details.remove(conversation_id).is_none() {
            return Err(ChatlineError::NotFound(format!("conversation {}", conversation_id)).into());
        }
        state
            .summaries
            .retain(|s| s.conversation_id != conversation_id);
        Ok(())
    }

    async fn stream_chat(
        &self,
        text: &str,
        conversation_id: Option<&str>,
    ) -> Result<EventStream> {
        self.record(Call::Stream {
            text: text.to_string(),
            conversation_id: conversation_id.map(str::to_string),
        });
        let mut state = self.state.lock().unwrap();
        if state.fail_stream_open {
            return Err(ChatlineError::Transient("connection refused".into()).into());
        }
        let script = state.scripts.pop_front().unwrap_or_default();
        let items: Vec<Result<StreamEvent>> = script
            .into_iter()
            .map(|item| item.map_err(|e| ChatlineError::Transient(e).into()))
            .collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}
