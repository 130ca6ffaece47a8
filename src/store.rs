//! Conversation store
//!
//! [`ConversationStore`] caches the conversation summary list and owns the
//! [`ChatSession`] for the active conversation. All reads and writes against
//! the remote service go through it; the session never touches the summary
//! list directly.
//!
//! The cache is eventually consistent with the service. A successful
//! [`ConversationStore::list_summaries`] is the only resynchronization
//! point, and failed operations leave cached state untouched.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{ChatlineError, Result};
use crate::service::ChatService;
use crate::session::{ChatSession, SendOutcome};
use crate::types::{ConversationSummary, Message};

/// Summary cache plus the active conversation.
pub struct ConversationStore {
    service: Arc<dyn ChatService>,
    summaries: Vec<ConversationSummary>,
    session: ChatSession,
}

impl ConversationStore {
    pub fn new(service: Arc<dyn ChatService>) -> Self {
        Self {
            service,
            summaries: Vec::new(),
            session: ChatSession::new(),
        }
    }

    /// Cached summaries, in the order the service last returned them.
    pub fn summaries(&self) -> &[ConversationSummary] {
        &self.summaries
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn active_conversation_id(&self) -> Option<&str> {
        self.session.conversation_id()
    }

    pub fn messages(&self) -> &[Message] {
        self.session.messages()
    }

    /// Fetch and replace the full summary list.
    ///
    /// On failure the cached list is left as it was.
    pub async fn list_summaries(&mut self) -> Result<&[ConversationSummary]> {
        let summaries = self.service.list_conversations().await?;
        tracing::debug!(count = summaries.len(), "summary list refreshed");
        self.summaries = summaries;
        Ok(&self.summaries)
    }

    /// Load a conversation and make it active, replacing the current one.
    ///
    /// # Errors
    ///
    /// - [`ChatlineError::Busy`] while a response is streaming.
    /// - [`ChatlineError::NotFound`] if the service has no such conversation.
    ///
    /// On failure the previously active conversation stays active.
    pub async fn load_detail(&mut self, conversation_id: &str) -> Result<()> {
        if self.session.is_busy() {
            return Err(ChatlineError::Busy.into());
        }
        let mut detail = self.service.get_conversation(conversation_id).await?;
        if detail.conversation_id.is_empty() {
            detail.conversation_id = conversation_id.to_string();
        }
        tracing::info!(
            conversation_id = %detail.conversation_id,
            messages = detail.messages.len(),
            "conversation loaded"
        );
        self.session.replace(detail);
        Ok(())
    }

    /// Clear the active conversation and any response in flight.
    ///
    /// The summary list is not touched.
    pub fn start_new(&mut self) {
        self.session.reset();
    }

    /// Delete a conversation on the service, then drop it from the cache.
    ///
    /// Deleting the active conversation also behaves as [`Self::start_new`].
    /// Nothing local changes if the service call fails.
    pub async fn remove(&mut self, conversation_id: &str) -> Result<()> {
        self.service.delete_conversation(conversation_id).await?;
        self.summaries
            .retain(|s| s.conversation_id != conversation_id);
        if self.session.conversation_id() == Some(conversation_id) {
            self.start_new();
        }
        tracing::info!(conversation_id, "conversation deleted");
        Ok(())
    }

    /// Send a message in the active conversation.
    ///
    /// See [`ChatSession::send`] for the exchange semantics. After a
    /// successful exchange the summary list is refreshed; a failed refresh
    /// is logged and does not fail the send.
    pub async fn send<F>(
        &mut self,
        text: &str,
        cancel: &CancellationToken,
        on_chunk: F,
    ) -> Result<SendOutcome>
    where
        F: FnMut(&str),
    {
        let outcome = self
            .session
            .send(self.service.as_ref(), text, cancel, on_chunk)
            .await?;

        if let Err(e) = self.list_summaries().await {
            tracing::warn!("Failed to refresh conversation list: {}", e);
        }
        Ok(outcome)
    }

    /// Resolve a cached summary by full id or unique id prefix.
    ///
    /// # Errors
    ///
    /// - [`ChatlineError::NotFound`] when nothing matches.
    /// - [`ChatlineError::Validation`] when the prefix is ambiguous.
    pub fn find_summary(&self, id_or_prefix: &str) -> Result<&ConversationSummary> {
        let needle = id_or_prefix.trim();
        if needle.is_empty() {
            return Err(ChatlineError::Validation("conversation id is empty".into()).into());
        }
        if let Some(exact) = self.summaries.iter().find(|s| s.conversation_id == needle) {
            return Ok(exact);
        }

        let mut matches = self
            .summaries
            .iter()
            .filter(|s| s.conversation_id.starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Ok(only),
            (Some(_), Some(_)) => Err(ChatlineError::Validation(format!(
                "conversation id prefix {} is ambiguous",
                needle
            ))
            .into()),
            (None, _) => Err(ChatlineError::NotFound(format!("conversation {}", needle)).into()),
        }
    }
}
