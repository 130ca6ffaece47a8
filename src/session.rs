//! Streaming session controller
//!
//! [`ChatSession`] owns the active conversation (its id and message
//! sequence) and the transient [`StreamingBuffer`] of the exchange in
//! flight. One send moves through:
//!
//! ```text
//! begin_send ──> apply(Chunk)* ──> apply(Done)   -> assistant message committed
//!                              └─> apply(Error)  -> buffer discarded
//!                              └─> fail           -> buffer discarded (transport error, cancel)
//! ```
//!
//! Every exchange is tagged with a generation number. Resetting or
//! replacing the conversation bumps the generation, so events that arrive
//! for a superseded exchange are reported as [`Step::Stale`] and ignored.
//!
//! [`ChatSession::send`] drives a whole exchange against a
//! [`ChatService`]; the step methods are public so other drivers (and tests)
//! can feed events themselves.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::error::{ChatlineError, Result};
use crate::service::{ChatService, StreamEvent};
use crate::types::{ConversationDetail, Message};

/// Token identifying one streaming exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    generation: u64,
}

impl Exchange {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Text accumulated for the exchange in flight.
#[derive(Debug)]
pub struct StreamingBuffer {
    generation: u64,
    text: String,
}

/// What a caller needs to open the network exchange after [`ChatSession::begin_send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub exchange: Exchange,
    /// Trimmed message text
    pub text: String,
    /// Conversation the message belongs to; `None` starts a new one
    pub conversation_id: Option<String>,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Chunk appended; the exchange continues
    Pending,
    /// Assistant message committed under the returned conversation id
    Completed(Message),
    /// Exchange failed; buffer discarded
    Failed(String),
    /// Event belongs to a superseded exchange and was ignored
    Stale,
}

/// Successful end of [`ChatSession::send`].
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub conversation_id: String,
    pub message: Message,
}

/// Active conversation plus the exchange in flight.
#[derive(Debug, Default)]
pub struct ChatSession {
    conversation_id: Option<String>,
    messages: Vec<Message>,
    buffer: Option<StreamingBuffer>,
    generation: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True between `begin_send` and the exchange's terminal event.
    pub fn is_busy(&self) -> bool {
        self.buffer.is_some()
    }

    /// Text streamed so far for the exchange in flight.
    pub fn pending_text(&self) -> Option<&str> {
        self.buffer.as_ref().map(|b| b.text.as_str())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start an exchange: validate, append the user message, open a buffer.
    ///
    /// # Errors
    ///
    /// - [`ChatlineError::Validation`] when `text` is blank; nothing changes.
    /// - [`ChatlineError::Busy`] while another exchange is in flight;
    ///   nothing changes.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingSend> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatlineError::Validation("message is empty".into()).into());
        }
        if self.is_busy() {
            return Err(ChatlineError::Busy.into());
        }

        self.messages.push(Message::user(text));
        self.generation += 1;
        self.buffer = Some(StreamingBuffer {
            generation: self.generation,
            text: String::new(),
        });
        tracing::debug!(generation = self.generation, "exchange started");

        Ok(PendingSend {
            exchange: Exchange {
                generation: self.generation,
            },
            text: text.to_string(),
            conversation_id: self.conversation_id.clone(),
        })
    }

    /// Apply one event of `exchange`.
    pub fn apply(&mut self, exchange: Exchange, event: StreamEvent) -> Step {
        match event {
            StreamEvent::Chunk { content } => self.apply_chunk(exchange, &content),
            StreamEvent::Done { conversation_id } => self.complete(exchange, conversation_id),
            StreamEvent::Error { message } => self.fail(exchange, message),
        }
    }

    /// Append a chunk to the buffer of `exchange`.
    pub fn apply_chunk(&mut self, exchange: Exchange, content: &str) -> Step {
        match self.buffer_for(exchange) {
            Some(buffer) => {
                buffer.text.push_str(content);
                Step::Pending
            }
            None => Step::Stale,
        }
    }

    /// Commit the buffer of `exchange` as an assistant message.
    ///
    /// The conversation id carried by the completion event becomes the
    /// active id, replacing whatever was active when the send started.
    pub fn complete(&mut self, exchange: Exchange, conversation_id: String) -> Step {
        if self.buffer_for(exchange).is_none() {
            return Step::Stale;
        }
        let text = self.buffer.take().map(|b| b.text).unwrap_or_default();

        let message = Message::assistant(text);
        self.messages.push(message.clone());
        tracing::debug!(
            generation = exchange.generation,
            conversation_id = %conversation_id,
            "exchange completed"
        );
        self.conversation_id = Some(conversation_id);
        Step::Completed(message)
    }

    /// Discard the buffer of `exchange`; the user message stays.
    pub fn fail(&mut self, exchange: Exchange, reason: impl Into<String>) -> Step {
        if self.buffer_for(exchange).is_none() {
            return Step::Stale;
        }
        self.buffer = None;
        let reason = reason.into();
        tracing::debug!(generation = exchange.generation, %reason, "exchange failed");
        Step::Failed(reason)
    }

    /// Clear the active conversation and drop any exchange in flight.
    ///
    /// Always succeeds. Late events of the dropped exchange become stale.
    pub fn reset(&mut self) {
        if self.is_busy() {
            tracing::debug!(generation = self.generation, "discarding in-flight exchange");
        }
        self.generation += 1;
        self.buffer = None;
        self.conversation_id = None;
        self.messages.clear();
    }

    /// Replace the active conversation wholesale with a loaded detail.
    pub fn replace(&mut self, detail: ConversationDetail) {
        self.generation += 1;
        self.buffer = None;
        self.conversation_id = Some(detail.conversation_id);
        self.messages = detail.messages;
    }

    fn buffer_for(&mut self, exchange: Exchange) -> Option<&mut StreamingBuffer> {
        self.buffer
            .as_mut()
            .filter(|b| b.generation == exchange.generation)
    }

    /// Run one full exchange against `service`.
    ///
    /// The user message is appended before the service is contacted.
    /// `on_chunk` sees every chunk as it is buffered. Cancelling `cancel`
    /// abandons the exchange.
    ///
    /// # Errors
    ///
    /// - [`ChatlineError::Validation`] / [`ChatlineError::Busy`] from
    ///   [`ChatSession::begin_send`] (no message appended).
    /// - [`ChatlineError::Stream`] when the service reports an error event.
    /// - [`ChatlineError::Cancelled`] when `cancel` fires first.
    /// - [`ChatlineError::Transient`] or the transport's error when the
    ///   exchange cannot be opened or ends without a terminal event.
    ///
    /// In every error case after validation the user message is kept and no
    /// assistant message is committed.
    pub async fn send<S, F>(
        &mut self,
        service: &S,
        text: &str,
        cancel: &CancellationToken,
        mut on_chunk: F,
    ) -> Result<SendOutcome>
    where
        S: ChatService + ?Sized,
        F: FnMut(&str),
    {
        let pending = self.begin_send(text)?;
        let exchange = pending.exchange;

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            opened = service.stream_chat(&pending.text, pending.conversation_id.as_deref()) => Some(opened),
        };
        let mut events = match opened {
            Some(Ok(events)) => events,
            Some(Err(e)) => {
                self.fail(exchange, e.to_string());
                return Err(e);
            }
            None => {
                self.fail(exchange, "cancelled");
                return Err(ChatlineError::Cancelled.into());
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.fail(exchange, "cancelled");
                    return Err(ChatlineError::Cancelled.into());
                }
                next = events.next() => next,
            };

            match next {
                Some(Ok(StreamEvent::Chunk { content })) => {
                    if self.apply_chunk(exchange, &content) == Step::Pending {
                        on_chunk(&content);
                    }
                }
                Some(Ok(event)) => match self.apply(exchange, event) {
                    Step::Completed(message) => {
                        let conversation_id = self.conversation_id.clone().unwrap_or_default();
                        return Ok(SendOutcome {
                            conversation_id,
                            message,
                        });
                    }
                    Step::Failed(reason) => return Err(ChatlineError::Stream(reason).into()),
                    Step::Pending | Step::Stale => {}
                },
                Some(Err(e)) => {
                    self.fail(exchange, e.to_string());
                    return Err(e);
                }
                None => {
                    self.fail(exchange, "stream ended early");
                    return Err(ChatlineError::Transient(
                        "stream ended before the response completed".into(),
                    )
                    .into());
                }
            }
        }
    }
}
