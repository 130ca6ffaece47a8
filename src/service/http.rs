//! HTTP client for the remote chat service
//!
//! [`HttpChatService`] implements both [`ChatService`] and
//! [`SharedConversationService`] over plain JSON endpoints, plus a
//! Server-Sent Events response for the streaming exchange:
//!
//! | Operation | Request |
//! |---|---|
//! | list | `GET {base}/conversations` |
//! | detail | `GET {base}/conversations/{id}` |
//! | delete | `DELETE {base}/conversations/{id}` |
//! | stream | `POST {base}/chat/stream` |
//! | shared | `GET {base}/chat/shared/{share_id}` |
//!
//! # Status mapping
//!
//! - `401` -> [`ChatlineError::Unauthorized`]
//! - `403` -> [`ChatlineError::Forbidden`]
//! - `404` -> [`ChatlineError::NotFound`]
//! - any other non-success status or a network failure ->
//!   [`ChatlineError::Transient`]
//!
//! # Streaming
//!
//! The SSE body is decoded lazily on the consumer's task: no background task
//! is spawned, so dropping the returned [`EventStream`] closes the
//! connection. Each `data:` payload is one JSON-encoded [`StreamEvent`];
//! `[DONE]` sentinels, comments and `event: ping` blocks are skipped.

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ServiceConfig;
use crate::error::{ChatlineError, Result};
use crate::service::{ChatService, EventStream, SharedConversationService, StreamEvent};
use crate::types::{ConversationDetail, ConversationSummary, SharedConversation};

/// `reqwest`-backed chat service client.
///
/// # Examples
///
/// ```no_run
/// use chatline::config::ServiceConfig;
/// use chatline::service::HttpChatService;
///
/// let service = HttpChatService::new(&ServiceConfig::default()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpChatService {
    http: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
    timeout: Duration,
}

/// Request body of `POST /chat/stream`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

/// Services return either a bare array or an object wrapping it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SummaryListBody {
    Bare(Vec<ConversationSummary>),
    Wrapped { conversations: Vec<ConversationSummary> },
}

impl SummaryListBody {
    fn into_inner(self) -> Vec<ConversationSummary> {
        match self {
            SummaryListBody::Bare(list) => list,
            SummaryListBody::Wrapped { conversations } => conversations,
        }
    }
}

impl HttpChatService {
    /// Construct a client from service configuration.
    ///
    /// No network I/O is performed at construction time.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlineError::Config`] if the base URL does not parse, or
    /// an HTTP error if the client cannot be built.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ChatlineError::Config(format!("Invalid base URL {}: {}", config.base_url, e))
        })?;
        let timeout = Duration::from_secs(config.timeout_seconds);

        // Only connection setup is bounded on the client itself; streaming
        // responses may legitimately run longer than `timeout`.
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(ChatlineError::Http)?;

        Ok(Self {
            http,
            base_url,
            api_token: config.api_token.clone(),
            timeout,
        })
    }

    /// Build an endpoint URL below the base URL, percent-encoding each
    /// segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ChatlineError::Config(format!("Base URL cannot have a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let req = self.http.request(method, url);
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send a request and fail on any non-success status.
    async fn execute(&self, req: reqwest::RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let response = req.send().await.map_err(|e| {
            anyhow::anyhow!(ChatlineError::Transient(format!("{} failed: {}", what, e)))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        tracing::debug!(%status, "{} rejected by service", what);
        Err(status_error(status, what).into())
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T> {
        let body = response.bytes().await.map_err(|e| {
            anyhow::anyhow!(ChatlineError::Transient(format!(
                "failed to read {} response: {}",
                what, e
            )))
        })?;
        serde_json::from_slice(&body).map_err(|e| {
            anyhow::anyhow!(ChatlineError::Transient(format!(
                "unexpected {} response: {}",
                what, e
            )))
        })
    }
}

/// Map a non-success HTTP status onto the error taxonomy.
fn status_error(status: reqwest::StatusCode, what: &str) -> ChatlineError {
    match status {
        reqwest::StatusCode::UNAUTHORIZED => ChatlineError::Unauthorized(what.to_string()),
        reqwest::StatusCode::FORBIDDEN => ChatlineError::Forbidden(what.to_string()),
        reqwest::StatusCode::NOT_FOUND => ChatlineError::NotFound(what.to_string()),
        _ => ChatlineError::Transient(format!("{} returned HTTP {}", what, status)),
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        let url = self.endpoint(&["conversations"])?;
        let req = self.request(reqwest::Method::GET, url).timeout(self.timeout);
        let response = self.execute(req, "list conversations").await?;
        let body: SummaryListBody = Self::read_json(response, "list conversations").await?;
        Ok(body.into_inner())
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<ConversationDetail> {
        let what = format!("conversation {}", conversation_id);
        let url = self.endpoint(&["conversations", conversation_id])?;
        let req = self.request(reqwest::Method::GET, url).timeout(self.timeout);
        let response = self.execute(req, &what).await?;
        let mut detail: ConversationDetail = Self::read_json(response, &what).await?;
        if detail.conversation_id.is_empty() {
            detail.conversation_id = conversation_id.to_string();
        }
        Ok(detail)
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        let what = format!("delete conversation {}", conversation_id);
        let url = self.endpoint(&["conversations", conversation_id])?;
        let req = self
            .request(reqwest::Method::DELETE, url)
            .timeout(self.timeout);
        self.execute(req, &what).await?;
        Ok(())
    }

    async fn stream_chat(
        &self,
        text: &str,
        conversation_id: Option<&str>,
    ) -> Result<EventStream> {
        let url = self.endpoint(&["chat", "stream"])?;
        let body = StreamRequest {
            message: text,
            conversation_id,
        };
        let req = self
            .request(reqwest::Method::POST, url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body);

        let response = self.execute(req, "chat stream").await?;
        tracing::debug!(
            conversation_id = conversation_id.unwrap_or("<new>"),
            "streaming exchange opened"
        );
        Ok(decode_event_stream(response.bytes_stream()))
    }
}

#[async_trait]
impl SharedConversationService for HttpChatService {
    async fn fetch_shared(&self, share_id: &str) -> Result<SharedConversation> {
        let what = format!("shared chat {}", share_id);
        let url = self.endpoint(&["chat", "shared", share_id])?;
        let req = self.request(reqwest::Method::GET, url).timeout(self.timeout);
        let response = self.execute(req, &what).await?;
        Self::read_json(response, &what).await
    }
}

// ---------------------------------------------------------------------------
// SSE decoding
// ---------------------------------------------------------------------------

/// Incremental splitter for an SSE byte stream.
///
/// Bytes are buffered until a blank line closes an event block, so UTF-8
/// sequences and lines split across network chunks are reassembled before
/// decoding. Carriage returns are dropped, which folds `\r\n` line endings
/// into `\n`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed raw bytes; returns the `data` payload of every completed event.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut payloads = Vec::new();
        while let Some(pos) = find_blank_line(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            let block = String::from_utf8_lossy(&block[..pos]);
            if let Some(data) = event_data(&block) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Flush a trailing event that was not followed by a blank line.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let block = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        event_data(&block)
    }
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Extract the joined `data:` value of one event block.
///
/// Returns `None` for comment-only blocks, blocks without data, and
/// `event: ping` keep-alives.
fn event_data(block: &str) -> Option<String> {
    let mut data_lines: Vec<&str> = Vec::new();
    let mut event_type: Option<&str> = None;

    for line in block.lines() {
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        } else if let Some(value) = line.strip_prefix("event:") {
            event_type = Some(value.trim());
        }
        // `id:`, `retry:` and `:` comments carry nothing we act on.
    }

    if event_type.is_some_and(|t| t.eq_ignore_ascii_case("ping")) || data_lines.is_empty() {
        return None;
    }
    Some(data_lines.join("\n"))
}

/// Decode one `data:` payload into an event, skipping sentinels.
fn parse_payload(payload: &str) -> Option<Result<StreamEvent>> {
    let trimmed = payload.trim();
    if trimmed.is_empty() || trimmed == "[DONE]" {
        return None;
    }
    Some(serde_json::from_str::<StreamEvent>(trimmed).map_err(|e| {
        anyhow::anyhow!(ChatlineError::Transient(format!(
            "malformed stream event: {}",
            e
        )))
    }))
}

struct DecodeState<S> {
    bytes: Pin<Box<S>>,
    decoder: SseDecoder,
    ready: VecDeque<Result<StreamEvent>>,
    exhausted: bool,
}

/// Turn an SSE response body into an [`EventStream`].
///
/// A transport error ends the stream after yielding one `Err` item.
pub fn decode_event_stream<S, E>(byte_stream: S) -> EventStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = DecodeState {
        bytes: Box::pin(byte_stream),
        decoder: SseDecoder::default(),
        ready: VecDeque::new(),
        exhausted: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.ready.pop_front() {
                return Some((item, state));
            }
            if state.exhausted {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let payloads = state.decoder.push(&chunk);
                    state
                        .ready
                        .extend(payloads.iter().filter_map(|p| parse_payload(p)));
                }
                Some(Err(e)) => {
                    state.exhausted = true;
                    state.ready.push_back(Err(anyhow::anyhow!(
                        ChatlineError::Transient(format!("stream interrupted: {}", e))
                    )));
                }
                None => {
                    state.exhausted = true;
                    if let Some(payload) = state.decoder.finish() {
                        state.ready.extend(parse_payload(&payload));
                    }
                }
            }
        }
    }))
}
