//! Chatline - terminal client for a remote streaming chat service
//!
//! This library provides the core of the Chatline client: the streaming
//! session controller, the conversation store, the shared-view gate and an
//! HTTP client for the remote service.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: One active conversation and its streaming exchange
//! - `store`: Conversation summary cache plus the active session
//! - `shared`: Shared-link gate and deep links
//! - `service`: Remote service traits and the HTTP implementation
//! - `auth`: Injected sign-in capability
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chatline::{Config, ConversationStore, HttpChatService};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let service = HttpChatService::new(&config.service)?;
//!     let mut store = ConversationStore::new(Arc::new(service));
//!     let outcome = store
//!         .send("hello", &CancellationToken::new(), |chunk| print!("{}", chunk))
//!         .await?;
//!     println!("\n[{}]", outcome.conversation_id);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod service;
pub mod session;
pub mod shared;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use auth::{AuthState, StaticAuth, UserIdentity};
pub use config::Config;
pub use error::{ChatlineError, Result};
pub use service::{ChatService, HttpChatService, SharedConversationService, StreamEvent};
pub use session::{ChatSession, SendOutcome};
pub use shared::{SharedViewGate, SharedViewState};
pub use store::ConversationStore;
pub use types::{ConversationDetail, ConversationSummary, Message, Role, SharedConversation};
