//! Shared-view gate
//!
//! Decides what a viewer sees when they open a shared chat link. The gate
//! only fetches when the injected [`AuthState`] reports a signed-in user.
//! Any fetch outcome maps onto exactly one [`SharedViewState`]; there is no
//! retry and nothing is cached across mounts.
//!
//! The module also builds the app deep link and web fallback URL for a
//! share id.

use url::Url;

use crate::auth::AuthState;
use crate::config::ShareConfig;
use crate::error::{ChatlineError, Result};
use crate::service::SharedConversationService;
use crate::store::ConversationStore;
use crate::types::SharedConversation;

pub const NOT_FOUND_MESSAGE: &str = "This chat link is invalid or has expired.";
pub const FORBIDDEN_MESSAGE: &str = "You don't have permission to view this chat.";
pub const TRANSIENT_MESSAGE: &str = "Failed to load the shared chat. Please try again later.";
pub const SIGN_IN_MESSAGE: &str = "Sign in to view this shared chat.";

/// What the shared view is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum SharedViewState {
    SignInPrompt,
    Loading,
    Loaded(SharedConversation),
    NotFound,
    Forbidden,
    TransientError,
}

impl SharedViewState {
    /// Map a fetch outcome onto a terminal state.
    pub fn from_fetch(result: Result<SharedConversation>) -> Self {
        match result {
            Ok(conversation) => Self::Loaded(conversation),
            Err(err) => match ChatlineError::classify(&err) {
                Some(ChatlineError::NotFound(_)) => Self::NotFound,
                Some(ChatlineError::Forbidden(_)) => Self::Forbidden,
                _ => {
                    tracing::warn!("Shared chat fetch failed: {:#}", err);
                    Self::TransientError
                }
            },
        }
    }

    /// User-facing text for the non-content states.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::SignInPrompt => Some(SIGN_IN_MESSAGE),
            Self::NotFound => Some(NOT_FOUND_MESSAGE),
            Self::Forbidden => Some(FORBIDDEN_MESSAGE),
            Self::TransientError => Some(TRANSIENT_MESSAGE),
            Self::Loading | Self::Loaded(_) => None,
        }
    }
}

/// Where "continue conversation" took the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinueTarget {
    /// The original conversation was loaded and is now active
    Original(String),
    /// No original id was shared; a fresh conversation was started
    Fresh,
}

/// One mounted shared view.
#[derive(Debug, Clone)]
pub struct SharedViewGate {
    share_id: String,
    state: SharedViewState,
}

impl SharedViewGate {
    /// Mount the view for `share_id`.
    ///
    /// Signed-out viewers get [`SharedViewState::SignInPrompt`] and no fetch
    /// is issued.
    pub async fn mount(
        share_id: &str,
        auth: &dyn AuthState,
        service: &dyn SharedConversationService,
    ) -> Self {
        if !auth.is_signed_in() {
            tracing::info!(share_id, "shared view requires sign-in");
            return Self {
                share_id: share_id.to_string(),
                state: SharedViewState::SignInPrompt,
            };
        }

        let mut gate = Self {
            share_id: share_id.to_string(),
            state: SharedViewState::Loading,
        };
        tracing::debug!(share_id, "fetching shared conversation");
        gate.state = SharedViewState::from_fetch(service.fetch_shared(share_id).await);
        gate
    }

    pub fn share_id(&self) -> &str {
        &self.share_id
    }

    pub fn state(&self) -> &SharedViewState {
        &self.state
    }

    /// Continue the shared conversation in `store`.
    ///
    /// Loads the original conversation when the share carries its id,
    /// otherwise starts a new conversation.
    ///
    /// # Errors
    ///
    /// [`ChatlineError::Validation`] when nothing is loaded, or whatever
    /// [`ConversationStore::load_detail`] reports.
    pub async fn continue_conversation(
        &self,
        store: &mut ConversationStore,
    ) -> Result<ContinueTarget> {
        let SharedViewState::Loaded(shared) = &self.state else {
            return Err(ChatlineError::Validation(
                "no shared conversation is loaded".to_string(),
            )
            .into());
        };

        match shared.original_conversation_id.as_deref() {
            Some(original) if !original.is_empty() => {
                store.load_detail(original).await?;
                Ok(ContinueTarget::Original(original.to_string()))
            }
            _ => {
                store.start_new();
                Ok(ContinueTarget::Fresh)
            }
        }
    }
}

/// Greeting line for the signed-in viewer.
pub fn greeting(auth: &dyn AuthState) -> Option<String> {
    let user = auth.user()?;
    Some(format!("Hi {}!", user.display_name()))
}

/// App deep link plus web fallback for one share id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub app: Url,
    pub web: Url,
}

/// Build `<scheme>://chat/shared/<id>` and `<web_base_url>/chat/shared/<id>`.
///
/// # Examples
///
/// ```
/// use chatline::config::ShareConfig;
/// use chatline::shared::share_links;
///
/// let links = share_links(&ShareConfig::default(), "abc").unwrap();
/// assert_eq!(links.app.as_str(), "chatline://chat/shared/abc");
/// ```
pub fn share_links(config: &ShareConfig, share_id: &str) -> Result<ShareLinks> {
    if share_id.trim().is_empty() {
        return Err(ChatlineError::Validation("share id is empty".to_string()).into());
    }

    let app_base = Url::parse(&format!("{}://chat", config.app_scheme))
        .map_err(|e| ChatlineError::Config(format!("invalid app scheme: {}", e)))?;
    let web_base = Url::parse(&config.web_base_url)
        .map_err(|e| ChatlineError::Config(format!("invalid web base URL: {}", e)))?;

    Ok(ShareLinks {
        app: append_segments(app_base, &["shared", share_id])?,
        web: append_segments(web_base, &["chat", "shared", share_id])?,
    })
}

fn append_segments(mut url: Url, segments: &[&str]) -> Result<Url> {
    if url.cannot_be_a_base() {
        return Err(ChatlineError::Config(format!("{} cannot carry a path", url)).into());
    }
    url.path_segments_mut()
        .map_err(|_| ChatlineError::Config("URL cannot carry a path".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
