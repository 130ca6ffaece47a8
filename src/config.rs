//! Configuration management for Chatline
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatlineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Chatline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote chat service connection settings
    #[serde(default)]
    pub service: ServiceConfig,
    /// Identity asserted by the environment
    #[serde(default)]
    pub user: UserConfig,
    /// Shared-link and deep-link settings
    #[serde(default)]
    pub share: ShareConfig,
    /// Interactive chat presentation settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Remote chat service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the chat API (e.g. `https://chat.example.com/api`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request
    ///
    /// When set, the client is treated as signed in.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Timeout for non-streaming requests and for connecting (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Identity attributes supplied by the environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserConfig {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.first_name.is_none() && self.email.is_none()
    }
}

/// Shared-link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// URL scheme registered by the mobile app (e.g. `chatline`)
    #[serde(default = "default_app_scheme")]
    pub app_scheme: String,

    /// Public web origin that serves shared links
    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,
}

fn default_app_scheme() -> String {
    "chatline".to_string()
}

fn default_web_base_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            app_scheme: default_app_scheme(),
            web_base_url: default_web_base_url(),
        }
    }
}

/// Interactive chat presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Print message timestamps when showing a conversation
    #[serde(default)]
    pub show_timestamps: bool,

    /// Maximum title width in the history table
    #[serde(default = "default_history_title_width")]
    pub history_title_width: usize,
}

fn default_history_title_width() -> usize {
    40
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            show_timestamps: false,
            history_title_width: default_history_title_width(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// When `path` is `None` the platform config directory is tried
    /// (`<config dir>/chatline/config.yaml`). A missing file falls back to
    /// defaults with a warning.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: Option<&str>, cli: &crate::cli::Cli) -> Result<Self> {
        let path = path.map(PathBuf::from).or_else(default_config_path);

        let mut config = match path {
            Some(ref p) if p.exists() => Self::from_file(p)?,
            Some(ref p) => {
                tracing::warn!("Config file not found at {}, using defaults", p.display());
                Self::default()
            }
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatlineError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatlineError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("CHATLINE_BASE_URL") {
            self.service.base_url = base_url;
        }

        if let Ok(token) = std::env::var("CHATLINE_API_TOKEN") {
            self.service.api_token = Some(token).filter(|t| !t.is_empty());
        }

        if let Ok(timeout) = std::env::var("CHATLINE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.service.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid CHATLINE_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(name) = std::env::var("CHATLINE_USER_NAME") {
            self.user.name = Some(name);
        }

        if let Ok(email) = std::env::var("CHATLINE_USER_EMAIL") {
            self.user.email = Some(email);
        }

        if let Ok(scheme) = std::env::var("CHATLINE_APP_SCHEME") {
            self.share.app_scheme = scheme;
        }

        if let Ok(web) = std::env::var("CHATLINE_WEB_BASE_URL") {
            self.share.web_base_url = web;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.base_url {
            self.service.base_url = base_url.clone();
        }
        if let Some(token) = &cli.token {
            self.service.api_token = Some(token.clone());
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Whether the environment asserts a signed-in user
    ///
    /// A configured API token or any identity attribute counts as signed in.
    pub fn is_signed_in(&self) -> bool {
        self.service.api_token.is_some() || !self.user.is_empty()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.service.base_url).map_err(|e| {
            ChatlineError::Config(format!(
                "service.base_url is not a valid URL ({}): {}",
                self.service.base_url, e
            ))
        })?;

        if self.service.timeout_seconds == 0 {
            return Err(ChatlineError::Config(
                "service.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.service.timeout_seconds > 600 {
            return Err(ChatlineError::Config(
                "service.timeout_seconds must be less than or equal to 600".to_string(),
            )
            .into());
        }

        url::Url::parse(&self.share.web_base_url).map_err(|e| {
            ChatlineError::Config(format!(
                "share.web_base_url is not a valid URL ({}): {}",
                self.share.web_base_url, e
            ))
        })?;

        let scheme = &self.share.app_scheme;
        let valid_scheme = scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid_scheme {
            return Err(ChatlineError::Config(format!(
                "share.app_scheme is not a valid URL scheme: {:?}",
                scheme
            ))
            .into());
        }

        if self.chat.history_title_width < 8 {
            return Err(ChatlineError::Config(
                "chat.history_title_width must be at least 8".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "chatline", "chatline")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}
