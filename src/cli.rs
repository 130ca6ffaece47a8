//! Command-line interface definition for Chatline
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, conversation history, and
//! shared conversation links.

use clap::{Parser, Subcommand};

/// Chatline - streaming chat client for a remote conversation service
#[derive(Parser, Debug, Clone)]
#[command(name = "chatline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "CHATLINE_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the chat service base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the bearer token sent to the chat service
    #[arg(long)]
    pub token: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Chatline
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Resume an existing conversation (full ID or unique prefix)
        #[arg(short, long)]
        resume: Option<String>,
    },

    /// Manage conversation history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Open a shared conversation link
    Shared {
        /// Share identifier from the link (`/chat/shared/<share_id>`)
        share_id: String,

        /// Continue the conversation in interactive chat after viewing it
        #[arg(long = "continue")]
        continue_chat: bool,

        /// Print the app deep link and web link for this share
        #[arg(long)]
        links: bool,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List conversations, most recent first
    List,

    /// Print every message of a conversation
    Show {
        /// Conversation ID (full ID or unique prefix)
        id: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation ID (full ID or unique prefix)
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            verbose: false,
            base_url: None,
            token: None,
            command: Commands::Chat { resume: None },
        }
    }
}
