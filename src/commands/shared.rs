//! Shared link viewer
//!
//! Mounts the shared-view gate for a share id and prints whatever state it
//! lands in. With `--continue` a loaded share is handed to interactive chat.

use colored::Colorize;

use crate::auth::{AuthState, StaticAuth};
use crate::commands::chat::run_chat_with_store;
use crate::commands::history::render_message;
use crate::config::Config;
use crate::error::Result;
use crate::service::HttpChatService;
use crate::shared::{greeting, share_links, ContinueTarget, SharedViewGate, SharedViewState};
use crate::store::ConversationStore;

/// Open a shared conversation
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `share_id` - Identifier from the shared link
/// * `continue_chat` - Continue the conversation interactively once loaded
/// * `links` - Print the app deep link and web link for the share
pub async fn run_shared(
    config: Config,
    share_id: String,
    continue_chat: bool,
    links: bool,
) -> Result<()> {
    if links {
        let links = share_links(&config.share, &share_id)?;
        println!("App link: {}", links.app.as_str().cyan());
        println!("Web link: {}\n", links.web.as_str().cyan());
    }

    let service = HttpChatService::new(&config.service)?;
    let auth = StaticAuth::from_config(&config);
    let gate = SharedViewGate::mount(&share_id, &auth, &service).await;
    print_state(&config, &auth, gate.state());

    if !continue_chat {
        return Ok(());
    }
    if !matches!(gate.state(), SharedViewState::Loaded(_)) {
        tracing::debug!(share_id = %gate.share_id(), "nothing to continue");
        return Ok(());
    }

    let mut store = ConversationStore::new(std::sync::Arc::new(service));
    match gate.continue_conversation(&mut store).await? {
        ContinueTarget::Original(id) => {
            tracing::info!("Continuing original conversation {}", id);
        }
        ContinueTarget::Fresh => {
            println!(
                "{}\n",
                "The original conversation is not available; starting a new one.".yellow()
            );
        }
    }
    run_chat_with_store(&config, &mut store).await
}

fn print_state(config: &Config, auth: &dyn AuthState, state: &SharedViewState) {
    match state {
        SharedViewState::Loaded(shared) => {
            if let Some(line) = greeting(auth) {
                println!("{}", line);
            }
            println!("\n{}", shared.title.bold());
            println!(
                "{}\n",
                format!(
                    "Shared by {} on {}",
                    shared.shared_by,
                    shared.shared_at.format("%Y-%m-%d %H:%M")
                )
                .dimmed()
            );
            for message in &shared.messages {
                println!("{}\n", render_message(message, config.chat.show_timestamps));
            }
        }
        SharedViewState::SignInPrompt => {
            println!("{}", state_text(state).yellow());
            println!("Set an API token with --token or CHATLINE_API_TOKEN.");
        }
        SharedViewState::Loading => println!("Loading..."),
        _ => eprintln!("{}", state_text(state).red()),
    }
}

fn state_text(state: &SharedViewState) -> &'static str {
    state.message().unwrap_or_default()
}
