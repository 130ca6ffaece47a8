/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`    - Interactive chat mode
- `history` - List, show and delete saved conversations
- `shared`  - Open a shared conversation link

These handlers are small and drive the library components: the
conversation store, the chat service client and the shared-view gate.
*/

use std::sync::Arc;

use crate::config::Config;
use crate::error::{ChatlineError, Result};
use crate::service::HttpChatService;
use crate::store::ConversationStore;

// Special commands parser for conversation management
pub mod special_commands;

// History subcommands
pub mod history;

// Shared link viewer
pub mod shared;

/// Build a conversation store backed by the configured HTTP service
pub fn build_store(config: &Config) -> Result<ConversationStore> {
    let service = HttpChatService::new(&config.service)?;
    Ok(ConversationStore::new(Arc::new(service)))
}

/// Resolve a full conversation id from a full id or unique prefix
///
/// Looks in the cached summary list first and refreshes it once on a miss.
/// An id the list still does not know is returned unchanged so the service
/// can answer for it.
///
/// # Errors
///
/// Returns [`ChatlineError::Validation`] for an ambiguous prefix.
pub async fn resolve_conversation_id(store: &mut ConversationStore, needle: &str) -> Result<String> {
    if let Ok(summary) = store.find_summary(needle) {
        return Ok(summary.conversation_id.clone());
    }

    if let Err(e) = store.list_summaries().await {
        tracing::warn!("Failed to refresh conversation list: {}", e);
    }

    match store.find_summary(needle) {
        Ok(summary) => Ok(summary.conversation_id.clone()),
        Err(e) => match ChatlineError::classify(&e) {
            Some(ChatlineError::NotFound(_)) => Ok(needle.trim().to_string()),
            _ => Err(e),
        },
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline-based loop over a [`ConversationStore`]. Plain input
    //! is sent to the chat service and the reply is printed as it streams
    //! in; `/` commands manage conversations.

    use super::*;
    use std::io::Write;

    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use tokio_util::sync::CancellationToken;

    use crate::auth::StaticAuth;
    use crate::commands::history::{render_message, summary_table};
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::shared::greeting;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `resume` - Optional conversation id or unique prefix to continue
    pub async fn run_chat(config: Config, resume: Option<String>) -> Result<()> {
        let mut store = build_store(&config)?;

        if let Err(e) = store.list_summaries().await {
            tracing::warn!("Failed to load conversation list: {}", e);
        }

        if let Some(needle) = resume {
            let conversation_id = resolve_conversation_id(&mut store, &needle).await?;
            store.load_detail(&conversation_id).await?;
            tracing::info!("Resumed conversation {}", conversation_id);
        }

        run_chat_with_store(&config, &mut store).await
    }

    /// Run the interactive loop over an existing store
    ///
    /// The active conversation of `store`, if any, is printed first.
    pub async fn run_chat_with_store(config: &Config, store: &mut ConversationStore) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(config);
        if !store.messages().is_empty() {
            for message in store.messages() {
                println!("{}\n", render_message(message, config.chat.show_timestamps));
            }
        }

        loop {
            match rl.readline(&prompt(store)) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => {}
                        Ok(SpecialCommand::Exit) => break,
                        Ok(command) => {
                            if let Err(e) = handle_special(config, store, command).await {
                                eprintln!("{}", format!("Error: {}", e).red());
                            }
                            continue;
                        }
                        Err(e) => {
                            eprintln!("{}", e.to_string().yellow());
                            continue;
                        }
                    }

                    rl.add_history_entry(trimmed)?;

                    if let Err(e) = send_and_print(store, trimmed).await {
                        report_send_error(&e);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("^D");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn send_and_print(store: &mut ConversationStore, text: &str) -> Result<()> {
        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        print!("{} ", "Assistant:".cyan().bold());
        let _ = std::io::stdout().flush();

        let result = store
            .send(text, &cancel, |chunk| {
                print!("{}", chunk);
                let _ = std::io::stdout().flush();
            })
            .await;
        watcher.abort();
        println!("\n");

        let outcome = result?;
        tracing::debug!(
            conversation_id = %outcome.conversation_id,
            chars = outcome.message.content.len(),
            "exchange completed"
        );
        Ok(())
    }

    fn report_send_error(err: &anyhow::Error) {
        match ChatlineError::classify(err) {
            Some(ChatlineError::Cancelled) => {
                eprintln!("{}", "Response cancelled.".yellow());
            }
            Some(ChatlineError::Unauthorized(_)) => {
                eprintln!(
                    "{}",
                    "The service rejected your credentials. Check your API token.".red()
                );
            }
            _ => eprintln!("{}", format!("Error: {}", err).red()),
        }
    }

    async fn handle_special(
        config: &Config,
        store: &mut ConversationStore,
        command: SpecialCommand,
    ) -> Result<()> {
        match command {
            SpecialCommand::New => {
                store.start_new();
                println!("{}\n", "Started a new conversation.".green());
            }
            SpecialCommand::History => {
                let summaries = store.list_summaries().await?;
                if summaries.is_empty() {
                    println!("{}\n", "No conversation history found.".yellow());
                } else {
                    summary_table(summaries, config.chat.history_title_width).printstd();
                    println!();
                }
            }
            SpecialCommand::Open(needle) => {
                let conversation_id = resolve_conversation_id(store, &needle).await?;
                store.load_detail(&conversation_id).await?;
                println!(
                    "{}\n",
                    format!("Opened conversation {}", conversation_id).green()
                );
                for message in store.messages() {
                    println!("{}\n", render_message(message, config.chat.show_timestamps));
                }
            }
            SpecialCommand::Delete(needle) => {
                let conversation_id = resolve_conversation_id(store, &needle).await?;
                store.remove(&conversation_id).await?;
                println!(
                    "{}\n",
                    format!("Deleted conversation {}", conversation_id).green()
                );
            }
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
        Ok(())
    }

    fn prompt(store: &ConversationStore) -> String {
        match store.active_conversation_id() {
            Some(id) => {
                let short: String = id.chars().take(8).collect();
                format!("[{}] >> ", short)
            }
            None => "[new] >> ".to_string(),
        }
    }

    fn print_welcome_banner(config: &Config) {
        println!("{}", "Chatline interactive chat".bold());
        if let Some(line) = greeting(&StaticAuth::from_config(config)) {
            println!("{}", line);
        }
        println!("Type '/help' for commands, 'exit' to quit.\n");
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::service::fake::FakeChatService;
        use crate::service::StreamEvent;

        #[tokio::test]
        async fn test_prompt_shows_active_conversation() {
            let service = Arc::new(FakeChatService::new());
            service.insert_conversation("c1234567890", "First", vec![]);
            let mut store = ConversationStore::new(service);
            assert_eq!(prompt(&store), "[new] >> ");

            store.load_detail("c1234567890").await.unwrap();
            assert_eq!(prompt(&store), "[c1234567] >> ");
        }

        #[tokio::test]
        async fn test_handle_special_open_and_delete_by_prefix() {
            let service = Arc::new(FakeChatService::new());
            service.insert_conversation("c1234", "First", vec![]);
            let mut store = ConversationStore::new(service.clone());
            let config = Config::default();

            handle_special(&config, &mut store, SpecialCommand::Open("c12".into()))
                .await
                .unwrap();
            assert_eq!(store.active_conversation_id(), Some("c1234"));

            handle_special(&config, &mut store, SpecialCommand::Delete("c12".into()))
                .await
                .unwrap();
            assert_eq!(store.active_conversation_id(), None);
            assert!(store.summaries().is_empty());
        }

        #[tokio::test]
        async fn test_handle_special_new_discards_conversation() {
            let service = Arc::new(FakeChatService::new());
            service.script_stream(vec![Ok(StreamEvent::Done {
                conversation_id: "c1".into(),
            })]);
            let mut store = ConversationStore::new(service);
            send_and_print(&mut store, "hello").await.unwrap();
            assert_eq!(store.active_conversation_id(), Some("c1"));

            handle_special(&Config::default(), &mut store, SpecialCommand::New)
                .await
                .unwrap();
            assert_eq!(store.active_conversation_id(), None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fake::{Call, FakeChatService};

    #[tokio::test]
    async fn test_resolve_uses_cache_first() {
        let service = Arc::new(FakeChatService::new());
        service.insert_conversation("abc123", "One", vec![]);
        let mut store = ConversationStore::new(service.clone());
        store.list_summaries().await.unwrap();

        let id = resolve_conversation_id(&mut store, "abc").await.unwrap();
        assert_eq!(id, "abc123");
        assert_eq!(service.calls(), vec![Call::List]);
    }

    #[tokio::test]
    async fn test_resolve_refreshes_on_miss() {
        let service = Arc::new(FakeChatService::new());
        service.insert_conversation("abc123", "One", vec![]);
        let mut store = ConversationStore::new(service.clone());

        let id = resolve_conversation_id(&mut store, "abc").await.unwrap();
        assert_eq!(id, "abc123");
    }

    #[tokio::test]
    async fn test_resolve_unknown_passes_through() {
        let service = Arc::new(FakeChatService::new());
        let mut store = ConversationStore::new(service);

        let id = resolve_conversation_id(&mut store, " zzz ").await.unwrap();
        assert_eq!(id, "zzz");
    }

    #[tokio::test]
    async fn test_resolve_ambiguous_is_error() {
        let service = Arc::new(FakeChatService::new());
        service.insert_conversation("ab1", "One", vec![]);
        service.insert_conversation("ab2", "Two", vec![]);
        let mut store = ConversationStore::new(service);

        assert!(resolve_conversation_id(&mut store, "ab").await.is_err());
    }
}
