use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::Result;
use crate::store::ConversationStore;
use crate::types::{ConversationSummary, Message, Role};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub async fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let mut store = super::build_store(config)?;
    run_history(&mut store, config, command).await
}

/// Run a history command against an existing store
pub async fn run_history(
    store: &mut ConversationStore,
    config: &Config,
    command: HistoryCommand,
) -> Result<()> {
    match command {
        HistoryCommand::List => {
            let summaries = store.list_summaries().await?;

            if summaries.is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }

            println!("\nConversation History:");
            summary_table(summaries, config.chat.history_title_width).printstd();
            println!();
            println!(
                "Use {} to continue a conversation.",
                "chatline chat --resume <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id } => {
            let conversation_id = super::resolve_conversation_id(store, &id).await?;
            store.load_detail(&conversation_id).await?;

            let title = store
                .find_summary(&conversation_id)
                .map(|s| s.title.clone())
                .unwrap_or_default();
            println!("\n{}", truncate_title(&title, usize::MAX).bold());
            println!("{}\n", conversation_id.dimmed());
            for message in store.messages() {
                println!("{}\n", render_message(message, config.chat.show_timestamps));
            }
        }
        HistoryCommand::Delete { id } => {
            let conversation_id = super::resolve_conversation_id(store, &id).await?;
            store.remove(&conversation_id).await?;
            println!(
                "{}",
                format!("Deleted conversation {}", conversation_id).green()
            );
        }
    }

    Ok(())
}

/// Build the conversation list table
pub fn summary_table(summaries: &[ConversationSummary], title_width: usize) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Last Updated".bold()
    ]);

    for summary in summaries {
        let id_short: String = summary.conversation_id.chars().take(8).collect();
        let updated = summary.updated_at.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(prettytable::row![
            id_short.cyan(),
            truncate_title(&summary.title, title_width),
            updated
        ]);
    }

    table
}

/// Shorten a title to `width` characters, marking the cut with "..."
pub fn truncate_title(title: &str, width: usize) -> String {
    let title = if title.trim().is_empty() {
        "(untitled)"
    } else {
        title.trim()
    };
    if title.chars().count() <= width {
        return title.to_string();
    }
    let kept: String = title.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Format one message for terminal output
pub fn render_message(message: &Message, show_timestamp: bool) -> String {
    let label = match message.role {
        Role::User => "You".green().bold(),
        Role::Assistant => "Assistant".cyan().bold(),
    };
    let stamp = match (show_timestamp, message.timestamp) {
        (true, Some(ts)) => format!(" {}", ts.format("%Y-%m-%d %H:%M").to_string().dimmed()),
        _ => String::new(),
    };
    format!("{}{}: {}", label, stamp, message.content)
}
