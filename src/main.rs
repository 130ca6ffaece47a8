//! Chatline - terminal client for a remote streaming chat service
//!
#![doc = "Main entry point for the Chatline application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatline::cli::{Cli, Commands};
use chatline::commands;
use chatline::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config = Config::load(cli.config.as_deref(), &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { resume } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(r) = &resume {
                tracing::debug!("Resuming conversation: {}", r);
            }
            commands::chat::run_chat(config, resume).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command).await?;
            Ok(())
        }
        Commands::Shared {
            share_id,
            continue_chat,
            links,
        } => {
            tracing::info!("Opening shared conversation {}", share_id);
            commands::shared::run_shared(config, share_id, continue_chat, links).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so streamed replies on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "chatline=debug" } else { "chatline=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
