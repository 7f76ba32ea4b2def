//! # EduBot Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the `edubot` binary. It parses the command line, sets up
//! logging from the verbosity flags, loads the layered configuration and
//! dispatches to the command handlers.
//!
//! ## Examples
//!
//! ```bash
//! # Run the HTTP API on the configured port
//! edubot serve
//!
//! # Ask a question from the terminal with debug logging
//! edubot -vv chat --message "Tell me about hostels"
//!
//! # Use a specific config file
//! edubot --config ./staging.toml loadtest --users 50
//! ```
//!
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod bot; // Chatbot engine: topics, conversations, knowledge, responder
mod commands; // Command surfaces (serve, chat, kb, loadtest)
mod core; // Core infrastructure (errors, config, templating)

#[derive(Parser, Debug)]
#[command(
    name = "edubot",
    about = "🎓 EduBot: FAQ assistant for the Nalanda Institute of Technology",
    long_about = "Answer admissions, courses, placements and campus-life questions over HTTP or in the terminal,\n\
                  inspect the knowledge base, and load test a running server.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Read configuration from this file instead of `.edubot.toml`.
    #[arg(long, global = true, env = "EDUBOT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Run the HTTP API and chat pages.
    #[command(alias = "s")]
    Serve(commands::serve::ServeArgs),
    /// Chat with the bot in the terminal.
    #[command(alias = "c")]
    Chat(commands::chat::ChatArgs),
    /// Inspect the knowledge base.
    #[command(alias = "k")]
    Kb(commands::kb::KbArgs),
    /// Simulate concurrent users against a running server.
    #[command(alias = "l")]
    Loadtest(commands::loadtest::LoadTestArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match core::config::load_config(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Serve(args) => commands::serve::handle_serve(args, config).await,
            Commands::Chat(args) => commands::chat::handle_chat(args, config).await,
            Commands::Kb(args) => commands::kb::handle_kb(args).await,
            Commands::Loadtest(args) => commands::loadtest::handle_loadtest(args, config).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_aliases_parse() {
        let cli = Cli::parse_from(["edubot", "-vv", "k", "show", "college"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Kb(_)));
        let cli = Cli::parse_from(["edubot", "c", "--message", "hi"]);
        assert!(matches!(cli.command, Commands::Chat(_)));
    }
}
