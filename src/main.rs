use anyhow::Result;
use clap::{Parser, Subcommand};

use nlink::chat;
use nlink::cli;
use nlink::config::ConfigStore;
use nlink::history::HistoryStore;
use nlink::llm::ChatClient;
use nlink::session::Session;
use nlink::web;

#[derive(Debug, Parser)]
#[command(name = "nlink")]
#[command(about = "Terminal and local-web client for OpenAI-compatible chat endpoints")]
struct App {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive terminal chat session (the default)
    Chat,
    /// Serve the browser chat client
    Web {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:9747")]
        addr: String,
    },
    /// Send a single message and print the reply
    Send {
        /// The message to send
        #[arg(trailing_var_arg = true, required = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show or clear the stored conversation
    History {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
        /// Drop all stored turns
        #[arg(long)]
        clear: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Check configuration and stored state
    Health,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Set one field: api-key, model, or endpoint
    Set { field: String, value: String },
    /// Reset the stored configuration to defaults
    Reset,
}

fn new_session() -> Result<Session<ChatClient>> {
    Ok(Session::new(
        ConfigStore::open_default()?,
        HistoryStore::open_default()?,
        ChatClient::new(),
    ))
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command.unwrap_or(Commands::Chat) {
        Commands::Chat => chat::run(&mut new_session()?),
        Commands::Web { addr } => web::serve(&addr, &mut new_session()?),
        Commands::Send { args } => cli::run_send(&args.join(" ")),
        Commands::History { format, clear } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(fmt, clear)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Set { field, value } => cli::run_config_set(&field, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
        Commands::Health => cli::run_health(),
    }
}
