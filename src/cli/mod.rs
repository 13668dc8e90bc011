//! CLI command implementations for nlink maintenance and diagnostics.
//!
//! Provides subcommand handlers for:
//! - `nlink send "message"` — one-shot exchange, reply on stdout
//! - `nlink history` — show or clear the stored conversation
//! - `nlink config show|set|reset` — configuration management
//! - `nlink health` — check config, key, model, stored state

use anyhow::Result;
use colored::Colorize;

use crate::config::{self, mask_key, ConfigStore, SaveOutcome};
use crate::history::{HistoryStore, Role};
use crate::llm::ChatClient;
use crate::session::{SendOutcome, Session};

/// Output format for data commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// nlink send
// ---------------------------------------------------------------------------

/// Run one exchange and print the reply to stdout.
///
/// Unlike the interactive frontends, a failed exchange here exits
/// non-zero so the command composes in scripts.
pub fn run_send(message: &str) -> Result<()> {
    let mut session = Session::new(
        ConfigStore::open_default()?,
        HistoryStore::open_default()?,
        ChatClient::new(),
    );

    match session.submit(message)? {
        SendOutcome::Reply { content, .. } => {
            println!("{content}");
            Ok(())
        }
        SendOutcome::Failed { message } => anyhow::bail!(message),
        SendOutcome::MissingApiKey => {
            anyhow::bail!("no API key configured — run `nlink config set api-key <key>`")
        }
        SendOutcome::Ignored => anyhow::bail!("message is empty"),
        SendOutcome::Busy => unreachable!("one-shot session cannot be busy"),
    }
}

// ---------------------------------------------------------------------------
// nlink history
// ---------------------------------------------------------------------------

/// Show or clear the stored conversation.
pub fn run_history(format: OutputFormat, clear: bool) -> Result<()> {
    let mut store = HistoryStore::open_default()?;

    if clear {
        let count = store.len();
        store.clear()?;
        println!("{} Cleared {} stored turns", "✓".green().bold(), count);
        return Ok(());
    }

    if store.is_empty() {
        println!("{}", "No stored conversation yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(store.turns())?);
        }
        OutputFormat::Table => {
            println!("{}", "Stored Conversation".bold().cyan());
            println!("{}", "=".repeat(60));
            for (i, turn) in store.turns().iter().enumerate() {
                let who = match turn.role {
                    Role::User => "U ".cyan().bold(),
                    Role::Assistant => "AI".green().bold(),
                };
                let line = format!("  {:>3}  {}  {}", i + 1, who, truncate(&turn.content, 64));
                if i % 2 == 0 {
                    println!("{line}");
                } else {
                    println!("{}", line.dimmed());
                }
            }
            println!();
            println!("  {}", format!("{} turns", store.len()).dimmed());
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// nlink config show | set | reset
// ---------------------------------------------------------------------------

/// Show the effective configuration and its sources.
pub fn run_config_show() -> Result<()> {
    let store = ConfigStore::open_default()?;
    let cfg = store.load();

    let key_display = if cfg.has_api_key() {
        mask_key(&cfg.api_key)
    } else {
        "unset".to_string()
    };

    println!("{}", "Effective Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    print_row("API key", &key_display);
    print_row("Model", &cfg.model);
    print_row("Endpoint", &cfg.api_endpoint);
    println!();
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if store.exists() {
        println!("  {} {}", "✓".green(), store.path().display().to_string().dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            format!("{} (not found)", store.path().display()).dimmed()
        );
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "NLINK_API_KEY / NLINK_MODEL / NLINK_ENDPOINT environment variables".dimmed()
    );

    Ok(())
}

/// Set a single configuration field in the stored record.
///
/// The candidate goes through the same validation as any other save, so
/// e.g. blanking the API key is rejected rather than persisted.
pub fn run_config_set(field: &str, value: &str) -> Result<()> {
    let store = ConfigStore::open_default()?;
    let mut candidate = store.stored();

    match field {
        "api-key" | "api_key" | "key" => candidate.api_key = value.to_string(),
        "model" => candidate.model = value.to_string(),
        "endpoint" | "api-endpoint" | "api_endpoint" => {
            candidate.api_endpoint = value.to_string();
        }
        other => anyhow::bail!("unknown config field '{other}' (expected api-key, model, or endpoint)"),
    }

    match store.save(&candidate)? {
        SaveOutcome::Saved(resolved) => {
            let shown = match field {
                "api-key" | "api_key" | "key" => mask_key(&resolved.api_key),
                "model" => resolved.model,
                _ => resolved.api_endpoint,
            };
            println!("{} Set {} = {}", "✓".green().bold(), field.bold(), shown);
            Ok(())
        }
        rejected => anyhow::bail!(rejected.rejection().unwrap_or("invalid configuration")),
    }
}

/// Reset the stored configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let store = ConfigStore::open_default()?;
    store.reset()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        store.path().display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// nlink health
// ---------------------------------------------------------------------------

/// Check configuration and stored state.
pub fn run_health() -> Result<()> {
    println!("{}", "NLINK Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let store = ConfigStore::open_default()?;
    let cfg = store.load();

    print_health_item(
        "Config file",
        store.exists(),
        &if store.exists() {
            store.path().display().to_string()
        } else {
            "not found (saved on first config change)".to_string()
        },
    );

    print_health_item(
        "API key",
        cfg.has_api_key(),
        if cfg.has_api_key() {
            "configured"
        } else {
            "missing — requests will be refused"
        },
    );

    print_health_item(
        "Model",
        config::is_known_model(&cfg.model),
        &cfg.model,
    );

    print_health_item("Endpoint", true, &cfg.api_endpoint);

    let history = HistoryStore::open_default()?;
    print_health_item(
        "History",
        true,
        &if history.is_empty() {
            "empty".to_string()
        } else {
            format!("{} turns stored", history.len())
        },
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn print_row(name: &str, detail: &str) {
    println!("  {:<10} {}", name.bold(), detail);
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<14} {}", status, name, detail.dimmed());
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("héllo wörld", 5), "héll…");
    }
}
