//! Interactive terminal frontend.
//!
//! A line-based loop over [`Session`]: stored turns render on startup
//! (without re-triggering any network calls), then each prompt line is
//! either a slash command or a message to send. Rendering is a pure
//! mapping of (role or notice kind, content) to a styled line with a
//! role-specific avatar glyph.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::Colorize;

use crate::config::{mask_key, NlinkConfig};
use crate::history::{Role, Turn};
use crate::session::{ChatTransport, LinkStatus, SendOutcome, Session, MISSING_KEY_MESSAGE};

/// Severity of a system-level notice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Success,
    Error,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the interactive terminal session until `/quit` or end of input.
pub fn run<T: ChatTransport>(session: &mut Session<T>) -> Result<()> {
    print_banner();

    for turn in session.turns() {
        render_turn(turn);
    }
    if !session.turns().is_empty() {
        println!();
    }

    print_status_line(session);

    if !session.config().has_api_key() {
        render_notice(
            Notice::Info,
            "No API key configured — use /config to set one.",
        );
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", "❯".cyan().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/stats" => print_stats(session),
            "/clear" => {
                session.clear_history()?;
                render_notice(Notice::Success, "Conversation cleared");
            }
            "/config" => edit_config(session, &mut lines)?,
            _ if input.starts_with('/') => {
                render_notice(Notice::Error, &format!("Unknown command: {input}"));
            }
            message => {
                send_message(session, message, &mut lines)?;
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Sending
// ---------------------------------------------------------------------------

fn send_message<T: ChatTransport>(
    session: &mut Session<T>,
    message: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<()> {
    render_turn(&Turn::user(message));

    // Pending-response indicator; overwritten once the exchange settles.
    print!("{}  {}\r", "AI".bold().green(), "…".dimmed());
    io::stdout().flush()?;

    let outcome = session.submit(message)?;
    print!("\x1b[2K");

    match outcome {
        SendOutcome::Reply { content, .. } => {
            render_turn(&Turn::assistant(content));
            print_status_line(session);
        }
        SendOutcome::Failed { message } => {
            render_notice(Notice::Error, &format!("Error: {message}"));
            print_status_line(session);
        }
        SendOutcome::MissingApiKey => {
            render_notice(Notice::Error, MISSING_KEY_MESSAGE);
            edit_config(session, lines)?;
        }
        SendOutcome::Ignored | SendOutcome::Busy => {}
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Settings editor
// ---------------------------------------------------------------------------

/// Terminal counterpart of the settings panel: prompt the three fields,
/// blank input keeping the current value, then save through the session.
fn edit_config<T: ChatTransport>(
    session: &mut Session<T>,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<()> {
    println!("{}", "Settings".bold().cyan());
    println!("  {}", "Press Enter to keep the current value.".dimmed());

    let current = session.config().clone();

    let api_key = prompt_field(lines, "API key", &mask_key(&current.api_key))?
        .unwrap_or(current.api_key);
    let model = prompt_field(lines, "Model", &current.model)?.unwrap_or(current.model);
    let api_endpoint =
        prompt_field(lines, "Endpoint", &current.api_endpoint)?.unwrap_or(current.api_endpoint);

    let candidate = NlinkConfig {
        api_key,
        api_endpoint,
        model,
    };

    let outcome = session.save_config(&candidate)?;
    match outcome.rejection() {
        None => render_notice(Notice::Success, "Configuration saved successfully"),
        Some(message) => render_notice(Notice::Error, message),
    }
    print_status_line(session);

    Ok(())
}

/// Prompt one field; `None` means the user kept the current value.
fn prompt_field(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    label: &str,
    current: &str,
) -> Result<Option<String>> {
    let shown = if current.is_empty() { "unset" } else { current };
    print!("  {} [{}]: ", label.bold(), shown.dimmed());
    io::stdout().flush()?;

    match lines.next() {
        Some(line) => {
            let value = line?;
            if value.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(value.trim().to_string()))
            }
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn print_banner() {
    println!("{}", "NLINK Neural Interface".bold().cyan());
    println!("{}", "=".repeat(50));
    println!(
        "  {}",
        "Type a message and press Enter. /help lists commands.".dimmed()
    );
    println!();
}

/// Render one conversation turn with its avatar glyph.
fn render_turn(turn: &Turn) {
    let avatar = match turn.role {
        Role::User => "U ".bold().cyan(),
        Role::Assistant => "AI".bold().green(),
    };
    println!("{}  {}", avatar, turn.content);
}

/// Render a system-level notice line.
fn render_notice(kind: Notice, message: &str) {
    let glyph = match kind {
        Notice::Info => "!".bold().yellow(),
        Notice::Success => "!".bold().green(),
        Notice::Error => "!".bold().red(),
    };
    println!("{}   {}", glyph, message);
}

/// One dimmed status line: indicator, latency, tokens, uptime.
fn print_status_line<T: ChatTransport>(session: &Session<T>) {
    let stats = session.stats();
    let latency = stats
        .last_latency_ms()
        .map(|ms| format!("{ms}ms"))
        .unwrap_or_else(|| "--".to_string());

    println!(
        "{}  {}",
        colorize_status(session.status()),
        format!(
            "{} · {} tokens · up {}",
            latency,
            stats.total_tokens(),
            stats.uptime(),
        )
        .dimmed()
    );
}

fn colorize_status(status: LinkStatus) -> colored::ColoredString {
    match status {
        LinkStatus::Online => status.as_str().green(),
        LinkStatus::Standby => status.as_str().yellow(),
        LinkStatus::Processing => status.as_str().magenta(),
    }
}

fn print_help() {
    println!("{}", "Commands".bold().cyan());
    println!("  {}  {}", "/config".bold(), "edit API key, model, endpoint".dimmed());
    println!("  {}  {}", "/stats ".bold(), "session statistics".dimmed());
    println!("  {}  {}", "/clear ".bold(), "drop the stored conversation".dimmed());
    println!("  {}  {}", "/quit  ".bold(), "leave the session".dimmed());
}

fn print_stats<T: ChatTransport>(session: &Session<T>) {
    let stats = session.stats();
    println!("{}", "Session".bold().cyan());
    print_stat_row("Status", &session.status().to_string());
    print_stat_row("Uptime", &stats.uptime());
    print_stat_row("Tokens", &stats.total_tokens().to_string());
    print_stat_row(
        "Latency",
        &stats
            .last_latency_ms()
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_else(|| "no exchanges yet".to_string()),
    );
    print_stat_row("Turns", &session.turns().len().to_string());
    print_stat_row("Model", &session.config().model);
}

fn print_stat_row(name: &str, detail: &str) {
    println!("  {:<10} {}", name.bold(), detail.dimmed());
}
