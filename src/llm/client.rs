/// Synchronous chat-completions HTTP client.
///
/// One POST per exchange via `ureq`, bearer-token authorized, JSON in and
/// out. Expected response shape:
///
/// ```json
/// { "choices": [{ "message": { "content": "..." } }],
///   "usage": { "total_tokens": 42 } }
/// ```
///
/// Non-2xx responses carry `{ "error": { "message": "..." } }` when the
/// provider produced a structured error; otherwise the status line stands
/// in for it.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{ChatMessage, MAX_TOKENS, TEMPERATURE};
use crate::config::NlinkConfig;

/// Transport-level request timeout. There is no retry on expiry — the
/// exchange just fails with the transport's message.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

/// Response body (success).
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u64,
}

/// Response body (error).
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// The extracted result of one successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Assistant reply text.
    pub content: String,
    /// Token usage reported by the provider; 0 when the response carried
    /// no usage figure.
    pub total_tokens: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking HTTP client for chat exchanges.
///
/// Stateless apart from the timeout: endpoint, key and model are read from
/// the configuration at each call, so a settings save mid-session takes
/// effect on the next send.
#[derive(Debug)]
pub struct ChatClient {
    timeout: Duration,
}

impl ChatClient {
    pub fn new() -> Self {
        Self {
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Send the message window and return the assistant's reply.
    pub fn send(&self, config: &NlinkConfig, messages: &[ChatMessage]) -> Result<ChatReply> {
        let body = ChatRequest {
            model: &config.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let result = ureq::post(&config.api_endpoint)
            .set("Authorization", &format!("Bearer {}", config.api_key))
            .timeout(self.timeout)
            .send_json(&body);

        match result {
            Ok(resp) => {
                let text = resp
                    .into_string()
                    .context("failed to read chat completion response")?;
                parse_completion(&text)
            }
            Err(ureq::Error::Status(code, resp)) => {
                let status_text = resp.status_text().to_string();
                let body = resp.into_string().unwrap_or_default();
                anyhow::bail!(status_error_message(code, &status_text, &body))
            }
            Err(err @ ureq::Error::Transport(_)) => anyhow::bail!(err.to_string()),
        }
    }
}

impl Default for ChatClient {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a successful completion body into a [`ChatReply`].
fn parse_completion(text: &str) -> Result<ChatReply> {
    let completion: ChatCompletion =
        serde_json::from_str(text).context("failed to parse chat completion response")?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .context("chat completion contained no choices")?;

    Ok(ChatReply {
        content: choice.message.content,
        total_tokens: completion.usage.map(|u| u.total_tokens).unwrap_or(0),
    })
}

/// Human-readable message for a non-2xx response.
///
/// Prefers the provider's structured `error.message`; falls back to
/// `HTTP <status>: <statusText>` when the body is empty, malformed, or
/// missing the message field.
fn status_error_message(code: u16, status_text: &str, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| format!("HTTP {code}: {status_text}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
