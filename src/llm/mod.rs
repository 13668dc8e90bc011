/// Request layer — one HTTP POST per exchange to an OpenAI-compatible
/// `/v1/chat/completions` endpoint.
///
/// The payload is always: a fixed system instruction, then the most recent
/// [`CONTEXT_TURNS`] stored turns oldest-first (the just-sent user turn is
/// already in the store, so it closes the window), with fixed sampling
/// settings. Policy constants live here rather than in the config record;
/// the conversation contract doesn't depend on them.
///
/// No retries and no backoff: a failed exchange surfaces one error message
/// and the next user message starts fresh.
use serde::{Deserialize, Serialize};

use crate::history::Turn;

pub mod client;

pub use client::{ChatClient, ChatReply};

/// System instruction prepended to every request.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant in a cyberpunk neural interface.";

/// Number of most-recent stored turns included as model context.
pub const CONTEXT_TURNS: usize = 10;

/// Fixed sampling temperature.
pub const TEMPERATURE: f64 = 0.7;

/// Fixed response token cap.
pub const MAX_TOKENS: u32 = 1000;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single message in the outbound payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Map a stored turn to its wire form.
    pub fn from_turn(turn: &Turn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }
    }
}

/// Build the outbound message window from the full stored conversation.
///
/// Returns the system instruction followed by the last [`CONTEXT_TURNS`]
/// turns in stored order — all of them when fewer exist.
pub fn context_window(turns: &[Turn]) -> Vec<ChatMessage> {
    let start = turns.len().saturating_sub(CONTEXT_TURNS);

    let mut messages = Vec::with_capacity(turns.len() - start + 1);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.extend(turns[start..].iter().map(ChatMessage::from_turn));
    messages
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("message {i}"))
                } else {
                    Turn::assistant(format!("message {i}"))
                }
            })
            .collect()
    }

    #[test]
    fn window_on_empty_history_is_system_only() {
        let messages = context_window(&[]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
    }

    #[test]
    fn window_includes_all_turns_when_under_limit() {
        let history = turns(4);
        let messages = context_window(&history);
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1].content, "message 0");
        assert_eq!(messages[4].content, "message 3");
    }

    #[test]
    fn window_caps_at_most_recent_ten_turns() {
        let history = turns(25);
        let messages = context_window(&history);

        assert_eq!(messages.len(), CONTEXT_TURNS + 1);
        // Oldest-first slice of the tail: turns 15..25.
        assert_eq!(messages[1].content, "message 15");
        assert_eq!(messages[CONTEXT_TURNS].content, "message 24");
    }

    #[test]
    fn window_preserves_roles() {
        let history = vec![Turn::user("q"), Turn::assistant("a")];
        let messages = context_window(&history);
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
    }
}
