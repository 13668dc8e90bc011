/// Chat controller — the send → request → persist cycle.
///
/// A [`Session`] owns the loaded configuration, the history store, the
/// single in-flight guard flag, and the session stats; both frontends
/// drive it through [`Session::submit`] and render the returned
/// [`SendOutcome`]. There is no other mutable state in the program.
///
/// The controller has two states, `Idle` and `Sending`, tracked by the
/// processing flag. Entering `Sending` appends and persists the user turn
/// before the request goes out, so a crash mid-exchange still leaves the
/// user's side of the conversation on disk. Leaving `Sending` is
/// unconditional on completion: success appends the assistant turn and
/// updates stats; failure yields the error message and touches nothing
/// else — the user turn stays recorded, with no compensating removal.
use std::time::Instant;

use anyhow::Result;

use crate::config::{ConfigStore, NlinkConfig, SaveOutcome};
use crate::history::{HistoryStore, Turn};
use crate::llm::{self, ChatClient, ChatMessage, ChatReply};

pub mod stats;

pub use stats::{LinkStatus, SessionStats};

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// The one suspension point of the controller: sending a message window
/// and waiting for the reply. Implemented by [`ChatClient`] for real HTTP
/// and by test doubles for controller tests.
pub trait ChatTransport {
    fn send(&self, config: &NlinkConfig, messages: &[ChatMessage]) -> Result<ChatReply>;
}

impl ChatTransport for ChatClient {
    fn send(&self, config: &NlinkConfig, messages: &[ChatMessage]) -> Result<ChatReply> {
        ChatClient::send(self, config, messages)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What one [`Session::submit`] call amounted to. Frontends render these;
/// the controller itself prints nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was blank after trimming. Nothing happened.
    Ignored,
    /// A request is already outstanding. Nothing happened — not queued,
    /// not an error.
    Busy,
    /// No API key configured; the request was never issued. Frontends
    /// surface the settings panel.
    MissingApiKey,
    /// Exchange succeeded; the assistant turn is persisted and stats are
    /// updated.
    Reply {
        content: String,
        latency_ms: u64,
        total_tokens: u64,
    },
    /// Exchange failed; the user turn remains recorded and stats are
    /// unchanged.
    Failed { message: String },
}

/// User-visible message for the missing-key refusal.
pub const MISSING_KEY_MESSAGE: &str = "Please configure your API key first";

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Application state: configuration, history, guard flag, stats.
pub struct Session<T: ChatTransport> {
    config: NlinkConfig,
    config_store: ConfigStore,
    history: HistoryStore,
    transport: T,
    processing: bool,
    stats: SessionStats,
}

impl<T: ChatTransport> Session<T> {
    /// Build a session from its stores, loading the effective config.
    pub fn new(config_store: ConfigStore, history: HistoryStore, transport: T) -> Self {
        let config = config_store.load();
        Self {
            config,
            config_store,
            history,
            transport,
            processing: false,
            stats: SessionStats::new(),
        }
    }

    pub fn config(&self) -> &NlinkConfig {
        &self.config
    }

    pub fn turns(&self) -> &[Turn] {
        self.history.turns()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Current status indicator value.
    pub fn status(&self) -> LinkStatus {
        if self.processing {
            LinkStatus::Processing
        } else if self.config.has_api_key() {
            LinkStatus::Online
        } else {
            LinkStatus::Standby
        }
    }

    /// Submit one user input through the full cycle.
    ///
    /// Guards, in order: in-flight request (silent no-op), blank input
    /// (silent no-op), missing API key (refusal, no request). Otherwise
    /// the user turn is persisted, the window is sent, and the outcome of
    /// the exchange comes back. `Err` is reserved for persistence
    /// failures; request failures are a [`SendOutcome::Failed`].
    pub fn submit(&mut self, input: &str) -> Result<SendOutcome> {
        if self.processing {
            return Ok(SendOutcome::Busy);
        }

        let message = input.trim();
        if message.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        if !self.config.has_api_key() {
            return Ok(SendOutcome::MissingApiKey);
        }

        self.history.append(Turn::user(message))?;

        self.processing = true;
        let outcome = self.exchange();
        self.processing = false;

        outcome
    }

    /// Issue the request for the already-appended user turn.
    fn exchange(&mut self) -> Result<SendOutcome> {
        let messages = llm::context_window(self.history.turns());

        let start = Instant::now();
        match self.transport.send(&self.config, &messages) {
            Ok(reply) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                self.history.append(Turn::assistant(reply.content.clone()))?;
                self.stats.record_exchange(reply.total_tokens, latency_ms);
                Ok(SendOutcome::Reply {
                    content: reply.content,
                    latency_ms,
                    total_tokens: reply.total_tokens,
                })
            }
            Err(err) => Ok(SendOutcome::Failed {
                message: err.to_string(),
            }),
        }
    }

    /// Validate and persist a configuration candidate, adopting it for
    /// the rest of the session when accepted.
    pub fn save_config(&mut self, candidate: &NlinkConfig) -> Result<SaveOutcome> {
        let outcome = self.config_store.save(candidate)?;
        if let SaveOutcome::Saved(resolved) = &outcome {
            self.config = resolved.clone();
        }
        Ok(outcome)
    }

    /// Drop the persisted conversation.
    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::history::Role;

    /// Scripted transport: pops one canned result per send, recording the
    /// window it was handed.
    struct MockTransport {
        script: RefCell<VecDeque<Result<ChatReply>>>,
        calls: RefCell<Vec<Vec<ChatMessage>>>,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                script: RefCell::new(VecDeque::new()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn push_reply(&self, content: &str, tokens: u64) {
            self.script.borrow_mut().push_back(Ok(ChatReply {
                content: content.to_string(),
                total_tokens: tokens,
            }));
        }

        fn push_error(&self, message: &str) {
            self.script
                .borrow_mut()
                .push_back(Err(anyhow::anyhow!("{message}")));
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        fn last_window(&self) -> Vec<ChatMessage> {
            self.calls.borrow().last().cloned().unwrap()
        }
    }

    impl ChatTransport for &MockTransport {
        fn send(&self, _config: &NlinkConfig, messages: &[ChatMessage]) -> Result<ChatReply> {
            self.calls.borrow_mut().push(messages.to_vec());
            self.script
                .borrow_mut()
                .pop_front()
                .expect("unscripted send")
        }
    }

    fn scratch_session<'a>(
        name: &str,
        transport: &'a MockTransport,
    ) -> Session<&'a MockTransport> {
        let dir = std::env::temp_dir();
        let pid = std::process::id();

        let config_path = dir.join(format!("nlink-session-{pid}-{name}-config.json"));
        let history_path = dir.join(format!("nlink-session-{pid}-{name}-history.json"));
        let _ = std::fs::remove_file(&config_path);
        let _ = std::fs::remove_file(&history_path);

        let config_store = ConfigStore::at(&config_path);
        config_store
            .save(&NlinkConfig {
                api_key: "sk-test".to_string(),
                ..NlinkConfig::default()
            })
            .unwrap();

        Session::new(config_store, HistoryStore::open(history_path), transport)
    }

    #[test]
    fn successful_exchange_appends_both_turns_and_updates_stats() {
        let transport = MockTransport::new();
        transport.push_reply("hello back", 42);
        let mut session = scratch_session("success", &transport);

        let outcome = session.submit("hello").unwrap();
        let SendOutcome::Reply {
            content,
            total_tokens,
            ..
        } = outcome
        else {
            panic!("expected a reply, got {outcome:?}");
        };
        assert_eq!(content, "hello back");
        assert_eq!(total_tokens, 42);

        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns()[0].role, Role::User);
        assert_eq!(session.turns()[1].role, Role::Assistant);
        assert_eq!(session.stats().total_tokens(), 42);
        assert!(session.stats().last_latency_ms().is_some());
    }

    #[test]
    fn submit_trims_input_before_sending() {
        let transport = MockTransport::new();
        transport.push_reply("ok", 0);
        let mut session = scratch_session("trim", &transport);

        session.submit("  hi there  \n").unwrap();
        assert_eq!(session.turns()[0].content, "hi there");
    }

    #[test]
    fn blank_input_is_ignored_without_side_effects() {
        let transport = MockTransport::new();
        let mut session = scratch_session("blank", &transport);

        assert_eq!(session.submit("   ").unwrap(), SendOutcome::Ignored);
        assert!(session.turns().is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn busy_guard_drops_concurrent_send_silently() {
        let transport = MockTransport::new();
        let mut session = scratch_session("busy", &transport);

        session.processing = true;
        assert_eq!(session.submit("hello").unwrap(), SendOutcome::Busy);
        assert!(session.turns().is_empty(), "no turn may be persisted");
        assert_eq!(transport.call_count(), 0, "no request may be issued");
    }

    #[test]
    fn missing_api_key_refuses_before_any_request() {
        let transport = MockTransport::new();
        let mut session = scratch_session("nokey", &transport);
        session.config.api_key.clear();

        assert_eq!(session.submit("hello").unwrap(), SendOutcome::MissingApiKey);
        assert!(session.turns().is_empty());
        assert_eq!(transport.call_count(), 0);
        assert_eq!(session.status(), LinkStatus::Standby);
    }

    #[test]
    fn failed_exchange_keeps_user_turn_and_stats_untouched() {
        let transport = MockTransport::new();
        transport.push_reply("first", 10);
        transport.push_error("invalid key");
        let mut session = scratch_session("failure", &transport);

        session.submit("one").unwrap();
        let outcome = session.submit("two").unwrap();

        assert_eq!(
            outcome,
            SendOutcome::Failed {
                message: "invalid key".to_string()
            }
        );
        // Turns: user one, assistant first, user two — no assistant turn
        // for the failed exchange.
        assert_eq!(session.turns().len(), 3);
        assert_eq!(session.turns()[2], Turn::user("two"));
        assert_eq!(session.stats().total_tokens(), 10, "stats unchanged on failure");
        assert_eq!(session.status(), LinkStatus::Online, "flag cleared after failure");
    }

    #[test]
    fn window_is_system_plus_last_ten_turns() {
        let transport = MockTransport::new();
        for i in 0..8 {
            transport.push_reply(&format!("reply {i}"), 1);
        }
        let mut session = scratch_session("window", &transport);

        for i in 0..8 {
            session.submit(&format!("message {i}")).unwrap();
        }

        // 15 stored turns preceded the final send (7 exchanges plus the
        // new user turn): the window must hold system + the last 10.
        let window = transport.last_window();
        assert_eq!(window.len(), llm::CONTEXT_TURNS + 1);
        assert_eq!(window[0].role, "system");
        assert_eq!(window.last().unwrap().content, "message 7");
        assert_eq!(window.last().unwrap().role, "user");
    }

    #[test]
    fn window_includes_just_appended_user_turn() {
        let transport = MockTransport::new();
        transport.push_reply("ok", 0);
        let mut session = scratch_session("window-tail", &transport);

        session.submit("hello").unwrap();
        let window = transport.last_window();
        assert_eq!(window.len(), 2);
        assert_eq!(window[1].content, "hello");
    }

    #[test]
    fn tokens_accumulate_across_exchanges() {
        let transport = MockTransport::new();
        transport.push_reply("a", 42);
        transport.push_reply("b", 8);
        let mut session = scratch_session("tokens", &transport);

        session.submit("one").unwrap();
        session.submit("two").unwrap();
        assert_eq!(session.stats().total_tokens(), 50);
    }

    #[test]
    fn save_config_adopts_resolved_record() {
        let transport = MockTransport::new();
        let mut session = scratch_session("save", &transport);

        let outcome = session
            .save_config(&NlinkConfig {
                api_key: " sk-new ".to_string(),
                api_endpoint: String::new(),
                model: "gpt-4".to_string(),
            })
            .unwrap();

        assert!(matches!(outcome, SaveOutcome::Saved(_)));
        assert_eq!(session.config().api_key, "sk-new");
        assert_eq!(session.config().model, "gpt-4");
    }

    #[test]
    fn rejected_save_leaves_session_config_untouched() {
        let transport = MockTransport::new();
        let mut session = scratch_session("save-reject", &transport);

        let outcome = session
            .save_config(&NlinkConfig {
                api_key: String::new(),
                ..NlinkConfig::default()
            })
            .unwrap();

        assert_eq!(outcome, SaveOutcome::MissingApiKey);
        assert_eq!(session.config().api_key, "sk-test");
    }

    #[test]
    fn status_tracks_key_and_flag() {
        let transport = MockTransport::new();
        let mut session = scratch_session("status", &transport);

        assert_eq!(session.status(), LinkStatus::Online);
        session.processing = true;
        assert_eq!(session.status(), LinkStatus::Processing);
        session.processing = false;
        session.config.api_key.clear();
        assert_eq!(session.status(), LinkStatus::Standby);
    }
}
