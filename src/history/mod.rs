/// Conversation history for nlink.
///
/// Turns are persisted as one ordered JSON array at `~/.nlink/history.json`.
/// Every append rewrites the whole file — fine at chat scale, where the
/// record stays small and writes are serialized by the single in-flight
/// request. Missing or malformed files read back as an empty conversation.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::state_dir;

// ---------------------------------------------------------------------------
// Turn
// ---------------------------------------------------------------------------

/// Originating side of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire-protocol role string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// File-backed, append-only conversation store.
pub struct HistoryStore {
    path: PathBuf,
    turns: Vec<Turn>,
}

impl HistoryStore {
    /// Open the store at the default location, `~/.nlink/history.json`,
    /// loading any persisted turns.
    pub fn open_default() -> Result<Self> {
        let path = default_history_path().context("could not determine home directory")?;
        Ok(Self::open(path))
    }

    /// Open the store at an explicit path, loading any persisted turns.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let turns = read_turns(&path);
        Self { path, turns }
    }

    /// Path to the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All turns in append order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a turn and persist the full sequence.
    pub fn append(&mut self, turn: Turn) -> Result<()> {
        self.turns.push(turn);
        self.persist()
    }

    /// Drop all turns and remove the backing file.
    pub fn clear(&mut self) -> Result<()> {
        self.turns.clear();
        if self.path.exists() {
            fs::remove_file(&self.path).context("failed to remove history file")?;
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create state directory")?;
        }
        let json = serde_json::to_string(&self.turns).context("failed to serialize history")?;
        fs::write(&self.path, json).context("failed to write history file")?;
        Ok(())
    }
}

/// Read stored turns, treating a missing or malformed file as empty.
fn read_turns(path: &Path) -> Vec<Turn> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    serde_json::from_str(&content).unwrap_or_default()
}

fn default_history_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("history.json"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "nlink-history-{}-{}.json",
            std::process::id(),
            name
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn open_missing_file_is_empty() {
        let store = HistoryStore::open(scratch_path("missing"));
        assert!(store.is_empty());
    }

    #[test]
    fn open_malformed_file_is_empty() {
        let path = scratch_path("malformed");
        fs::write(&path, "not json at all").unwrap();
        assert!(HistoryStore::open(path).is_empty());
    }

    #[test]
    fn append_persists_each_turn() {
        let path = scratch_path("append");
        let mut store = HistoryStore::open(&path);

        store.append(Turn::user("hello")).unwrap();
        assert!(path.exists(), "first append must create the file");

        store.append(Turn::assistant("hi there")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn reload_restores_turns_in_original_order() {
        let path = scratch_path("reload");
        let mut store = HistoryStore::open(&path);
        for i in 0..7 {
            store.append(Turn::user(format!("question {i}"))).unwrap();
            store.append(Turn::assistant(format!("answer {i}"))).unwrap();
        }

        let reloaded = HistoryStore::open(&path);
        assert_eq!(reloaded.len(), 14);
        assert_eq!(reloaded.turns(), store.turns());
        assert_eq!(reloaded.turns()[0], Turn::user("question 0"));
        assert_eq!(reloaded.turns()[13], Turn::assistant("answer 6"));
    }

    #[test]
    fn clear_removes_turns_and_file() {
        let path = scratch_path("clear");
        let mut store = HistoryStore::open(&path);
        store.append(Turn::user("hello")).unwrap();

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!path.exists());

        assert!(HistoryStore::open(&path).is_empty());
    }

    #[test]
    fn turn_role_serializes_lowercase() {
        let json = serde_json::to_string(&Turn::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);

        let back: Turn = serde_json::from_str(r#"{"role":"assistant","content":"ok"}"#).unwrap();
        assert_eq!(back.role, Role::Assistant);
    }
}
