/// Endpoint configuration for nlink.
///
/// The configuration is a single JSON record at `~/.nlink/config.json`:
///
/// ```json
/// { "api_key": "sk-...", "api_endpoint": "https://...", "model": "gpt-4" }
/// ```
///
/// Layering on load: built-in defaults → stored record → `NLINK_*`
/// environment variables (highest precedence). The record is loaded once at
/// startup and only rewritten by an explicit save (or by the model repair
/// described below).
///
/// # Model repair
///
/// A stored model name must contain one of the known model names
/// (case-insensitive). Anything else is silently replaced with the default
/// model and the corrected record is re-persisted, so a hand-edited or
/// stale config never reaches the request layer.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model substituted for blank or unrecognized model names.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Model names accepted by the repair check. A configured model is valid
/// when it contains any of these, case-insensitively.
const KNOWN_MODELS: [&str; 4] = [
    "gpt-4",
    "gpt-4-turbo",
    "gpt-3.5-turbo",
    "gpt-3.5-turbo-instruct",
];

// ---------------------------------------------------------------------------
// Config record
// ---------------------------------------------------------------------------

/// The persisted configuration record.
///
/// Missing fields deserialize to their defaults, so partial records merge
/// over the built-in values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NlinkConfig {
    /// Bearer token sent with every request. Must be non-empty before any
    /// request is issued.
    pub api_key: String,
    /// Chat-completions URL.
    pub api_endpoint: String,
    /// Model identifier included in the request payload.
    pub model: String,
}

impl Default for NlinkConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl NlinkConfig {
    /// Whether an API key has been configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Check a model name against the known-model list.
///
/// Substring match, case-insensitive: `"GPT-4o"` passes because it contains
/// `"gpt-4"`.
pub fn is_known_model(model: &str) -> bool {
    let lower = model.to_lowercase();
    KNOWN_MODELS.iter().any(|known| lower.contains(known))
}

// ---------------------------------------------------------------------------
// Save outcome
// ---------------------------------------------------------------------------

/// Result of validating and persisting a configuration candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The candidate was valid; carries the resolved record as persisted.
    Saved(NlinkConfig),
    /// The API key was blank after trimming. Nothing was persisted.
    MissingApiKey,
    /// The model was blank after trimming. Nothing was persisted.
    MissingModel,
}

impl SaveOutcome {
    /// User-visible rejection message, or `None` when the save succeeded.
    pub fn rejection(&self) -> Option<&'static str> {
        match self {
            Self::Saved(_) => None,
            Self::MissingApiKey => Some("Please provide an API key"),
            Self::MissingModel => Some("Please specify a model (e.g., gpt-3.5-turbo, gpt-4)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// File-backed configuration store.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at the default location, `~/.nlink/config.json`.
    pub fn open_default() -> Result<Self> {
        let path = default_config_path().context("could not determine home directory")?;
        Ok(Self { path })
    }

    /// Store at an explicit path. Used by tests and one-off tooling.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the effective configuration.
    ///
    /// Merges the stored record over defaults, repairs an unrecognized
    /// model (re-persisting the corrected record, best-effort), then
    /// applies `NLINK_*` environment overrides. Malformed or missing files
    /// fall back to defaults.
    pub fn load(&self) -> NlinkConfig {
        let mut config = NlinkConfig::default();

        if let Some(stored) = self.read_record() {
            config = stored;

            if !is_known_model(&config.model) {
                config.model = DEFAULT_MODEL.to_string();
                let _ = self.persist(&config);
            }
        }

        apply_env_overrides(&mut config);

        config
    }

    /// Validate and persist a configuration candidate.
    ///
    /// All fields are trimmed first. A blank key or model rejects the save
    /// with no side effect on the stored record; a blank endpoint is
    /// replaced with [`DEFAULT_ENDPOINT`].
    pub fn save(&self, candidate: &NlinkConfig) -> Result<SaveOutcome> {
        let api_key = candidate.api_key.trim();
        let model = candidate.model.trim();
        let endpoint = candidate.api_endpoint.trim();

        if api_key.is_empty() {
            return Ok(SaveOutcome::MissingApiKey);
        }
        if model.is_empty() {
            return Ok(SaveOutcome::MissingModel);
        }

        let resolved = NlinkConfig {
            api_key: api_key.to_string(),
            api_endpoint: if endpoint.is_empty() {
                DEFAULT_ENDPOINT.to_string()
            } else {
                endpoint.to_string()
            },
            model: model.to_string(),
        };

        self.persist(&resolved)?;
        Ok(SaveOutcome::Saved(resolved))
    }

    /// Overwrite the stored record with built-in defaults.
    pub fn reset(&self) -> Result<NlinkConfig> {
        let config = NlinkConfig::default();
        self.persist(&config)?;
        Ok(config)
    }

    /// Whether a record exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// The stored record alone — defaults for missing pieces, no
    /// environment overrides and no model repair. Used as the base for
    /// single-field edits so session-only overrides never get written
    /// back to disk.
    pub fn stored(&self) -> NlinkConfig {
        self.read_record().unwrap_or_default()
    }

    /// Read the stored record, or `None` when missing or malformed.
    fn read_record(&self) -> Option<NlinkConfig> {
        let content = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn persist(&self, config: &NlinkConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create state directory")?;
        }
        let json =
            serde_json::to_string_pretty(config).context("failed to serialize configuration")?;
        fs::write(&self.path, json).context("failed to write configuration file")?;
        Ok(())
    }
}

/// Shorten an API key for display: first 3 and last 4 characters.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        String::new()
    } else if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// State directory holding both persisted records: `~/.nlink/`.
pub fn state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".nlink"))
}

fn default_config_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("config.json"))
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply `NLINK_*` overrides (highest precedence layer).
///
/// Supported variables: `NLINK_API_KEY`, `NLINK_MODEL`, `NLINK_ENDPOINT`.
/// Values set here are session-only and never written back to disk.
fn apply_env_overrides(config: &mut NlinkConfig) {
    if let Ok(val) = std::env::var("NLINK_API_KEY")
        && !val.is_empty()
    {
        config.api_key = val;
    }
    if let Ok(val) = std::env::var("NLINK_MODEL")
        && !val.is_empty()
    {
        config.model = val;
    }
    if let Ok(val) = std::env::var("NLINK_ENDPOINT")
        && !val.is_empty()
    {
        config.api_endpoint = val;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
