/// Persistence contracts for the two JSON records, exercised through the
/// public crate API. Finer-grained cases live in each store's
/// `#[cfg(test)]` block; these cover the cross-module behaviors a restart
/// depends on.
use std::fs;
use std::path::PathBuf;

use nlink::config::{ConfigStore, NlinkConfig, SaveOutcome, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use nlink::history::{HistoryStore, Turn};

fn scratch_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "nlink-store-{}-{}.json",
        std::process::id(),
        name
    ));
    let _ = fs::remove_file(&path);
    path
}

// ---------------------------------------------------------------------------
// Config record
// ---------------------------------------------------------------------------

#[test]
fn blank_key_never_persists_and_yields_validation_error() {
    let store = ConfigStore::at(scratch_path("blank-key"));

    let outcome = store
        .save(&NlinkConfig {
            api_key: "  \t ".to_string(),
            api_endpoint: "https://example.invalid/v1".to_string(),
            model: "gpt-4".to_string(),
        })
        .unwrap();

    assert!(outcome.rejection().is_some());
    assert!(!store.exists());

    // A later load still sees pure defaults.
    assert_eq!(store.load(), NlinkConfig::default());
}

#[test]
fn unknown_stored_model_is_replaced_and_repersisted_on_load() {
    let store = ConfigStore::at(scratch_path("model-repair"));
    fs::write(
        store.path(),
        r#"{ "api_key": "sk-live", "api_endpoint": "https://example.invalid/v1", "model": "mistral-7b" }"#,
    )
    .unwrap();

    let loaded = store.load();
    assert_eq!(loaded.model, DEFAULT_MODEL);
    assert_eq!(loaded.api_key, "sk-live", "other fields survive the repair");

    // The correction must already be on disk, not just in memory.
    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains(DEFAULT_MODEL));
    assert!(!raw.contains("mistral-7b"));
}

#[test]
fn save_resolves_blank_endpoint_to_default() {
    let store = ConfigStore::at(scratch_path("endpoint-default"));

    let outcome = store
        .save(&NlinkConfig {
            api_key: "sk-live".to_string(),
            api_endpoint: String::new(),
            model: "gpt-3.5-turbo".to_string(),
        })
        .unwrap();

    let SaveOutcome::Saved(resolved) = outcome else {
        panic!("expected save to succeed");
    };
    assert_eq!(resolved.api_endpoint, DEFAULT_ENDPOINT);
}

// ---------------------------------------------------------------------------
// History record
// ---------------------------------------------------------------------------

#[test]
fn reload_restores_exactly_n_turns_in_order() {
    let path = scratch_path("reload-order");

    let mut store = HistoryStore::open(&path);
    for i in 0..9 {
        store.append(Turn::user(format!("u{i}"))).unwrap();
        store.append(Turn::assistant(format!("a{i}"))).unwrap();
    }
    let written = store.turns().to_vec();
    drop(store);

    let reloaded = HistoryStore::open(&path);
    assert_eq!(reloaded.len(), 18, "no duplication, no loss");
    assert_eq!(reloaded.turns(), &written[..]);
}

#[test]
fn cleared_history_stays_empty_after_reload() {
    let path = scratch_path("clear-reload");

    let mut store = HistoryStore::open(&path);
    store.append(Turn::user("hello")).unwrap();
    store.clear().unwrap();
    drop(store);

    assert!(HistoryStore::open(&path).is_empty());
}
