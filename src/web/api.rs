//! JSON API handlers backing the embedded chat frontend.
//!
//! Each handler drives the shared [`Session`] and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content. The chat handler maps
//! the controller's [`SendOutcome`] onto a tagged `outcome` field the
//! frontend switches on.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::config::NlinkConfig;
use crate::history::Turn;
use crate::session::{ChatTransport, SendOutcome, Session, MISSING_KEY_MESSAGE};

use super::content_type_json;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `POST /api/chat` request body.
#[derive(Deserialize)]
struct ChatRequestBody {
    #[serde(default)]
    message: String,
}

/// `GET /api/history` response.
#[derive(Serialize)]
struct HistoryResponse<'a> {
    turns: &'a [Turn],
}

/// `PUT /api/config` request body — the three editable fields.
#[derive(Deserialize)]
#[serde(default)]
struct ConfigUpdateRequest {
    api_key: String,
    api_endpoint: String,
    model: String,
}

impl Default for ConfigUpdateRequest {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_endpoint: String::new(),
            model: String::new(),
        }
    }
}

/// `GET /api/status` response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime: String,
    total_tokens: u64,
    latency_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `POST /api/chat` — run one full send cycle.
pub fn post_chat<T: ChatTransport>(
    session: &mut Session<T>,
    body: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ChatRequestBody =
        serde_json::from_str(body).context("invalid JSON in chat request")?;

    let outcome = session.submit(&req.message)?;

    let payload = match outcome {
        SendOutcome::Reply {
            content,
            latency_ms,
            total_tokens,
        } => serde_json::json!({
            "outcome": "reply",
            "content": content,
            "latency_ms": latency_ms,
            "total_tokens": total_tokens,
            "session_tokens": session.stats().total_tokens(),
        }),
        SendOutcome::Failed { message } => serde_json::json!({
            "outcome": "error",
            "message": message,
        }),
        SendOutcome::MissingApiKey => serde_json::json!({
            "outcome": "missing_api_key",
            "message": MISSING_KEY_MESSAGE,
        }),
        SendOutcome::Busy => serde_json::json!({ "outcome": "busy" }),
        SendOutcome::Ignored => serde_json::json!({ "outcome": "ignored" }),
    };

    json_response(&payload)
}

/// `GET /api/history` — stored turns in order.
pub fn get_history<T: ChatTransport>(
    session: &Session<T>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&HistoryResponse {
        turns: session.turns(),
    })
}

/// `DELETE /api/history` — drop the stored conversation.
pub fn delete_history<T: ChatTransport>(
    session: &mut Session<T>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    session.clear_history()?;
    json_response(&serde_json::json!({ "success": true }))
}

/// `GET /api/config` — the current effective configuration.
///
/// Returned in full (key included): the server binds to loopback and the
/// frontend prefills its settings panel with these values, exactly as the
/// panel would from any other local store.
pub fn get_config<T: ChatTransport>(session: &Session<T>) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(session.config())
}

/// `PUT /api/config` — validate and persist a configuration candidate.
pub fn put_config<T: ChatTransport>(
    session: &mut Session<T>,
    body: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ConfigUpdateRequest =
        serde_json::from_str(body).context("invalid JSON in config update request")?;

    let candidate = NlinkConfig {
        api_key: req.api_key,
        api_endpoint: req.api_endpoint,
        model: req.model,
    };

    let outcome = session.save_config(&candidate)?;
    let payload = match outcome.rejection() {
        None => serde_json::json!({ "success": true }),
        Some(message) => serde_json::json!({ "success": false, "error": message }),
    };

    json_response(&payload)
}

/// `GET /api/status` — indicator, uptime, token and latency figures.
pub fn get_status<T: ChatTransport>(session: &Session<T>) -> Result<Response<Cursor<Vec<u8>>>> {
    let stats = session.stats();
    json_response(&StatusResponse {
        status: session.status().as_str(),
        uptime: stats.uptime(),
        total_tokens: stats.total_tokens(),
        latency_ms: stats.last_latency_ms(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_body_deserializes() {
        let req: ChatRequestBody = serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert_eq!(req.message, "hello");

        let empty: ChatRequestBody = serde_json::from_str("{}").unwrap();
        assert!(empty.message.is_empty());
    }

    #[test]
    fn config_update_request_fills_missing_fields() {
        let req: ConfigUpdateRequest =
            serde_json::from_str(r#"{"api_key": "sk-x", "model": "gpt-4"}"#).unwrap();
        assert_eq!(req.api_key, "sk-x");
        assert_eq!(req.model, "gpt-4");
        assert!(req.api_endpoint.is_empty());
    }

    #[test]
    fn status_response_serializes() {
        let resp = StatusResponse {
            status: "ONLINE",
            uptime: "03:22".to_string(),
            total_tokens: 318,
            latency_ms: Some(142),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""status":"ONLINE""#));
        assert!(json.contains(r#""uptime":"03:22""#));
        assert!(json.contains(r#""latency_ms":142"#));
    }

    #[test]
    fn history_response_serializes_turns_in_order() {
        let turns = vec![Turn::user("q"), Turn::assistant("a")];
        let json = serde_json::to_string(&HistoryResponse { turns: &turns }).unwrap();
        assert_eq!(
            json,
            r#"{"turns":[{"role":"user","content":"q"},{"role":"assistant","content":"a"}]}"#
        );
    }
}
