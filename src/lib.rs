//! nlink — a terminal and local-web client for OpenAI-compatible chat
//! endpoints.
//!
//! The crate is organized around one controller core shared by two
//! frontends:
//!
//! - [`config`] — persisted endpoint configuration with validation
//! - [`history`] — persisted conversation turns
//! - [`llm`] — the chat-completions request layer
//! - [`session`] — the send → request → persist controller and stats
//! - [`chat`] — the interactive terminal frontend
//! - [`web`] — the embedded browser frontend and its JSON API
//! - [`cli`] — one-shot maintenance and diagnostic commands

pub mod chat;
pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod session;
pub mod web;
