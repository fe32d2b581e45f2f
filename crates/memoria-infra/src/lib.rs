//! Infrastructure layer for Memoria.
//!
//! Contains implementations of the port traits defined in `memoria-core`:
//! SQLite storage, the OpenAI-compatible chat-completion client, config file
//! loading, and data directory resolution.

pub mod config;
pub mod llm;
pub mod paths;
pub mod sqlite;
