//! Shared domain types for Memoria.
//!
//! This crate contains the core domain types used across the Memoria workspace:
//! memories, conversation messages, chat-completion wire shapes, configuration,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
