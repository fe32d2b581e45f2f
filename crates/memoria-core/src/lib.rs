//! Business logic and port trait definitions for Memoria.
//!
//! This crate defines the "ports" (repository and provider traits) that the
//! infrastructure layer implements, plus the memory subsystem itself:
//! similarity filtering, context budgeting, the per-user context cache,
//! the extraction pipeline, and the `MemoryManager` facade. It depends only
//! on `memoria-types` -- never on `memoria-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod memory;
