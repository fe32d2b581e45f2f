//! Conversation history access.
//!
//! The memory subsystem only reads conversations (to build extraction
//! transcripts); the repository trait here is the port infra implements.

pub mod repository;
