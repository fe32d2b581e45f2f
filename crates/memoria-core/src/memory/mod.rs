//! Long-term memory for Memoria.
//!
//! Facts about a user are extracted from conversations by an auxiliary LLM
//! call, deduplicated against what is already stored, persisted through the
//! `MemoryRepository` port, and compiled on demand into a size-bounded
//! context string that is cached per user.
//!
//! - `similarity`: cheap lexical "same fact?" check used for dedup
//! - `budget`: greedy packing of ranked facts under a character budget
//! - `cache`: per-user TTL cache of the compiled context
//! - `extractor`: transcript -> LLM -> validated facts -> dedup -> persist
//! - `manager`: the `MemoryManager` facade, the only public entry point
//! - `store`: the `MemoryRepository` port

pub mod budget;
pub mod cache;
pub mod extractor;
pub mod manager;
pub mod similarity;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
