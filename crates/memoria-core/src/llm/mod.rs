//! LLM provider abstraction and model registry port.
//!
//! - `provider`: the `LlmProvider` trait implemented by infra backends
//! - `box_provider`: object-safe wrapper for runtime provider selection
//! - `registry`: the `ModelRegistry` port and extraction-model selection

pub mod box_provider;
pub mod provider;
pub mod registry;
