//! LlmProvider trait definition.
//!
//! This is the core abstraction that chat-completion backends implement.
//! Uses RPITIT for `complete`; see `BoxLlmProvider` for dynamic dispatch.

use memoria_types::llm::{ChatCompletionRequest, ChatCompletionResponse, LlmError};

/// Trait for chat-completion backends (OpenAI-compatible endpoints, test stubs).
///
/// Implementations live in memoria-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai", "mistral").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    ///
    /// Dropping the returned future aborts the in-flight request.
    fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> impl std::future::Future<Output = Result<ChatCompletionResponse, LlmError>> + Send;
}
