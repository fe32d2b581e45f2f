//! BoxLlmProvider -- object-safe dynamic dispatch wrapper for LlmProvider.
//!
//! 1. Define an object-safe `LlmProviderDyn` trait with boxed futures
//! 2. Blanket-impl `LlmProviderDyn` for all `T: LlmProvider`
//! 3. `BoxLlmProvider` wraps `Box<dyn LlmProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use memoria_types::llm::{ChatCompletionRequest, ChatCompletionResponse, LlmError};

use super::provider::LlmProvider;

/// Object-safe version of [`LlmProvider`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn LlmProviderDyn`).
/// A blanket implementation is provided for all types implementing `LlmProvider`.
pub trait LlmProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a ChatCompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChatCompletionResponse, LlmError>> + Send + 'a>>;
}

impl<T: LlmProvider> LlmProviderDyn for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a ChatCompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChatCompletionResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased LLM provider for runtime provider selection.
///
/// Since `LlmProvider` uses RPITIT, it cannot be used as a trait object directly.
/// `BoxLlmProvider` provides equivalent methods that delegate to the inner
/// `LlmProviderDyn` trait object.
pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn + Send + Sync>,
}

impl BoxLlmProvider {
    /// Wrap a concrete `LlmProvider` in a type-erased box.
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    /// Human-readable provider name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Send a completion request and receive the full response.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        self.inner.complete_boxed(request).await
    }
}

impl std::fmt::Debug for BoxLlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxLlmProvider")
            .field("name", &self.name())
            .finish()
    }
}
