//! OpenAI-compatible chat-completion provider.
//!
//! One [`OpenAiCompatibleProvider`] serves OpenAI and any server speaking the
//! same protocol (Ollama, vLLM, LM Studio, hosted proxies) via a configurable
//! base URL. Uses [`async_openai`] for typed request/response handling.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::ExposeSecret;

use memoria_core::llm::provider::LlmProvider;
use memoria_types::llm::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, LlmError,
    MessageRole, Usage,
};

use self::config::OpenAiCompatConfig;

/// Provider for any OpenAI-compatible API.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
        }
    }

    /// Create a provider for `https://api.openai.com/v1`.
    pub fn openai(api_key: &str) -> Self {
        Self::new(config::openai_defaults(api_key))
    }

    /// Translate a domain request into the async-openai request type.
    fn build_request(&self, request: &ChatCompletionRequest) -> CreateChatCompletionRequest {
        let messages = request
            .messages
            .iter()
            .map(|msg| match msg.role {
                MessageRole::System => {
                    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    })
                }
                MessageRole::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                        name: None,
                    })
                }
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                        content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        )),
                        refusal: None,
                        name: None,
                        audio: None,
                        tool_calls: None,
                        function_call: None,
                    })
                }
            })
            .collect();

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature,
            ..Default::default()
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let oai_request = self.build_request(request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        let choices = response
            .choices
            .into_iter()
            .map(|c| ChatChoice {
                index: c.index,
                message: ChatMessage {
                    role: MessageRole::Assistant,
                    content: c.message.content.unwrap_or_default(),
                },
            })
            .collect();

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        tracing::debug!(
            provider = %self.provider_name,
            model = %response.model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Chat completion finished"
        );

        Ok(ChatCompletionResponse {
            id: response.id,
            model: response.model,
            choices,
            usage,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else if error_type == "invalid_request_error" {
                LlmError::InvalidRequest(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited {
                retry_after_ms: None,
            },
            Some(500..=599) => LlmError::Overloaded(err.to_string()),
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::{ApiError, OpenAIError};

    fn api_error(message: &str, r#type: Option<&str>, code: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: r#type.map(str::to_string),
            param: None,
            code: code.map(str::to_string),
        })
    }

    #[test]
    fn test_openai_factory() {
        let provider = OpenAiCompatibleProvider::openai("sk-test");
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_build_request_messages() {
        let provider = OpenAiCompatibleProvider::openai("sk-test");
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage::system("Extract facts"),
                ChatMessage::user("user: hi"),
                ChatMessage {
                    role: MessageRole::Assistant,
                    content: "[]".to_string(),
                },
            ],
            temperature: Some(0.3),
            max_tokens: 400,
        };

        let oai_req = provider.build_request(&request);
        assert_eq!(oai_req.model, "gpt-4o-mini");
        assert_eq!(oai_req.messages.len(), 3);
        assert!(matches!(oai_req.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(oai_req.messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(oai_req.messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert_eq!(oai_req.max_completion_tokens, Some(400));
        assert_eq!(oai_req.temperature, Some(0.3));
        assert!(oai_req.stream.is_none());
    }

    #[test]
    fn test_build_request_without_temperature() {
        let provider = OpenAiCompatibleProvider::openai("sk-test");
        let request = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: None,
            max_tokens: 10,
        };
        assert!(provider.build_request(&request).temperature.is_none());
    }

    #[test]
    fn test_map_openai_error_api_auth() {
        let err = map_openai_error(api_error(
            "Incorrect API key provided",
            Some("authentication_error"),
            None,
        ));
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[test]
    fn test_map_openai_error_rate_limit() {
        let err = map_openai_error(api_error("Slow down", Some("rate_limit_error"), None));
        assert!(matches!(err, LlmError::RateLimited { .. }));
    }

    #[test]
    fn test_map_openai_error_server() {
        let err = map_openai_error(api_error("boom", None, Some("server_error")));
        assert!(matches!(err, LlmError::Overloaded(_)));
    }

    #[test]
    fn test_map_openai_error_invalid_request() {
        let err = map_openai_error(api_error("bad model", Some("invalid_request_error"), None));
        assert!(matches!(err, LlmError::InvalidRequest(_)));

        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }

    #[test]
    fn test_map_openai_error_unknown_is_provider_error() {
        let err = map_openai_error(api_error("mystery", None, None));
        assert!(matches!(err, LlmError::Provider { .. }));
    }
}
