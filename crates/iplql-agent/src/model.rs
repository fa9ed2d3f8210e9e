//! Language model boundary
//!
//! The model is an opaque capability: given a system prompt, a user message
//! and a declared result schema, return JSON text that should conform to the
//! schema, or fail. Conformance is checked by the caller.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ModelError;

/// Most deterministic sampling setting
pub const TEMPERATURE: f32 = 0.0;

/// JSON schema the response must follow
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub response_schema: ResponseSchema,
    pub temperature: f32,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Return the raw JSON text of one structured completion
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError>;
}

/// OpenAI chat completions with strict JSON-schema output
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system_prompt.clone())
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.user_message.clone())
                    .build()?,
            ),
        ];

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                name: request.response_schema.name.clone(),
                description: Some(request.response_schema.description.clone()),
                schema: Some(request.response_schema.schema.clone()),
                strict: Some(true),
            },
        };

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(request.temperature)
            .response_format(response_format)
            .build()?;

        info!(model = %self.model, "Requesting completion");
        let response = self.client.chat().create(chat_request).await?;

        let message = &response
            .choices
            .first()
            .ok_or(ModelError::EmptyResponse)?
            .message;

        if let Some(refusal) = &message.refusal {
            return Err(ModelError::Refusal(refusal.clone()));
        }

        let content = message.content.clone().ok_or(ModelError::EmptyResponse)?;
        debug!("LLM Response: {}", content);
        Ok(content)
    }
}
