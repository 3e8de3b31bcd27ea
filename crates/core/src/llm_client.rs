use crate::turn::{Role, Turn, TurnContent};
use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestMessageContentPartImageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ImageUrlArgs,
    },
};
use async_trait::async_trait;

/// A turn-based conversational oracle.
///
/// The client is stateless from the caller's point of view: it receives the
/// committed history plus the new turn and returns the full reply text. It must
/// not retain either, so that an abandoned call leaves nothing behind.
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn respond(&self, history: &[Turn], turn: &Turn) -> Result<String>;
}

/// An implementation of `LLMClient` for any OpenAI-compatible chat completion API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gemini-2.0-flash").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

/// Converts one turn into the chat completion message the API expects.
fn to_request_message(turn: &Turn) -> Result<ChatCompletionRequestMessage> {
    let message = match (&turn.role, &turn.content) {
        (Role::User, TurnContent::Text(text)) => ChatCompletionRequestUserMessageArgs::default()
            .content(text.clone())
            .build()?
            .into(),
        (Role::User, TurnContent::Attachment(attachment)) => {
            let image = ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(ImageUrlArgs::default().url(attachment.to_data_url()).build()?)
                .build()?;
            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(vec![
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(image),
                ]))
                .build()?
                .into()
        }
        (Role::Model, TurnContent::Text(text)) => {
            ChatCompletionRequestAssistantMessageArgs::default()
                .content(text.clone())
                .build()?
                .into()
        }
        (Role::Model, TurnContent::Attachment(_)) => {
            anyhow::bail!("model turns cannot carry attachments")
        }
    };
    Ok(message)
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn respond(&self, history: &[Turn], turn: &Turn) -> Result<String> {
        let messages = history
            .iter()
            .chain(std::iter::once(turn))
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()?;

        let response: CreateChatCompletionResponse = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .clone()
            .context("No content in LLM response")?;
        Ok(content)
    }
}
