//! services/api/src/adapters/prompt_llm.rs
//!
//! This module contains the adapter for the prompt-writing LLM.
//! It implements the `PromptGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use promptt_core::{
    domain::{Category, GenerationRequest},
    ports::{PortError, PortResult, PromptGenerationService},
};
use tracing::{debug, error};

const SYSTEM_INSTRUCTIONS: &str = "You are an expert prompt engineer. Generate highly effective, detailed prompts for GPT models based on user goals. Return only the optimized prompt, nothing else.";

const USER_INPUT_TEMPLATE: &str = r#"Create an optimized GPT prompt for this goal: "{goal}"{category}

Please generate a prompt that:
1. Is specific and detailed
2. Includes relevant context and constraints
3. Specifies the desired output format
4. Uses clear, actionable language
5. Incorporates best practices for prompt engineering

Consider the user's goal and create a prompt that will generate the highest quality results from a language model."#;

const UPSTREAM_FAILURE: &str = "Failed to generate prompt";

/// Builds the instruction sent as the user message.
pub fn build_instruction(goal: &str, category: Option<Category>) -> String {
    let category_context = category
        .map(|c| format!(" for {}", c))
        .unwrap_or_default();
    USER_INPUT_TEMPLATE
        .replace("{goal}", goal)
        .replace("{category}", &category_context)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Tuning knobs for the chat completion call.
#[derive(Clone, Debug)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_base: Option<String>,
}

/// An adapter that implements `PromptGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiPromptAdapter {
    /// Built from the server-held key, if the deployment has one.
    client: Option<Client<OpenAIConfig>>,
    allow_client_api_key: bool,
    settings: GenerationSettings,
}

impl OpenAiPromptAdapter {
    /// Creates a new `OpenAiPromptAdapter`.
    pub fn new(
        server_api_key: Option<&str>,
        allow_client_api_key: bool,
        settings: GenerationSettings,
    ) -> Self {
        let client = server_api_key.map(|key| Self::client_for(key, &settings));
        Self {
            client,
            allow_client_api_key,
            settings,
        }
    }

    fn client_for(api_key: &str, settings: &GenerationSettings) -> Client<OpenAIConfig> {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = &settings.api_base {
            config = config.with_api_base(base);
        }
        Client::with_config(config)
    }

    /// The server key wins; a caller key is only honoured when the deployment allows it.
    fn resolve_client(&self, api_key: Option<&str>) -> PortResult<Client<OpenAIConfig>> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) if self.allow_client_api_key => Ok(Self::client_for(key, &self.settings)),
            _ => Err(PortError::Unauthorized),
        }
    }
}

//=========================================================================================
// `PromptGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PromptGenerationService for OpenAiPromptAdapter {
    async fn generate_prompt(
        &self,
        request: &GenerationRequest,
        api_key: Option<&str>,
    ) -> PortResult<String> {
        let client = self.resolve_client(api_key)?;

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_instruction(&request.goal, request.category))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.settings.model)
            .messages(messages)
            .temperature(self.settings.temperature)
            .max_completion_tokens(self.settings.max_tokens)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!("Requesting prompt for goal: {}", request.goal);

        // Upstream API errors carry a message worth showing to the user.
        let response = client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| {
                error!("Prompt generation failed upstream: {}", e);
                match e {
                    OpenAIError::ApiError(api) if !api.message.trim().is_empty() => {
                        PortError::Rejected(api.message)
                    }
                    _ => PortError::Rejected(UPSTREAM_FAILURE.to_string()),
                }
            })?;

        let generated = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(generated.trim().to_string())
    }
}
