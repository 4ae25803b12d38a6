//! RAG answer generation.

use super::{format_context_for_prompt, ContextChunk};
use crate::config::{render, RagPrompts};
use crate::error::{Result, RoostError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Trait for answer generation backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer to `question` strictly from the provided chunks.
    async fn generate(&self, question: &str, chunks: &[ContextChunk]) -> Result<String>;
}

/// Chat-backend answer generator.
///
/// Composes a single prompt containing the full text of every retrieved
/// chunk plus the question ("stuff" composition, no recursive
/// summarization). Total chunk text must stay within the backend's input
/// limit, which bounds usable retrieval k and chunk size.
pub struct RagEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    prompts: RagPrompts,
}

impl RagEngine {
    /// Create a new engine using the given chat model.
    pub fn new(model: &str, prompts: RagPrompts) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            prompts,
        }
    }
}

#[async_trait]
impl Generator for RagEngine {
    #[instrument(skip(self, chunks), fields(question = %question, chunks = chunks.len()))]
    async fn generate(&self, question: &str, chunks: &[ContextChunk]) -> Result<String> {
        let context_text = if chunks.is_empty() {
            "(no relevant excerpts found)".to_string()
        } else {
            format_context_for_prompt(chunks)
        };

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context_text);

        let user_prompt = render(&self.prompts.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.system.clone())
                .build()
                .map_err(|e| RoostError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| RoostError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .build()
            .map_err(|e| RoostError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RoostError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| RoostError::Generation("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated answer from {} chunks", chunks.len());
        Ok(answer)
    }
}
