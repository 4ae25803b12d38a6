//! Query relevance gating.
//!
//! Classifies whether an incoming question is in-domain before the full
//! pipeline runs. Two interchangeable strategies honor the same contract:
//! cheap keyword containment, or a single-shot classification call to the
//! chat backend.

use crate::config::{render, GatePrompts};
use crate::error::{Result, RoostError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Gate strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStrategy {
    /// Keyword containment against an allow-list.
    Keyword,
    /// Single-shot classification call to the chat backend.
    Model,
}

impl std::str::FromStr for GateStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(GateStrategy::Keyword),
            "model" => Ok(GateStrategy::Model),
            _ => Err(format!("Unknown gate strategy: {}", s)),
        }
    }
}

/// Trait for relevance gate implementations.
#[async_trait]
pub trait RelevanceGate: Send + Sync {
    /// Whether the query belongs to the assistant's domain.
    async fn is_relevant(&self, query: &str) -> Result<bool>;
}

/// Keyword containment gate.
///
/// Cheap and offline, but prone to false negatives on paraphrased
/// in-domain questions and false positives on stray keyword mentions.
pub struct KeywordGate {
    keywords: Vec<String>,
}

impl KeywordGate {
    /// Create a gate from an allow-list; matching is case-insensitive.
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

#[async_trait]
impl RelevanceGate for KeywordGate {
    async fn is_relevant(&self, query: &str) -> Result<bool> {
        let query_lower = query.to_lowercase();
        Ok(self.keywords.iter().any(|k| query_lower.contains(k)))
    }
}

/// Model-classifier gate.
pub struct ModelGate {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    prompts: GatePrompts,
}

impl ModelGate {
    /// Create a classifier gate using the given chat model.
    pub fn new(model: &str, prompts: GatePrompts) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            prompts,
        }
    }
}

/// Normalize a classifier response to a total verdict.
///
/// Anything other than an exact (trimmed, uppercased) `YES` counts as
/// out-of-domain, so unexpected backend output can never wedge the gate.
pub fn parse_verdict(response: &str) -> bool {
    response.trim().to_uppercase() == "YES"
}

#[async_trait]
impl RelevanceGate for ModelGate {
    #[instrument(skip(self), fields(query = %query))]
    async fn is_relevant(&self, query: &str) -> Result<bool> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), query.to_string());
        let user_prompt = render(&self.prompts.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.system.clone())
                .build()
                .map_err(|e| RoostError::Gate(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| RoostError::Gate(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| RoostError::Gate(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RoostError::OpenAI(format!("Gate classification failed: {}", e)))?;

        let verdict = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("");

        let relevant = parse_verdict(verdict);
        debug!("Gate verdict '{}' -> {}", verdict.trim(), relevant);
        Ok(relevant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_strategy_parsing() {
        assert_eq!("keyword".parse::<GateStrategy>().unwrap(), GateStrategy::Keyword);
        assert_eq!("Model".parse::<GateStrategy>().unwrap(), GateStrategy::Model);
        assert!("heuristic".parse::<GateStrategy>().is_err());
    }

    #[test]
    fn test_parse_verdict_normalizes() {
        assert!(parse_verdict("YES"));
        assert!(parse_verdict("  yes\n"));
        assert!(parse_verdict("Yes"));

        assert!(!parse_verdict("NO"));
        assert!(!parse_verdict("YES."));
        assert!(!parse_verdict("Yes, this is about poultry."));
        assert!(!parse_verdict(""));
        assert!(!parse_verdict("MAYBE"));
    }

    #[tokio::test]
    async fn test_keyword_gate() {
        let gate = KeywordGate::new(&[
            "poultry".to_string(),
            "chicken".to_string(),
            "egg".to_string(),
        ]);

        assert!(gate.is_relevant("How do I keep my Poultry healthy?").await.unwrap());
        assert!(gate.is_relevant("best chicken feed ratio").await.unwrap());
        assert!(!gate.is_relevant("How do I fix my tractor?").await.unwrap());
    }

    #[tokio::test]
    async fn test_keyword_gate_empty_allowlist_rejects_everything() {
        let gate = KeywordGate::new(&[]);
        assert!(!gate.is_relevant("poultry").await.unwrap());
    }
}
