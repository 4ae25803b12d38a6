//! Laboratory report analysis.
//!
//! Extracts text from an uploaded report file and sends it to the chat
//! backend with a fixed veterinary-analysis instruction.

use crate::config::LabPrompts;
use crate::error::{Result, RoostError};
use crate::extract;
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use std::path::Path;
use tracing::{info, instrument};

/// Analyzes veterinary lab reports.
pub struct LabAnalyzer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    prompts: LabPrompts,
}

impl LabAnalyzer {
    /// Create an analyzer using the given chat model.
    pub fn new(model: &str, prompts: LabPrompts) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            prompts,
        }
    }

    /// Extract an uploaded report file and analyze its content.
    ///
    /// Supports the extraction formats of [`crate::extract`]: direct text,
    /// paginated documents, tabular dumps, and OCR for images.
    #[instrument(skip(self))]
    pub async fn analyze_file(&self, path: &Path) -> Result<String> {
        let doc = extract::extract_document(path, None).await?;
        let report_text = doc.combined_text();

        info!(
            "Extracted {} characters from lab report {}",
            report_text.len(),
            doc.source
        );

        self.analyze_text(&report_text).await
    }

    /// Analyze already-extracted report text.
    pub async fn analyze_text(&self, report_text: &str) -> Result<String> {
        if report_text.trim().is_empty() {
            return Err(RoostError::Extraction(
                "Lab report is empty after extraction".to_string(),
            ));
        }

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.instruction.clone())
                .build()
                .map_err(|e| RoostError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("Lab report:\n\n{}", report_text))
                .build()
                .map_err(|e| RoostError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| RoostError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RoostError::OpenAI(format!("Lab analysis failed: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| RoostError::Generation("Empty analysis response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;

    #[tokio::test]
    async fn test_empty_report_rejected() {
        let analyzer = LabAnalyzer::new("gpt-4o-mini", Prompts::default().lab);
        let err = analyzer.analyze_text("   \n ").await.unwrap_err();
        assert!(matches!(err, RoostError::Extraction(_)));
    }
}
