//! Disease diagnosis from bird images.
//!
//! Sends an uploaded image plus a fixed instruction to the multimodal chat
//! backend and returns the free-text diagnosis.

use crate::config::DiagnosisPrompts;
use crate::error::{Result, RoostError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, ImageDetail, ImageUrlArgs,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::{info, instrument};

/// Diagnoses poultry diseases from images.
pub struct DiseaseDiagnoser {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    prompts: DiagnosisPrompts,
}

impl DiseaseDiagnoser {
    /// Create a diagnoser using the given multimodal chat model.
    pub fn new(model: &str, prompts: DiagnosisPrompts) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            prompts,
        }
    }

    /// Diagnose from an image file on disk.
    #[instrument(skip(self))]
    pub async fn diagnose(&self, image_path: &Path) -> Result<String> {
        if !image_path.exists() {
            return Err(RoostError::DocumentNotFound(
                image_path.display().to_string(),
            ));
        }

        let mime = match image_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            other => {
                return Err(RoostError::InvalidInput(format!(
                    "Unsupported image type: {:?} (expected jpg or png)",
                    other
                )))
            }
        };

        let bytes = std::fs::read(image_path)?;
        let data_url = format!("data:{};base64,{}", mime, STANDARD.encode(&bytes));

        info!(
            "Diagnosing {} ({} bytes)",
            image_path.display(),
            bytes.len()
        );

        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(self.prompts.instruction.clone())
            .build()
            .map_err(|e| RoostError::Generation(e.to_string()))?;

        let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(data_url)
                    .detail(ImageDetail::Auto)
                    .build()
                    .map_err(|e| RoostError::Generation(e.to_string()))?,
            )
            .build()
            .map_err(|e| RoostError::Generation(e.to_string()))?;

        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(vec![text_part.into(), image_part.into()])
            .build()
            .map_err(|e| RoostError::Generation(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![user_message.into()])
            .build()
            .map_err(|e| RoostError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RoostError::OpenAI(format!("Diagnosis failed: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| RoostError::Generation("Empty diagnosis response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;

    #[tokio::test]
    async fn test_missing_image_rejected() {
        let diagnoser = DiseaseDiagnoser::new("gpt-4o", Prompts::default().diagnosis);
        let err = diagnoser
            .diagnose(Path::new("/nonexistent/bird.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, RoostError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn test_unsupported_extension_rejected() {
        let file = tempfile::NamedTempFile::with_suffix(".gif").unwrap();
        let diagnoser = DiseaseDiagnoser::new("gpt-4o", Prompts::default().diagnosis);

        let err = diagnoser.diagnose(file.path()).await.unwrap_err();
        assert!(matches!(err, RoostError::InvalidInput(_)));
    }
}
