//! Optical character recognition for uploaded images.
//!
//! Shells out to the tesseract binary rather than binding it natively.

use crate::error::{Result, RoostError};
use std::path::Path;
use tracing::debug;

/// Run OCR over an image file and return the recognized text.
pub async fn ocr_image(path: &Path) -> Result<String> {
    let output = tokio::process::Command::new("tesseract")
        .arg(path)
        .arg("stdout")
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RoostError::ToolNotFound("tesseract".to_string())
            } else {
                RoostError::ToolFailed(format!("tesseract: {}", e))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RoostError::ToolFailed(format!("tesseract: {}", stderr)));
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!("OCR produced {} characters from {}", text.len(), path.display());

    if text.is_empty() {
        return Err(RoostError::Extraction(format!(
            "OCR produced no text from {}",
            path.display()
        )));
    }

    Ok(text)
}
