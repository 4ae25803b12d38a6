//! PDF text and page-image extraction.

use crate::error::{Result, RoostError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extract plain text from PDF bytes.
///
/// Whitespace-trims every line and drops empties; PDFs with no extractable
/// text (scanned/image-only) fail with `Extraction`.
pub fn extract_text(data: &[u8], source: &str) -> Result<String> {
    let raw = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| RoostError::Extraction(format!("{}: {}", source, e)))?;

    let content = raw
        .replace('\0', "")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if content.trim().is_empty() {
        return Err(RoostError::Extraction(format!(
            "{}: no text content could be extracted (PDF may be image-based)",
            source
        )));
    }

    debug!("Extracted {} characters from {}", content.len(), source);
    Ok(content)
}

/// Render each PDF page to a PNG under `output_dir` using pdftoppm.
///
/// Returns the paths of the rendered images. pdftoppm is optional tooling;
/// callers treat failure as "no page images".
pub async fn render_page_images(pdf_path: &Path, output_dir: &Path) -> Result<Vec<String>> {
    std::fs::create_dir_all(output_dir)?;

    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let prefix: PathBuf = output_dir.join(&stem);

    let output = tokio::process::Command::new("pdftoppm")
        .args(["-png", "-r", "150"])
        .arg(pdf_path)
        .arg(&prefix)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RoostError::ToolNotFound("pdftoppm".to_string())
            } else {
                RoostError::ToolFailed(format!("pdftoppm: {}", e))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RoostError::ToolFailed(format!("pdftoppm: {}", stderr)));
    }

    // pdftoppm names outputs <prefix>-1.png, <prefix>-2.png, ...
    let mut images: Vec<String> = std::fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension().is_some_and(|e| e == "png")
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(&format!("{}-", stem)))
        })
        .map(|p| p.display().to_string())
        .collect();
    images.sort();

    debug!("Rendered {} page images for {}", images.len(), stem);
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_rejects_garbage() {
        assert!(extract_text(b"not a pdf", "bogus.pdf").is_err());
    }
}
