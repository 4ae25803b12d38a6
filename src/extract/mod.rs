//! Document content extraction.
//!
//! Pulls raw text (and, where the format supports it, tabular and image
//! sub-content) out of reference documents and uploaded files. Dispatch is
//! by file extension; unsupported formats are rejected up front.

mod ocr;
mod pdf;
mod tabular;

pub use ocr::ocr_image;
pub use pdf::render_page_images;
pub use tabular::csv_to_table_text;

use crate::error::{Result, RoostError};
use std::path::Path;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Csv,
    Text,
    Image,
}

impl FileKind {
    /// Determine the kind from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "csv" => Some(FileKind::Csv),
            "txt" | "md" => Some(FileKind::Text),
            "jpg" | "jpeg" | "png" => Some(FileKind::Image),
            _ => None,
        }
    }
}

/// Extracted content of a single document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// File name of the originating document.
    pub source: String,
    /// Raw text content.
    pub text: String,
    /// Tabular sub-content, serialized to text.
    pub tables: Vec<String>,
    /// Paths of extracted page-image artifacts.
    pub images: Vec<String>,
}

impl ExtractedDocument {
    /// Whether the document yielded any usable content.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.tables.is_empty() && self.images.is_empty()
    }

    /// Text plus table dumps, joined for single-prompt consumers.
    pub fn combined_text(&self) -> String {
        let mut out = self.text.trim().to_string();
        for table in &self.tables {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(table);
        }
        out
    }
}

/// Extract the content of a document.
///
/// `image_dir` receives rendered page images for formats that support them
/// (PDF); pass `None` to skip image extraction. Fails with
/// `DocumentNotFound` for a missing path and `Extraction` when the document
/// yields no content at all.
pub async fn extract_document(
    path: &Path,
    image_dir: Option<&Path>,
) -> Result<ExtractedDocument> {
    if !path.exists() {
        return Err(RoostError::DocumentNotFound(path.display().to_string()));
    }

    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let kind = FileKind::from_path(path).ok_or_else(|| {
        RoostError::Extraction(format!(
            "Unsupported file type: {} (supported: pdf, csv, txt, md, jpg, png)",
            path.display()
        ))
    })?;

    let doc = match kind {
        FileKind::Pdf => {
            let data = std::fs::read(path)?;
            let text = pdf::extract_text(&data, &source)?;
            let images = match image_dir {
                Some(dir) => pdf::render_page_images(path, dir).await.unwrap_or_else(|e| {
                    tracing::warn!("Page image rendering skipped for {}: {}", source, e);
                    Vec::new()
                }),
                None => Vec::new(),
            };
            ExtractedDocument {
                source: source.clone(),
                text,
                tables: Vec::new(),
                images,
            }
        }
        FileKind::Csv => {
            let data = std::fs::read(path)?;
            let table = tabular::csv_to_table_text(&data)?;
            ExtractedDocument {
                source: source.clone(),
                text: String::new(),
                tables: vec![table],
                images: Vec::new(),
            }
        }
        FileKind::Text => {
            let text = std::fs::read_to_string(path)?;
            ExtractedDocument {
                source: source.clone(),
                text,
                tables: Vec::new(),
                images: Vec::new(),
            }
        }
        FileKind::Image => {
            let text = ocr::ocr_image(path).await?;
            ExtractedDocument {
                source: source.clone(),
                text,
                tables: Vec::new(),
                images: Vec::new(),
            }
        }
    };

    if doc.is_empty() {
        return Err(RoostError::Extraction(format!(
            "Document {} yielded no text or tables",
            source
        )));
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_kind_from_path() {
        assert_eq!(FileKind::from_path(Path::new("a.pdf")), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_path(Path::new("a.CSV")), Some(FileKind::Csv));
        assert_eq!(FileKind::from_path(Path::new("a.txt")), Some(FileKind::Text));
        assert_eq!(FileKind::from_path(Path::new("a.jpeg")), Some(FileKind::Image));
        assert_eq!(FileKind::from_path(Path::new("a.docx")), None);
        assert_eq!(FileKind::from_path(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn test_missing_document() {
        let err = extract_document(Path::new("/nonexistent/report.pdf"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RoostError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn test_extract_text_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        writeln!(file, "Layer hens need 16 hours of light per day.").unwrap();

        let doc = extract_document(file.path(), None).await.unwrap();
        assert!(doc.text.contains("16 hours"));
        assert!(doc.tables.is_empty());
    }

    #[tokio::test]
    async fn test_extract_empty_text_file_fails() {
        let file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();

        let err = extract_document(file.path(), None).await.unwrap_err();
        assert!(matches!(err, RoostError::Extraction(_)));
    }

    #[test]
    fn test_combined_text_joins_tables() {
        let doc = ExtractedDocument {
            source: "feed.csv".to_string(),
            text: "Intro".to_string(),
            tables: vec!["a | b\n1 | 2".to_string()],
            images: Vec::new(),
        };
        let combined = doc.combined_text();
        assert!(combined.starts_with("Intro"));
        assert!(combined.contains("a | b"));
    }
}
