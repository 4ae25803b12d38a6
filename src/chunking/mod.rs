//! Document text chunking.
//!
//! Splits extracted document text into fixed-length overlapping windows so
//! no semantic boundary is lost between adjacent chunks. Chunk boundaries
//! are a pure function of the text and the splitter parameters, so indexing
//! the same corpus twice yields identical chunk sets.

use crate::error::{Result, RoostError};

/// Fixed-window text splitter with overlap.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    /// Target chunk length in characters.
    chunk_size: usize,
    /// Characters shared between adjacent chunks.
    overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. The overlap must be strictly smaller than the
    /// chunk size, otherwise the window would never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RoostError::InvalidInput(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RoostError::InvalidInput(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Split text into overlapping character windows.
    ///
    /// Windows are measured in Unicode scalar values, never splitting a
    /// multi-byte character. The final window may be shorter than
    /// `chunk_size`; whitespace-only windows are dropped.
    pub fn split(&self, text: &str) -> Vec<String> {
        // Byte offsets of every char boundary, plus the end of the text.
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());

        let char_count = boundaries.len() - 1;
        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            let window = &text[boundaries[start]..boundaries[end]];

            if !window.trim().is_empty() {
                chunks.push(window.to_string());
            }

            if end == char_count {
                break;
            }
            start = end - self.overlap;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(100, 150).is_err());
        assert!(TextSplitter::new(100, 10).is_ok());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = TextSplitter::new(1000, 100).unwrap();
        let chunks = splitter.split("a short document");
        assert_eq!(chunks, vec!["a short document".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        let splitter = TextSplitter::new(1000, 100).unwrap();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n  ").is_empty());
    }

    #[test]
    fn test_windows_overlap() {
        let splitter = TextSplitter::new(10, 3).unwrap();
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = splitter.split(text);

        assert_eq!(chunks[0], "abcdefghij");
        // Next window starts 3 characters before the previous end.
        assert_eq!(chunks[1], "hijklmnopq");
        assert!(chunks[1].starts_with(&chunks[0][7..]));
    }

    #[test]
    fn test_split_is_deterministic() {
        let splitter = TextSplitter::new(50, 10).unwrap();
        let text = "The brooder temperature should start at 35 degrees and drop \
                    by roughly half a degree per day until feathering is complete. \
                    Ventilation matters as much as heat.";

        let first = splitter.split(text);
        let second = splitter.split(text);
        assert_eq!(first, second);
        assert!(first.len() > 1);
    }

    #[test]
    fn test_multibyte_boundaries() {
        let splitter = TextSplitter::new(4, 1).unwrap();
        let text = "héllo wörld ünïcode";
        let chunks = splitter.split(text);

        // Re-splitting must not panic and must cover the text.
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 4);
        }
    }
}
