//! Tabular data extraction.

use crate::error::{Result, RoostError};

/// Serialize CSV bytes into a readable table dump.
///
/// Header row first, columns joined with ` | `.
pub fn csv_to_table_text(data: &[u8]) -> Result<String> {
    let mut reader = csv::Reader::from_reader(data);
    let mut content = String::new();

    if let Ok(headers) = reader.headers() {
        content.push_str(&headers.iter().collect::<Vec<_>>().join(" | "));
        content.push('\n');
    }

    for result in reader.records() {
        let record =
            result.map_err(|e| RoostError::Extraction(format!("CSV parse error: {}", e)))?;
        content.push_str(&record.iter().collect::<Vec<_>>().join(" | "));
        content.push('\n');
    }

    if content.trim().is_empty() {
        return Err(RoostError::Extraction("CSV file is empty".to_string()));
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_to_table_text() {
        let data = b"parameter,value,unit\nhemoglobin,9.2,g/dL\ncalcium,8.1,mg/dL\n";
        let table = csv_to_table_text(data).unwrap();

        assert!(table.starts_with("parameter | value | unit"));
        assert!(table.contains("hemoglobin | 9.2 | g/dL"));
        assert!(table.contains("calcium | 8.1 | mg/dL"));
    }

    #[test]
    fn test_empty_csv_fails() {
        assert!(csv_to_table_text(b"").is_err());
    }

    #[test]
    fn test_malformed_csv_fails() {
        // Unbalanced quote produces a reader error on the record.
        let data = b"a,b\n\"unterminated,1\n2,3\n";
        assert!(csv_to_table_text(data).is_err());
    }
}
