//! Pre-flight checks before expensive operations.
//!
//! Validates that required credentials are available before starting
//! operations that would otherwise fail midway.

use crate::error::{Result, RoostError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Indexing requires the embedding backend.
    Index,
    /// Asking questions requires the generation backend.
    Ask,
    /// Lab analysis requires the generation backend.
    Lab,
    /// Diagnosis requires the multimodal backend.
    Diagnose,
    /// Weather lookups require the weather backend key.
    Weather,
    /// Search only reads the local index.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Index | Operation::Ask | Operation::Lab | Operation::Diagnose => {
            check_env("OPENAI_API_KEY", "export OPENAI_API_KEY='sk-...'")?;
        }
        Operation::Weather => {
            check_env("WEATHER_API_KEY", "export WEATHER_API_KEY='...'")?;
        }
        Operation::Search => {
            // No external requirements for search
        }
    }
    Ok(())
}

/// Check that an environment variable is set and non-empty.
fn check_env(name: &str, hint: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(()),
        Ok(_) => Err(RoostError::Config(format!(
            "{} is empty. Set it with: {}",
            name, hint
        ))),
        Err(_) => Err(RoostError::Config(format!(
            "{} not set. Set it with: {}",
            name, hint
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_search_no_requirements() {
        // Search should always pass pre-flight (no external requirements)
        assert!(check(Operation::Search).is_ok());
    }
}
