//! Google Custom Search web provider.

use super::{WebResult, WebSearchProvider};
use crate::error::{Result, RoostError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Web search via the Google Custom Search JSON API.
pub struct GoogleWebSearch {
    client: reqwest::Client,
    api_key: String,
    cse_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleWebSearch {
    /// Create a provider with explicit credentials.
    pub fn new(api_key: &str, cse_id: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
            cse_id: cse_id.to_string(),
        }
    }

    /// Create a provider from `GOOGLE_SEARCH_API_KEY` and `GOOGLE_CSE_ID`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_SEARCH_API_KEY").map_err(|_| {
            RoostError::Config(
                "GOOGLE_SEARCH_API_KEY not set. Web search is unavailable.".to_string(),
            )
        })?;
        let cse_id = std::env::var("GOOGLE_CSE_ID").map_err(|_| {
            RoostError::Config("GOOGLE_CSE_ID not set. Web search is unavailable.".to_string())
        })?;
        Ok(Self::new(&api_key, &cse_id))
    }
}

#[async_trait]
impl WebSearchProvider for GoogleWebSearch {
    #[instrument(skip(self), fields(query = %query))]
    async fn search(&self, query: &str, n: usize) -> Result<Vec<WebResult>> {
        let response = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("q", query),
                ("key", &self.api_key),
                ("cx", &self.cse_id),
                ("num", &n.to_string()),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| RoostError::Search(format!("Web search failed: {}", e)))?;

        let body: SearchResponse = response.json().await?;

        let results: Vec<WebResult> = body
            .items
            .into_iter()
            .take(n)
            .map(|item| WebResult {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
            })
            .collect();

        debug!("Web search returned {} results", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "items": [
                {"title": "Poultry Housing", "link": "https://example.com/a", "snippet": "Ventilation basics."},
                {"title": "Feed Guide", "link": "https://example.com/b", "snippet": "Layer rations."}
            ]
        }"#;

        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].title, "Poultry Housing");
    }

    #[test]
    fn test_response_without_items() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }
}
