//! YouTube Data API video provider.

use super::{VideoResult, VideoSearchProvider};
use crate::error::{Result, RoostError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Video search via the YouTube Data API v3.
pub struct YoutubeVideoSearch {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: VideoId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct VideoId {
    #[serde(rename = "videoId", default)]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
}

impl YoutubeVideoSearch {
    /// Create a provider with an explicit API key.
    pub fn new(api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
        }
    }

    /// Create a provider from `YOUTUBE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("YOUTUBE_API_KEY").map_err(|_| {
            RoostError::Config("YOUTUBE_API_KEY not set. Video search is unavailable.".to_string())
        })?;
        Ok(Self::new(&api_key))
    }
}

#[async_trait]
impl VideoSearchProvider for YoutubeVideoSearch {
    #[instrument(skip(self), fields(query = %query))]
    async fn search(&self, query: &str, n: usize) -> Result<Vec<VideoResult>> {
        let response = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", &n.to_string()),
                ("key", &self.api_key),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| RoostError::Search(format!("Video search failed: {}", e)))?;

        let body: SearchResponse = response.json().await?;

        let results: Vec<VideoResult> = body
            .items
            .into_iter()
            .filter(|item| !item.id.video_id.is_empty())
            .take(n)
            .map(|item| VideoResult {
                title: item.snippet.title,
                url: format!("https://www.youtube.com/watch?v={}", item.id.video_id),
                channel: item.snippet.channel_title,
            })
            .collect();

        debug!("Video search returned {} results", results.len());
        Ok(results)
    }
}
