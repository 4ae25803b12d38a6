//! Web and video search enrichment.
//!
//! Independent lookups against external search backends. Providers return
//! the backend's own ranking truncated to the requested count; no local
//! re-ranking. The fail-soft contract (degrading a failed lookup to a
//! placeholder section) lives in the pipeline, not here.

mod video;
mod web;

pub use video::YoutubeVideoSearch;
pub use web::GoogleWebSearch;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single web search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A single video search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResult {
    pub title: String,
    pub url: String,
    pub channel: String,
}

/// Trait for web search backends.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Fetch the top `n` results for a query.
    async fn search(&self, query: &str, n: usize) -> Result<Vec<WebResult>>;
}

/// Trait for video search backends.
#[async_trait]
pub trait VideoSearchProvider: Send + Sync {
    /// Fetch the top `n` video results for a query.
    async fn search(&self, query: &str, n: usize) -> Result<Vec<VideoResult>>;
}
