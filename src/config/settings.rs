//! Configuration settings for Roost.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub documents: DocumentSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub vector_store: VectorStoreSettings,
    pub gate: GateSettings,
    pub rag: RagSettings,
    pub search: SearchSettings,
    pub weather: WeatherSettings,
    pub prices: PriceSettings,
    pub prompts: crate::config::Prompts,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.roost".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Reference document corpus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Directory holding the reference documents.
    pub dir: String,
    /// File names of the fixed corpus, resolved relative to `dir`.
    pub files: Vec<String>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            dir: "~/.roost/docs".to_string(),
            files: vec![
                "poultry1.pdf".to_string(),
                "poultry2.pdf".to_string(),
                "poultry3.pdf".to_string(),
            ],
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Document chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 100,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.roost/index.db".to_string(),
        }
    }
}

/// Relevance gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Gate strategy (keyword, model).
    pub strategy: String,
    /// Allow-list for the keyword strategy.
    pub keywords: Vec<String>,
    /// Chat model for the model-classifier strategy.
    pub model: String,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            strategy: "keyword".to_string(),
            keywords: vec![
                "poultry".to_string(),
                "chicken".to_string(),
                "hen".to_string(),
                "rooster".to_string(),
                "broiler".to_string(),
                "layer".to_string(),
                "chick".to_string(),
                "egg".to_string(),
                "hatchery".to_string(),
                "coop".to_string(),
                "feed".to_string(),
            ],
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// RAG (Retrieval-Augmented Generation) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// LLM model for response generation.
    pub model: String,
    /// Number of chunks retrieved per query.
    pub retrieval_k: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            retrieval_k: 3,
        }
    }
}

/// Web and video search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of web results per query.
    pub web_results: usize,
    /// Number of video results per query.
    pub video_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            web_results: 3,
            video_results: 3,
        }
    }
}

/// Weather advisory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    /// City used when none is given on the command line.
    pub default_city: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            default_city: "Karachi".to_string(),
        }
    }
}

/// Price page scraping and monitoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceSettings {
    /// URL of the egg price listing page.
    pub url: String,
    /// Cities to extract price tables for.
    pub cities: Vec<String>,
    /// Polling interval for the structure monitor, in hours.
    pub interval_hours: u64,
    /// File persisting the last observed content hash.
    pub state_file: String,
    /// Lock file enforcing a single monitor instance.
    pub lock_file: String,
    /// Optional webhook to notify on page structure changes.
    pub webhook_url: Option<String>,
}

impl Default for PriceSettings {
    fn default() -> Self {
        Self {
            url: "https://eggrates.pk/".to_string(),
            cities: vec![
                "Islamabad".to_string(),
                "Lahore".to_string(),
                "Karachi".to_string(),
                "Peshawar".to_string(),
            ],
            interval_hours: 24,
            state_file: "~/.roost/price_hash".to_string(),
            lock_file: "~/.roost/monitor.lock".to_string(),
            webhook_url: None,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::RoostError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roost")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded document corpus directory.
    pub fn documents_dir(&self) -> PathBuf {
        Self::expand_path(&self.documents.dir)
    }

    /// Get the expanded paths of every corpus document.
    pub fn document_paths(&self) -> Vec<PathBuf> {
        let dir = self.documents_dir();
        self.documents.files.iter().map(|f| dir.join(f)).collect()
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Get the expanded price monitor state file path.
    pub fn price_state_path(&self) -> PathBuf {
        Self::expand_path(&self.prices.state_file)
    }

    /// Get the expanded price monitor lock file path.
    pub fn price_lock_path(&self) -> PathBuf {
        Self::expand_path(&self.prices.lock_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.chunking.overlap, 100);
        assert_eq!(settings.rag.retrieval_k, 3);
        assert_eq!(settings.gate.strategy, "keyword");
        assert_eq!(settings.prices.interval_hours, 24);
        assert!(settings.gate.keywords.contains(&"poultry".to_string()));
    }

    #[test]
    fn test_document_paths_join_dir() {
        let mut settings = Settings::default();
        settings.documents.dir = "/corpus".to_string();
        settings.documents.files = vec!["a.pdf".to_string(), "b.txt".to_string()];

        let paths = settings.document_paths();
        assert_eq!(paths[0], PathBuf::from("/corpus/a.pdf"));
        assert_eq!(paths[1], PathBuf::from("/corpus/b.txt"));
    }

    #[test]
    fn test_roundtrip_toml() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed.embedding.model, settings.embedding.model);
        assert_eq!(parsed.prices.cities, settings.prices.cities);
    }
}
