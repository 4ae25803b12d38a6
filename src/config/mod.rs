//! Configuration module for Roost.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{render, DiagnosisPrompts, GatePrompts, LabPrompts, Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, DocumentSettings, EmbeddingSettings, GateSettings, GeneralSettings,
    PriceSettings, RagSettings, SearchSettings, Settings, VectorStoreSettings, WeatherSettings,
};
