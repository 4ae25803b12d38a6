//! CLI module for Roost.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Roost - Poultry Farming Knowledge Assistant
///
/// A CLI assistant that answers poultry-farming questions from a reference
/// library, enriched with live web and video results, plus husbandry tools:
/// weather advisories, lab-report analysis, disease diagnosis, a profit
/// calculator, and egg price monitoring.
#[derive(Parser, Debug)]
#[command(name = "roost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Roost and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Build the document index from the reference corpus
    Index {
        /// Document paths (defaults to the configured corpus)
        files: Vec<String>,
    },

    /// Ask a question and get a composite answer with sources
    Ask {
        /// The question to ask
        question: String,

        /// Number of context chunks to retrieve
        #[arg(short = 'k', long)]
        retrieval_k: Option<usize>,
    },

    /// Start an interactive chat session
    Chat,

    /// Search the reference library without generating an answer
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Fetch current weather and husbandry advisories for a city
    Weather {
        /// City name (defaults to the configured city)
        city: Option<String>,
    },

    /// Analyze a veterinary lab report file (pdf, csv, txt, jpg, png)
    Lab {
        /// Path to the report file
        file: String,
    },

    /// Diagnose poultry disease from a bird image (jpg, png)
    Diagnose {
        /// Path to the image file
        image: String,
    },

    /// Calculate farm profit from costs and sales
    Profit {
        #[arg(long, default_value = "0")]
        feed_cost: f64,

        #[arg(long, default_value = "0")]
        medicine_cost: f64,

        #[arg(long, default_value = "0")]
        labor_cost: f64,

        #[arg(long, default_value = "0")]
        egg_sales: f64,

        #[arg(long, default_value = "0")]
        meat_sales: f64,
    },

    /// Fetch the latest egg prices
    Prices,

    /// Run the price page structure monitor
    Monitor {
        /// Run a single check and exit instead of polling
        #[arg(long)]
        once: bool,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
