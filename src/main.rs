//! Roost CLI entry point.

use anyhow::Result;
use clap::Parser;
use roost::cli::{commands, Cli, Commands};
use roost::config::Settings;
use roost::tools::ProfitInputs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("roost={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure the data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Index { files } => {
            commands::run_index(files, settings).await?;
        }

        Commands::Ask {
            question,
            retrieval_k,
        } => {
            commands::run_ask(question, *retrieval_k, settings).await?;
        }

        Commands::Chat => {
            commands::run_chat(settings).await?;
        }

        Commands::Search { query, limit } => {
            commands::run_search(query, *limit, settings).await?;
        }

        Commands::Weather { city } => {
            commands::run_weather(city.as_deref(), settings).await?;
        }

        Commands::Lab { file } => {
            commands::run_lab(file, settings).await?;
        }

        Commands::Diagnose { image } => {
            commands::run_diagnose(image, settings).await?;
        }

        Commands::Profit {
            feed_cost,
            medicine_cost,
            labor_cost,
            egg_sales,
            meat_sales,
        } => {
            commands::run_profit(&ProfitInputs {
                feed_cost: *feed_cost,
                medicine_cost: *medicine_cost,
                labor_cost: *labor_cost,
                egg_sales: *egg_sales,
                meat_sales: *meat_sales,
            })?;
        }

        Commands::Prices => {
            commands::run_prices(settings).await?;
        }

        Commands::Monitor { once } => {
            commands::run_monitor(*once, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
