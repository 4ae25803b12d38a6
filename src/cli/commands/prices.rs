//! Egg prices command.

use crate::cli::Output;
use crate::config::Settings;
use crate::prices::PriceScraper;
use anyhow::Result;
use console::style;

/// Run the prices command.
pub async fn run_prices(settings: Settings) -> Result<()> {
    let scraper = PriceScraper::new(&settings.prices.url, &settings.prices.cities)?;

    let spinner = Output::spinner("Fetching latest egg prices...");

    match scraper.fetch_prices().await {
        Ok(prices) => {
            spinner.finish_and_clear();
            Output::header("Latest Egg Rates");
            Output::info(&format!("Source: {}", settings.prices.url));

            for city in &prices {
                println!("\n{}", style(&city.city).bold());
                for entry in &city.entries {
                    Output::kv(&entry.label, &format!("{} PKR", entry.price));
                }
            }
            println!();
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Unable to fetch egg prices: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
