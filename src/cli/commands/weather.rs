//! Weather command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::weather::WeatherClient;
use anyhow::Result;

/// Run the weather command.
pub async fn run_weather(city: Option<&str>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Weather) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let city = city.unwrap_or(&settings.weather.default_city);
    let client = WeatherClient::from_env()?;

    let spinner = Output::spinner(&format!("Fetching weather for {}...", city));
    let report = client.report(city).await;
    spinner.finish_and_clear();

    Output::header(&format!("Weather in {}", report.city));

    match &report.observation {
        Some(obs) => {
            Output::kv("Temperature", &format!("{:.1} C", obs.temp));
            Output::kv("Humidity", &format!("{:.0}%", obs.humidity));
            Output::kv("Wind speed", &format!("{:.1} m/s", obs.wind_speed));
            Output::kv("Conditions", &obs.description);
        }
        None => {
            Output::warning("Weather data unavailable.");
        }
    }

    println!();
    for advisory in &report.advisories {
        Output::list_item(advisory);
    }

    Ok(())
}
