//! Weather lookups and husbandry advisories.
//!
//! Fetches current conditions for a city and derives a fixed rule set of
//! poultry-keeping advisories plus a heuristic real-feel temperature.

use crate::error::{Result, RoostError};
use serde::Deserialize;
use std::time::Duration;
use tracing::{instrument, warn};

const WEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Current conditions for a city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    /// Temperature in degrees Celsius.
    pub temp: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Wind speed in m/s.
    pub wind_speed: f64,
    /// Free-text condition description.
    pub description: String,
}

/// A weather report with advisories.
///
/// `observation` is `None` when the backend was unreachable; the
/// advisories then carry the explanation.
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub city: String,
    pub observation: Option<WeatherObservation>,
    pub advisories: Vec<String>,
}

/// Heuristic real-feel temperature combining humidity and wind speed.
pub fn real_feel(temp: f64, humidity: f64, wind_speed: f64) -> f64 {
    temp + 0.33 * humidity - 0.7 * wind_speed - 4.0
}

/// Derive husbandry advisories from an observation.
///
/// Rules: heat stress above 35 C, cold stress below 15 C, high wind above
/// 20 m/s, rain keyword in the condition text. Always ends with the
/// real-feel line.
pub fn advisories(obs: &WeatherObservation) -> Vec<String> {
    let mut out = Vec::new();

    if obs.temp > 35.0 {
        out.push(
            "Extreme heat detected. Provide electrolytes and ensure shade for the birds."
                .to_string(),
        );
    } else if obs.temp < 15.0 {
        out.push("Cold alert. Use heaters and deep bedding to keep birds warm.".to_string());
    }

    if obs.wind_speed > 20.0 {
        out.push("Strong winds detected. Secure poultry houses properly.".to_string());
    }

    if obs.description.to_lowercase().contains("rain") {
        out.push("Rain alert. Keep sheds dry and ensure proper drainage.".to_string());
    }

    out.push(format!(
        "Real feel temperature: {:.1} C",
        real_feel(obs.temp, obs.humidity, obs.wind_speed)
    ));

    out
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    main: ApiMain,
    wind: ApiWind,
    #[serde(default)]
    weather: Vec<ApiWeather>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ApiWeather {
    #[serde(default)]
    description: String,
}

/// OpenWeatherMap client.
pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
}

impl WeatherClient {
    /// Create a client with an explicit API key.
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

    /// Create a client from `WEATHER_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("WEATHER_API_KEY").map_err(|_| {
            RoostError::Config(
                "WEATHER_API_KEY not set. Set it with: export WEATHER_API_KEY='...'".to_string(),
            )
        })?;
        Ok(Self::new(&api_key))
    }

    /// Fetch current conditions for a city.
    #[instrument(skip(self))]
    pub async fn current(&self, city: &str) -> Result<WeatherObservation> {
        let response = self
            .client
            .get(WEATHER_ENDPOINT)
            .query(&[("q", city), ("appid", &self.api_key), ("units", "metric")])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| RoostError::Weather(format!("{}: {}", city, e)))?;

        let body: ApiResponse = response.json().await?;

        Ok(WeatherObservation {
            temp: body.main.temp,
            humidity: body.main.humidity,
            wind_speed: body.wind.speed,
            description: body
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_default(),
        })
    }

    /// Fetch a full report with advisories.
    ///
    /// Never fails: on any backend error the report carries no observation
    /// and a single explanatory advisory.
    pub async fn report(&self, city: &str) -> WeatherReport {
        match self.current(city).await {
            Ok(obs) => {
                let advisories = advisories(&obs);
                WeatherReport {
                    city: city.to_string(),
                    observation: Some(obs),
                    advisories,
                }
            }
            Err(e) => {
                warn!("Weather lookup failed for {}: {}", city, e);
                WeatherReport {
                    city: city.to_string(),
                    observation: None,
                    advisories: vec![
                        "Unable to fetch weather data. Check your network or API key.".to_string(),
                    ],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_feel_formula() {
        // 40 + 0.33*50 - 0.7*5 - 4 = 40 + 16.5 - 3.5 - 4 = 49.0
        assert!((real_feel(40.0, 50.0, 5.0) - 49.0).abs() < 1e-9);
    }

    #[test]
    fn test_heat_stress_advisory() {
        let obs = WeatherObservation {
            temp: 40.0,
            humidity: 50.0,
            wind_speed: 5.0,
            description: "clear sky".to_string(),
        };

        let advisories = advisories(&obs);
        assert!(advisories.iter().any(|a| a.contains("Extreme heat")));
        assert!(advisories.iter().any(|a| a.contains("49.0")));
    }

    #[test]
    fn test_cold_stress_advisory() {
        let obs = WeatherObservation {
            temp: 5.0,
            humidity: 60.0,
            wind_speed: 2.0,
            description: "overcast clouds".to_string(),
        };

        let advisories = advisories(&obs);
        assert!(advisories.iter().any(|a| a.contains("Cold alert")));
        assert!(!advisories.iter().any(|a| a.contains("Extreme heat")));
    }

    #[test]
    fn test_wind_and_rain_advisories() {
        let obs = WeatherObservation {
            temp: 20.0,
            humidity: 80.0,
            wind_speed: 25.0,
            description: "light rain".to_string(),
        };

        let advisories = advisories(&obs);
        assert!(advisories.iter().any(|a| a.contains("Strong winds")));
        assert!(advisories.iter().any(|a| a.contains("Rain alert")));
    }

    #[test]
    fn test_mild_weather_only_real_feel() {
        let obs = WeatherObservation {
            temp: 22.0,
            humidity: 50.0,
            wind_speed: 3.0,
            description: "clear sky".to_string(),
        };

        let advisories = advisories(&obs);
        assert_eq!(advisories.len(), 1);
        assert!(advisories[0].starts_with("Real feel temperature"));
    }

    #[test]
    fn test_api_response_parsing() {
        let json = r#"{
            "main": {"temp": 31.5, "humidity": 62},
            "wind": {"speed": 4.2},
            "weather": [{"description": "scattered clouds"}]
        }"#;

        let parsed: ApiResponse = serde_json::from_str(json).unwrap();
        assert!((parsed.main.temp - 31.5).abs() < 1e-9);
        assert_eq!(parsed.weather[0].description, "scattered clouds");
    }
}
