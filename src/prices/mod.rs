//! Egg price page scraping.
//!
//! Extracts per-city (quantity label, price) pairs from the pricing page's
//! markup. The markup is upstream-controlled and brittle, which is why the
//! structure monitor in [`monitor`] exists.

pub mod monitor;

pub use monitor::{
    CheckOutcome, HttpPageFetcher, LogNotifier, Notifier, PageFetcher, PriceMonitor,
    WebhookNotifier,
};

use crate::error::{Result, RoostError};
use regex::Regex;
use scraper::{CaseSensitivity, ElementRef, Html, Selector};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const REQUEST_TIMEOUT_SECS: u64 = 20;

/// One (quantity label, price) pair.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceEntry {
    pub label: String,
    pub price: String,
}

/// Price listing for one city.
#[derive(Debug, Clone, Serialize)]
pub struct CityPrices {
    pub city: String,
    pub entries: Vec<PriceEntry>,
}

/// Scrapes the egg price listing page.
pub struct PriceScraper {
    client: reqwest::Client,
    url: String,
    cities: Vec<String>,
    price_re: Regex,
}

impl PriceScraper {
    /// Create a scraper for the given page and city list.
    pub fn new(page_url: &str, cities: &[String]) -> Result<Self> {
        url::Url::parse(page_url)
            .map_err(|e| RoostError::Config(format!("Invalid price page URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        // Matches "Rs. 348", "Rs: 348", "348 PKR" style price fragments.
        let price_re = Regex::new(r"(?i)(?:rs\.?:?\s*|pkr\s*)?([0-9][0-9,]*(?:\.[0-9]+)?)\s*(?:pkr)?\s*$")
            .expect("Invalid price regex");

        Ok(Self {
            client,
            url: page_url.to_string(),
            cities: cities.to_vec(),
            price_re,
        })
    }

    /// Fetch the raw page HTML.
    pub async fn fetch_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| RoostError::Scrape(format!("{}: {}", self.url, e)))?;

        Ok(response.text().await?)
    }

    /// Fetch and parse the current per-city prices.
    #[instrument(skip(self))]
    pub async fn fetch_prices(&self) -> Result<Vec<CityPrices>> {
        let html = self.fetch_page().await?;
        let prices = self.parse(&html);

        if prices.is_empty() {
            return Err(RoostError::Scrape(
                "No city price data found; the page markup may have changed".to_string(),
            ));
        }

        Ok(prices)
    }

    /// Parse per-city prices from page HTML.
    ///
    /// Page schema: each city has an `h3` heading inside a column div,
    /// with centered paragraphs carrying the individual price lines.
    pub fn parse(&self, html: &str) -> Vec<CityPrices> {
        let document = Html::parse_document(html);
        let heading_sel = Selector::parse("h3").expect("Invalid selector");
        let price_sel = Selector::parse("p.has-text-align-center").expect("Invalid selector");

        let mut result = Vec::new();

        for city in &self.cities {
            let heading = document.select(&heading_sel).find(|h| {
                h.text().collect::<String>().contains(city.as_str())
            });

            let Some(heading) = heading else {
                warn!("No heading found for city {}", city);
                continue;
            };

            let Some(column) = enclosing_column(heading) else {
                warn!("No price column found for city {}", city);
                continue;
            };

            let entries: Vec<PriceEntry> = column
                .select(&price_sel)
                .filter_map(|p| self.parse_price_line(&p.text().collect::<String>()))
                .collect();

            if !entries.is_empty() {
                result.push(CityPrices {
                    city: city.clone(),
                    entries,
                });
            }
        }

        debug!("Parsed prices for {} cities", result.len());
        result
    }

    /// Split a price line like "1 Dozen Eggs Rs. 348" into label and price.
    fn parse_price_line(&self, text: &str) -> Option<PriceEntry> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let caps = self.price_re.captures(text)?;
        let price = caps.get(1)?.as_str().to_string();
        let label = text[..caps.get(0)?.start()]
            .trim()
            .trim_end_matches([':', '-', '='])
            .trim()
            .to_string();

        if label.is_empty() {
            return None;
        }

        Some(PriceEntry { label, price })
    }
}

/// Walk up from a heading to its enclosing layout column.
fn enclosing_column(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value()
                .has_class("wp-block-column", CaseSensitivity::AsciiCaseInsensitive)
        })
}

/// Extract the normalized subset of the page used for change detection:
/// the concatenated markup of the price tables. Returns None when the page
/// carries no recognizable price tables.
pub fn normalized_tables(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table.kb-table").expect("Invalid selector");

    let tables: Vec<String> = document.select(&table_sel).map(|t| t.html()).collect();

    if tables.is_empty() {
        return None;
    }

    Some(tables.join("").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
        <div class="wp-block-column">
            <h3>Egg Rates in Lahore</h3>
            <p class="has-text-align-center">1 Dozen Eggs Rs. 348</p>
            <p class="has-text-align-center">1 Egg Rs. 29</p>
            <p class="has-text-align-center">30 Eggs Tray Rs. 870</p>
        </div>
        <div class="wp-block-column">
            <h3>Egg Rates in Karachi</h3>
            <p class="has-text-align-center">1 Dozen Eggs Rs. 352</p>
        </div>
        <table class="kb-table"><tr><td>1 Dozen</td><td>348</td></tr></table>
        </body></html>
    "#;

    fn scraper() -> PriceScraper {
        PriceScraper::new(
            "https://eggrates.pk/",
            &["Lahore".to_string(), "Karachi".to_string(), "Multan".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(PriceScraper::new("not a url", &[]).is_err());
    }

    #[test]
    fn test_parse_extracts_city_prices() {
        let prices = scraper().parse(FIXTURE);

        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].city, "Lahore");
        assert_eq!(prices[0].entries.len(), 3);
        assert_eq!(
            prices[0].entries[0],
            PriceEntry {
                label: "1 Dozen Eggs".to_string(),
                price: "348".to_string(),
            }
        );
        assert_eq!(prices[1].city, "Karachi");
        assert_eq!(prices[1].entries[0].price, "352");
    }

    #[test]
    fn test_parse_missing_city_skipped() {
        let prices = scraper().parse(FIXTURE);
        assert!(!prices.iter().any(|p| p.city == "Multan"));
    }

    #[test]
    fn test_parse_price_line() {
        let s = scraper();

        let entry = s.parse_price_line("1 Dozen Eggs Rs. 348").unwrap();
        assert_eq!(entry.label, "1 Dozen Eggs");
        assert_eq!(entry.price, "348");

        let entry = s.parse_price_line("Egg Rate: Rs: 29.50").unwrap();
        assert_eq!(entry.label, "Egg Rate");
        assert_eq!(entry.price, "29.50");

        assert!(s.parse_price_line("No numbers here").is_none());
        assert!(s.parse_price_line("").is_none());
    }

    #[test]
    fn test_normalized_tables_stable() {
        let first = normalized_tables(FIXTURE).unwrap();
        let second = normalized_tables(FIXTURE).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("1 Dozen"));
    }

    #[test]
    fn test_normalized_tables_absent() {
        assert!(normalized_tables("<html><body><p>no tables</p></body></html>").is_none());
    }

    #[test]
    fn test_normalized_tables_ignores_non_table_changes() {
        let variant = FIXTURE.replace("Egg Rates in Lahore", "Lahore Egg Rates (updated)");
        assert_eq!(
            normalized_tables(FIXTURE).unwrap(),
            normalized_tables(&variant).unwrap()
        );
    }
}
