//! HTTP API server for integration with other systems.
//!
//! Exposes the composite answering pipeline and utility tools as REST
//! endpoints; chat frontends talk to this API.

use super::open_components;
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{Assistant, Section, Session};
use crate::prices::PriceScraper;
use crate::rag::ContextBuilder;
use crate::search::{VideoResult, WebResult};
use crate::tools::{calculate_profit, ProfitInputs};
use crate::weather::WeatherClient;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    assistant: Assistant,
    session: tokio::sync::Mutex<Session>,
    weather: Option<WeatherClient>,
    scraper: PriceScraper,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let (store, embedder) = open_components(&settings)?;
    let assistant = Assistant::from_settings(&settings, store, embedder)?;

    let weather = match WeatherClient::from_env() {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Weather endpoint disabled: {}", e);
            None
        }
    };

    let scraper = PriceScraper::new(&settings.prices.url, &settings.prices.cities)?;

    let state = Arc::new(AppState {
        assistant,
        session: tokio::sync::Mutex::new(Session::new()),
        weather,
        scraper,
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/search", post(search))
        .route("/weather/{city}", get(weather_report))
        .route("/profit", post(profit))
        .route("/prices", get(prices))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Roost API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask (composite)", "POST /ask");
    Output::kv("Search", "POST /search");
    Output::kv("Weather", "GET  /weather/:city");
    Output::kv("Profit", "POST /profit");
    Output::kv("Prices", "GET  /prices");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    refused: bool,
    answer: String,
    knowledge: SectionInfo,
    web: SectionInfo,
    video: SectionInfo,
    sources: Vec<SourceInfo>,
    web_results: Vec<WebResult>,
    video_results: Vec<VideoResult>,
}

#[derive(Serialize)]
struct SectionInfo {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> From<&Section<T>> for SectionInfo {
    fn from(section: &Section<T>) -> Self {
        match section {
            Section::Ok(_) => SectionInfo {
                status: "ok",
                error: None,
            },
            Section::Empty => SectionInfo {
                status: "empty",
                error: None,
            },
            Section::Failed(reason) => SectionInfo {
                status: "failed",
                error: Some(reason.clone()),
            },
        }
    }
}

#[derive(Serialize)]
struct SourceInfo {
    source: String,
    score: f32,
    content: String,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct WeatherResponse {
    city: String,
    temp: Option<f64>,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    description: Option<String>,
    advisories: Vec<String>,
}

#[derive(Deserialize)]
struct ProfitRequest {
    #[serde(default)]
    feed_cost: f64,
    #[serde(default)]
    medicine_cost: f64,
    #[serde(default)]
    labor_cost: f64,
    #[serde(default)]
    egg_sales: f64,
    #[serde(default)]
    meat_sales: f64,
}

#[derive(Serialize)]
struct ProfitResponse {
    profit: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let mut session = state.session.lock().await;

    match state.assistant.answer(&mut session, &req.question).await {
        Ok(composite) => Json(AskResponse {
            refused: composite.refused,
            answer: composite.render(),
            knowledge: (&composite.knowledge).into(),
            web: (&composite.web).into(),
            video: (&composite.video).into(),
            sources: composite
                .sources
                .iter()
                .map(|s| SourceInfo {
                    source: s.source.clone(),
                    score: s.score,
                    content: s.content.clone(),
                })
                .collect(),
            web_results: match &composite.web {
                Section::Ok(results) => results.clone(),
                _ => Vec::new(),
            },
            video_results: match &composite.video {
                Section::Ok(results) => results.clone(),
                _ => Vec::new(),
            },
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let (store, embedder) = match open_components(&state.settings) {
        Ok(components) => components,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    let builder = ContextBuilder::new(store, embedder, req.limit);

    match builder.build(&req.query).await {
        Ok(chunks) => Json(SearchResponse {
            results: chunks
                .into_iter()
                .map(|c| SourceInfo {
                    source: c.source,
                    score: c.score,
                    content: c.content,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn weather_report(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(city): axum::extract::Path<String>,
) -> impl IntoResponse {
    let Some(client) = &state.weather else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Weather backend is not configured".to_string(),
            }),
        )
            .into_response();
    };

    let report = client.report(&city).await;

    Json(WeatherResponse {
        city: report.city,
        temp: report.observation.as_ref().map(|o| o.temp),
        humidity: report.observation.as_ref().map(|o| o.humidity),
        wind_speed: report.observation.as_ref().map(|o| o.wind_speed),
        description: report.observation.as_ref().map(|o| o.description.clone()),
        advisories: report.advisories,
    })
    .into_response()
}

async fn profit(Json(req): Json<ProfitRequest>) -> impl IntoResponse {
    let inputs = ProfitInputs {
        feed_cost: req.feed_cost,
        medicine_cost: req.medicine_cost,
        labor_cost: req.labor_cost,
        egg_sales: req.egg_sales,
        meat_sales: req.meat_sales,
    };

    match calculate_profit(&inputs) {
        Ok(profit) => Json(ProfitResponse { profit }).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn prices(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.scraper.fetch_prices().await {
        Ok(prices) => Json(prices).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
