//! JSON API over the rate, news and quote providers.

pub mod error;
pub mod routes;

use crate::core::config::{
    ALPHA_VANTAGE_KEY_VAR, AppConfig, EXCHANGE_RATE_KEY_VAR, NEWS_KEY_VAR, ServerSettings,
};
use crate::core::market::{ExchangeRateProvider, NewsProvider, QuoteProvider};
use crate::providers::alpha_vantage::AlphaVantage;
use crate::providers::caching::CachingRateProvider;
use crate::providers::exchange_rate::ExchangeRateApi;
use crate::providers::news_api::NewsApi;
use crate::providers::util::http_client;
use anyhow::{Context, Result};
use axum::Router;
use axum::http::HeaderValue;
use axum::response::Json;
use axum::routing::get;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

/// Providers shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<dyn ExchangeRateProvider>,
    pub news: Arc<dyn NewsProvider>,
    pub quotes: Arc<dyn QuoteProvider>,
}

impl AppState {
    /// Wires the upstream clients described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = http_client()?;
        let providers = &config.providers;

        let exchange_rate = ExchangeRateApi::new(
            &providers.exchange_rate.base_url,
            providers.exchange_rate.resolve_api_key(EXCHANGE_RATE_KEY_VAR),
            client.clone(),
        )
        .with_retries(config.retries);
        let news = NewsApi::new(
            &providers.news.base_url,
            providers.news.resolve_api_key(NEWS_KEY_VAR),
            client.clone(),
        )
        .with_retries(config.retries);
        let quotes = AlphaVantage::new(
            &providers.alpha_vantage.base_url,
            providers.alpha_vantage.resolve_api_key(ALPHA_VANTAGE_KEY_VAR),
            client,
        )
        .with_retries(config.retries);

        Ok(AppState {
            rates: Arc::new(CachingRateProvider::new(exchange_rate, config.cache_ttl())),
            news: Arc::new(news),
            quotes: Arc::new(quotes),
        })
    }
}

/// Any origin when none are configured, otherwise exactly the configured list.
fn cors_layer(settings: &ServerSettings) -> Result<CorsLayer> {
    if settings.cors_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = settings
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Builds the router with all routes and middleware.
pub fn build_router(state: AppState, settings: &ServerSettings) -> Result<Router> {
    let cors = cors_layer(settings)?;
    let router = Router::new()
        .route(
            "/health",
            get(|| async {
                Json(HealthResponse {
                    status: "healthy".to_string(),
                    timestamp: chrono::Utc::now(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                })
            }),
        )
        .route("/api/all-rates", get(routes::rates::all_rates))
        .route("/api/market-summary", get(routes::rates::market_summary))
        .route("/api/news", get(routes::news::news))
        .route("/api/charts", get(routes::charts::series_chart))
        .route("/api/chart-data", get(routes::charts::candle_chart))
        .route("/api/convert", get(routes::convert::convert))
        .route("/api/currencies", get(routes::convert::currencies))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(router)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: &AppConfig, bind: Option<&str>) -> Result<()> {
    let bind = bind.unwrap_or(&config.server.bind);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: {bind}"))?;

    let state = AppState::from_config(config)?;
    let router = build_router(state, &config.server)?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await
        .context("Server error")
}
