use crate::core::insights::market_summary as summary_text;
use crate::core::market::{NewsQuery, SortBy};
use crate::core::news::{Insight, to_insights};
use crate::core::rates::{RateQuote, build_rate_table, filter_rates, pick_rate};
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::server::routes::{currency_pair, present};
use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const RATE_TABLE_BASE: &str = "USD";
const MARKET_NEWS_QUERY: &str = "forex OR currency market";

#[derive(Debug, Deserialize)]
pub struct AllRatesParams {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllRatesResponse {
    pub exchange_rates: Vec<RateQuote>,
    pub market_insights: Vec<Insight>,
}

/// `GET /api/all-rates`: USD rate table plus the latest market headlines.
pub async fn all_rates(
    State(state): State<AppState>,
    Query(params): Query<AllRatesParams>,
) -> Result<Json<AllRatesResponse>, ApiError> {
    const HEADLINE: &str = "Failed to fetch market data.";

    let news_query = NewsQuery::new(MARKET_NEWS_QUERY, SortBy::PublishedAt);
    let (rates, articles) = futures::try_join!(
        state.rates.latest(RATE_TABLE_BASE),
        state.news.search(&news_query)
    )
    .map_err(|e| ApiError::upstream(HEADLINE, e))?;

    let mut quotes = build_rate_table(RATE_TABLE_BASE, &rates, &mut rand::thread_rng());
    if let Some(term) = present(params.search) {
        quotes = filter_rates(&quotes, &term);
    }
    info!(
        quotes = quotes.len(),
        articles = articles.len(),
        "Serving rate table"
    );

    Ok(Json(AllRatesResponse {
        exchange_rates: quotes,
        market_insights: to_insights(&articles),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub rate: f64,
}

/// `GET /api/market-summary`: current rate for a pair with a narrative summary.
pub async fn market_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryResponse>, ApiError> {
    const HEADLINE: &str = "Failed to generate market summary.";

    let (from, to) = currency_pair(
        params.from,
        params.to,
        "Missing 'from' or 'to' currency parameters",
    )?;

    let news_query = NewsQuery::new(format!("currency exchange {from} {to}"), SortBy::Relevancy);
    let (articles, rates) = futures::try_join!(
        state.news.search(&news_query),
        state.rates.latest(&from)
    )
    .map_err(|e| ApiError::upstream(HEADLINE, e))?;

    let rate = pick_rate(&rates, &to).map_err(|e| ApiError::upstream(HEADLINE, e))?;
    // TODO: summarize `articles` with a language model instead of the fixed template.
    debug!(articles = articles.len(), "Fetched summary headlines");

    Ok(Json(SummaryResponse {
        summary: summary_text(&from, &to),
        rate,
    }))
}
