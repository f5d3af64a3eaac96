use crate::core::charts::{CandleChart, SeriesChart, build_candle_chart, build_series_chart};
use crate::core::currency::parse_pair;
use crate::core::market::Timeframe;
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::server::routes::{currency_pair, present};
use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

const HEADLINE: &str = "Failed to fetch chart data.";

#[derive(Debug, Deserialize)]
pub struct SeriesParams {
    pub pair: Option<String>,
    pub timeframe: Option<String>,
}

/// `GET /api/charts`: daily rate line for a `FROM/TO` pair over a timeframe.
pub async fn series_chart(
    State(state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Result<Json<SeriesChart>, ApiError> {
    let (Some(pair), Some(timeframe)) = (present(params.pair), present(params.timeframe)) else {
        return Err(ApiError::bad_request(
            "Missing \"pair\" or \"timeframe\" parameters",
        ));
    };
    let (from, to) = parse_pair(&pair).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let timeframe = Timeframe::parse_or_default(&timeframe);

    let end = Utc::now().date_naive();
    let start = timeframe.start_date(end);
    let points = state
        .rates
        .timeseries(&from, &to, start, end)
        .await
        .map_err(|e| ApiError::upstream(HEADLINE, e))?;

    info!(%from, %to, %timeframe, points = points.len(), "Serving rate series");
    Ok(Json(build_series_chart(&points, &mut rand::thread_rng())))
}

#[derive(Debug, Deserialize)]
pub struct CandleParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub timeframe: Option<String>,
}

/// `GET /api/chart-data`: OHLC candles for a pair with a last-bar change summary.
pub async fn candle_chart(
    State(state): State<AppState>,
    Query(params): Query<CandleParams>,
) -> Result<Json<CandleChart>, ApiError> {
    let (from, to) = currency_pair(params.from, params.to, "Missing currency parameters")?;
    let timeframe = params
        .timeframe
        .as_deref()
        .map(Timeframe::parse_or_default)
        .unwrap_or_default();

    let candles = state
        .quotes
        .fx_series(&from, &to, timeframe)
        .await
        .map_err(|e| ApiError::upstream(HEADLINE, e))?;

    info!(%from, %to, %timeframe, candles = candles.len(), "Serving candles");
    Ok(Json(build_candle_chart(candles)))
}
