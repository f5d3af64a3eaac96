use crate::core::config::ALPHA_VANTAGE_KEY_VAR;
use crate::core::market::{Candle, QuoteProvider, Timeframe};
use crate::providers::util::{RETRY_DELAY_MS, redact, require_key, with_retry};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Client for the Alpha Vantage FX time-series functions.
pub struct AlphaVantage {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    retries: usize,
}

impl AlphaVantage {
    pub fn new(base_url: &str, api_key: Option<String>, client: reqwest::Client) -> Self {
        AlphaVantage {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            retries: 0,
        }
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }
}

/// Query function (and interval, for intraday) serving a timeframe.
pub fn series_function(timeframe: Timeframe) -> (&'static str, Option<&'static str>) {
    match timeframe {
        Timeframe::OneDay => ("FX_INTRADAY", Some("60min")),
        Timeframe::SevenDays | Timeframe::OneMonth => ("FX_DAILY", None),
        Timeframe::ThreeMonths | Timeframe::OneYear => ("FX_WEEKLY", None),
    }
}

#[derive(Debug, Deserialize)]
struct Bar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
}

fn parse_timestamp(raw: &str) -> Result<i64> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc().timestamp());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid timestamp in time series: {raw}"))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp())
}

fn parse_price(raw: &str, field: &str, time: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid {field} price '{raw}' at {time}"))
}

fn extract_candles(body: Map<String, Value>) -> Result<Vec<Candle>> {
    let series = body
        .iter()
        .find(|(key, _)| key.contains("Time Series"))
        .and_then(|(_, value)| value.as_object());

    let Some(series) = series else {
        if let Some(info) = body
            .get("Information")
            .or_else(|| body.get("Note"))
            .and_then(Value::as_str)
        {
            return Err(anyhow!("API call limit reached: {}", info));
        }
        if let Some(message) = body.get("Error Message").and_then(Value::as_str) {
            return Err(anyhow!("Alpha Vantage error: {}", message));
        }
        return Err(anyhow!("Could not find time series data in API response."));
    };

    let mut candles = series
        .iter()
        .map(|(time, value)| {
            let bar: Bar = serde_json::from_value(value.clone())
                .with_context(|| format!("Malformed bar at {time}"))?;
            Ok::<_, anyhow::Error>(Candle {
                time: parse_timestamp(time)?,
                open: parse_price(&bar.open, "open", time)?,
                high: parse_price(&bar.high, "high", time)?,
                low: parse_price(&bar.low, "low", time)?,
                close: parse_price(&bar.close, "close", time)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    candles.sort_by_key(|c| c.time);
    Ok(candles)
}

#[async_trait]
impl QuoteProvider for AlphaVantage {
    #[instrument(name = "AlphaVantageSeries", skip(self), fields(from = %from, to = %to, timeframe = %timeframe))]
    async fn fx_series(&self, from: &str, to: &str, timeframe: Timeframe) -> Result<Vec<Candle>> {
        let key = require_key(&self.api_key, ALPHA_VANTAGE_KEY_VAR)?;
        let (function, interval) = series_function(timeframe);
        let interval = interval
            .map(|i| format!("&interval={i}"))
            .unwrap_or_default();
        let url = format!(
            "{}/query?function={}{}&from_symbol={}&to_symbol={}&outputsize=compact&apikey={}",
            self.base_url, function, interval, from, to, key
        );
        debug!("Requesting FX series from {}", redact(&url, key));

        let response = with_retry(|| self.client.get(&url).send(), self.retries, RETRY_DELAY_MS)
            .await
            .with_context(|| format!("Request error for currency pair: {from}/{to}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Failed to fetch data from Alpha Vantage (HTTP {})",
                response.status()
            ));
        }

        let body: Map<String, Value> = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse Alpha Vantage response")?;

        extract_candles(body)
    }
}
