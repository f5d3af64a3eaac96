//! Market data records and provider abstractions

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    OneDay,
    #[default]
    SevenDays,
    OneMonth,
    ThreeMonths,
    OneYear,
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Timeframe::OneDay => "1D",
                Timeframe::SevenDays => "7D",
                Timeframe::OneMonth => "1M",
                Timeframe::ThreeMonths => "3M",
                Timeframe::OneYear => "1Y",
            }
        )
    }
}

impl Timeframe {
    /// Unknown or empty input falls back to seven days.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "1D" => Timeframe::OneDay,
            "7D" => Timeframe::SevenDays,
            "1M" => Timeframe::OneMonth,
            "3M" => Timeframe::ThreeMonths,
            "1Y" => Timeframe::OneYear,
            _ => Timeframe::default(),
        }
    }

    /// First day of the window that ends at `end`.
    pub fn start_date(&self, end: NaiveDate) -> NaiveDate {
        let start = match self {
            Timeframe::OneDay => end.checked_sub_days(Days::new(1)),
            Timeframe::SevenDays => end.checked_sub_days(Days::new(7)),
            Timeframe::OneMonth => end.checked_sub_months(Months::new(1)),
            Timeframe::ThreeMonths => end.checked_sub_months(Months::new(3)),
            Timeframe::OneYear => end.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(end)
    }
}

/// One OHLC bar. `time` is unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    /// `None` when upstream sent no usable timestamp.
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    pub url: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    PublishedAt,
    Relevancy,
}

impl SortBy {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsQuery {
    pub q: String,
    pub sort_by: SortBy,
    pub language: String,
}

impl NewsQuery {
    pub fn new(q: impl Into<String>, sort_by: SortBy) -> Self {
        Self {
            q: q.into(),
            sort_by,
            language: "en".to_string(),
        }
    }
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Conversion rates from `base` to every currency the provider knows.
    async fn latest(&self, base: &str) -> Result<HashMap<String, f64>>;

    /// Daily rates for `from`/`to` between `start` and `end`, oldest first.
    async fn timeseries(
        &self,
        from: &str,
        to: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SeriesPoint>>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search(&self, query: &NewsQuery) -> Result<Vec<Article>>;
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// OHLC bars for the pair at the resolution implied by `timeframe`, oldest first.
    async fn fx_series(&self, from: &str, to: &str, timeframe: Timeframe) -> Result<Vec<Candle>>;
}
