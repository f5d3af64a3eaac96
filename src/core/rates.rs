use crate::core::currency::{CURRENCIES, CurrencyRateProvider};
use crate::core::insights::mock_rate_change;
use crate::core::market::ExchangeRateProvider;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub change: f64,
    pub change_percent: f64,
    pub flag: String,
    pub name: String,
}

/// Quotes for every known currency present in `rates`, in display order.
pub fn build_rate_table<R: Rng>(
    base: &str,
    rates: &HashMap<String, f64>,
    rng: &mut R,
) -> Vec<RateQuote> {
    CURRENCIES
        .iter()
        .filter_map(|info| {
            let rate = *rates.get(info.code)?;
            let (change, change_percent) = mock_rate_change(rng, rate);
            Some(RateQuote {
                from: base.to_string(),
                to: info.code.to_string(),
                rate,
                change,
                change_percent,
                flag: info.flag.to_string(),
                name: info.name.to_string(),
            })
        })
        .collect()
}

/// Case-insensitive match on code or name.
pub fn filter_rates(quotes: &[RateQuote], term: &str) -> Vec<RateQuote> {
    let term = term.trim().to_lowercase();
    quotes
        .iter()
        .filter(|q| {
            term.is_empty()
                || q.to.to_lowercase().contains(&term)
                || q.name.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}

pub fn biggest_movers(quotes: &[RateQuote]) -> Vec<RateQuote> {
    let mut sorted = quotes.to_vec();
    sorted.sort_by(|a, b| b.change_percent.abs().total_cmp(&a.change_percent.abs()));
    sorted
}

pub fn favorites(quotes: &[RateQuote], codes: &[String]) -> Vec<RateQuote> {
    quotes
        .iter()
        .filter(|q| codes.iter().any(|c| c.eq_ignore_ascii_case(&q.to)))
        .cloned()
        .collect()
}

/// Rate for `to` out of a conversion table. A zero rate counts as missing.
pub fn pick_rate(rates: &HashMap<String, f64>, to: &str) -> Result<f64> {
    rates
        .get(to)
        .copied()
        .filter(|rate| *rate != 0.0)
        .ok_or_else(|| anyhow!("Could not find rate for currency: {}", to))
}

/// Any rate table source answers single-pair lookups.
#[async_trait]
impl<T: ExchangeRateProvider + ?Sized> CurrencyRateProvider for T {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let rates = self.latest(from).await?;
        pick_rate(&rates, to)
    }
}

/// Converted amount rounded to cents.
pub fn convert(amount: f64, rate: f64) -> f64 {
    (amount * rate * 100.0).round() / 100.0
}
