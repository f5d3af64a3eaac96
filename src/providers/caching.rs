use crate::core::cache::Cache;
use crate::core::market::{ExchangeRateProvider, SeriesPoint};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Keeps `latest` tables for `ttl`. Failures and timeseries are never cached.
pub struct CachingRateProvider<T: ExchangeRateProvider> {
    inner: T,
    cache: Cache<String, HashMap<String, f64>>,
    ttl: Duration,
}

impl<T: ExchangeRateProvider> CachingRateProvider<T> {
    pub fn new(inner: T, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::new(),
            ttl,
        }
    }
}

#[async_trait]
impl<T: ExchangeRateProvider> ExchangeRateProvider for CachingRateProvider<T> {
    async fn latest(&self, base: &str) -> Result<HashMap<String, f64>> {
        let key = base.to_uppercase();
        if let Some(rates) = self.cache.get(&key).await {
            return Ok(rates);
        }

        debug!("Fetching latest rates for {}", key);
        let rates = self.inner.latest(base).await?;
        if !self.ttl.is_zero() {
            self.cache.put(key, rates.clone(), Some(self.ttl)).await;
        }
        Ok(rates)
    }

    async fn timeseries(
        &self,
        from: &str,
        to: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SeriesPoint>> {
        self.inner.timeseries(from, to, start, end).await
    }
}
