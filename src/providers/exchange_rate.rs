use crate::core::config::EXCHANGE_RATE_KEY_VAR;
use crate::core::market::{ExchangeRateProvider, SeriesPoint};
use crate::providers::util::{RETRY_DELAY_MS, redact, require_key, with_retry};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Client for exchangerate-api.com (v6).
pub struct ExchangeRateApi {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    retries: usize,
}

impl ExchangeRateApi {
    pub fn new(base_url: &str, api_key: Option<String>, client: reqwest::Client) -> Self {
        ExchangeRateApi {
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

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        with_retry(|| self.client.get(url).send(), self.retries, RETRY_DELAY_MS).await
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    conversion_rates: Option<HashMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    rates: Option<BTreeMap<String, HashMap<String, f64>>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

fn path_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}

fn timeseries_error(error_type: Option<String>) -> anyhow::Error {
    match error_type.as_deref() {
        Some("plan-upgrade-required") => anyhow!(
            "Your API plan does not support time-series data, which is required for charts."
        ),
        Some(other) => anyhow!("{}", other),
        None => anyhow!("Failed to fetch historical data"),
    }
}

#[async_trait]
impl ExchangeRateProvider for ExchangeRateApi {
    #[instrument(name = "ExchangeRateLatest", skip(self), fields(base = %base))]
    async fn latest(&self, base: &str) -> Result<HashMap<String, f64>> {
        let key = require_key(&self.api_key, EXCHANGE_RATE_KEY_VAR)?;
        let url = format!("{}/v6/{}/latest/{}", self.base_url, key, base);
        debug!("Requesting latest rates from {}", redact(&url, key));

        let response = self
            .get(&url)
            .await
            .with_context(|| format!("Request error for base currency: {base}"))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Latest rates request failed");
            return Err(anyhow!("Failed to fetch exchange rates"));
        }

        let data: LatestResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to parse exchange rates for {base}"))?;

        if data.result.as_deref() == Some("error") {
            return Err(anyhow!(
                "External API error: {}",
                data.error_type.unwrap_or_else(|| "unknown".to_string())
            ));
        }

        data.conversion_rates
            .ok_or_else(|| anyhow!("No conversion rates found for base currency: {}", base))
    }

    #[instrument(name = "ExchangeRateTimeseries", skip(self), fields(from = %from, to = %to))]
    async fn timeseries(
        &self,
        from: &str,
        to: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SeriesPoint>> {
        let key = require_key(&self.api_key, EXCHANGE_RATE_KEY_VAR)?;
        let url = format!(
            "{}/v6/{}/timeseries/{}/{}/{}/{}",
            self.base_url,
            key,
            from,
            to,
            path_date(start),
            path_date(end)
        );
        debug!("Requesting timeseries from {}", redact(&url, key));

        let response = self
            .get(&url)
            .await
            .with_context(|| format!("Request error for currency pair: {from}/{to}"))?;

        if !response.status().is_success() {
            let body = response.json::<ErrorBody>().await.ok();
            return Err(timeseries_error(body.and_then(|b| b.error_type)));
        }

        let data: TimeseriesResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to parse timeseries for {from}/{to}"))?;

        if data.result.as_deref() == Some("error") {
            return Err(anyhow!(
                "External API error: {}",
                data.error_type.unwrap_or_else(|| "unknown".to_string())
            ));
        }

        let rates = data
            .rates
            .ok_or_else(|| anyhow!("No timeseries data found for currency pair: {from}/{to}"))?;

        rates
            .into_iter()
            .map(|(date, quotes)| {
                let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date in timeseries: {date}"))?;
                Ok::<_, anyhow::Error>(SeriesPoint {
                    date,
                    value: quotes.get(to).copied(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MissingApiKey;
    use crate::core::currency::CurrencyRateProvider;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> ExchangeRateApi {
        ExchangeRateApi::new(
            &server.uri(),
            Some("test-key".to_string()),
            reqwest::Client::new(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_successful_latest_fetch() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{
            "result": "success",
            "base_code": "USD",
            "conversion_rates": { "USD": 1, "EUR": 0.9213, "JPY": 149.32 }
        }"#;

        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        let rates = provider(&mock_server).latest("USD").await.unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates["EUR"], 0.9213);
        assert_eq!(rates["USD"], 1.0);
    }

    #[tokio::test]
    async fn test_latest_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/USD"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server).latest("USD").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch exchange rates");
    }

    #[tokio::test]
    async fn test_latest_reports_upstream_error_type() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/USD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"result": "error", "error-type": "invalid-key"}"#),
            )
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server).latest("USD").await.unwrap_err();
        assert_eq!(err.to_string(), "External API error: invalid-key");
    }

    #[tokio::test]
    async fn test_latest_without_key_does_not_call_upstream() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = ExchangeRateApi::new(&mock_server.uri(), None, reqwest::Client::new());
        let err = provider.latest("USD").await.unwrap_err();
        let missing = err.downcast_ref::<MissingApiKey>().unwrap();
        assert_eq!(missing.variable, "EXCHANGE_RATE_API_KEY");
    }

    #[tokio::test]
    async fn test_get_rate() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/GBP"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"result": "success", "conversion_rates": {"GBP": 1, "NPR": 168.4}}"#,
            ))
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server);
        assert_eq!(provider.get_rate("GBP", "NPR").await.unwrap(), 168.4);
        let err = provider.get_rate("GBP", "XYZ").await.unwrap_err();
        assert_eq!(err.to_string(), "Could not find rate for currency: XYZ");
    }

    #[tokio::test]
    async fn test_successful_timeseries_fetch() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{
            "result": "success",
            "rates": {
                "2024-03-03": { "EUR": 0.93 },
                "2024-03-01": { "EUR": 0.91 },
                "2024-03-02": { "GBP": 0.79 }
            }
        }"#;

        Mock::given(method("GET"))
            .and(path("/v6/test-key/timeseries/USD/EUR/2024/2/25/2024/3/3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        let points = provider(&mock_server)
            .timeseries("USD", "EUR", date(2024, 2, 25), date(2024, 3, 3))
            .await
            .unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, date(2024, 3, 1));
        assert_eq!(points[0].value, Some(0.91));
        assert_eq!(points[1].value, None);
        assert_eq!(points[2].value, Some(0.93));
    }

    #[tokio::test]
    async fn test_timeseries_plan_upgrade_required() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"{"result": "error", "error-type": "plan-upgrade-required"}"#,
            ))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .timeseries("USD", "EUR", date(2024, 3, 1), date(2024, 3, 8))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Your API plan does not support time-series data, which is required for charts."
        );
    }

    #[tokio::test]
    async fn test_timeseries_error_without_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .timeseries("USD", "EUR", date(2024, 3, 1), date(2024, 3, 8))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch historical data");
    }
}
