use crate::core::config::MissingApiKey;
use anyhow::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Delay between attempts made by provider requests.
pub const RETRY_DELAY_MS: u64 = 500;

/// Builds the HTTP client shared by every provider.
pub fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("fxdesk/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(15))
        .build()?;
    Ok(client)
}

/// Returns the key or a [`MissingApiKey`] error naming the variable to set.
pub fn require_key<'a>(key: &'a Option<String>, variable: &'static str) -> Result<&'a str> {
    key.as_deref()
        .ok_or_else(|| MissingApiKey { variable }.into())
}

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        // Request URLs carry API keys.
        match operation()
            .await
            .map_err(|e| anyhow::Error::from(e.without_url()))
        {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Removes the API key from a URL before it is logged or returned in an error.
pub fn redact(url: &str, key: &str) -> String {
    if key.is_empty() {
        url.to_string()
    } else {
        url.replace(key, "***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_require_key() {
        assert_eq!(require_key(&Some("abc".to_string()), "KEY").unwrap(), "abc");

        let err = require_key(&None, "NEWS_API_KEY").unwrap_err();
        assert!(err.downcast_ref::<MissingApiKey>().is_some());
        assert_eq!(err.to_string(), "NEWS_API_KEY is not defined");
    }

    #[test]
    fn test_redact() {
        assert_eq!(
            redact("https://host/v6/secret/latest/USD", "secret"),
            "https://host/v6/***/latest/USD"
        );
        assert_eq!(redact("https://host/x", ""), "https://host/x");
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_after_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = reqwest::Client::new();

        let counter = Arc::clone(&calls);
        let result = with_retry(
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                // Port 9 (discard) on localhost refuses connections.
                client.get("http://127.0.0.1:9/").send()
            },
            2,
            1,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
