use crate::core::config::NEWS_KEY_VAR;
use crate::core::market::{Article, NewsProvider, NewsQuery};
use crate::providers::util::{RETRY_DELAY_MS, redact, require_key, with_retry};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument, warn};

/// Client for the newsapi.org `everything` endpoint.
pub struct NewsApi {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    retries: usize,
}

impl NewsApi {
    pub fn new(base_url: &str, api_key: Option<String>, client: reqwest::Client) -> Self {
        NewsApi {
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

#[derive(Debug, Deserialize)]
struct NewsResponse {
    articles: Option<Vec<RawArticle>>,
}

#[derive(Debug, Deserialize)]
struct NewsErrorBody {
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    source: RawSource,
    #[serde(default)]
    url: String,
    url_to_image: Option<String>,
}

/// A missing, null or malformed `publishedAt` becomes `None` instead of failing the feed.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Article {
            title: raw.title.unwrap_or_default(),
            description: raw.description,
            published_at: raw.published_at,
            source: raw.source.name.unwrap_or_default(),
            url: raw.url,
            image_url: raw.url_to_image,
        }
    }
}

#[async_trait]
impl NewsProvider for NewsApi {
    #[instrument(name = "NewsSearch", skip(self, query), fields(q = %query.q))]
    async fn search(&self, query: &NewsQuery) -> Result<Vec<Article>> {
        let key = require_key(&self.api_key, NEWS_KEY_VAR)?;
        let url = format!(
            "{}/v2/everything?q={}&sortBy={}&language={}&apiKey={}",
            self.base_url,
            urlencoding::encode(&query.q),
            query.sort_by.as_param(),
            query.language,
            key
        );
        debug!("Requesting news from {}", redact(&url, key));

        let response = with_retry(|| self.client.get(&url).send(), self.retries, RETRY_DELAY_MS)
            .await
            .with_context(|| format!("Request error for news query: {}", query.q))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.json::<NewsErrorBody>().await.ok();
            warn!(%status, "News API returned an error");
            return Err(anyhow!(
                "{}",
                body.and_then(|b| b.message)
                    .unwrap_or_else(|| "Failed to fetch news from external source".to_string())
            ));
        }

        let data: NewsResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse news response")?;

        let articles = data
            .articles
            .ok_or_else(|| anyhow!("No articles found in news response"))?;
        debug!("Received {} articles", articles.len());

        Ok(articles.into_iter().map(Article::from).collect())
    }
}
