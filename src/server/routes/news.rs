use crate::core::market::{NewsQuery, SortBy};
use crate::core::news::{NewsItem, build_news_query, filter_by_impact, to_news_items};
use crate::server::AppState;
use crate::server::error::ApiError;
use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct NewsParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub impact: Option<String>,
}

/// `GET /api/news`: latest articles for a search term, optionally narrowed by category.
pub async fn news(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> Result<Json<Vec<NewsItem>>, ApiError> {
    let query = build_news_query(params.q.as_deref(), params.category.as_deref());
    let articles = state
        .news
        .search(&NewsQuery::new(query.as_str(), SortBy::PublishedAt))
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch news.", e))?;

    let items = filter_by_impact(to_news_items(&articles), params.impact.as_deref());
    info!(query = %query, items = items.len(), "Serving news");
    Ok(Json(items))
}
