use crate::core::insights::MOCK_AFFECTED_CURRENCIES;
use crate::core::market::{Article, Impact};
use serde::Serialize;

pub const DEFAULT_NEWS_QUERY: &str = "currency exchange";
pub const MAX_NEWS_ITEMS: usize = 20;
pub const MAX_INSIGHTS: usize = 4;

/// Shown in place of a publish date upstream did not supply.
pub const UNKNOWN_DATE: &str = "Unknown date";

/// Categories that search everything rather than narrowing the query.
const UNFILTERED_CATEGORIES: [&str; 2] = ["All News", "Breaking News"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub id: usize,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub impact: Impact,
    pub timestamp: String,
    pub source: String,
    pub currencies: Vec<String>,
    pub image: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub title: String,
    pub description: Option<String>,
    pub time: String,
    pub impact: Impact,
}

pub fn build_news_query(q: Option<&str>, category: Option<&str>) -> String {
    let term = q
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(DEFAULT_NEWS_QUERY);

    match category.map(str::trim) {
        Some(category) if !category.is_empty() && !UNFILTERED_CATEGORIES.contains(&category) => {
            format!("{category} AND {term}")
        }
        _ => term.to_string(),
    }
}

fn format_published(article: &Article, fmt: &str) -> String {
    article
        .published_at
        .map_or_else(|| UNKNOWN_DATE.to_string(), |at| at.format(fmt).to_string())
}

pub fn to_news_items(articles: &[Article]) -> Vec<NewsItem> {
    articles
        .iter()
        .take(MAX_NEWS_ITEMS)
        .enumerate()
        .map(|(index, article)| NewsItem {
            id: index + 1,
            title: article.title.clone(),
            summary: article
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "No summary available.".to_string()),
            category: article.source.clone(),
            impact: Impact::default(),
            timestamp: format_published(article, "%B %-d, %Y"),
            source: article.source.clone(),
            currencies: MOCK_AFFECTED_CURRENCIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            image: article
                .image_url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| "/placeholder.svg".to_string()),
            url: article.url.clone(),
        })
        .collect()
}

pub fn to_insights(articles: &[Article]) -> Vec<Insight> {
    articles
        .iter()
        .take(MAX_INSIGHTS)
        .map(|article| Insight {
            title: article.title.clone(),
            description: article.description.clone(),
            time: format_published(article, "%-m/%-d/%Y"),
            impact: Impact::default(),
        })
        .collect()
}

/// `"all"`, empty or unparseable filters keep every item.
pub fn filter_by_impact(items: Vec<NewsItem>, impact: Option<&str>) -> Vec<NewsItem> {
    let wanted = impact
        .map(str::trim)
        .filter(|i| !i.is_empty() && !i.eq_ignore_ascii_case("all"))
        .and_then(|i| serde_json::from_value::<Impact>(i.to_lowercase().into()).ok());

    match wanted {
        Some(wanted) => items.into_iter().filter(|i| i.impact == wanted).collect(),
        None => items,
    }
}
