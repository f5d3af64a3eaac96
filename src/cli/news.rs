use super::ui;
use crate::core::NewsProvider;
use crate::core::market::{NewsQuery, SortBy};
use crate::core::news::{NewsItem, build_news_query, filter_by_impact, to_news_items};
use anyhow::Result;
use comfy_table::Cell;

pub async fn fetch(
    provider: &dyn NewsProvider,
    query: Option<&str>,
    category: Option<&str>,
    impact: Option<&str>,
) -> Result<Vec<NewsItem>> {
    let query = NewsQuery::new(build_news_query(query, category), SortBy::PublishedAt);
    let articles = provider.search(&query).await?;
    Ok(filter_by_impact(to_news_items(&articles), impact))
}

pub fn display_as_table(items: &[NewsItem]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Headline"),
        ui::header_cell("Source"),
        ui::header_cell("Published"),
        ui::header_cell("Impact"),
    ]);

    for item in items {
        let impact = serde_json::to_value(item.impact)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(item.id),
            Cell::new(format!("{}\n{}", item.title, item.url)),
            Cell::new(&item.source),
            Cell::new(&item.timestamp),
            Cell::new(impact),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Market News", ui::StyleType::Title),
        table
    )
}

pub async fn run(
    provider: &dyn NewsProvider,
    query: Option<&str>,
    category: Option<&str>,
    impact: Option<&str>,
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching news...");
    let items = fetch(provider, query, category, impact).await;
    spinner.finish_and_clear();

    let items = items?;
    if items.is_empty() {
        println!(
            "{}",
            ui::style_text("No news matches the given filters.", ui::StyleType::Subtle)
        );
    } else {
        println!("{}", display_as_table(&items));
    }
    Ok(())
}
