use super::ui;
use crate::core::ExchangeRateProvider;
use crate::core::rates::{RateQuote, biggest_movers, build_rate_table, favorites, filter_rates};
use anyhow::Result;
use comfy_table::Cell;
use tracing::debug;

pub const BASE_CURRENCY: &str = "USD";

/// How the rate board should be narrowed before display.
#[derive(Debug, Default, Clone)]
pub struct RateView {
    pub search: Option<String>,
    pub movers: bool,
    pub favorites: Vec<String>,
}

impl RateView {
    pub fn apply(&self, quotes: &[RateQuote]) -> Vec<RateQuote> {
        let mut selected = match self.search.as_deref() {
            Some(term) => filter_rates(quotes, term),
            None => quotes.to_vec(),
        };
        if !self.favorites.is_empty() {
            selected = favorites(&selected, &self.favorites);
        }
        if self.movers {
            selected = biggest_movers(&selected);
        }
        selected
    }
}

pub fn display_as_table(quotes: &[RateQuote]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Name"),
        ui::header_cell(&format!("Rate (1 {BASE_CURRENCY})")),
        ui::header_cell("Change"),
        ui::header_cell("Change (%)"),
    ]);

    for quote in quotes {
        table.add_row(vec![
            Cell::new(format!("{} {}", quote.flag, quote.to)),
            Cell::new(&quote.name),
            ui::number_cell(quote.rate, 4),
            ui::number_cell(quote.change, 4),
            ui::change_cell(quote.change_percent),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Exchange Rates", ui::StyleType::Title),
        table
    )
}

pub async fn run(provider: &dyn ExchangeRateProvider, view: &RateView) -> Result<()> {
    let spinner = ui::new_spinner("Fetching latest rates...");
    let rates = provider.latest(BASE_CURRENCY).await;
    spinner.finish_and_clear();

    let quotes = build_rate_table(BASE_CURRENCY, &rates?, &mut rand::thread_rng());
    let selected = view.apply(&quotes);
    debug!(total = quotes.len(), shown = selected.len(), "Rendering rate board");

    if selected.is_empty() {
        println!(
            "{}",
            ui::style_text("No currencies match the given filters.", ui::StyleType::Subtle)
        );
    } else {
        println!("{}", display_as_table(&selected));
    }
    Ok(())
}
