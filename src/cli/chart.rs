use super::ui;
use crate::core::charts::{CandleChart, SeriesChart, build_candle_chart, build_series_chart};
use crate::core::currency::parse_pair;
use crate::core::{ExchangeRateProvider, QuoteProvider, Timeframe};
use anyhow::Result;
use chrono::{DateTime, NaiveDate};
use comfy_table::Cell;

pub async fn fetch_series(
    provider: &dyn ExchangeRateProvider,
    pair: &str,
    timeframe: Timeframe,
    today: NaiveDate,
) -> Result<SeriesChart> {
    let (from, to) = parse_pair(pair)?;
    let points = provider
        .timeseries(&from, &to, timeframe.start_date(today), today)
        .await?;
    Ok(build_series_chart(&points, &mut rand::thread_rng()))
}

pub async fn fetch_candles(
    provider: &dyn QuoteProvider,
    pair: &str,
    timeframe: Timeframe,
) -> Result<CandleChart> {
    let (from, to) = parse_pair(pair)?;
    let candles = provider.fx_series(&from, &to, timeframe).await?;
    Ok(build_candle_chart(candles))
}

pub fn display_series(pair: &str, timeframe: Timeframe, chart: &SeriesChart) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Rate")]);
    for point in &chart.chart_data {
        table.add_row(vec![
            Cell::new(&point.date),
            ui::format_optional_cell(point.value, |v| format!("{v:.4}")),
        ]);
    }

    let mut indicators = ui::new_styled_table();
    indicators.set_header(vec![
        ui::header_cell("Indicator"),
        ui::header_cell("Value"),
        ui::header_cell("Signal"),
    ]);
    for indicator in &chart.indicators {
        indicators.add_row(vec![
            Cell::new(indicator.name),
            Cell::new(&indicator.value),
            Cell::new(format!("{:?}", indicator.status)),
        ]);
    }

    format!(
        "{} ({timeframe})\n\n{table}\n\n{}: {}  {}: {}\n\n{indicators}",
        ui::style_text(pair, ui::StyleType::Title),
        ui::style_text("Change", ui::StyleType::Label),
        ui::change_cell(chart.change).content(),
        ui::style_text("Volume", ui::StyleType::Label),
        chart.volume,
    )
}

pub fn display_candles(pair: &str, timeframe: Timeframe, chart: &CandleChart) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Time"),
        ui::header_cell("Open"),
        ui::header_cell("High"),
        ui::header_cell("Low"),
        ui::header_cell("Close"),
    ]);
    for candle in &chart.chart_data {
        let time = DateTime::from_timestamp(candle.time, 0)
            .map_or(candle.time.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        table.add_row(vec![
            Cell::new(time),
            ui::number_cell(candle.open, 4),
            ui::number_cell(candle.high, 4),
            ui::number_cell(candle.low, 4),
            ui::number_cell(candle.close, 4),
        ]);
    }

    format!(
        "{} ({timeframe})\n\n{table}\n\n{}: {:+.4} ({})  {}: {}",
        ui::style_text(pair, ui::StyleType::Title),
        ui::style_text("Last change", ui::StyleType::Label),
        chart.summary.change,
        ui::change_cell(chart.summary.change_percent).content(),
        ui::style_text("Volume", ui::StyleType::Label),
        chart.summary.volume,
    )
}

pub async fn run(
    rates: &dyn ExchangeRateProvider,
    quotes: &dyn QuoteProvider,
    pair: &str,
    timeframe: Timeframe,
    candles: bool,
) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching {pair} history..."));
    let output = if candles {
        fetch_candles(quotes, pair, timeframe)
            .await
            .map(|chart| display_candles(pair, timeframe, &chart))
    } else {
        let today = chrono::Utc::now().date_naive();
        fetch_series(rates, pair, timeframe, today)
            .await
            .map(|chart| display_series(pair, timeframe, &chart))
    };
    spinner.finish_and_clear();

    println!("{}", output?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::market::{Candle, SeriesPoint};
    use anyhow::bail;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct History {
        windows: Mutex<Vec<(String, String, NaiveDate, NaiveDate)>>,
    }

    #[async_trait]
    impl ExchangeRateProvider for History {
        async fn latest(&self, _base: &str) -> Result<HashMap<String, f64>> {
            bail!("not used")
        }

        async fn timeseries(
            &self,
            from: &str,
            to: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<SeriesPoint>> {
            self.windows
                .lock()
                .unwrap()
                .push((from.to_string(), to.to_string(), start, end));
            Ok(vec![
                SeriesPoint {
                    date: start,
                    value: Some(1.0),
                },
                SeriesPoint {
                    date: end,
                    value: Some(1.05),
                },
            ])
        }
    }

    struct Bars;

    #[async_trait]
    impl QuoteProvider for Bars {
        async fn fx_series(&self, _from: &str, _to: &str, _tf: Timeframe) -> Result<Vec<Candle>> {
            Ok(vec![
                Candle {
                    time: 1_700_000_000,
                    open: 1.0,
                    high: 1.1,
                    low: 0.9,
                    close: 1.0,
                },
                Candle {
                    time: 1_700_086_400,
                    open: 1.0,
                    high: 1.2,
                    low: 1.0,
                    close: 1.1,
                },
            ])
        }
    }

    #[tokio::test]
    async fn test_fetch_series_requests_timeframe_window() {
        let provider = History::default();
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();

        let chart = fetch_series(&provider, "usd/eur", Timeframe::OneMonth, today)
            .await
            .unwrap();

        let windows = provider.windows.lock().unwrap();
        assert_eq!(
            windows[0],
            (
                "USD".to_string(),
                "EUR".to_string(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                today
            )
        );
        assert!((chart.change - 5.0).abs() < 1e-9);
        assert_eq!(chart.chart_data[1].date, "Mar 31");
    }

    #[tokio::test]
    async fn test_fetch_series_rejects_bad_pair() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let err = fetch_series(&History::default(), "USDEUR", Timeframe::OneDay, today)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid \"pair\" format"));
    }

    #[tokio::test]
    async fn test_candle_display() {
        let chart = fetch_candles(&Bars, "EUR/USD", Timeframe::OneDay)
            .await
            .unwrap();
        let output = display_candles("EUR/USD", Timeframe::OneDay, &chart);
        assert!(output.contains("2023-11-14 22:13"));
        assert!(output.contains("+0.1000"));
        assert!(output.contains("+10.00%"));
        assert!(output.contains("1.8B"));
    }
}
