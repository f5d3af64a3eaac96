use crate::core::insights::{FIXED_VOLUME, Indicator, mock_indicators, mock_volume};
use crate::core::market::{Candle, SeriesPoint};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesChart {
    pub chart_data: Vec<ChartPoint>,
    pub change: f64,
    pub volume: String,
    pub indicators: Vec<Indicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleSummary {
    pub change: f64,
    pub change_percent: f64,
    pub volume: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleChart {
    pub chart_data: Vec<Candle>,
    pub summary: CandleSummary,
}

/// Percent change from the first to the last point; zero when either end is missing or zero.
pub fn series_change(points: &[SeriesPoint]) -> f64 {
    let first = points.first().and_then(|p| p.value);
    let last = points.last().and_then(|p| p.value);
    match (first, last) {
        (Some(first), Some(last)) if first != 0.0 && last != 0.0 => {
            (last - first) / first * 100.0
        }
        _ => 0.0,
    }
}

pub fn build_series_chart<R: Rng>(points: &[SeriesPoint], rng: &mut R) -> SeriesChart {
    SeriesChart {
        chart_data: points
            .iter()
            .map(|p| ChartPoint {
                date: p.date.format("%b %-d").to_string(),
                value: p.value,
            })
            .collect(),
        change: series_change(points),
        volume: mock_volume(rng),
        indicators: mock_indicators(rng),
    }
}

pub fn build_candle_chart(candles: Vec<Candle>) -> CandleChart {
    let summary = match candles.as_slice() {
        [.., previous, latest] => {
            let change = latest.close - previous.close;
            CandleSummary {
                change,
                change_percent: change / previous.close * 100.0,
                volume: FIXED_VOLUME.to_string(),
            }
        }
        _ => CandleSummary {
            change: 0.0,
            change_percent: 0.0,
            volume: "N/A".to_string(),
        },
    };

    CandleChart {
        chart_data: candles,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn point(day: u32, value: Option<f64>) -> SeriesPoint {
        SeriesPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            value,
        }
    }

    fn candle(time: i64, close: f64) -> Candle {
        Candle {
            time,
            open: close,
            high: close,
            low: close,
            close,
        }
    }

    #[test]
    fn test_series_change() {
        let points = [point(1, Some(0.90)), point(2, None), point(3, Some(0.99))];
        assert!((series_change(&points) - 10.0).abs() < 1e-9);

        assert_eq!(series_change(&[]), 0.0);
        assert_eq!(series_change(&[point(1, None), point(2, Some(1.0))]), 0.0);
        assert_eq!(series_change(&[point(1, Some(0.0)), point(2, Some(1.0))]), 0.0);
    }

    #[test]
    fn test_build_series_chart() {
        let mut rng = StdRng::seed_from_u64(9);
        let chart = build_series_chart(&[point(4, Some(1.0)), point(5, Some(1.1))], &mut rng);

        assert_eq!(chart.chart_data[0].date, "Mar 4");
        assert_eq!(chart.chart_data[1].value, Some(1.1));
        assert_eq!(chart.indicators.len(), 3);
        assert!(chart.volume.ends_with('B'));

        let json = serde_json::to_value(&chart).unwrap();
        assert!(json.get("chartData").is_some());
    }

    #[test]
    fn test_build_candle_chart_summary() {
        let chart = build_candle_chart(vec![candle(1, 1.0), candle(2, 1.25), candle(3, 1.5)]);
        assert_eq!(chart.chart_data.len(), 3);
        assert!((chart.summary.change - 0.25).abs() < 1e-9);
        assert!((chart.summary.change_percent - 20.0).abs() < 1e-9);
        assert_eq!(chart.summary.volume, "1.8B");
    }

    #[test]
    fn test_build_candle_chart_with_single_candle() {
        let chart = build_candle_chart(vec![candle(1, 1.0)]);
        assert_eq!(chart.summary.change, 0.0);
        assert_eq!(chart.summary.change_percent, 0.0);
        assert_eq!(chart.summary.volume, "N/A");
    }
}
