//! Placeholder analytics.
//!
//! None of the upstream plans expose change history, volume or indicators for
//! FX pairs, so these values are generated. Generators take the RNG as an
//! argument so callers can seed it.

use rand::Rng;
use serde::Serialize;

/// Volume reported alongside candle summaries.
pub const FIXED_VOLUME: &str = "1.8B";

/// Affected currencies attached to every news item.
pub const MOCK_AFFECTED_CURRENCIES: [&str; 3] = ["USD", "EUR", "GBP"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub name: &'static str,
    pub value: String,
    pub status: Signal,
    pub description: &'static str,
}

/// Returns `(change, change_percent)` for a quote at `rate`.
pub fn mock_rate_change<R: Rng>(rng: &mut R, rate: f64) -> (f64, f64) {
    let change = (rng.r#gen::<f64>() - 0.5) * 0.01 * rate;
    let change_percent = rng.r#gen::<f64>() - 0.5;
    (change, change_percent)
}

pub fn mock_volume<R: Rng>(rng: &mut R) -> String {
    format!("{:.1}B", rng.gen_range(0.5_f64..3.5))
}

pub fn mock_indicators<R: Rng>(rng: &mut R) -> Vec<Indicator> {
    vec![
        Indicator {
            name: "RSI",
            value: format!("{:.1}", rng.gen_range(30.0_f64..70.0)),
            status: Signal::Neutral,
            description: "Relative Strength Index",
        },
        Indicator {
            name: "MACD",
            value: format!("{:.4}", rng.gen_range(0.0_f64..0.005)),
            status: Signal::Bullish,
            description: "Moving Average Convergence Divergence",
        },
        Indicator {
            name: "SMA 20",
            value: format!("{:.4}", rng.gen_range(0.8_f64..0.9)),
            status: Signal::Bearish,
            description: "Simple Moving Average (20 periods)",
        },
    ]
}

pub fn market_summary(from: &str, to: &str) -> String {
    format!(
        "The {from} has shown slight volatility against the {to} this week, influenced by recent trade balance reports. The trend suggests a stable outlook, favorable for near-term travel plans."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_mock_rate_change_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let (change, pct) = mock_rate_change(&mut rng, 150.0);
            assert!(change.abs() <= 0.005 * 150.0);
            assert!((-0.5..0.5).contains(&pct));
        }
    }

    #[test]
    fn test_mock_volume_format() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let volume = mock_volume(&mut rng);
            let number: f64 = volume.trim_end_matches('B').parse().unwrap();
            assert!(volume.ends_with('B'));
            assert!((0.5..=3.5).contains(&number));
        }
    }

    #[test]
    fn test_mock_indicators() {
        let mut rng = StdRng::seed_from_u64(42);
        let indicators = mock_indicators(&mut rng);
        let names: Vec<_> = indicators.iter().map(|i| i.name).collect();
        assert_eq!(names, ["RSI", "MACD", "SMA 20"]);

        let rsi: f64 = indicators[0].value.parse().unwrap();
        assert!((30.0..=70.0).contains(&rsi));
        assert_eq!(indicators[1].value.split('.').nth(1).unwrap().len(), 4);
        assert_eq!(indicators[2].status, Signal::Bearish);

        let json = serde_json::to_value(&indicators[1]).unwrap();
        assert_eq!(json["status"], "bullish");
    }

    #[test]
    fn test_market_summary_mentions_pair() {
        let summary = market_summary("USD", "NPR");
        assert!(summary.starts_with("The USD has shown slight volatility against the NPR"));
    }
}
