//! Currency metadata and conversion abstractions

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

const fn info(code: &'static str, name: &'static str, flag: &'static str) -> CurrencyInfo {
    CurrencyInfo { code, name, flag }
}

/// Supported currencies, in display order.
pub const CURRENCIES: [CurrencyInfo; 20] = [
    info("EUR", "Euro", "🇪🇺"),
    info("GBP", "British Pound", "🇬🇧"),
    info("JPY", "Japanese Yen", "🇯🇵"),
    info("CAD", "Canadian Dollar", "🇨🇦"),
    info("AUD", "Australian Dollar", "🇦🇺"),
    info("CHF", "Swiss Franc", "🇨🇭"),
    info("CNY", "Chinese Yuan", "🇨🇳"),
    info("INR", "Indian Rupee", "🇮🇳"),
    info("NPR", "Nepali Rupee", "🇳🇵"),
    info("USD", "US Dollar", "🇺🇸"),
    info("SGD", "Singapore Dollar", "🇸🇬"),
    info("HKD", "Hong Kong Dollar", "🇭🇰"),
    info("NZD", "New Zealand Dollar", "🇳🇿"),
    info("SEK", "Swedish Krona", "🇸🇪"),
    info("NOK", "Norwegian Krone", "🇳🇴"),
    info("DKK", "Danish Krone", "🇩🇰"),
    info("ZAR", "South African Rand", "🇿🇦"),
    info("BRL", "Brazilian Real", "🇧🇷"),
    info("RUB", "Russian Ruble", "🇷🇺"),
    info("MXN", "Mexican Peso", "🇲🇽"),
];

pub fn lookup(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Normalizes a currency code. Anything but three ASCII letters is rejected.
pub fn parse_code(raw: &str) -> Result<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(anyhow!("Invalid currency code: {}", raw.trim()))
    }
}

/// Splits a `FROM/TO` pair into its two codes.
pub fn parse_pair(pair: &str) -> Result<(String, String)> {
    let invalid = || anyhow!("Invalid \"pair\" format. Expected \"FROM/TO\"");
    let (from, to) = pair.split_once('/').ok_or_else(invalid)?;
    if from.trim().is_empty() || to.trim().is_empty() {
        return Err(invalid());
    }
    Ok((parse_code(from)?, parse_code(to)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let eur = lookup("eur").unwrap();
        assert_eq!(eur.name, "Euro");
        assert_eq!(eur.flag, "🇪🇺");
        assert!(lookup("XYZ").is_none());
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code(" usd ").unwrap(), "USD");
        assert!(parse_code("US").is_err());
        assert!(parse_code("US1").is_err());
        assert!(parse_code("").is_err());
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("USD/eur").unwrap(),
            ("USD".to_string(), "EUR".to_string())
        );

        let err = parse_pair("USDEUR").unwrap_err();
        assert_eq!(err.to_string(), "Invalid \"pair\" format. Expected \"FROM/TO\"");
        assert!(parse_pair("USD/").is_err());
        assert!(parse_pair("/EUR").is_err());
    }
}
