use crate::core::currency::{CURRENCIES, CurrencyInfo, CurrencyRateProvider};
use crate::core::rates::convert as convert_amount;
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::server::routes::{currency_pair, present};
use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ConvertParams {
    pub amount: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub converted: f64,
}

pub(crate) fn parse_amount(raw: Option<String>) -> Result<f64, ApiError> {
    let Some(raw) = present(raw) else {
        return Ok(1.0);
    };
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| ApiError::bad_request(format!("Invalid amount: {}", raw.trim())))
}

/// `GET /api/convert`: amount converted at the current rate, rounded to cents.
pub async fn convert(
    State(state): State<AppState>,
    Query(params): Query<ConvertParams>,
) -> Result<Json<ConvertResponse>, ApiError> {
    const HEADLINE: &str = "Failed to convert currency.";

    let amount = parse_amount(params.amount)?;
    let (from, to) = currency_pair(
        params.from,
        params.to,
        "Missing 'from' or 'to' currency parameters",
    )?;

    let rate = state
        .rates
        .get_rate(&from, &to)
        .await
        .map_err(|e| ApiError::upstream(HEADLINE, e))?;

    Ok(Json(ConvertResponse {
        amount,
        converted: convert_amount(amount, rate),
        from,
        to,
        rate,
    }))
}

/// `GET /api/currencies`
pub async fn currencies() -> Json<Vec<CurrencyInfo>> {
    Json(CURRENCIES.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(None).unwrap(), 1.0);
        assert_eq!(parse_amount(Some(" ".into())).unwrap(), 1.0);
        assert_eq!(parse_amount(Some("250.5".into())).unwrap(), 250.5);
        assert_eq!(
            parse_amount(Some("ten".into())).unwrap_err().to_string(),
            "Invalid amount: ten"
        );
        assert!(parse_amount(Some("inf".into())).is_err());
    }
}
