pub mod charts;
pub mod convert;
pub mod news;
pub mod rates;

use crate::core::currency::parse_code;
use crate::server::error::ApiError;

/// Treats an empty query value the same as an absent one.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Both codes required; `missing` is the message used when either is absent.
pub(crate) fn currency_pair(
    from: Option<String>,
    to: Option<String>,
    missing: &str,
) -> Result<(String, String), ApiError> {
    let (Some(from), Some(to)) = (present(from), present(to)) else {
        return Err(ApiError::bad_request(missing));
    };
    let from = parse_code(&from).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let to = parse_code(&to).map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok((from, to))
}
