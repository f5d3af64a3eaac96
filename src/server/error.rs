//! Error types for the HTTP API.

use crate::core::config::MissingApiKey;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors a handler can answer with.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed query parameters
    #[error("{0}")]
    BadRequest(String),

    /// A provider was called without its API key
    #[error("Server configuration error: API key missing.")]
    MissingKey { details: String },

    /// Upstream call or response shaping failed
    #[error("{headline}")]
    Upstream {
        headline: &'static str,
        details: String,
    },
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Wraps a provider failure under a route-specific headline.
    pub fn upstream(headline: &'static str, err: anyhow::Error) -> Self {
        match err.downcast_ref::<MissingApiKey>() {
            Some(missing) => Self::MissingKey {
                details: missing.to_string(),
            },
            None => Self::Upstream {
                headline,
                details: format!("{err:#}"),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingKey { .. } | ApiError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest(_) => None,
            ApiError::MissingKey { details } | ApiError::Upstream { details, .. } => Some(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self.details() {
            Some(details) => {
                error!(error = %self, details, "Request failed");
                json!({ "error": self.to_string(), "details": details })
            }
            None => {
                warn!(error = %self, "Rejected request");
                json!({ "error": self.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
