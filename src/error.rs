//! # error
//!
//! Centralised application error type.
//!
//! Store operations, route handlers and the CLI all return
//! `Result<_, AppError>`.  Axum's `IntoResponse` impl converts these into
//! structured JSON error bodies so the dashboard always gets a
//! machine-readable response even on failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before anything was persisted.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// close / update / delete matched zero rows.
    #[error("Trade {0} not found")]
    NotFound(i64),

    /// Database or connection failure.  Never retried.
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let AppError::Storage(err) = &self {
            tracing::error!(error = %format!("{err:#}"), "❌ storage failure");
        }

        let body = Json(json!({
            "ok":    false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let resp = AppError::validation("bad setup").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::NotFound(7).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AppError::Storage(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_message_names_the_trade() {
        assert_eq!(AppError::NotFound(42).to_string(), "Trade 42 not found");
    }
}
