//! # routes
//!
//! JSON endpoints behind the dashboard.  Two logical pages:
//!
//! | Page       | Endpoints                                           |
//! |------------|-----------------------------------------------------|
//! | Journal    | `/api/journal/*`, `/api/trades*`                    |
//! | Statistics | `/api/stats/*`                                      |

use axum::{
    extract::rejection::JsonRejection,
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{require_api_key, HEALTH_PATH};
use crate::error::{AppError, AppResult};
use crate::state::SharedState;

pub mod journal;
pub mod stats;
pub mod trades;

/// Full application router, middleware included.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(HEALTH_PATH, get(health_check))
        // ── Journal page ──────────────────────────────────────────────────────
        .route("/api/journal/calendar",  get(journal::calendar))
        .route("/api/journal/day/:date", get(journal::day))
        .route("/api/trades",            post(trades::create_trade))
        .route("/api/trades/:id",        get(trades::get_trade)
                                           .put(trades::update_trade)
                                           .delete(trades::delete_trade))
        .route("/api/trades/:id/close",  post(trades::close_trade))
        // ── Statistics page ───────────────────────────────────────────────────
        .route("/api/stats/setups",      get(stats::by_setup))
        .route("/api/stats/directions",  get(stats::by_direction))
        .route("/api/stats/overview",    get(stats::overview))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET /api/health
async fn health_check() -> Json<Value> {
    Json(json!({ "ok": true, "service": "trade-journal" }))
}

// ─── Shared extraction helpers ────────────────────────────────────────────────

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Unwraps a JSON body, turning a malformed payload into a validation error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

/// A price as sent by a form: either a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(serde_json::Number),
    Text(String),
}

impl PriceInput {
    pub fn raw(&self) -> String {
        match self {
            PriceInput::Number(n) => n.to_string(),
            PriceInput::Text(s) => s.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{state::build_state, store::MemoryTradeStore};

    pub fn app() -> Router {
        super::router(build_state(Arc::new(MemoryTradeStore::new()), None))
    }

    pub fn app_with_key(key: &str) -> Router {
        super::router(build_state(Arc::new(MemoryTradeStore::new()), Some(key.to_string())))
    }

    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
