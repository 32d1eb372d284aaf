//! # routes::trades
//!
//! Add / edit / close / delete forms of the journal page.
//!
//! | Method | Path                     | Description              |
//! |--------|--------------------------|--------------------------|
//! | POST   | `/api/trades`            | Record an open trade     |
//! | GET    | `/api/trades/:id`        | One trade                |
//! | POST   | `/api/trades/:id/close`  | Close with an outcome    |
//! | PUT    | `/api/trades/:id`        | Edit a trade             |
//! | DELETE | `/api/trades/:id`        | Delete permanently       |

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{
        trade::{parse_date, parse_price, parse_trade_id},
        NewTrade, Outcome, Trade, TradeUpdate,
    },
    routes::{json_body, PriceInput},
    state::SharedState,
};

// ─── Request bodies ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateTradeBody {
    /// `YYYY-MM-DD`; the day selected in the calendar.  Omitted = now.
    pub trade_date:  Option<String>,
    pub symbol:      String,
    pub direction:   String,
    pub setup:       String,
    pub entry_price: PriceInput,
    pub notes:       Option<String>,
}

#[derive(Deserialize)]
pub struct CloseTradeBody {
    pub outcome:    String,
    pub exit_price: Option<PriceInput>,
}

#[derive(Deserialize)]
pub struct UpdateTradeBody {
    pub entry_price: PriceInput,
    pub exit_price:  Option<PriceInput>,
    pub outcome:     String,
    pub notes:       Option<String>,
}

fn optional_price(input: Option<&PriceInput>, field: &str) -> AppResult<Option<bigdecimal::BigDecimal>> {
    input
        .map(|p| parse_price(&p.raw(), field))
        .transpose()
}

async fn load(state: &SharedState, id: i64) -> AppResult<Trade> {
    state.store.get(id).await?.ok_or(AppError::NotFound(id))
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/trades
pub async fn create_trade(
    State(state): State<SharedState>,
    payload: Result<Json<CreateTradeBody>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let body = json_body(payload)?;

    let mut new_trade = NewTrade::new(
        &body.symbol,
        body.direction.parse()?,
        body.setup.parse()?,
        parse_price(&body.entry_price.raw(), "Entry price")?,
    )?
    .with_notes(body.notes);

    if let Some(raw) = body.trade_date.as_deref() {
        new_trade = new_trade.on_day(parse_date(raw, "Trade date")?);
    }

    let id = state.store.insert(new_trade).await?;
    let trade = load(&state, id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok":      true,
            "id":      id,
            "message": "Trade added",
            "trade":   trade,
        })),
    ))
}

/// GET /api/trades/:id
pub async fn get_trade(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let trade = load(&state, parse_trade_id(&id)?).await?;
    Ok(Json(json!({ "ok": true, "trade": trade })))
}

/// POST /api/trades/:id/close
pub async fn close_trade(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<CloseTradeBody>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let id = parse_trade_id(&id)?;
    let body = json_body(payload)?;
    let outcome: Outcome = body.outcome.parse()?;
    let exit_price = optional_price(body.exit_price.as_ref(), "Exit price")?;

    state.store.close(id, outcome, exit_price).await?;
    let trade = load(&state, id).await?;

    Ok(Json(json!({
        "ok":      true,
        "message": format!("Trade #{id} closed as {outcome}"),
        "trade":   trade,
    })))
}

/// PUT /api/trades/:id
pub async fn update_trade(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTradeBody>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let id = parse_trade_id(&id)?;
    let body = json_body(payload)?;

    let update = TradeUpdate::new(
        parse_price(&body.entry_price.raw(), "Entry price")?,
        optional_price(body.exit_price.as_ref(), "Exit price")?,
        body.outcome.parse()?,
        body.notes,
    );

    state.store.update(id, update).await?;
    let trade = load(&state, id).await?;

    Ok(Json(json!({
        "ok":      true,
        "message": "Trade updated",
        "trade":   trade,
    })))
}

/// DELETE /api/trades/:id
pub async fn delete_trade(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_trade_id(&id)?;
    state.store.delete(id).await?;

    Ok(Json(json!({
        "ok":      true,
        "message": "Trade deleted",
        "id":      id,
    })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    fn eurusd() -> serde_json::Value {
        json!({
            "trade_date":  "2024-05-01",
            "symbol":      "eurusd",
            "direction":   "LONG",
            "setup":       "A",
            "entry_price": 1.08,
            "notes":       "  "
        })
    }

    #[tokio::test]
    async fn create_then_close_then_edit() {
        let app = app();

        let (status, body) = send(&app, Method::POST, "/api/trades", Some(eurusd())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_i64().unwrap();
        assert_eq!(body["trade"]["symbol"], "EURUSD");
        assert_eq!(body["trade"]["trade_date"], "2024-05-01T00:00:00");
        assert!(body["trade"]["outcome"].is_null());
        assert!(body["trade"]["notes"].is_null());

        let uri = format!("/api/trades/{id}/close");
        let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "outcome": "win", "exit_price": "1.0850" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], format!("Trade #{id} closed as WIN"));
        assert_eq!(body["trade"]["outcome"], "WIN");
        assert!(!body["trade"]["exit_price"].is_null());

        let uri = format!("/api/trades/{id}");
        let edit = json!({ "entry_price": "1.0810", "exit_price": 0, "outcome": "BREAKEVEN", "notes": "moved stop" });
        let (status, body) = send(&app, Method::PUT, &uri, Some(edit)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["trade"]["outcome"], "BREAKEVEN");
        assert!(body["trade"]["exit_price"].is_null());
        assert_eq!(body["trade"]["notes"], "moved stop");
    }

    #[tokio::test]
    async fn invalid_enum_values_are_rejected_before_insert() {
        let app = app();
        let mut bad = eurusd();
        bad["setup"] = json!("D");

        let (status, body) = send(&app, Method::POST, "/api/trades", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Setup must be A, B, or C"));

        let (_, day) = send(&app, Method::GET, "/api/journal/day/2024-05-01", None).await;
        assert_eq!(day["stats"]["total"], 0);
    }

    #[tokio::test]
    async fn oversized_price_is_a_bad_request() {
        let app = app();
        let mut bad = eurusd();
        bad["entry_price"] = json!("100000000000000");

        let (status, body) = send(&app, Method::POST, "/api/trades", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("at most 13 digits"));
    }

    #[tokio::test]
    async fn unknown_and_non_numeric_ids() {
        let app = app();

        let (status, _) = send(&app, Method::POST, "/api/trades/42/close", Some(json!({ "outcome": "LOSS" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, "/api/trades/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::GET, "/api/trades/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input: Trade ID must be a number");
    }

    #[tokio::test]
    async fn delete_removes_the_trade() {
        let app = app();
        let (_, body) = send(&app, Method::POST, "/api/trades", Some(eurusd())).await;
        let id = body["id"].as_i64().unwrap();

        let (status, _) = send(&app, Method::DELETE, &format!("/api/trades/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, &format!("/api/trades/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
