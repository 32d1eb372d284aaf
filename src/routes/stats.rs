//! # routes::stats
//!
//! Statistics page.  Every endpoint takes an inclusive `start` / `end`
//! (`YYYY-MM-DD`); both default to the current month up to today.  Only
//! closed trades are counted.
//!
//! | Method | Path                                    | Description                    |
//! |--------|-----------------------------------------|--------------------------------|
//! | GET    | `/api/stats/setups?start&end`           | Win rate per setup             |
//! | GET    | `/api/stats/directions?start&end`       | Win rate per direction         |
//! | GET    | `/api/stats/overview?start&end&setups`  | Selected setups + by direction |

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{trade::parse_date, DateRange, Setup},
    routes::today,
    state::SharedState,
};

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end:   Option<String>,
}

impl RangeQuery {
    fn resolve(&self) -> AppResult<DateRange> {
        let default = DateRange::month_to_date(today());
        let start = match self.start.as_deref() {
            Some(raw) => parse_date(raw, "Start date")?,
            None => default.start,
        };
        let end = match self.end.as_deref() {
            Some(raw) => parse_date(raw, "End date")?,
            None => default.end,
        };
        DateRange::new(start, end)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OverviewQuery {
    pub start:  Option<String>,
    pub end:    Option<String>,
    /// Comma separated, e.g. `A,C`.  Omitted = every setup.
    pub setups: Option<String>,
}

/// GET /api/stats/setups
pub async fn by_setup(
    State(state): State<SharedState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<impl IntoResponse> {
    let range = query.resolve()?;
    let rows = state.store.stats_by_setup(range).await?;
    Ok(Json(json!({ "ok": true, "range": range, "rows": rows })))
}

/// GET /api/stats/directions
pub async fn by_direction(
    State(state): State<SharedState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<impl IntoResponse> {
    let range = query.resolve()?;
    let rows = state.store.stats_by_direction(range).await?;
    Ok(Json(json!({ "ok": true, "range": range, "rows": rows })))
}

/// GET /api/stats/overview
pub async fn overview(
    State(state): State<SharedState>,
    Query(query): Query<OverviewQuery>,
) -> AppResult<impl IntoResponse> {
    let range = RangeQuery {
        start: query.start,
        end:   query.end,
    }
    .resolve()?;

    let setups = match query.setups.as_deref() {
        Some(raw) => Setup::parse_list(raw)?,
        None => Setup::ALL.to_vec(),
    };
    if setups.is_empty() {
        return Err(AppError::validation("Select at least one setup"));
    }

    let overall = state.store.stats_for_setups(range, &setups).await?;
    let directions = state.store.direction_stats_for_setups(range, &setups).await?;

    let message = (overall.total == 0).then_some("No closed trades for this selection.");

    Ok(Json(json!({
        "ok":         true,
        "range":      range,
        "setups":     setups,
        "overall":    overall,
        "win_rate":   overall.win_rate_label(),
        "directions": directions,
        "message":    message,
    })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    async fn closed(app: &axum::Router, date: &str, direction: &str, setup: &str, outcome: &str) {
        let body = json!({
            "trade_date": date, "symbol": "EURUSD", "direction": direction,
            "setup": setup, "entry_price": 1.08
        });
        let (_, created) = send(app, Method::POST, "/api/trades", Some(body)).await;
        let uri = format!("/api/trades/{}/close", created["id"]);
        send(app, Method::POST, &uri, Some(json!({ "outcome": outcome }))).await;
    }

    async fn seeded() -> axum::Router {
        let app = app();
        closed(&app, "2024-05-01", "LONG", "A", "WIN").await;
        closed(&app, "2024-05-02", "SHORT", "A", "LOSS").await;
        closed(&app, "2024-05-03", "SHORT", "B", "WIN").await;
        closed(&app, "2024-05-04", "LONG", "C", "BREAKEVEN").await;
        closed(&app, "2024-06-01", "LONG", "B", "WIN").await;
        app
    }

    #[tokio::test]
    async fn setup_rows_in_label_order() {
        let app = seeded().await;
        let (status, body) = send(&app, Method::GET, "/api/stats/setups?start=2024-05-01&end=2024-05-31", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["rows"].as_array().unwrap();
        let labels: Vec<_> = rows.iter().map(|r| r["setup"].as_str().unwrap()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
        assert_eq!(rows[0]["total"], 2);
        assert_eq!(rows[0]["win_rate"], 50.0);
    }

    #[tokio::test]
    async fn direction_rows() {
        let app = seeded().await;
        let (_, body) = send(&app, Method::GET, "/api/stats/directions?start=2024-05-01&end=2024-05-31", None).await;
        assert_eq!(
            body["rows"],
            json!([
                { "direction": "LONG",  "total": 2, "wins": 1, "losses": 0, "win_rate": 50.0 },
                { "direction": "SHORT", "total": 2, "wins": 1, "losses": 1, "win_rate": 50.0 },
            ])
        );
    }

    #[tokio::test]
    async fn overview_filters_by_setup_subset() {
        let app = seeded().await;
        let uri = "/api/stats/overview?start=2024-05-01&end=2024-06-30&setups=B";
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["setups"], json!(["B"]));
        assert_eq!(body["overall"]["total"], 2);
        assert_eq!(body["overall"]["wins"], 2);
        assert_eq!(body["win_rate"], "100.0%");
        assert_eq!(body["directions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn overview_without_setups_param_uses_all() {
        let app = seeded().await;
        let uri = "/api/stats/overview?start=2024-05-01&end=2024-05-31";
        let (_, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(body["setups"], json!(["A", "B", "C"]));
        assert_eq!(body["overall"]["total"], 4);
    }

    #[tokio::test]
    async fn overview_requires_a_setup_and_a_sane_range() {
        let app = seeded().await;
        let (status, body) = send(&app, Method::GET, "/api/stats/overview?setups=", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input: Select at least one setup");

        let uri = "/api/stats/setups?start=2024-06-01&end=2024-05-01";
        let (status, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn overview_reports_empty_selection() {
        let app = app();
        let uri = "/api/stats/overview?start=2024-05-01&end=2024-05-31&setups=A";
        let (_, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(body["overall"]["total"], 0);
        assert_eq!(body["message"], "No closed trades for this selection.");
    }
}
