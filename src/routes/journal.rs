//! # routes::journal
//!
//! Day-by-day journal page.
//!
//! | Method | Path                                      | Description                      |
//! |--------|-------------------------------------------|----------------------------------|
//! | GET    | `/api/journal/calendar?year&month&selected` | Month grid coloured by outcome |
//! | GET    | `/api/journal/day/:date`                  | Day stats + open / closed trades |

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
    calendar::CalendarView,
    error::AppResult,
    models::trade::parse_date,
    routes::today,
    state::SharedState,
};

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year:     Option<i32>,
    pub month:    Option<u32>,
    /// `YYYY-MM-DD`
    pub selected: Option<String>,
}

/// GET /api/journal/calendar
pub async fn calendar(
    State(state): State<SharedState>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<impl IntoResponse> {
    let selected = query
        .selected
        .as_deref()
        .map(|raw| parse_date(raw, "Selected date"))
        .transpose()?;
    let view = CalendarView::resolve(query.year, query.month, selected, today())?;

    let outcomes = state.store.daily_outcome_map(view.year, view.month).await?;
    let weeks = view.weeks(&outcomes)?;
    debug!(year = view.year, month = view.month, days = outcomes.len(), "calendar built");

    let (prev, next) = (view.prev_month(), view.next_month());
    Ok(Json(json!({
        "ok":       true,
        "label":    view.label()?,
        "year":     view.year,
        "month":    view.month,
        "selected": view.selected,
        "prev":     { "year": prev.year, "month": prev.month },
        "next":     { "year": next.year, "month": next.month },
        "outcomes": outcomes,
        "weeks":    weeks,
    })))
}

/// GET /api/journal/day/:date
pub async fn day(
    State(state): State<SharedState>,
    Path(date): Path<String>,
) -> AppResult<impl IntoResponse> {
    let day = parse_date(&date, "Date")?;

    let stats = state.store.day_stats(day).await?;
    let (open, closed): (Vec<_>, Vec<_>) = state
        .store
        .find_by_date(day)
        .await?
        .into_iter()
        .partition(|t| t.is_open());

    let message = if stats.total == 0 {
        Some("No trades for this day.")
    } else {
        None
    };

    Ok(Json(json!({
        "ok":            true,
        "date":          day,
        "stats":         stats,
        "win_rate":      stats.win_rate_label(),
        "open_trades":   open,
        "closed_trades": closed,
        "message":       message,
    })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::routes::test_support::{app, send};

    async fn add(app: &axum::Router, date: &str, outcome: Option<&str>) -> i64 {
        let body = json!({
            "trade_date": date, "symbol": "EURUSD", "direction": "LONG",
            "setup": "A", "entry_price": "1.08"
        });
        let (_, created) = send(app, Method::POST, "/api/trades", Some(body)).await;
        let id = created["id"].as_i64().unwrap();
        if let Some(outcome) = outcome {
            let uri = format!("/api/trades/{id}/close");
            send(app, Method::POST, &uri, Some(json!({ "outcome": outcome, "exit_price": 1.09 }))).await;
        }
        id
    }

    #[tokio::test]
    async fn day_view_splits_open_and_closed() {
        let app = app();
        add(&app, "2024-05-01", None).await;
        add(&app, "2024-05-01", Some("WIN")).await;
        add(&app, "2024-05-02", Some("LOSS")).await;

        let (status, body) = send(&app, Method::GET, "/api/journal/day/2024-05-01", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"], json!({ "total": 2, "wins": 1, "losses": 0, "win_rate": 50.0 }));
        assert_eq!(body["win_rate"], "50.0%");
        assert_eq!(body["open_trades"].as_array().unwrap().len(), 1);
        assert_eq!(body["closed_trades"].as_array().unwrap().len(), 1);
        assert!(body["message"].is_null());
    }

    #[tokio::test]
    async fn empty_day_has_no_data() {
        let app = app();
        let (_, body) = send(&app, Method::GET, "/api/journal/day/2024-05-03", None).await;
        assert_eq!(body["stats"]["total"], 0);
        assert!(body["stats"]["win_rate"].is_null());
        assert_eq!(body["win_rate"], "n/a");
        assert_eq!(body["message"], "No trades for this day.");
    }

    #[tokio::test]
    async fn bad_date_is_rejected() {
        let app = app();
        let (status, _) = send(&app, Method::GET, "/api/journal/day/yesterday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn calendar_colours_days_and_links_neighbours() {
        let app = app();
        add(&app, "2024-05-01", Some("WIN")).await;
        add(&app, "2024-05-02", Some("WIN")).await;
        add(&app, "2024-05-02", Some("LOSS")).await;
        add(&app, "2024-05-03", Some("LOSS")).await;
        add(&app, "2024-05-04", None).await;

        let uri = "/api/journal/calendar?year=2024&month=5&selected=2024-05-02";
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["label"], "May 2024");
        assert_eq!(
            body["outcomes"],
            json!({ "2024-05-01": "green", "2024-05-02": "gray", "2024-05-03": "red" })
        );
        assert_eq!(body["prev"], json!({ "year": 2024, "month": 4 }));
        assert_eq!(body["next"], json!({ "year": 2024, "month": 6 }));

        let selected: Vec<&Value> = body["weeks"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|w| w.as_array().unwrap())
            .filter(|c| c["selected"] == true)
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["date"], "2024-05-02");
    }

    #[tokio::test]
    async fn calendar_rejects_bad_month() {
        let app = app();
        let (status, _) = send(&app, Method::GET, "/api/journal/calendar?year=2024&month=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
