//! # store::postgres
//!
//! [`TradeStore`] on `tracker.trades`.  Enum columns travel as text: values
//! are cast to the `tracker.*_type` enums on the way in and back to `text`
//! on the way out, then parsed into the Rust enums.

use std::collections::BTreeMap;

use anyhow::Context;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{PgPool, Postgres};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{
    trade::normalize_exit_price, DateRange, Direction, DirectionStats, NewTrade, Outcome, Setup,
    SetupStats, Tally, Trade, TradeUpdate,
};
use crate::store::TradeStore;

// ─── SQL ──────────────────────────────────────────────────────────────────────

const SELECT_TRADES: &str = r#"
    SELECT id, trade_date, symbol,
           direction::text AS direction,
           setup::text     AS setup,
           entry_price, exit_price,
           outcome::text   AS outcome,
           notes, screenshot_path
    FROM tracker.trades
"#;

const INSERT_TRADE: &str = r#"
    INSERT INTO tracker.trades
      (trade_date, symbol, direction, setup, entry_price, notes, screenshot_path)
    VALUES (COALESCE($1, LOCALTIMESTAMP), $2, $3::tracker.direction_type,
            $4::tracker.setup_type, $5, $6, $7)
    RETURNING id
"#;

const CLOSE_TRADE: &str = r#"
    UPDATE tracker.trades
    SET outcome    = $2::tracker.outcome_type,
        exit_price = $3
    WHERE id = $1
"#;

const UPDATE_TRADE: &str = r#"
    UPDATE tracker.trades
    SET entry_price = $2,
        exit_price  = $3,
        outcome     = $4::tracker.outcome_type,
        notes       = $5
    WHERE id = $1
"#;

const DELETE_TRADE: &str = "DELETE FROM tracker.trades WHERE id = $1";

const DAY_STATS: &str = r#"
    SELECT COUNT(*)                                 AS total,
           COUNT(*) FILTER (WHERE outcome = 'WIN')  AS wins,
           COUNT(*) FILTER (WHERE outcome = 'LOSS') AS losses
    FROM tracker.trades
    WHERE trade_date::date = $1
"#;

const DAILY_TALLIES: &str = r#"
    SELECT trade_date::date                         AS day,
           COUNT(*)                                 AS total,
           COUNT(*) FILTER (WHERE outcome = 'WIN')  AS wins,
           COUNT(*) FILTER (WHERE outcome = 'LOSS') AS losses
    FROM tracker.trades
    WHERE trade_date::date BETWEEN $1 AND $2
      AND outcome IS NOT NULL
    GROUP BY trade_date::date
    ORDER BY day
"#;

const STATS_BY_SETUP: &str = r#"
    SELECT setup::text                              AS label,
           COUNT(*)                                 AS total,
           COUNT(*) FILTER (WHERE outcome = 'WIN')  AS wins,
           COUNT(*) FILTER (WHERE outcome = 'LOSS') AS losses
    FROM tracker.trades
    WHERE trade_date::date BETWEEN $1 AND $2
      AND outcome IS NOT NULL
    GROUP BY setup
    ORDER BY setup
"#;

const STATS_BY_DIRECTION: &str = r#"
    SELECT direction::text                          AS label,
           COUNT(*)                                 AS total,
           COUNT(*) FILTER (WHERE outcome = 'WIN')  AS wins,
           COUNT(*) FILTER (WHERE outcome = 'LOSS') AS losses
    FROM tracker.trades
    WHERE trade_date::date BETWEEN $1 AND $2
      AND outcome IS NOT NULL
    GROUP BY direction
    ORDER BY direction
"#;

const STATS_FOR_SETUPS: &str = r#"
    SELECT COUNT(*)                                 AS total,
           COUNT(*) FILTER (WHERE outcome = 'WIN')  AS wins,
           COUNT(*) FILTER (WHERE outcome = 'LOSS') AS losses
    FROM tracker.trades
    WHERE trade_date::date BETWEEN $1 AND $2
      AND outcome IS NOT NULL
      AND setup = ANY($3::tracker.setup_type[])
"#;

const DIRECTION_STATS_FOR_SETUPS: &str = r#"
    SELECT direction::text                          AS label,
           COUNT(*)                                 AS total,
           COUNT(*) FILTER (WHERE outcome = 'WIN')  AS wins,
           COUNT(*) FILTER (WHERE outcome = 'LOSS') AS losses
    FROM tracker.trades
    WHERE trade_date::date BETWEEN $1 AND $2
      AND outcome IS NOT NULL
      AND setup = ANY($3::tracker.setup_type[])
    GROUP BY direction
    ORDER BY direction
"#;

// ─── Rows ─────────────────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
struct TradeRow {
    id:              i64,
    trade_date:      NaiveDateTime,
    symbol:          String,
    direction:       String,
    setup:           String,
    entry_price:     BigDecimal,
    exit_price:      Option<BigDecimal>,
    outcome:         Option<String>,
    notes:           Option<String>,
    screenshot_path: Option<String>,
}

impl TradeRow {
    fn into_trade(self) -> anyhow::Result<Trade> {
        Ok(Trade {
            id:              self.id,
            trade_date:      self.trade_date,
            symbol:          self.symbol,
            direction:       self.direction.parse()?,
            setup:           self.setup.parse()?,
            entry_price:     self.entry_price,
            exit_price:      self.exit_price,
            outcome:         self.outcome.as_deref().map(str::parse::<Outcome>).transpose()?,
            notes:           self.notes,
            screenshot_path: self.screenshot_path,
        })
    }
}

/// `(label, total, wins, losses)` from the grouped statistics queries.
type GroupRow = (String, i64, i64, i64);

fn setup_rows(rows: Vec<GroupRow>) -> anyhow::Result<Vec<SetupStats>> {
    rows.into_iter()
        .map(|(label, total, wins, losses)| {
            Ok(SetupStats {
                setup: label.parse::<Setup>()?,
                tally: Tally::new(total, wins, losses),
            })
        })
        .collect()
}

fn direction_rows(rows: Vec<GroupRow>) -> anyhow::Result<Vec<DirectionStats>> {
    rows.into_iter()
        .map(|(label, total, wins, losses)| {
            Ok(DirectionStats {
                direction: label.parse::<Direction>()?,
                tally: Tally::new(total, wins, losses),
            })
        })
        .collect()
}

fn setup_labels(setups: &[Setup]) -> Vec<String> {
    setups.iter().map(|s| s.as_str().to_string()).collect()
}

// ─── Store ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PgTradeStore {
    pool: PgPool,
}

impl PgTradeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn grouped(
        &self,
        sql: &'static str,
        range: DateRange,
        setups: Option<&[Setup]>,
    ) -> anyhow::Result<Vec<GroupRow>> {
        let mut query = sqlx::query_as::<Postgres, GroupRow>(sql)
            .bind(range.start)
            .bind(range.end);
        if let Some(setups) = setups {
            query = query.bind(setup_labels(setups));
        }
        query.fetch_all(&self.pool).await.context("grouped stats query failed")
    }
}

#[async_trait]
impl TradeStore for PgTradeStore {
    async fn insert(&self, new: NewTrade) -> AppResult<i64> {
        let (id,): (i64,) = sqlx::query_as(INSERT_TRADE)
            .bind(new.trade_date)
            .bind(&new.symbol)
            .bind(new.direction.as_str())
            .bind(new.setup.as_str())
            .bind(&new.entry_price)
            .bind(&new.notes)
            .bind(&new.screenshot_path)
            .fetch_one(&self.pool)
            .await
            .context("insert trade failed")?;

        info!(id, symbol = %new.symbol, direction = %new.direction, setup = %new.setup, "📝 trade recorded");
        Ok(id)
    }

    async fn close(
        &self,
        id: i64,
        outcome: Outcome,
        exit_price: Option<BigDecimal>,
    ) -> AppResult<()> {
        let result = sqlx::query(CLOSE_TRADE)
            .bind(id)
            .bind(outcome.as_str())
            .bind(normalize_exit_price(exit_price))
            .execute(&self.pool)
            .await
            .context("close trade failed")?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(id));
        }
        info!(id, %outcome, "🔒 trade closed");
        Ok(())
    }

    async fn update(&self, id: i64, update: TradeUpdate) -> AppResult<()> {
        let result = sqlx::query(UPDATE_TRADE)
            .bind(id)
            .bind(&update.entry_price)
            .bind(normalize_exit_price(update.exit_price))
            .bind(update.outcome.as_str())
            .bind(&update.notes)
            .execute(&self.pool)
            .await
            .context("update trade failed")?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(id));
        }
        info!(id, "✏️ trade updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query(DELETE_TRADE)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete trade failed")?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(id));
        }
        info!(id, "🗑 trade deleted");
        Ok(())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Trade>> {
        let row = sqlx::query_as::<_, TradeRow>(&format!("{SELECT_TRADES} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("get trade failed")?;

        Ok(row.map(TradeRow::into_trade).transpose()?)
    }

    async fn find_by_date(&self, day: NaiveDate) -> AppResult<Vec<Trade>> {
        let rows = sqlx::query_as::<_, TradeRow>(&format!(
            "{SELECT_TRADES} WHERE trade_date::date = $1 ORDER BY trade_date ASC, id ASC"
        ))
        .bind(day)
        .fetch_all(&self.pool)
        .await
        .context("find trades by date failed")?;

        debug!(%day, count = rows.len(), "trades by date");
        let trades = rows
            .into_iter()
            .map(TradeRow::into_trade)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(trades)
    }

    async fn day_stats(&self, day: NaiveDate) -> AppResult<Tally> {
        let (total, wins, losses): (i64, i64, i64) = sqlx::query_as(DAY_STATS)
            .bind(day)
            .fetch_one(&self.pool)
            .await
            .context("day stats query failed")?;

        Ok(Tally::new(total, wins, losses))
    }

    async fn daily_tallies(&self, range: DateRange) -> AppResult<BTreeMap<NaiveDate, Tally>> {
        let rows: Vec<(NaiveDate, i64, i64, i64)> = sqlx::query_as(DAILY_TALLIES)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await
            .context("daily outcome query failed")?;

        Ok(rows
            .into_iter()
            .map(|(day, total, wins, losses)| (day, Tally::new(total, wins, losses)))
            .collect())
    }

    async fn stats_by_setup(&self, range: DateRange) -> AppResult<Vec<SetupStats>> {
        let rows = self.grouped(STATS_BY_SETUP, range, None).await?;
        Ok(setup_rows(rows)?)
    }

    async fn stats_by_direction(&self, range: DateRange) -> AppResult<Vec<DirectionStats>> {
        let rows = self.grouped(STATS_BY_DIRECTION, range, None).await?;
        Ok(direction_rows(rows)?)
    }

    async fn stats_for_setups(&self, range: DateRange, setups: &[Setup]) -> AppResult<Tally> {
        let (total, wins, losses): (i64, i64, i64) = sqlx::query_as(STATS_FOR_SETUPS)
            .bind(range.start)
            .bind(range.end)
            .bind(setup_labels(setups))
            .fetch_one(&self.pool)
            .await
            .context("stats for setups query failed")?;

        Ok(Tally::new(total, wins, losses))
    }

    async fn direction_stats_for_setups(
        &self,
        range: DateRange,
        setups: &[Setup],
    ) -> AppResult<Vec<DirectionStats>> {
        let rows = self
            .grouped(DIRECTION_STATS_FOR_SETUPS, range, Some(setups))
            .await?;
        Ok(direction_rows(rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn row(direction: &str, setup: &str, outcome: Option<&str>) -> TradeRow {
        TradeRow {
            id: 1,
            trade_date: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            symbol: "EURUSD".into(),
            direction: direction.into(),
            setup: setup.into(),
            entry_price: BigDecimal::from_str("1.08000").unwrap(),
            exit_price: None,
            outcome: outcome.map(Into::into),
            notes: None,
            screenshot_path: None,
        }
    }

    #[test]
    fn row_converts_enum_text() {
        let trade = row("SHORT", "B", Some("BREAKEVEN")).into_trade().unwrap();
        assert_eq!(trade.direction, Direction::Short);
        assert_eq!(trade.setup, Setup::B);
        assert_eq!(trade.outcome, Some(Outcome::Breakeven));

        let open = row("LONG", "A", None).into_trade().unwrap();
        assert!(open.is_open());
    }

    #[test]
    fn row_with_unknown_enum_text_fails() {
        assert!(row("SIDEWAYS", "A", None).into_trade().is_err());
    }

    #[test]
    fn grouped_rows_parse_labels() {
        let rows = vec![("A".to_string(), 3, 2, 1), ("C".to_string(), 1, 0, 0)];
        let parsed = setup_rows(rows).unwrap();
        assert_eq!(parsed[0].setup, Setup::A);
        assert_eq!(parsed[1].tally, Tally::new(1, 0, 0));

        let rows = vec![("SHORT".to_string(), 2, 1, 1)];
        assert_eq!(direction_rows(rows).unwrap()[0].direction, Direction::Short);
    }

    #[test]
    fn range_and_calendar_queries_only_count_closed_trades() {
        for sql in [
            DAILY_TALLIES,
            STATS_BY_SETUP,
            STATS_BY_DIRECTION,
            STATS_FOR_SETUPS,
            DIRECTION_STATS_FOR_SETUPS,
        ] {
            assert!(sql.contains("outcome IS NOT NULL"));
            assert!(sql.contains("trade_date::date BETWEEN $1 AND $2"));
        }
        // the day view counts open trades too
        assert!(!DAY_STATS.contains("IS NOT NULL"));
    }

    #[test]
    fn subset_queries_bind_setup_array() {
        assert!(STATS_FOR_SETUPS.contains("setup = ANY($3::tracker.setup_type[])"));
        assert!(DIRECTION_STATS_FOR_SETUPS.contains("setup = ANY($3::tracker.setup_type[])"));
        assert_eq!(setup_labels(&[Setup::A, Setup::C]), vec!["A", "C"]);
    }
}
