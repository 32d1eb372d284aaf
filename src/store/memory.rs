//! # store::memory
//!
//! In-process [`TradeStore`].  Aggregates are computed over the rows with
//! the same [`Tally`] rules the SQL queries encode.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{Local, NaiveDate};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{
    trade::normalize_exit_price, DateRange, Direction, DirectionStats, NewTrade, Outcome, Setup,
    SetupStats, Tally, Trade, TradeUpdate,
};
use crate::store::TradeStore;

#[derive(Debug, Default)]
struct MemoryInner {
    last_id: i64,
    trades:  BTreeMap<i64, Trade>,
}

#[derive(Debug, Default)]
pub struct MemoryTradeStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryTradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed trades in `range`, optionally restricted to `setups`.
    async fn closed_in(&self, range: DateRange, setups: Option<&[Setup]>) -> Vec<Trade> {
        let inner = self.inner.read().await;
        inner
            .trades
            .values()
            .filter(|t| t.outcome.is_some())
            .filter(|t| range.contains(t.day()))
            .filter(|t| setups.map_or(true, |s| s.contains(&t.setup)))
            .cloned()
            .collect()
    }
}

fn by_direction(trades: &[Trade]) -> Vec<DirectionStats> {
    let mut groups: BTreeMap<Direction, Tally> = BTreeMap::new();
    for t in trades {
        groups.entry(t.direction).or_default().record(t.outcome);
    }
    groups
        .into_iter()
        .map(|(direction, tally)| DirectionStats { direction, tally })
        .collect()
}

#[async_trait]
impl TradeStore for MemoryTradeStore {
    async fn insert(&self, new: NewTrade) -> AppResult<i64> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;

        let trade = Trade {
            id,
            trade_date: new.trade_date.unwrap_or_else(|| Local::now().naive_local()),
            symbol: new.symbol,
            direction: new.direction,
            setup: new.setup,
            entry_price: new.entry_price,
            exit_price: None,
            outcome: None,
            notes: new.notes,
            screenshot_path: new.screenshot_path,
        };
        info!(id, symbol = %trade.symbol, direction = %trade.direction, setup = %trade.setup, "📝 trade recorded");
        inner.trades.insert(id, trade);

        Ok(id)
    }

    async fn close(
        &self,
        id: i64,
        outcome: Outcome,
        exit_price: Option<BigDecimal>,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let trade = inner.trades.get_mut(&id).ok_or(AppError::NotFound(id))?;
        trade.outcome = Some(outcome);
        trade.exit_price = normalize_exit_price(exit_price);
        info!(id, %outcome, "🔒 trade closed");
        Ok(())
    }

    async fn update(&self, id: i64, update: TradeUpdate) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let trade = inner.trades.get_mut(&id).ok_or(AppError::NotFound(id))?;
        trade.entry_price = update.entry_price;
        trade.exit_price = normalize_exit_price(update.exit_price);
        trade.outcome = Some(update.outcome);
        trade.notes = update.notes;
        info!(id, "✏️ trade updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.trades.remove(&id).ok_or(AppError::NotFound(id))?;
        info!(id, "🗑 trade deleted");
        Ok(())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Trade>> {
        Ok(self.inner.read().await.trades.get(&id).cloned())
    }

    async fn find_by_date(&self, day: NaiveDate) -> AppResult<Vec<Trade>> {
        let inner = self.inner.read().await;
        let mut trades: Vec<Trade> = inner
            .trades
            .values()
            .filter(|t| t.day() == day)
            .cloned()
            .collect();
        trades.sort_by(|a, b| a.trade_date.cmp(&b.trade_date).then(a.id.cmp(&b.id)));
        debug!(%day, count = trades.len(), "trades by date");
        Ok(trades)
    }

    async fn day_stats(&self, day: NaiveDate) -> AppResult<Tally> {
        let inner = self.inner.read().await;
        Ok(Tally::from_outcomes(
            inner
                .trades
                .values()
                .filter(|t| t.day() == day)
                .map(|t| t.outcome),
        ))
    }

    async fn daily_tallies(&self, range: DateRange) -> AppResult<BTreeMap<NaiveDate, Tally>> {
        let inner = self.inner.read().await;
        let mut days: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
        for t in inner
            .trades
            .values()
            .filter(|t| t.outcome.is_some() && range.contains(t.day()))
        {
            days.entry(t.day()).or_default().record(t.outcome);
        }
        Ok(days)
    }

    async fn stats_by_setup(&self, range: DateRange) -> AppResult<Vec<SetupStats>> {
        let mut groups: BTreeMap<Setup, Tally> = BTreeMap::new();
        for t in self.closed_in(range, None).await {
            groups.entry(t.setup).or_default().record(t.outcome);
        }
        Ok(groups
            .into_iter()
            .map(|(setup, tally)| SetupStats { setup, tally })
            .collect())
    }

    async fn stats_by_direction(&self, range: DateRange) -> AppResult<Vec<DirectionStats>> {
        Ok(by_direction(&self.closed_in(range, None).await))
    }

    async fn stats_for_setups(&self, range: DateRange, setups: &[Setup]) -> AppResult<Tally> {
        let trades = self.closed_in(range, Some(setups)).await;
        Ok(Tally::from_outcomes(trades.iter().map(|t| t.outcome)))
    }

    async fn direction_stats_for_setups(
        &self,
        range: DateRange,
        setups: &[Setup],
    ) -> AppResult<Vec<DirectionStats>> {
        Ok(by_direction(&self.closed_in(range, Some(setups)).await))
    }
}
