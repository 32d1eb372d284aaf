//! # store
//!
//! [`TradeStore`] is the seam between the presentation layer and
//! persistence.  Two implementations:
//!
//! - [`PgTradeStore`] — PostgreSQL through `sqlx` (feature `postgres`)
//! - [`MemoryTradeStore`] — rows in a `RwLock`, for tests and for running
//!   the dashboard without a database
//!
//! Every method is a single statement against the store; there are no
//! multi-step transactions.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{
    DateRange, DayColor, DirectionStats, NewTrade, Outcome, Setup, SetupStats, Tally, Trade,
    TradeUpdate,
};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryTradeStore;
#[cfg(feature = "postgres")]
pub use postgres::PgTradeStore;

#[async_trait]
pub trait TradeStore: Send + Sync {
    // ─── Writes ───────────────────────────────────────────────────────────────

    /// Records an open trade and returns its generated id.
    async fn insert(&self, trade: NewTrade) -> AppResult<i64>;

    /// Sets outcome and exit price.  A non-positive or absent exit price is
    /// stored as NULL.  `NotFound` when the id does not exist.
    async fn close(
        &self,
        id: i64,
        outcome: Outcome,
        exit_price: Option<BigDecimal>,
    ) -> AppResult<()>;

    /// Overwrites entry price, exit price, outcome and notes.
    /// `NotFound` when the id does not exist.
    async fn update(&self, id: i64, update: TradeUpdate) -> AppResult<()>;

    /// Hard delete.  `NotFound` when the id does not exist.
    async fn delete(&self, id: i64) -> AppResult<()>;

    // ─── Reads ────────────────────────────────────────────────────────────────

    async fn get(&self, id: i64) -> AppResult<Option<Trade>>;

    /// Trades on `day`, ascending by timestamp.
    async fn find_by_date(&self, day: NaiveDate) -> AppResult<Vec<Trade>>;

    /// Counts over every trade (open or closed) on `day`.
    async fn day_stats(&self, day: NaiveDate) -> AppResult<Tally>;

    /// Closed trades in `range`, one tally per day that has any.
    async fn daily_tallies(&self, range: DateRange) -> AppResult<BTreeMap<NaiveDate, Tally>>;

    /// Closed trades in `range`, grouped by setup, in label order.
    async fn stats_by_setup(&self, range: DateRange) -> AppResult<Vec<SetupStats>>;

    /// Closed trades in `range`, grouped by direction.
    async fn stats_by_direction(&self, range: DateRange) -> AppResult<Vec<DirectionStats>>;

    /// Closed trades in `range` whose setup is in `setups`, as one row.
    async fn stats_for_setups(&self, range: DateRange, setups: &[Setup]) -> AppResult<Tally>;

    /// Closed trades in `range` whose setup is in `setups`, by direction.
    async fn direction_stats_for_setups(
        &self,
        range: DateRange,
        setups: &[Setup],
    ) -> AppResult<Vec<DirectionStats>>;

    /// Calendar colour for every day of the month with a closed trade.
    /// Days with only open trades, or none, are absent.
    async fn daily_outcome_map(
        &self,
        year: i32,
        month: u32,
    ) -> AppResult<BTreeMap<NaiveDate, DayColor>> {
        let range = DateRange::month(year, month)?;
        let tallies = self.daily_tallies(range).await?;
        Ok(tallies
            .into_iter()
            .map(|(day, tally)| (day, tally.day_color()))
            .collect())
    }
}

pub type DynStore = Arc<dyn TradeStore>;

/// Picks the store from configuration: PostgreSQL when `DATABASE_URL` is
/// set, otherwise the in-memory store.
pub async fn open_store(config: &Config) -> anyhow::Result<DynStore> {
    match &config.database_url {
        #[cfg(feature = "postgres")]
        Some(url) => {
            let pool = crate::db::init_pool(url, config.db_max_connections).await?;
            Ok(Arc::new(PgTradeStore::new(pool)))
        }
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            anyhow::bail!("DATABASE_URL is set but this build has no `postgres` feature")
        }
        None => {
            warn!("DATABASE_URL not set — journal is kept in memory and lost on exit");
            info!("🧠 Using in-memory trade store");
            Ok(Arc::new(MemoryTradeStore::new()))
        }
    }
}
