//! Domain models shared by the store, the dashboard and the CLI.

pub mod stats;
pub mod trade;

pub use stats::{DateRange, DayColor, DirectionStats, SetupStats, Tally};
pub use trade::{Direction, NewTrade, Outcome, Setup, Trade, TradeUpdate};
