//! # trade-journal
//!
//! Personal trading journal: trades are logged open, closed with an
//! outcome, shown on a month calendar coloured by each day's wins vs
//! losses, and rolled up into win-rate statistics per setup and direction.
//!
//! ```text
//!  ┌──────────────┐  JSON over HTTP   ┌──────────────┐
//!  │  Dashboard   │ ────────────────▶ │   routes     │──┐
//!  └──────────────┘                   └──────────────┘  │   ┌───────────────────┐
//!                                                       ├──▶│ dyn TradeStore    │
//!  ┌──────────────┐  stdin prompts    ┌──────────────┐  │   │ ├─ PgTradeStore   │
//!  │  Terminal    │ ────────────────▶ │   cli        │──┘   │ └─ MemoryTradeStore│
//!  └──────────────┘                   └──────────────┘      └───────────────────┘
//! ```

pub mod auth;
pub mod calendar;
pub mod cli;
pub mod config;
#[cfg(feature = "postgres")]
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use error::{AppError, AppResult};
