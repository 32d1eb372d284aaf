//! # models::trade
//!
//! The journal's one record type, [`Trade`], and the closed enumerations it
//! is tagged with.  Every enum is parsed from user text here, before any
//! store call, so an unknown `direction` / `setup` / `outcome` never reaches
//! the database.

use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Fractional digits kept for prices (`NUMERIC(18,5)` in PostgreSQL).
pub const PRICE_SCALE: i64 = 5;

/// Integer digits left by `NUMERIC(18,5)`.
const PRICE_INTEGER_DIGITS: u32 = 13;

// ─── Direction ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Long, Direction::Short];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl FromStr for Direction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LONG" => Ok(Direction::Long),
            "SHORT" => Ok(Direction::Short),
            other => Err(AppError::validation(format!(
                "Direction must be LONG or SHORT, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ─── Setup ────────────────────────────────────────────────────────────────────

/// Strategy / pattern tag.  Declaration order is label order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Setup {
    A,
    B,
    C,
}

impl Setup {
    pub const ALL: [Setup; 3] = [Setup::A, Setup::B, Setup::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            Setup::A => "A",
            Setup::B => "B",
            Setup::C => "C",
        }
    }

    /// Parses a comma separated list such as `"A,C"`.  Duplicates collapse;
    /// the result is in label order.
    pub fn parse_list(raw: &str) -> AppResult<Vec<Setup>> {
        let mut setups = raw
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Setup::from_str)
            .collect::<AppResult<Vec<_>>>()?;
        setups.sort();
        setups.dedup();
        Ok(setups)
    }
}

impl FromStr for Setup {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Setup::A),
            "B" => Ok(Setup::B),
            "C" => Ok(Setup::C),
            other => Err(AppError::validation(format!(
                "Setup must be A, B, or C, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ─── Outcome ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "WIN",
            Outcome::Loss => "LOSS",
            Outcome::Breakeven => "BREAKEVEN",
        }
    }
}

impl FromStr for Outcome {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WIN" => Ok(Outcome::Win),
            "LOSS" => Ok(Outcome::Loss),
            "BREAKEVEN" => Ok(Outcome::Breakeven),
            other => Err(AppError::validation(format!(
                "Outcome must be WIN, LOSS, or BREAKEVEN, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ─── Trade ────────────────────────────────────────────────────────────────────

/// One logged trade.  `outcome == None` means the trade is still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id:              i64,
    pub trade_date:      NaiveDateTime,
    pub symbol:          String,
    pub direction:       Direction,
    pub setup:           Setup,
    pub entry_price:     BigDecimal,
    pub exit_price:      Option<BigDecimal>,
    pub outcome:         Option<Outcome>,
    pub notes:           Option<String>,
    pub screenshot_path: Option<String>,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.outcome.is_none()
    }

    /// Calendar day the trade belongs to (time of day ignored).
    pub fn day(&self) -> NaiveDate {
        self.trade_date.date()
    }
}

// ─── Write payloads ───────────────────────────────────────────────────────────

/// Everything needed to record a new (open) trade.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrade {
    /// `None` = the store stamps the current local time.
    pub trade_date:      Option<NaiveDateTime>,
    pub symbol:          String,
    pub direction:       Direction,
    pub setup:           Setup,
    pub entry_price:     BigDecimal,
    pub notes:           Option<String>,
    pub screenshot_path: Option<String>,
}

impl NewTrade {
    pub fn new(
        symbol: &str,
        direction: Direction,
        setup: Setup,
        entry_price: BigDecimal,
    ) -> AppResult<Self> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(AppError::validation("Symbol is required"));
        }

        Ok(Self {
            trade_date: None,
            symbol,
            direction,
            setup,
            entry_price: entry_price.round(PRICE_SCALE),
            notes: None,
            screenshot_path: None,
        })
    }

    /// Dates the trade at midnight of `day` (the dashboard's selected day).
    pub fn on_day(mut self, day: NaiveDate) -> Self {
        self.trade_date = Some(day.and_time(NaiveTime::MIN));
        self
    }

    pub fn at(mut self, when: NaiveDateTime) -> Self {
        self.trade_date = Some(when);
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = normalize_notes(notes);
        self
    }

    pub fn with_screenshot(mut self, path: Option<String>) -> Self {
        self.screenshot_path = path;
        self
    }
}

/// Full overwrite of a trade's mutable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeUpdate {
    pub entry_price: BigDecimal,
    pub exit_price:  Option<BigDecimal>,
    pub outcome:     Outcome,
    pub notes:       Option<String>,
}

impl TradeUpdate {
    pub fn new(
        entry_price: BigDecimal,
        exit_price: Option<BigDecimal>,
        outcome: Outcome,
        notes: Option<String>,
    ) -> Self {
        Self {
            entry_price: entry_price.round(PRICE_SCALE),
            exit_price: normalize_exit_price(exit_price),
            outcome,
            notes: normalize_notes(notes),
        }
    }
}

// ─── Boundary rules ───────────────────────────────────────────────────────────

/// A non-positive exit price means "unset" and is stored as NULL.
pub fn normalize_exit_price(price: Option<BigDecimal>) -> Option<BigDecimal> {
    price
        .filter(|p| *p > BigDecimal::zero())
        .map(|p| p.round(PRICE_SCALE))
}

/// Blank notes are stored as NULL.
pub fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Parses a decimal price typed by the user.
pub fn parse_price(raw: &str, field: &str) -> AppResult<BigDecimal> {
    let price = BigDecimal::from_str(raw.trim()).map_err(|_| {
        AppError::validation(format!("{field} must be a number, got '{}'", raw.trim()))
    })?;

    let limit = BigDecimal::from(10_i64.pow(PRICE_INTEGER_DIGITS));
    if price.round(PRICE_SCALE).abs() >= limit {
        return Err(AppError::validation(format!(
            "{field} must have at most {PRICE_INTEGER_DIGITS} digits before the decimal point"
        )));
    }
    Ok(price)
}

/// Parses an optional price: blank input is `None`.
pub fn parse_optional_price(raw: &str, field: &str) -> AppResult<Option<BigDecimal>> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_price(raw, field).map(Some)
    }
}

/// Parses a trade id: digits only.
pub fn parse_trade_id(raw: &str) -> AppResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::validation("Trade ID must be a number"));
    }
    raw.parse()
        .map_err(|_| AppError::validation("Trade ID must be a number"))
}

pub fn parse_date(raw: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::validation(format!("{field} must be a date (YYYY-MM-DD), got '{}'", raw.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!(" long ".parse::<Direction>().unwrap(), Direction::Long);
        assert_eq!("b".parse::<Setup>().unwrap(), Setup::B);
        assert_eq!("Breakeven".parse::<Outcome>().unwrap(), Outcome::Breakeven);
    }

    #[test]
    fn unknown_enum_values_are_validation_errors() {
        assert!(matches!("FLAT".parse::<Direction>(), Err(AppError::Validation(_))));
        assert!(matches!("D".parse::<Setup>(), Err(AppError::Validation(_))));
        assert!(matches!("DRAW".parse::<Outcome>(), Err(AppError::Validation(_))));
    }

    #[test]
    fn setup_list_is_sorted_and_deduplicated() {
        assert_eq!(Setup::parse_list("c, a,C").unwrap(), vec![Setup::A, Setup::C]);
        assert!(Setup::parse_list("").unwrap().is_empty());
        assert!(Setup::parse_list("A,Z").is_err());
    }

    #[test]
    fn non_positive_exit_price_is_unset() {
        assert_eq!(normalize_exit_price(Some(dec("0"))), None);
        assert_eq!(normalize_exit_price(Some(dec("-1.2"))), None);
        assert_eq!(normalize_exit_price(None), None);
        assert_eq!(normalize_exit_price(Some(dec("1.0850"))), Some(dec("1.085")));
    }

    #[test]
    fn prices_keep_five_fractional_digits() {
        let trade = NewTrade::new("eurusd", Direction::Long, Setup::A, dec("1.0800049")).unwrap();
        assert_eq!(trade.entry_price, dec("1.08000"));
        assert_eq!(trade.symbol, "EURUSD");
    }

    #[test]
    fn blank_symbol_is_rejected() {
        let err = NewTrade::new("   ", Direction::Short, Setup::C, dec("1")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn on_day_stamps_midnight() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let trade = NewTrade::new("EURUSD", Direction::Long, Setup::A, dec("1.08"))
            .unwrap()
            .on_day(day);
        assert_eq!(trade.trade_date, Some(day.and_hms_opt(0, 0, 0).unwrap()));
    }

    #[test]
    fn blank_notes_become_none() {
        assert_eq!(normalize_notes(Some("  ".into())), None);
        assert_eq!(normalize_notes(Some(" ok ".into())), Some("ok".into()));
    }

    #[test]
    fn trade_id_must_be_digits() {
        assert_eq!(parse_trade_id(" 12 ").unwrap(), 12);
        assert!(parse_trade_id("-3").is_err());
        assert!(parse_trade_id("abc").is_err());
        assert!(parse_trade_id("").is_err());
    }

    #[test]
    fn optional_price_blank_is_none() {
        assert_eq!(parse_optional_price("  ", "Exit price").unwrap(), None);
        assert_eq!(parse_optional_price("1.5", "Exit price").unwrap(), Some(dec("1.5")));
        assert!(parse_optional_price("one", "Exit price").is_err());
    }

    #[test]
    fn prices_must_fit_the_price_column() {
        assert_eq!(parse_price("9999999999999.99999", "Entry price").unwrap(), dec("9999999999999.99999"));
        assert!(matches!(parse_price("10000000000000", "Entry price"), Err(AppError::Validation(_))));
        assert!(matches!(parse_price("1e20", "Entry price"), Err(AppError::Validation(_))));
        assert!(matches!(parse_optional_price("-99999999999999", "Exit price"), Err(AppError::Validation(_))));
    }
}
