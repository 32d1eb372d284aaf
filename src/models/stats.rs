//! # models::stats
//!
//! Aggregate shapes returned by the query layer: win/loss [`Tally`] counts,
//! per-setup and per-direction rows, calendar [`DayColor`]s and the
//! inclusive [`DateRange`] every statistics query filters on.

use chrono::{Datelike, Months, NaiveDate};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{AppError, AppResult};
use crate::models::{Direction, Outcome, Setup};

// ─── Tally ────────────────────────────────────────────────────────────────────

/// `total` counts every trade in the group; `wins` / `losses` count
/// outcomes.  Breakeven and open trades add to `total` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub total:  i64,
    pub wins:   i64,
    pub losses: i64,
}

impl Tally {
    pub fn new(total: i64, wins: i64, losses: i64) -> Self {
        Self { total, wins, losses }
    }

    pub fn record(&mut self, outcome: Option<Outcome>) {
        self.total += 1;
        match outcome {
            Some(Outcome::Win) => self.wins += 1,
            Some(Outcome::Loss) => self.losses += 1,
            Some(Outcome::Breakeven) | None => {}
        }
    }

    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Option<Outcome>>,
    {
        let mut tally = Tally::default();
        for outcome in outcomes {
            tally.record(outcome);
        }
        tally
    }

    /// `wins / total × 100`; `None` when there is nothing to rate.
    pub fn win_rate(&self) -> Option<f64> {
        if self.total > 0 {
            Some(self.wins as f64 / self.total as f64 * 100.0)
        } else {
            None
        }
    }

    /// `"62.5%"`, or `"n/a"` without data.
    pub fn win_rate_label(&self) -> String {
        match self.win_rate() {
            Some(rate) => format!("{rate:.1}%"),
            None => "n/a".to_string(),
        }
    }

    pub fn day_color(&self) -> DayColor {
        use std::cmp::Ordering;

        match self.wins.cmp(&self.losses) {
            Ordering::Greater => DayColor::Green,
            Ordering::Less => DayColor::Red,
            Ordering::Equal => DayColor::Gray,
        }
    }
}

impl std::ops::Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        Tally {
            total:  self.total + rhs.total,
            wins:   self.wins + rhs.wins,
            losses: self.losses + rhs.losses,
        }
    }
}

impl std::iter::Sum for Tally {
    fn sum<I: Iterator<Item = Tally>>(iter: I) -> Tally {
        iter.fold(Tally::default(), |acc, t| acc + t)
    }
}

// win_rate is derived, so it is written alongside the counts.
impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Tally", 4)?;
        s.serialize_field("total", &self.total)?;
        s.serialize_field("wins", &self.wins)?;
        s.serialize_field("losses", &self.losses)?;
        s.serialize_field("win_rate", &self.win_rate())?;
        s.end()
    }
}

// ─── Grouped rows ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SetupStats {
    pub setup: Setup,
    #[serde(flatten)]
    pub tally: Tally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DirectionStats {
    pub direction: Direction,
    #[serde(flatten)]
    pub tally: Tally,
}

// ─── DayColor ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayColor {
    Green,
    Red,
    Gray,
}

// ─── DateRange ────────────────────────────────────────────────────────────────

/// Inclusive on both ends; only the date part of a trade timestamp is
/// compared against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end:   NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start > end {
            return Err(AppError::validation(format!(
                "Start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Widest range PostgreSQL `date` and chrono agree on comfortably.
    pub fn all_time() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN),
            end:   NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }

    /// First through last day of a calendar month.
    pub fn month(year: i32, month: u32) -> AppResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            AppError::validation(format!("Invalid month {year}-{month:02}"))
        })?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| AppError::validation(format!("Invalid month {year}-{month:02}")))?;
        Ok(Self { start, end })
    }

    /// From the first of `today`'s month up to `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            start: today.with_day(1).unwrap_or(today),
            end:   today,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}
