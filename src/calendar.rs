//! # calendar
//!
//! Month navigation for the journal page.  The displayed month and the
//! selected day arrive with every request and leave with every response;
//! nothing is held between requests.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{DateRange, DayColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub year:     i32,
    pub month:    u32,
    pub selected: NaiveDate,
}

/// One square of the Monday-first month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub date:     NaiveDate,
    pub day:      u32,
    /// `false` for padding days of the previous / next month.
    pub in_month: bool,
    pub selected: bool,
    /// Only set for in-month days that have trades.
    pub color:    Option<DayColor>,
}

impl CalendarView {
    /// Builds the view from optional request parameters; anything missing
    /// falls back to `today`.
    pub fn resolve(
        year: Option<i32>,
        month: Option<u32>,
        selected: Option<NaiveDate>,
        today: NaiveDate,
    ) -> AppResult<Self> {
        let selected = selected.unwrap_or(today);
        let year = year.unwrap_or(selected.year());
        let month = month.unwrap_or(selected.month());
        if !(1..=12).contains(&month) {
            return Err(AppError::validation(format!("Month must be 1-12, got {month}")));
        }
        Ok(Self { year, month, selected })
    }

    pub fn prev_month(&self) -> Self {
        let (year, month) = if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        };
        Self { year, month, ..*self }
    }

    pub fn next_month(&self) -> Self {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        Self { year, month, ..*self }
    }

    pub fn range(&self) -> AppResult<DateRange> {
        DateRange::month(self.year, self.month)
    }

    /// `"May 2024"`.
    pub fn label(&self) -> AppResult<String> {
        Ok(self.range()?.start.format("%B %Y").to_string())
    }

    /// Full Monday-to-Sunday weeks covering the month.
    pub fn weeks(&self, colors: &BTreeMap<NaiveDate, DayColor>) -> AppResult<Vec<Vec<CalendarCell>>> {
        let range = self.range()?;
        let lead = u64::from(range.start.weekday().num_days_from_monday());
        let trail = u64::from(6 - range.end.weekday().num_days_from_monday());

        let first = range.start - Days::new(lead);
        let last = range.end + Days::new(trail);

        let cells: Vec<CalendarCell> = first
            .iter_days()
            .take_while(|d| *d <= last)
            .map(|date| {
                let in_month = range.contains(date);
                CalendarCell {
                    date,
                    day: date.day(),
                    in_month,
                    selected: date == self.selected,
                    color: if in_month { colors.get(&date).copied() } else { None },
                }
            })
            .collect();

        Ok(cells.chunks(7).map(<[CalendarCell]>::to_vec).collect())
    }
}
