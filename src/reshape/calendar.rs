// src/reshape/calendar.rs

use chrono::{Datelike, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which day of the month a monthly row is stamped with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthAnchor {
    #[default]
    MonthStart,
    MonthEnd,
}

/// Positional monthly calendar: row `i` is the month `i` months after the
/// month of `start`, stamped with the anchor day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyCalendar {
    start: NaiveDate,
    anchor: MonthAnchor,
}

fn first_of_month(d: NaiveDate) -> Option<NaiveDate> {
    d.with_day(1)
}

fn last_of_month(d: NaiveDate) -> Option<NaiveDate> {
    first_of_month(d)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

fn anchored(d: NaiveDate, anchor: MonthAnchor) -> Option<NaiveDate> {
    match anchor {
        MonthAnchor::MonthStart => first_of_month(d),
        MonthAnchor::MonthEnd => last_of_month(d),
    }
}

impl MonthlyCalendar {
    pub fn new(start: NaiveDate, anchor: MonthAnchor) -> Self {
        Self { start, anchor }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn date_at(&self, index: usize) -> Result<NaiveDate> {
        let months = u32::try_from(index)
            .map_err(|_| Error::Config(format!("row {index} is beyond the calendar range")))?;
        // Step from day 1 so a start late in the month never clamps.
        first_of_month(self.start)
            .and_then(|d| d.checked_add_months(Months::new(months)))
            .and_then(|d| anchored(d, self.anchor))
            .ok_or_else(|| Error::Config(format!("row {index} is beyond the calendar range")))
    }

    /// Dates for the first `n` rows.
    pub fn dates(&self, n: usize) -> Result<Vec<NaiveDate>> {
        (0..n).map(|i| self.date_at(i)).collect()
    }
}

impl Default for MonthlyCalendar {
    fn default() -> Self {
        Self::new(
            NaiveDate::from_ymd_opt(2019, 1, 1).expect("valid default start"),
            MonthAnchor::MonthStart,
        )
    }
}

static PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-?M?(\d{1,2})$").expect("period regex should compile"));

/// Parse a monthly period id (`2019-M01`, `2019-M1`, `2019-01`, `2019M01`).
pub fn parse_period(id: &str, anchor: MonthAnchor) -> Result<NaiveDate> {
    let caps = PERIOD_RE
        .captures(id.trim())
        .ok_or_else(|| Error::Schema(format!("time period {id:?} is not a monthly period")))?;
    let year: i32 = caps[1]
        .parse()
        .map_err(|_| Error::Schema(format!("bad year in period {id:?}")))?;
    let month: u32 = caps[2]
        .parse()
        .map_err(|_| Error::Schema(format!("bad month in period {id:?}")))?;
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| anchored(d, anchor))
        .ok_or_else(|| Error::Schema(format!("period {id:?} is not a valid month")))
}
