//! Recurrence engine
//!
//! Computes the current occurrence window of a recurring schedule relative
//! to an explicit reference date. Starting at the schedule's first date, a
//! window is skipped while its end has already passed the reference; the
//! first window that has not fully elapsed is the current occurrence.
//!
//! The skip count is computed arithmetically instead of stepping one window
//! at a time, so a daily schedule started decades ago resolves in constant
//! time. The arithmetic path is required to produce exactly the same result
//! as stepwise advancement; tests pin the equivalence against a naive
//! stepper.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// How often a reminder recurs.
///
/// Stored in SQLite and serialized as the lowercase token. Parsing an
/// unrecognized token is a validation error; there is no fallback
/// frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl Frequency {
    /// Every supported frequency, shortest step first. Hosts use this to
    /// populate pickers.
    pub const ALL: [Frequency; 6] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Semiannual,
        Frequency::Annual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Semiannual => "semiannual",
            Frequency::Annual => "annual",
        }
    }

    /// Advance a date by one step of this frequency.
    ///
    /// Month and year steps keep the day-of-month; when that day does not
    /// exist in the target month it clamps to 28 (exactly 28, not the end
    /// of the month). A clamped date stays on the 28th for all later
    /// steps, since stepping is applied to the clamped date.
    pub fn advance(self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => date + Duration::days(1),
            Frequency::Weekly => date + Duration::days(7),
            Frequency::Monthly => add_months(date, 1),
            Frequency::Quarterly => add_months(date, 3),
            Frequency::Semiannual => add_months(date, 6),
            Frequency::Annual => add_months(date, 12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "semiannual" => Ok(Frequency::Semiannual),
            "annual" => Ok(Frequency::Annual),
            other => Err(AppError::Validation(format!(
                "unrecognized frequency: {}",
                other
            ))),
        }
    }
}

/// A single occurrence window of a recurring reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// First day of the window.
    pub start: NaiveDate,
    /// Last day of the window: `start + window_days`.
    pub end: NaiveDate,
}

impl Occurrence {
    fn new(start: NaiveDate, window_days: i64) -> Self {
        Self {
            start,
            end: start + Duration::days(window_days),
        }
    }

    /// Whether `date` falls inside the window, boundaries included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Compute the earliest occurrence of a schedule whose window has not fully
/// elapsed at `reference`.
///
/// Equivalent to: begin at `start` and, while the window end lies strictly
/// before `reference`, advance one frequency step. Terminates for every
/// input; a reference on or before `start` yields the first window
/// unchanged.
pub fn next_occurrence(
    start: NaiveDate,
    frequency: Frequency,
    window_days: i64,
    reference: NaiveDate,
) -> Occurrence {
    let window = Duration::days(window_days);
    let lag = reference.signed_duration_since(start).num_days() - window_days;

    // Jump over already-elapsed windows in one move. Daily and weekly steps
    // are uniform so the jump lands exactly; month-based steps under-jump
    // and let the settle loop below finish.
    let mut current = start;
    if lag > 0 {
        current = match frequency {
            Frequency::Daily => start + Duration::days(lag),
            Frequency::Weekly => start + Duration::weeks((lag + 6) / 7),
            Frequency::Monthly => bulk_month_advance(start, 1, reference - window),
            Frequency::Quarterly => bulk_month_advance(start, 3, reference - window),
            Frequency::Semiannual => bulk_month_advance(start, 6, reference - window),
            Frequency::Annual => bulk_month_advance(start, 12, reference - window),
        };
    }

    while current + window < reference {
        current = frequency.advance(current);
    }

    Occurrence::new(current, window_days)
}

/// Advance `start` by whole steps of `step_months` while staying strictly
/// inside an earlier month than `target` (the first date the next window
/// start would need to reach). Staying a month short guarantees the result
/// never passes the date stepwise advancement would produce.
fn bulk_month_advance(start: NaiveDate, step_months: i64, target: NaiveDate) -> NaiveDate {
    let month_gap = month_index(target) - month_index(start) - 1;
    if month_gap <= 0 {
        return start;
    }
    advance_steps(start, step_months, month_gap / step_months)
}

/// Apply `steps` month steps with stepwise day-of-month behavior: a day
/// past the 28th clamps to 28 at the first visited month where it does not
/// exist and then stays put.
fn advance_steps(start: NaiveDate, step_months: i64, steps: i64) -> NaiveDate {
    let mut current = start;
    let mut remaining = steps;

    // A day <= 28 exists in every month and never clamps. Larger days are
    // stepped singly until the clamp happens or enough steps have passed to
    // prove the day survives every month the cycle visits: 48 steps cover
    // four years at the smallest step, including leap and common Februaries.
    let mut probes = 0;
    while remaining > 0 && current.day() > 28 && probes < 48 {
        current = add_months(current, step_months);
        remaining -= 1;
        probes += 1;
    }

    if remaining > 0 {
        current = add_months(current, step_months * remaining);
    }
    current
}

/// Add calendar months, keeping the day-of-month and clamping to day 28
/// when the target month is shorter.
fn add_months(date: NaiveDate, months: i64) -> NaiveDate {
    let total = month_index(date) + months;
    let year = total.div_euclid(12) as i32;
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, month, 28))
        .unwrap_or(NaiveDate::MIN) // unreachable: day 28 exists in every month
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}
