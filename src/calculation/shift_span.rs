//! Shift span resolution.
//!
//! Turns a punch's date and clock readings into a concrete interval. An
//! exit earlier in the day than the entry belongs to the next calendar day.

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::Punch;

/// A punch placed on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSpan {
    /// Entry on the punch date.
    pub entry: NaiveDateTime,
    /// Exit, on the punch date or the day after.
    pub exit: NaiveDateTime,
    /// Whether the exit was moved to the next day.
    pub rolled_over: bool,
}

impl ShiftSpan {
    /// Length of the span in hours.
    pub fn hours(&self) -> Decimal {
        hours_between(self.entry, self.exit)
    }
}

/// Resolves the span of a punch.
///
/// # Errors
///
/// Returns [`EngineError::InvalidTime`](crate::error::EngineError::InvalidTime)
/// if either side is absent or unreadable.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::resolve_shift_span;
/// use payroll_engine::models::{ClockReading, Punch, PunchId};
/// use rust_decimal::Decimal;
///
/// let punch = Punch {
///     id: PunchId::source(0),
///     employee: "Ana".to_string(),
///     date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
///     entry: ClockReading::from_raw("21:00"),
///     exit: ClockReading::from_raw("1:00"),
///     inventory_deduction: Decimal::ZERO,
///     cash_deduction: Decimal::ZERO,
///     withdrawal: Decimal::ZERO,
/// };
///
/// let span = resolve_shift_span(&punch).unwrap();
/// assert!(span.rolled_over);
/// assert_eq!(span.exit.date(), NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
/// assert_eq!(span.hours(), Decimal::from(4));
/// ```
pub fn resolve_shift_span(punch: &Punch) -> EngineResult<ShiftSpan> {
    let entry = punch.date.and_time(punch.entry_time()?);
    let mut exit = punch.date.and_time(punch.exit_time()?);

    let rolled_over = exit < entry;
    if rolled_over {
        exit += Duration::days(1);
    }

    Ok(ShiftSpan {
        entry,
        exit,
        rolled_over,
    })
}

/// Hours from `start` to `end`, zero when `end` is not after `start`.
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> Decimal {
    let seconds = (end - start).num_seconds().max(0);
    Decimal::from(seconds) / Decimal::from(3600)
}
