//! Special hours split.
//!
//! Hours overlapping the special window of the entry date are paid at a
//! premium. The window is not repeated on the following day, so the part
//! of an overnight shift after midnight is always normal time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::TimeWindow;

use super::shift_span::{ShiftSpan, hours_between};

/// Hours of a span split into normal and special time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursSplit {
    /// Hours outside the special window.
    pub normal_hours: Decimal,
    /// Hours inside the special window.
    pub special_hours: Decimal,
    /// All hours of the span.
    pub total_hours: Decimal,
}

/// Splits `span` into normal and special hours.
///
/// Both parts are non-negative and add up to the span length.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::{ShiftSpan, split_special_hours};
/// use payroll_engine::config::TimeWindow;
/// use rust_decimal::Decimal;
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let span = ShiftSpan {
///     entry: day.and_hms_opt(18, 0, 0).unwrap(),
///     exit: day.and_hms_opt(21, 0, 0).unwrap(),
///     rolled_over: false,
/// };
///
/// let split = split_special_hours(&span, &TimeWindow::from_hm((20, 0), (22, 0)));
/// assert_eq!(split.normal_hours, Decimal::from(2));
/// assert_eq!(split.special_hours, Decimal::from(1));
/// ```
pub fn split_special_hours(span: &ShiftSpan, special_window: &TimeWindow) -> HoursSplit {
    let day = span.entry.date();
    let window_start = day.and_time(special_window.start);
    let window_end = day.and_time(special_window.end);

    let total_hours = span.hours();
    let overlap_start = span.entry.max(window_start);
    let overlap_end = span.exit.min(window_end);
    let special_hours = hours_between(overlap_start, overlap_end).min(total_hours);
    let normal_hours = (total_hours - special_hours).max(Decimal::ZERO);

    HoursSplit {
        normal_hours,
        special_hours,
        total_hours,
    }
}
