//! Labor window enforcement.
//!
//! An entry must fall in the half-open labor window `[start, end)` of the
//! punch date or the punch is not paid. An exit past the window end is
//! clamped back to it. For a shift whose exit rolled over to the next day,
//! the clamping limit moves one day forward as well, so a 21:00 to 01:00
//! shift is paid in full.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::config::TimeWindow;

use super::shift_span::ShiftSpan;

/// Outcome of checking a span against the labor window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LaborWindowCheck {
    /// The entry is outside the window. The punch earns nothing.
    OutsideWindow,
    /// The entry is inside the window.
    Within {
        /// The span to pay, with the exit clamped when needed.
        span: ShiftSpan,
        /// Whether the exit was clamped.
        clamped: bool,
    },
}

/// Checks `span` against `window` and clamps its exit.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::{LaborWindowCheck, ShiftSpan, apply_labor_window};
/// use payroll_engine::config::TimeWindow;
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let window = TimeWindow::from_hm((10, 30), (22, 0));
///
/// let span = ShiftSpan {
///     entry: day.and_hms_opt(21, 0, 0).unwrap(),
///     exit: day.and_hms_opt(23, 30, 0).unwrap(),
///     rolled_over: false,
/// };
/// match apply_labor_window(span, &window) {
///     LaborWindowCheck::Within { span, clamped } => {
///         assert!(clamped);
///         assert_eq!(span.exit, day.and_hms_opt(22, 0, 0).unwrap());
///     }
///     LaborWindowCheck::OutsideWindow => unreachable!(),
/// }
/// ```
pub fn apply_labor_window(span: ShiftSpan, window: &TimeWindow) -> LaborWindowCheck {
    let day = span.entry.date();
    let window_start = day.and_time(window.start);
    let window_end = day.and_time(window.end);

    if span.entry < window_start || span.entry >= window_end {
        return LaborWindowCheck::OutsideWindow;
    }

    let limit = if span.rolled_over {
        window_end + Duration::days(1)
    } else {
        window_end
    };

    if span.exit > limit {
        LaborWindowCheck::Within {
            span: ShiftSpan {
                exit: window_end,
                ..span
            },
            clamped: true,
        }
    } else {
        LaborWindowCheck::Within {
            span,
            clamped: false,
        }
    }
}
