//! Per-punch payroll calculation.
//!
//! Combines the span, labor window, special hours and holiday rules into
//! a [`PayrollResult`] for one punch.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::PayrollRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{HolidaySet, PayrollResult, Punch};

use super::holiday_factor::holiday_factor;
use super::labor_window::{LaborWindowCheck, apply_labor_window};
use super::shift_span::resolve_shift_span;
use super::special_hours::split_special_hours;

/// Rejects negative hourly rates.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRate`] when `rate` is below zero.
pub fn validate_rate(rate: Decimal) -> EngineResult<Decimal> {
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(EngineError::InvalidRate {
            rate: rate.to_string(),
        });
    }
    Ok(rate)
}

/// Computes hours and pay for one punch.
///
/// The steps are:
///
/// 1. resolve the span, rolling the exit to the next day when it is
///    earlier than the entry;
/// 2. return a zero result with an observation when the entry is outside
///    the labor window, otherwise clamp the exit to the window end;
/// 3. split the hours into normal and special time;
/// 4. `gross = (normal × rate + special × rate × premium) × holiday factor`;
/// 5. `net = gross − inventory − cash − withdrawal`, rounded to cents.
///
/// Net pay may be negative when deductions exceed gross.
///
/// # Errors
///
/// Returns [`EngineError::InvalidTime`] when either clock reading is
/// absent or unreadable, and [`EngineError::AmountOverflow`] when the rate
/// or deductions are too large for the pay to be represented. Callers
/// decide whether that fails the batch.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::compute_punch_pay;
/// use payroll_engine::config::PayrollRules;
/// use payroll_engine::models::{ClockReading, HolidaySet, Punch, PunchId};
/// use rust_decimal::Decimal;
///
/// let punch = Punch {
///     id: PunchId::source(0),
///     employee: "Ana".to_string(),
///     date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
///     entry: ClockReading::from_raw("18:00"),
///     exit: ClockReading::from_raw("21:00"),
///     inventory_deduction: Decimal::ZERO,
///     cash_deduction: Decimal::ZERO,
///     withdrawal: Decimal::ZERO,
/// };
///
/// let result = compute_punch_pay(
///     &punch,
///     Decimal::from(1000),
///     &HolidaySet::new(),
///     &PayrollRules::default(),
/// )
/// .unwrap();
///
/// assert_eq!(result.normal_hours, Decimal::from(2));
/// assert_eq!(result.special_hours, Decimal::from(1));
/// assert_eq!(result.net_pay, Decimal::from(3300));
/// ```
pub fn compute_punch_pay(
    punch: &Punch,
    rate: Decimal,
    holidays: &HolidaySet,
    rules: &PayrollRules,
) -> EngineResult<PayrollResult> {
    let span = resolve_shift_span(punch)?;

    let span = match apply_labor_window(span, &rules.labor_window) {
        LaborWindowCheck::OutsideWindow => {
            debug!(punch = %punch.id, entry = %span.entry, "Entry outside labor window");
            return Ok(PayrollResult::outside_labor_window(
                punch.id,
                format!("Outside labor window ({})", rules.labor_window_label()),
            ));
        }
        LaborWindowCheck::Within { span, clamped } => {
            if clamped {
                debug!(punch = %punch.id, exit = %span.exit, "Exit clamped to labor window end");
            }
            span
        }
    };

    let split = split_special_hours(&span, &rules.special_window);
    let factor = holiday_factor(punch.date, holidays);

    let overflow = || EngineError::AmountOverflow {
        punch: punch.id.to_string(),
    };
    let gross = gross_pay(
        split.normal_hours,
        split.special_hours,
        rate,
        rules.special_premium,
        factor,
    )
    .ok_or_else(overflow)?;
    let net = punch
        .total_deductions()
        .and_then(|deductions| gross.checked_sub(deductions))
        .ok_or_else(overflow)?;

    let result = PayrollResult {
        punch: punch.id,
        normal_hours: split.normal_hours,
        special_hours: split.special_hours,
        total_hours: split.total_hours,
        holiday_applied: factor != Decimal::ONE,
        deductions_applied: true,
        gross_pay: gross.round_dp(2),
        net_pay: net.round_dp(2),
        observation: None,
    };

    debug!(
        punch = %punch.id,
        hours = %result.total_hours.round_dp(4),
        net_pay = %result.net_pay,
        "Computed punch pay"
    );

    Ok(result)
}

/// `(normal × rate + special × rate × premium) × factor`, or `None` on overflow.
fn gross_pay(
    normal_hours: Decimal,
    special_hours: Decimal,
    rate: Decimal,
    premium: Decimal,
    factor: Decimal,
) -> Option<Decimal> {
    let normal = normal_hours.checked_mul(rate)?;
    let special = special_hours.checked_mul(rate)?.checked_mul(premium)?;
    normal.checked_add(special)?.checked_mul(factor)
}
