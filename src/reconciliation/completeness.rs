//! Separation of punches without any attendance.

use tracing::info;

use crate::models::Punch;

/// Splits punches into those with at least one recorded clock value and
/// those with neither.
///
/// Both halves keep their relative input order. Excluded punches take no
/// further part in reconciliation or payroll.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{ClockReading, Punch, PunchId};
/// use payroll_engine::reconciliation::split_attendance;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let punch = |row: usize, entry: &str, exit: &str| Punch {
///     id: PunchId::source(row),
///     employee: "Ana".to_string(),
///     date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
///     entry: ClockReading::from_raw(entry),
///     exit: ClockReading::from_raw(exit),
///     inventory_deduction: Decimal::ZERO,
///     cash_deduction: Decimal::ZERO,
///     withdrawal: Decimal::ZERO,
/// };
///
/// let (with, without) = split_attendance(vec![punch(0, "", "nan"), punch(1, "11:00", "")]);
/// assert_eq!(with.len(), 1);
/// assert_eq!(without[0].id, PunchId::source(0));
/// ```
pub fn split_attendance(punches: Vec<Punch>) -> (Vec<Punch>, Vec<Punch>) {
    let (without, with): (Vec<Punch>, Vec<Punch>) = punches
        .into_iter()
        .partition(Punch::is_without_attendance);

    if !without.is_empty() {
        info!(
            excluded = without.len(),
            "Excluded punches without entry or exit"
        );
    }

    (with, without)
}
