//! Holiday pay factor.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::HolidaySet;

/// Multiplier applied to gross pay on a holiday.
pub const HOLIDAY_FACTOR: Decimal = Decimal::TWO;

/// Returns [`HOLIDAY_FACTOR`] when `date` is a holiday, one otherwise.
///
/// Only the full calendar date is compared.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::holiday_factor;
/// use payroll_engine::models::HolidaySet;
/// use rust_decimal::Decimal;
///
/// let christmas = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
/// let holidays: HolidaySet = [christmas].into_iter().collect();
///
/// assert_eq!(holiday_factor(christmas, &holidays), Decimal::TWO);
/// assert_eq!(holiday_factor(christmas.succ_opt().unwrap(), &holidays), Decimal::ONE);
/// ```
pub fn holiday_factor(date: NaiveDate, holidays: &HolidaySet) -> Decimal {
    if holidays.contains(date) {
        HOLIDAY_FACTOR
    } else {
        Decimal::ONE
    }
}
