//! `h:mm` formatting of decimal hours.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Formats decimal hours as `h:mm`, rounding to the nearest minute.
///
/// Negative input is treated as zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::format_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_hours(Decimal::new(75, 1)), "7:30");
/// assert_eq!(format_hours(Decimal::new(25, 2)), "0:15");
/// assert_eq!(format_hours(Decimal::ZERO), "0:00");
/// ```
pub fn format_hours(hours: Decimal) -> String {
    let minutes = (hours.max(Decimal::ZERO) * Decimal::from(60))
        .round()
        .to_i64()
        .unwrap_or(0);
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_nearest_minute() {
        // 20 minutes is a repeating decimal in hours.
        let third = Decimal::ONE / Decimal::from(3);
        assert_eq!(format_hours(third), "0:20");
        assert_eq!(format_hours(Decimal::new(9999, 3)), "10:00");
    }

    #[test]
    fn test_long_shift() {
        assert_eq!(format_hours(Decimal::from(26)), "26:00");
    }

    #[test]
    fn test_negative_is_zero() {
        assert_eq!(format_hours(Decimal::from(-1)), "0:00");
    }
}
