//! Batch aggregation.
//!
//! Runs [`compute_punch_pay`] over a whole batch, turns each result into
//! an output [`PayrollRow`] and accumulates [`BatchTotals`]. A row that
//! fails is recorded and skipped without stopping the batch.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::PayrollRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    BatchReport, BatchTotals, ClockSide, HolidaySet, PayrollResult, PayrollRow, Punch, RowFailure,
    format_clock,
};

use super::hours_format::format_hours;
use super::payroll::compute_punch_pay;

/// Computes every punch of a batch in input order.
///
/// Totals only include rows that produced a result. Failed rows are
/// returned in [`BatchReport::failures`] and logged at `warn` level.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::aggregate_batch;
/// use payroll_engine::config::PayrollRules;
/// use payroll_engine::models::{ClockReading, HolidaySet, Punch, PunchId};
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
/// let report = aggregate_batch(
///     &[punch(0, "11:00", "19:00"), punch(1, "11:00", "late")],
///     Decimal::from(1000),
///     &HolidaySet::new(),
///     &PayrollRules::default(),
/// );
///
/// assert_eq!(report.rows.len(), 1);
/// assert_eq!(report.failures[0].line(), 3);
/// assert_eq!(report.totals.total_pay, Decimal::from(8000));
/// ```
pub fn aggregate_batch(
    punches: &[Punch],
    rate: Decimal,
    holidays: &HolidaySet,
    rules: &PayrollRules,
) -> BatchReport {
    let mut report = BatchReport::default();

    for punch in punches {
        let outcome = compute_punch_pay(punch, rate, holidays, rules)
            .and_then(|result| accumulate(&mut report.totals, punch, &result).map(|()| result));

        match outcome {
            Ok(result) => {
                report.rows.push(build_payroll_row(punch, &result));
                report.results.push(result);
            }
            Err(err) => {
                warn!(
                    line = punch.id.row + 2,
                    employee = %punch.employee,
                    date = %punch.date,
                    error = %err,
                    "Row failed payroll calculation, skipping"
                );
                report.failures.push(RowFailure {
                    row: punch.id.row,
                    employee: punch.employee.clone(),
                    date: punch.date.to_string(),
                    message: err.to_string(),
                });
            }
        }
    }

    report.totals.failed_rows = report.failures.len();

    info!(
        computed = report.totals.computed_rows,
        failed = report.totals.failed_rows,
        total_pay = %report.totals.total_pay,
        total_hours = %format_hours(report.totals.total_hours),
        "Batch payroll computed"
    );

    report
}

/// Adds a result to the totals, leaving them untouched if the pay total
/// would overflow.
fn accumulate(totals: &mut BatchTotals, punch: &Punch, result: &PayrollResult) -> EngineResult<()> {
    let total_pay = totals
        .total_pay
        .checked_add(result.net_pay)
        .ok_or_else(|| EngineError::AmountOverflow {
            punch: punch.id.to_string(),
        })?;

    totals.total_pay = total_pay;
    totals.total_hours += result.total_hours;
    totals.total_normal_hours += result.normal_hours;
    totals.total_special_hours += result.special_hours;
    totals.computed_rows += 1;
    Ok(())
}

/// Builds the output row for a computed punch.
///
/// Clock values are written as `H:MM` as recorded, not as clamped. A
/// punch paid nothing for being outside the labor window shows zero
/// deductions.
pub fn build_payroll_row(punch: &Punch, result: &PayrollResult) -> PayrollRow {
    let clock = |side: ClockSide| {
        punch
            .reading(side)
            .time(side)
            .map(format_clock)
            .unwrap_or_else(|_| punch.reading(side).as_str().to_string())
    };
    let charged = |amount: Decimal| {
        if result.deductions_applied {
            amount
        } else {
            Decimal::ZERO
        }
    };

    PayrollRow {
        employee: punch.employee.clone(),
        date: punch.date.format("%Y-%m-%d").to_string(),
        entry: clock(ClockSide::Entry),
        exit: clock(ClockSide::Exit),
        holiday: if result.holiday_applied { "Yes" } else { "No" }.to_string(),
        worked_hours: format_hours(result.total_hours),
        normal_hours: format_hours(result.normal_hours),
        special_hours: format_hours(result.special_hours),
        inventory_deduction: charged(punch.inventory_deduction),
        cash_deduction: charged(punch.cash_deduction),
        withdrawal: charged(punch.withdrawal),
        final_salary: result.net_pay,
        observations: result.observation.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockReading, PunchId};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_punch(row: usize, entry: &str, exit: &str) -> Punch {
        Punch {
            id: PunchId::source(row),
            employee: format!("Employee {}", row),
            date: NaiveDate::from_ymd_opt(2025, 12, 25).unwrap(),
            entry: ClockReading::from_raw(entry),
            exit: ClockReading::from_raw(exit),
            inventory_deduction: dec("100"),
            cash_deduction: Decimal::ZERO,
            withdrawal: Decimal::ZERO,
        }
    }

    fn run(punches: &[Punch], holidays: &HolidaySet) -> BatchReport {
        aggregate_batch(punches, dec("1000"), holidays, &PayrollRules::default())
    }

    /// AGG-001: totals only count successful rows
    #[test]
    fn test_totals_skip_failed_rows() {
        let report = run(
            &[
                make_punch(0, "11:00", "19:00"),
                make_punch(1, "bad", "19:00"),
                make_punch(2, "18:00", "21:00"),
            ],
            &HolidaySet::new(),
        );

        assert_eq!(report.totals.computed_rows, 2);
        assert_eq!(report.totals.failed_rows, 1);
        assert_eq!(report.totals.total_hours, Decimal::from(11));
        assert_eq!(report.totals.total_normal_hours, Decimal::from(10));
        assert_eq!(report.totals.total_special_hours, Decimal::ONE);
        // 8000 - 100 + 3300 - 100
        assert_eq!(report.totals.total_pay, dec("11100.00"));

        let failure = &report.failures[0];
        assert_eq!(failure.row, 1);
        assert_eq!(failure.employee, "Employee 1");
        assert_eq!(failure.date, "2025-12-25");
        assert_eq!(failure.message, "Invalid entry time 'bad'");
    }

    /// AGG-002: output rows keep input order and use H:MM
    #[test]
    fn test_rows_follow_input_order() {
        let report = run(
            &[make_punch(3, "09:00", "17:00"), make_punch(1, "10:30:00", "18:05")],
            &HolidaySet::new(),
        );
        let employees: Vec<&str> = report.rows.iter().map(|r| r.employee.as_str()).collect();
        assert_eq!(employees, vec!["Employee 3", "Employee 1"]);
        assert_eq!(report.rows[1].entry, "10:30");
        assert_eq!(report.rows[1].worked_hours, "7:35");
    }

    /// AGG-003: out-of-window rows show zero deductions and a note
    #[test]
    fn test_outside_window_row() {
        let report = run(&[make_punch(0, "9:00", "17:00")], &HolidaySet::new());
        let row = &report.rows[0];
        assert_eq!(row.entry, "9:00");
        assert_eq!(row.worked_hours, "0:00");
        assert_eq!(row.inventory_deduction, Decimal::ZERO);
        assert_eq!(row.final_salary, Decimal::ZERO);
        assert_eq!(row.holiday, "No");
        assert_eq!(row.observations, "Outside labor window (10:30-22:00)");
        assert_eq!(report.totals.computed_rows, 1);
    }

    /// AGG-004: holiday rows are marked and doubled
    #[test]
    fn test_holiday_row() {
        let holidays: HolidaySet = [NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()]
            .into_iter()
            .collect();
        let report = run(&[make_punch(0, "12:00", "14:00")], &holidays);
        let row = &report.rows[0];
        assert_eq!(row.holiday, "Yes");
        assert_eq!(row.inventory_deduction, dec("100"));
        assert_eq!(row.final_salary, dec("3900.00"));
    }

    #[test]
    fn test_clamped_row_shows_recorded_exit() {
        let report = run(&[make_punch(0, "21:00", "23:30")], &HolidaySet::new());
        assert_eq!(report.rows[0].exit, "23:30");
        assert_eq!(report.rows[0].worked_hours, "1:00");
        assert_eq!(report.rows[0].special_hours, "1:00");
    }

    /// AGG-005: a rate that overflows fails every row instead of panicking
    #[test]
    fn test_overflowing_rate_fails_rows() {
        let report = aggregate_batch(
            &[make_punch(0, "11:00", "19:00")],
            Decimal::MAX,
            &HolidaySet::new(),
            &PayrollRules::default(),
        );
        assert!(report.rows.is_empty());
        assert_eq!(report.totals.failed_rows, 1);
        assert!(report.failures[0].message.contains("out of the supported amount range"));
    }

    /// AGG-006: a row that would overflow the pay total is failed and left out
    #[test]
    fn test_total_overflow_fails_the_row() {
        let huge_withdrawal = |row: usize| Punch {
            inventory_deduction: Decimal::ZERO,
            withdrawal: Decimal::MAX,
            ..make_punch(row, "11:00", "19:00")
        };
        let (first, second) = (huge_withdrawal(0), huge_withdrawal(1));

        let report = run(&[first, second], &HolidaySet::new());

        assert_eq!(report.totals.computed_rows, 1);
        assert_eq!(report.totals.failed_rows, 1);
        assert_eq!(report.failures[0].row, 1);
        assert_eq!(report.totals.total_pay, report.rows[0].final_salary);
        assert_eq!(report.totals.total_hours, Decimal::from(8));
    }

    #[test]
    fn test_empty_batch() {
        let report = run(&[], &HolidaySet::new());
        assert!(report.rows.is_empty());
        assert_eq!(report.totals.total_pay, Decimal::ZERO);
    }
}
