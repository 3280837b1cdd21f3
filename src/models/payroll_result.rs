//! Payroll result models.
//!
//! This module contains the per-punch [`PayrollResult`], the output
//! [`PayrollRow`] written back to the collaborator, the [`RowFailure`]
//! record used for row-scoped problems, and the batch-level
//! [`BatchReport`] with its [`BatchTotals`].

use std::io::Write;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

use super::punch::PunchId;

/// Hours and pay computed for one punch.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayrollResult, PunchId};
/// use rust_decimal::Decimal;
///
/// let result = PayrollResult::outside_labor_window(PunchId::source(0), "Outside labor window");
/// assert_eq!(result.net_pay, Decimal::ZERO);
/// assert!(result.observation.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    /// The punch the result belongs to.
    pub punch: PunchId,
    /// Hours outside the special window.
    pub normal_hours: Decimal,
    /// Hours inside the special window.
    pub special_hours: Decimal,
    /// All paid hours.
    pub total_hours: Decimal,
    /// Whether the holiday factor was applied.
    pub holiday_applied: bool,
    /// Whether the punch's deductions were charged against it.
    pub deductions_applied: bool,
    /// Pay before deductions, rounded to cents.
    pub gross_pay: Decimal,
    /// Pay after deductions, rounded to cents. May be negative.
    pub net_pay: Decimal,
    /// Free-text note, set when the punch was not paid normally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

impl PayrollResult {
    /// A zero-valued result for an entry outside the labor window.
    pub fn outside_labor_window(punch: PunchId, observation: impl Into<String>) -> Self {
        Self {
            punch,
            normal_hours: Decimal::ZERO,
            special_hours: Decimal::ZERO,
            total_hours: Decimal::ZERO,
            holiday_applied: false,
            deductions_applied: false,
            gross_pay: Decimal::ZERO,
            net_pay: Decimal::ZERO,
            observation: Some(observation.into()),
        }
    }
}

/// One line of the output dataset, using the output column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRow {
    /// Employee name.
    #[serde(rename = "Employee")]
    pub employee: String,
    /// Date as `YYYY-MM-DD`.
    #[serde(rename = "Date")]
    pub date: String,
    /// Entry as `H:MM`.
    #[serde(rename = "Entry")]
    pub entry: String,
    /// Exit as `H:MM`.
    #[serde(rename = "Exit")]
    pub exit: String,
    /// `Yes` or `No`.
    #[serde(rename = "Holiday")]
    pub holiday: String,
    /// Total hours as `h:mm`.
    #[serde(rename = "WorkedHours")]
    pub worked_hours: String,
    /// Normal hours as `h:mm`.
    #[serde(rename = "NormalHours")]
    pub normal_hours: String,
    /// Special hours as `h:mm`.
    #[serde(rename = "SpecialHours")]
    pub special_hours: String,
    /// Inventory deduction applied.
    #[serde(rename = "InventoryDeduction")]
    pub inventory_deduction: Decimal,
    /// Cash deduction applied.
    #[serde(rename = "CashDeduction")]
    pub cash_deduction: Decimal,
    /// Withdrawal applied.
    #[serde(rename = "Withdrawal")]
    pub withdrawal: Decimal,
    /// Net pay, two decimals.
    #[serde(rename = "FinalSalary")]
    pub final_salary: Decimal,
    /// Observation text, empty when none.
    #[serde(rename = "Observations")]
    pub observations: String,
}

/// A row that could not be read or computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// Zero-based source row index.
    pub row: usize,
    /// Employee cell of the row, as far as it could be read.
    pub employee: String,
    /// Date cell of the row, as far as it could be read.
    pub date: String,
    /// What went wrong.
    pub message: String,
}

impl RowFailure {
    /// The sheet line of the row, counting the header as line 1.
    pub fn line(&self) -> usize {
        self.row + 2
    }
}

/// Running totals over successfully computed rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    /// Sum of total hours.
    pub total_hours: Decimal,
    /// Sum of net pay.
    pub total_pay: Decimal,
    /// Sum of normal hours.
    pub total_normal_hours: Decimal,
    /// Sum of special hours.
    pub total_special_hours: Decimal,
    /// Number of rows that produced a result.
    pub computed_rows: usize,
    /// Number of rows that failed.
    pub failed_rows: usize,
}

/// Everything a computed batch hands back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-punch results, in stable input order.
    pub results: Vec<PayrollResult>,
    /// Output rows matching `results` one to one.
    pub rows: Vec<PayrollRow>,
    /// Batch totals.
    pub totals: BatchTotals,
    /// Rows excluded from totals because they failed.
    pub failures: Vec<RowFailure>,
}

/// Writes output rows as CSV with the output column names as header.
pub fn write_payroll_csv<W: Write>(writer: W, rows: &[PayrollRow]) -> EngineResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_row() -> PayrollRow {
        PayrollRow {
            employee: "Ana".to_string(),
            date: "2025-03-10".to_string(),
            entry: "18:00".to_string(),
            exit: "21:00".to_string(),
            holiday: "No".to_string(),
            worked_hours: "3:00".to_string(),
            normal_hours: "2:00".to_string(),
            special_hours: "1:00".to_string(),
            inventory_deduction: Decimal::ZERO,
            cash_deduction: Decimal::ZERO,
            withdrawal: dec("300"),
            final_salary: dec("3000.00"),
            observations: String::new(),
        }
    }

    #[test]
    fn test_row_failure_line_counts_header() {
        let failure = RowFailure {
            row: 0,
            employee: "Ana".to_string(),
            date: "2025-03-10".to_string(),
            message: "Invalid entry time 'x'".to_string(),
        };
        assert_eq!(failure.line(), 2);
    }

    #[test]
    fn test_payroll_row_uses_output_column_names() {
        let json = serde_json::to_value(make_row()).unwrap();
        assert_eq!(json["Employee"], "Ana");
        assert_eq!(json["FinalSalary"], "3000.00");
        assert_eq!(json["SpecialHours"], "1:00");
    }

    #[test]
    fn test_write_payroll_csv() {
        let mut out = Vec::new();
        write_payroll_csv(&mut out, &[make_row()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Employee,Date,Entry,Exit,Holiday,WorkedHours,NormalHours,SpecialHours,\
             InventoryDeduction,CashDeduction,Withdrawal,FinalSalary,Observations"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Ana,2025-03-10,18:00,21:00,No,3:00,2:00,1:00,0,0,300,3000.00,"
        );
    }

    #[test]
    fn test_outside_window_result_is_zero() {
        let result = PayrollResult::outside_labor_window(PunchId::source(2), "note");
        assert_eq!(result.total_hours, Decimal::ZERO);
        assert_eq!(result.gross_pay, Decimal::ZERO);
        assert!(!result.holiday_applied);
        assert!(!result.deductions_applied);
        assert_eq!(result.observation.as_deref(), Some("note"));
    }
}
