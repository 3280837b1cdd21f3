//! Attendance sheet model.
//!
//! An [`AttendanceSheet`] is the normalized tabular dataset handed to the
//! engine: a header row plus string cells. This module validates the
//! header, reads sheets from CSV, and turns rows into typed [`Punch`]es.

use std::io::Read;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};

use super::payroll_result::RowFailure;
use super::punch::{ClockReading, Punch, PunchId};

/// Employee name column.
pub const COLUMN_EMPLOYEE: &str = "Employee";
/// Punch date column.
pub const COLUMN_DATE: &str = "Date";
/// Entry time column.
pub const COLUMN_ENTRY: &str = "Entry";
/// Exit time column.
pub const COLUMN_EXIT: &str = "Exit";
/// Inventory deduction column.
pub const COLUMN_INVENTORY_DEDUCTION: &str = "InventoryDeduction";
/// Cash deduction column.
pub const COLUMN_CASH_DEDUCTION: &str = "CashDeduction";
/// Withdrawal column.
pub const COLUMN_WITHDRAWAL: &str = "Withdrawal";

/// Every column an input sheet must carry, in template order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COLUMN_EMPLOYEE,
    COLUMN_DATE,
    COLUMN_ENTRY,
    COLUMN_EXIT,
    COLUMN_INVENTORY_DEDUCTION,
    COLUMN_CASH_DEDUCTION,
    COLUMN_WITHDRAWAL,
];

/// Outcome of checking a sheet header against [`REQUIRED_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCheck {
    /// True when every required column is present.
    pub is_valid: bool,
    /// Required columns that were not found, in template order.
    pub missing: Vec<String>,
}

/// A header-first table of raw attendance cells.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AttendanceSheet, validate_columns};
///
/// let sheet = AttendanceSheet {
///     columns: vec!["Employee".to_string(), "Date".to_string()],
///     rows: vec![],
/// };
/// let check = validate_columns(&sheet);
/// assert!(!check.is_valid);
/// assert_eq!(check.missing.len(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSheet {
    /// Header names, in sheet order.
    pub columns: Vec<String>,
    /// Data rows; each cell lines up with `columns`.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Punches read from a sheet, plus the rows that could not be read.
#[derive(Debug, Clone, Default)]
pub struct Ingestion {
    /// Punches in source order.
    pub punches: Vec<Punch>,
    /// Rows skipped because a date or amount could not be parsed.
    pub failures: Vec<RowFailure>,
}

/// Checks that a sheet carries every required column.
pub fn validate_columns(sheet: &AttendanceSheet) -> ColumnCheck {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !sheet.columns.iter().any(|c| c.trim() == **required))
        .map(|required| required.to_string())
        .collect();

    ColumnCheck {
        is_valid: missing.is_empty(),
        missing,
    }
}

impl AttendanceSheet {
    /// Reads a sheet from CSV with a header row.
    ///
    /// Short rows are accepted; their trailing cells read as empty.
    pub fn from_csv_reader<R: Read>(reader: R) -> EngineResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { columns, rows })
    }

    /// Converts rows into punches.
    ///
    /// Rows whose date or deduction cells cannot be parsed are reported in
    /// [`Ingestion::failures`] and skipped; the rest of the sheet is kept.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingColumns`] if the header is incomplete.
    pub fn to_punches(&self) -> EngineResult<Ingestion> {
        let check = validate_columns(self);
        if !check.is_valid {
            return Err(EngineError::MissingColumns {
                columns: check.missing,
            });
        }

        let index = ColumnIndex::new(&self.columns);
        let mut ingestion = Ingestion::default();

        for (row, cells) in self.rows.iter().enumerate() {
            match index.read_punch(row, cells) {
                Ok(punch) => ingestion.punches.push(punch),
                Err(err) => {
                    let failure = RowFailure {
                        row,
                        employee: index.cell(cells, index.employee).to_string(),
                        date: index.cell(cells, index.date).to_string(),
                        message: err.to_string(),
                    };
                    warn!(
                        row = failure.line(),
                        employee = %failure.employee,
                        error = %failure.message,
                        "Skipping unreadable sheet row"
                    );
                    ingestion.failures.push(failure);
                }
            }
        }

        Ok(ingestion)
    }
}

/// Positions of the required columns within a particular header.
struct ColumnIndex {
    employee: usize,
    date: usize,
    entry: usize,
    exit: usize,
    inventory: usize,
    cash: usize,
    withdrawal: usize,
}

impl ColumnIndex {
    /// Builds the index; callers must have validated the header first.
    fn new(columns: &[String]) -> Self {
        let find = |name: &str| {
            columns
                .iter()
                .position(|c| c.trim() == name)
                .unwrap_or(usize::MAX)
        };
        Self {
            employee: find(COLUMN_EMPLOYEE),
            date: find(COLUMN_DATE),
            entry: find(COLUMN_ENTRY),
            exit: find(COLUMN_EXIT),
            inventory: find(COLUMN_INVENTORY_DEDUCTION),
            cash: find(COLUMN_CASH_DEDUCTION),
            withdrawal: find(COLUMN_WITHDRAWAL),
        }
    }

    fn cell<'a>(&self, cells: &'a [String], position: usize) -> &'a str {
        cells.get(position).map(|c| c.trim()).unwrap_or("")
    }

    fn read_punch(&self, row: usize, cells: &[String]) -> EngineResult<Punch> {
        Ok(Punch {
            id: PunchId::source(row),
            employee: self.cell(cells, self.employee).to_string(),
            date: parse_date(self.cell(cells, self.date))?,
            entry: ClockReading::from_raw(self.cell(cells, self.entry)),
            exit: ClockReading::from_raw(self.cell(cells, self.exit)),
            inventory_deduction: parse_amount(
                COLUMN_INVENTORY_DEDUCTION,
                self.cell(cells, self.inventory),
            )?,
            cash_deduction: parse_amount(COLUMN_CASH_DEDUCTION, self.cell(cells, self.cash))?,
            withdrawal: parse_amount(COLUMN_WITHDRAWAL, self.cell(cells, self.withdrawal))?,
        })
    }
}

/// Parses a sheet date.
///
/// Accepts `YYYY-MM-DD`, a date with a trailing time (`YYYY-MM-DD HH:MM:SS`
/// or ISO `T` form) and `DD/MM/YYYY`.
pub fn parse_date(text: &str) -> EngineResult<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .map_err(|_| EngineError::InvalidDate {
            value: text.to_string(),
        })
}

/// Parses a deduction cell; blank and `nan` read as zero.
fn parse_amount(column: &str, text: &str) -> EngineResult<Decimal> {
    if text.is_empty() || text.eq_ignore_ascii_case("nan") {
        return Ok(Decimal::ZERO);
    }

    let invalid = || EngineError::InvalidAmount {
        column: column.to_string(),
        value: text.to_string(),
    };
    let amount = Decimal::from_str(text).map_err(|_| invalid())?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(invalid());
    }
    Ok(amount)
}
