//! Punch model and clock reading normalization.
//!
//! A [`Punch`] is one recorded attendance line for an employee on a day.
//! Entry and exit are kept as [`ClockReading`]s so that every stage shares
//! the same notion of an absent field and parsing stays row-scoped.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Which side of a punch a clock value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockSide {
    /// The time the employee arrived.
    Entry,
    /// The time the employee left.
    Exit,
}

impl ClockSide {
    /// Returns the other side of the punch.
    pub fn opposite(self) -> Self {
        match self {
            ClockSide::Entry => ClockSide::Exit,
            ClockSide::Exit => ClockSide::Entry,
        }
    }
}

impl fmt::Display for ClockSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockSide::Entry => write!(f, "entry"),
            ClockSide::Exit => write!(f, "exit"),
        }
    }
}

/// A raw clock value from the sheet, normalized for absence.
///
/// Serializes as `null` when absent and as the recorded text otherwise.
///
/// # Example
///
/// ```
/// use payroll_engine::models::ClockReading;
///
/// assert_eq!(ClockReading::from_raw(" 00:00 "), ClockReading::Absent);
/// assert_eq!(ClockReading::from_raw("nan"), ClockReading::Absent);
/// assert_eq!(
///     ClockReading::from_raw(" 8:15 "),
///     ClockReading::Recorded("8:15".to_string())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ClockReading {
    /// Nothing usable was recorded.
    Absent,
    /// The trimmed text that was recorded, not yet parsed.
    Recorded(String),
}

impl ClockReading {
    /// Normalizes a raw cell value.
    ///
    /// After trimming, an empty value, the literal `nan` (any case), `0:00`
    /// and `00:00` are all treated as absent.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed == "0:00"
            || trimmed == "00:00"
        {
            ClockReading::Absent
        } else {
            ClockReading::Recorded(trimmed.to_string())
        }
    }

    /// Builds a reading from a parsed time, formatted as `H:MM`.
    pub fn at(time: NaiveTime) -> Self {
        ClockReading::Recorded(format_clock(time))
    }

    /// Returns true if nothing usable was recorded.
    pub fn is_absent(&self) -> bool {
        matches!(self, ClockReading::Absent)
    }

    /// Returns the recorded text, or an empty string when absent.
    pub fn as_str(&self) -> &str {
        match self {
            ClockReading::Absent => "",
            ClockReading::Recorded(text) => text,
        }
    }

    /// Parses the reading as a time of day.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTime`] if the reading is absent or
    /// is not a valid `H:MM` / `H:MM:SS` value.
    pub fn time(&self, side: ClockSide) -> EngineResult<NaiveTime> {
        let invalid = || EngineError::InvalidTime {
            field: side.to_string(),
            value: self.as_str().to_string(),
        };
        match self {
            ClockReading::Absent => Err(invalid()),
            ClockReading::Recorded(text) => parse_clock(text).ok_or_else(invalid),
        }
    }
}

impl From<Option<String>> for ClockReading {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(raw) => ClockReading::from_raw(&raw),
            None => ClockReading::Absent,
        }
    }
}

impl From<ClockReading> for Option<String> {
    fn from(reading: ClockReading) -> Self {
        match reading {
            ClockReading::Absent => None,
            ClockReading::Recorded(text) => Some(text),
        }
    }
}

/// Parses a time of day written as `H:MM`, `HH:MM` or `H:MM:SS`.
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

/// Formats a time of day as `H:MM` (24-hour, no leading zero on the hour).
///
/// # Example
///
/// ```
/// use chrono::NaiveTime;
/// use payroll_engine::models::format_clock;
///
/// assert_eq!(format_clock(NaiveTime::from_hms_opt(8, 5, 0).unwrap()), "8:05");
/// assert_eq!(format_clock(NaiveTime::from_hms_opt(21, 30, 0).unwrap()), "21:30");
/// ```
pub fn format_clock(time: NaiveTime) -> String {
    format!("{}:{:02}", time.hour(), time.minute())
}

/// Identity of a punch within a batch.
///
/// `row` is the zero-based source row the punch came from. The primary
/// punch synthesized by deduplication keeps the row of its earliest-entry
/// source and sets `merged`, so identities stay unique after merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PunchId {
    /// Zero-based index of the source row.
    pub row: usize,
    /// Whether this punch was synthesized by merging a group.
    #[serde(default)]
    pub merged: bool,
}

impl PunchId {
    /// Identity of a punch read straight from source row `row`.
    pub fn source(row: usize) -> Self {
        Self { row, merged: false }
    }

    /// Identity of the primary punch merged from a group led by `row`.
    pub fn merged(row: usize) -> Self {
        Self { row, merged: true }
    }
}

impl fmt::Display for PunchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.merged {
            write!(f, "row {} (merged)", self.row)
        } else {
            write!(f, "row {}", self.row)
        }
    }
}

/// One attendance record: an employee's entry and exit on a date, plus
/// the deductions booked against that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punch {
    /// Identity of the punch within its batch.
    pub id: PunchId,
    /// Employee name as it appears on the sheet.
    pub employee: String,
    /// The calendar date of the punch.
    pub date: NaiveDate,
    /// Entry clock reading.
    pub entry: ClockReading,
    /// Exit clock reading.
    pub exit: ClockReading,
    /// Inventory shortfall deducted from pay.
    #[serde(default)]
    pub inventory_deduction: Decimal,
    /// Cash register shortfall deducted from pay.
    #[serde(default)]
    pub cash_deduction: Decimal,
    /// Advance withdrawn against pay.
    #[serde(default)]
    pub withdrawal: Decimal,
}

impl Punch {
    /// Returns the reading on the given side.
    pub fn reading(&self, side: ClockSide) -> &ClockReading {
        match side {
            ClockSide::Entry => &self.entry,
            ClockSide::Exit => &self.exit,
        }
    }

    /// Overwrites the reading on the given side.
    pub fn set_reading(&mut self, side: ClockSide, reading: ClockReading) {
        match side {
            ClockSide::Entry => self.entry = reading,
            ClockSide::Exit => self.exit = reading,
        }
    }

    /// Parses the entry reading.
    pub fn entry_time(&self) -> EngineResult<NaiveTime> {
        self.entry.time(ClockSide::Entry)
    }

    /// Parses the exit reading.
    pub fn exit_time(&self) -> EngineResult<NaiveTime> {
        self.exit.time(ClockSide::Exit)
    }

    /// Returns true when neither entry nor exit was recorded.
    pub fn is_without_attendance(&self) -> bool {
        self.entry.is_absent() && self.exit.is_absent()
    }

    /// Returns the side that is missing when exactly one side is absent.
    pub fn missing_side(&self) -> Option<ClockSide> {
        match (self.entry.is_absent(), self.exit.is_absent()) {
            (true, false) => Some(ClockSide::Entry),
            (false, true) => Some(ClockSide::Exit),
            _ => None,
        }
    }

    /// Sum of every deduction booked against the punch, or `None` when
    /// the sum overflows.
    pub fn total_deductions(&self) -> Option<Decimal> {
        self.inventory_deduction
            .checked_add(self.cash_deduction)?
            .checked_add(self.withdrawal)
    }
}
