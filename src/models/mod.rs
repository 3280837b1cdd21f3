//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod correction;
mod holiday;
mod payroll_result;
mod punch;
mod sheet;

pub use correction::{
    AmbiguousPayload, CorrectionTicket, IncompletePayload, TicketKind, TicketPayload, TicketState,
};
pub use holiday::{Holiday, HolidaySet};
pub use payroll_result::{
    BatchReport, BatchTotals, PayrollResult, PayrollRow, RowFailure, write_payroll_csv,
};
pub use punch::{ClockReading, ClockSide, Punch, PunchId, format_clock, parse_clock};
pub use sheet::{
    AttendanceSheet, ColumnCheck, Ingestion, REQUIRED_COLUMNS, parse_date, validate_columns,
};
