//! Payroll calculation.
//!
//! This module contains the calculation functions for turning a reconciled
//! punch into hours and pay: span resolution with overnight rollover,
//! labor window enforcement, the special hours split, the holiday factor,
//! `h:mm` formatting, per-punch pay and batch aggregation.

mod aggregate;
mod holiday_factor;
mod hours_format;
mod labor_window;
mod payroll;
mod shift_span;
mod special_hours;

pub use aggregate::{aggregate_batch, build_payroll_row};
pub use holiday_factor::{HOLIDAY_FACTOR, holiday_factor};
pub use hours_format::format_hours;
pub use labor_window::{LaborWindowCheck, apply_labor_window};
pub use payroll::{compute_punch_pay, validate_rate};
pub use shift_span::{ShiftSpan, hours_between, resolve_shift_span};
pub use special_hours::{HoursSplit, split_special_hours};
