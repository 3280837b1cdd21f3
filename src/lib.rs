//! Attendance reconciliation and payroll engine.
//!
//! This crate turns punch-clock attendance sheets into payroll. It collapses
//! over-counted punches, sets aside days without attendance, routes
//! incomplete and ambiguous punches through operator review, and computes
//! pay with a labor window, a special-hours premium and a holiday factor.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod reconciliation;
