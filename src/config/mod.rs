//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load payroll rules (labor window,
//! special-hour premium, reconciliation thresholds) and holiday dates from
//! YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::RulesLoader;
//!
//! let config = RulesLoader::load("./config/default").unwrap();
//! println!("Special premium: {}", config.rules().special_premium);
//! ```

mod loader;
mod types;

pub use loader::RulesLoader;
pub use types::{
    AmbiguityRules, DeduplicationRules, HolidaysConfig, PayrollRules, TimeWindow, clock_format,
};
