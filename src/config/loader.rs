//! Configuration loading functionality.
//!
//! This module provides the [`RulesLoader`] type for loading payroll rules
//! and holiday dates from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::HolidaySet;

use super::types::{HolidaysConfig, PayrollRules};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── rules.yaml      # Labor window, premium, thresholds
/// └── holidays.yaml   # Optional named holiday dates
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::RulesLoader;
///
/// let loader = RulesLoader::load("./config/default").unwrap();
/// println!("Labor window: {}", loader.rules().labor_window_label());
/// println!("Configured holidays: {}", loader.holidays().len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RulesLoader {
    rules: PayrollRules,
    holidays: HolidaySet,
}

impl RulesLoader {
    /// Loads configuration from the specified directory.
    ///
    /// `rules.yaml` is required. `holidays.yaml` is optional; without it
    /// the configured holiday set is empty.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigNotFound`] if `rules.yaml` is missing
    /// and [`EngineError::ConfigParseError`] if any file is invalid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let rules = Self::load_yaml::<PayrollRules>(&path.join("rules.yaml"))?;

        let holidays_path = path.join("holidays.yaml");
        let holidays = if holidays_path.exists() {
            let config = Self::load_yaml::<HolidaysConfig>(&holidays_path)?;
            config.holidays.iter().collect()
        } else {
            HolidaySet::new()
        };

        info!(
            path = %path.display(),
            labor_window = %rules.labor_window_label(),
            holidays = holidays.len(),
            "Loaded payroll configuration"
        );

        Ok(Self { rules, holidays })
    }

    /// Wraps already-built rules, with no configured holidays.
    pub fn from_rules(rules: PayrollRules) -> Self {
        Self {
            rules,
            holidays: HolidaySet::new(),
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the payroll rules.
    pub fn rules(&self) -> &PayrollRules {
        &self.rules
    }

    /// Returns the configured holidays.
    pub fn holidays(&self) -> &HolidaySet {
        &self.holidays
    }
}
