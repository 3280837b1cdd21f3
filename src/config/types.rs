//! Configuration types for payroll and reconciliation rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every struct has a
//! `Default` matching the shipped `config/default` directory.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Holiday;

/// A same-day time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start.
    #[serde(with = "clock_format")]
    pub start: NaiveTime,
    /// Exclusive end.
    #[serde(with = "clock_format")]
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Builds a window from hour/minute pairs.
    ///
    /// # Panics
    ///
    /// Panics if either pair is not a valid time of day.
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start: hm(start.0, start.1),
            end: hm(end.0, end.1),
        }
    }
}

/// Thresholds used when collapsing three punches into two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeduplicationRules {
    /// Lower bound, in minutes, of the informational duplicate window.
    pub duplicate_min_minutes: i64,
    /// Upper bound, in minutes, of the informational duplicate window.
    pub duplicate_max_minutes: i64,
    /// A punch differing from the primary by more than this many minutes
    /// on either side is a distinct second punch.
    pub distinct_threshold_minutes: i64,
}

impl Default for DeduplicationRules {
    fn default() -> Self {
        Self {
            duplicate_min_minutes: 10,
            duplicate_max_minutes: 20,
            distinct_threshold_minutes: 20,
        }
    }
}

/// Thresholds that make an entry/exit pair look inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguityRules {
    /// Entries at or after this time look like exits.
    #[serde(with = "clock_format")]
    pub late_entry: NaiveTime,
    /// Exits at or before this time look like entries.
    #[serde(with = "clock_format")]
    pub early_exit: NaiveTime,
}

impl Default for AmbiguityRules {
    fn default() -> Self {
        Self {
            late_entry: hm(20, 0),
            early_exit: hm(10, 0),
        }
    }
}

/// Payroll and reconciliation rules loaded from `rules.yaml`.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollRules;
/// use rust_decimal::Decimal;
///
/// let rules = PayrollRules::default();
/// assert_eq!(rules.special_premium, Decimal::new(13, 1));
/// assert_eq!(rules.labor_window_label(), "10:30-22:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRules {
    /// Window an entry must fall in; exits are clamped to its end.
    pub labor_window: TimeWindow,
    /// Window whose overlap is paid at the premium.
    pub special_window: TimeWindow,
    /// Multiplier for special hours.
    pub special_premium: Decimal,
    /// Hourly rate used when a batch does not supply one.
    pub default_hourly_rate: Decimal,
    /// Three-punch collapse thresholds.
    #[serde(default)]
    pub deduplication: DeduplicationRules,
    /// Inverted entry/exit thresholds.
    #[serde(default)]
    pub ambiguity: AmbiguityRules,
}

impl Default for PayrollRules {
    fn default() -> Self {
        Self {
            labor_window: TimeWindow::from_hm((10, 30), (22, 0)),
            special_window: TimeWindow::from_hm((20, 0), (22, 0)),
            special_premium: Decimal::new(13, 1),
            default_hourly_rate: Decimal::from(13937),
            deduplication: DeduplicationRules::default(),
            ambiguity: AmbiguityRules::default(),
        }
    }
}

impl PayrollRules {
    /// The labor window as `H:MM-H:MM`, used in observations.
    pub fn labor_window_label(&self) -> String {
        format!(
            "{}-{}",
            crate::models::format_clock(self.labor_window.start),
            crate::models::format_clock(self.labor_window.end)
        )
    }
}

/// Holiday configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HolidaysConfig {
    /// Named holiday dates.
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid hour and minute")
}

/// Serde adapter for `H:MM` clock values.
pub mod clock_format {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use crate::models::{format_clock, parse_clock};

    /// Serializes a time as `H:MM`.
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_clock(*time))
    }

    /// Deserializes `H:MM`, `HH:MM` or `H:MM:SS`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_clock(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid clock time '{}'", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = PayrollRules::default();
        assert_eq!(rules.labor_window, TimeWindow::from_hm((10, 30), (22, 0)));
        assert_eq!(rules.special_window, TimeWindow::from_hm((20, 0), (22, 0)));
        assert_eq!(rules.default_hourly_rate, Decimal::from(13937));
        assert_eq!(rules.deduplication.distinct_threshold_minutes, 20);
        assert_eq!(rules.ambiguity.late_entry, hm(20, 0));
    }

    #[test]
    fn test_rules_from_yaml_with_defaulted_sections() {
        let yaml = r#"
labor_window: { start: "9:00", end: "23:00" }
special_window: { start: "21:00", end: "23:00" }
special_premium: "1.5"
default_hourly_rate: "1000"
"#;
        let rules: PayrollRules = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.labor_window.start, hm(9, 0));
        assert_eq!(rules.special_premium, Decimal::new(15, 1));
        assert_eq!(rules.deduplication, DeduplicationRules::default());
        assert_eq!(rules.labor_window_label(), "9:00-23:00");
    }

    #[test]
    fn test_invalid_clock_value_is_rejected() {
        let yaml = r#"{ start: "soon", end: "22:00" }"#;
        let result: Result<TimeWindow, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }
}
