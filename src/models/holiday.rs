//! Holiday models.
//!
//! This module contains the [`Holiday`] and [`HolidaySet`] types. Holidays
//! are full calendar dates; there are no weekday or recurring rules.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named holiday date.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Holiday;
/// use chrono::NaiveDate;
///
/// let holiday = Holiday {
///     date: NaiveDate::from_ymd_opt(2025, 9, 18).unwrap(),
///     name: "Fiestas Patrias".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday.
    #[serde(default)]
    pub name: String,
}

/// The set of dates that pay at the holiday factor.
///
/// # Example
///
/// ```
/// use payroll_engine::models::HolidaySet;
/// use chrono::NaiveDate;
///
/// let holidays: HolidaySet = [NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()]
///     .into_iter()
///     .collect();
///
/// assert!(holidays.contains(NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()));
/// assert!(!holidays.contains(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidaySet {
    dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    /// Creates an empty holiday set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a date; returns false if it was already present.
    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    /// Checks whether the exact date is a holiday.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Number of holiday dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true if no holidays are set.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Iterates the dates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

impl Extend<NaiveDate> for HolidaySet {
    fn extend<I: IntoIterator<Item = NaiveDate>>(&mut self, iter: I) {
        self.dates.extend(iter);
    }
}

impl<'a> FromIterator<&'a Holiday> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = &'a Holiday>>(iter: I) -> Self {
        iter.into_iter().map(|h| h.date).collect()
    }
}
