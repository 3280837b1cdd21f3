//! Request types for the payroll engine API.
//!
//! This module defines the JSON request structures for the `/batches`
//! endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceSheet, HolidaySet};
use crate::pipeline::CorrectionDecision;

/// Request body for `POST /batches`.
///
/// # Example
///
/// ```
/// use payroll_engine::api::CreateBatchRequest;
///
/// let request: CreateBatchRequest = serde_json::from_str(r#"{
///     "sheet": {
///         "columns": ["Employee", "Date", "Entry", "Exit",
///                     "InventoryDeduction", "CashDeduction", "Withdrawal"],
///         "rows": [["Ana", "2025-03-10", "11:00", "19:00", "0", "0", "0"]]
///     },
///     "rate_per_hour": "1000",
///     "holidays": ["2025-03-10"]
/// }"#).unwrap();
///
/// assert_eq!(request.sheet.rows.len(), 1);
/// assert_eq!(request.holidays.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    /// The attendance sheet.
    pub sheet: AttendanceSheet,
    /// Hourly rate; the configured default is used when absent.
    #[serde(default)]
    pub rate_per_hour: Option<Decimal>,
    /// Extra holiday dates for this batch, on top of the configured ones.
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

impl CreateBatchRequest {
    /// The batch holidays: `configured` plus the dates in the request.
    pub fn holiday_set(&self, configured: &HolidaySet) -> HolidaySet {
        let mut holidays = configured.clone();
        holidays.extend(self.holidays.iter().copied());
        holidays
    }
}

/// Request body for `POST /batches/:id/corrections`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRequest {
    /// Decisions to record, all or nothing.
    pub decisions: Vec<CorrectionDecision>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockSide, PunchId};
    use crate::pipeline::CorrectionAction;

    #[test]
    fn test_create_batch_defaults() {
        let request: CreateBatchRequest =
            serde_json::from_str(r#"{"sheet": {"columns": []}}"#).unwrap();
        assert!(request.rate_per_hour.is_none());
        assert!(request.holidays.is_empty());
        assert!(request.sheet.rows.is_empty());
    }

    #[test]
    fn test_holiday_set_merges_configured_dates() {
        let configured: HolidaySet = [NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()]
            .into_iter()
            .collect();
        let request = CreateBatchRequest {
            sheet: AttendanceSheet::default(),
            rate_per_hour: None,
            holidays: vec![
                NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 25).unwrap(),
            ],
        };
        assert_eq!(request.holiday_set(&configured).len(), 2);
    }

    #[test]
    fn test_correction_request_parses_every_action() {
        let request: CorrectionRequest = serde_json::from_str(
            r#"{"decisions": [
                {"punch": {"row": 0}, "action": "complete", "known_as": "entry", "missing_time": "19:00"},
                {"punch": {"row": 1}, "action": "swap"},
                {"punch": {"row": 2}, "action": "keep"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(request.decisions.len(), 3);
        assert_eq!(
            request.decisions[0].action,
            CorrectionAction::Complete {
                known_as: ClockSide::Entry,
                missing_time: "19:00".to_string(),
            }
        );
        assert_eq!(request.decisions[2].punch, PunchId::source(2));
        assert_eq!(request.decisions[2].action, CorrectionAction::Keep);
    }
}
