//! Response types for the payroll engine API.
//!
//! This module defines the batch status body, the error response
//! structures and the mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{BatchTotals, CorrectionTicket, PayrollRow, Punch, RowFailure};
use crate::pipeline::{BatchSession, BatchStage, BatchStatus};
use crate::reconciliation::{MergedGroup, UnresolvedGroup};

/// Body returned by every `/batches` endpoint that reports a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatusResponse {
    /// The batch session id.
    pub batch_id: Uuid,
    /// `pending` or `completed`.
    pub status: String,
    /// The stage the batch is in.
    pub stage: BatchStage,
    /// Tickets waiting for a decision.
    pub open_tickets: Vec<CorrectionTicket>,
    /// Punches without entry or exit, left out of payroll.
    pub excluded: Vec<Punch>,
    /// Rows that could not be read or computed.
    pub row_failures: Vec<RowFailure>,
    /// Three-punch groups that were collapsed.
    pub merged_groups: Vec<MergedGroup>,
    /// Three-punch groups left as they were.
    pub unresolved_groups: Vec<UnresolvedGroup>,
    /// Output rows, once completed.
    pub rows: Vec<PayrollRow>,
    /// Totals, once completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<BatchTotals>,
}

impl BatchStatusResponse {
    /// Builds the body from a session and the status it last reported.
    pub fn new(session: &BatchSession, status: BatchStatus) -> Self {
        let mut response = Self {
            batch_id: session.id,
            status: "pending".to_string(),
            stage: session.stage,
            open_tickets: Vec::new(),
            excluded: session.excluded.clone(),
            row_failures: session.ingestion_failures.clone(),
            merged_groups: session.merged_groups.clone(),
            unresolved_groups: session.unresolved_groups.clone(),
            rows: Vec::new(),
            totals: None,
        };

        match status {
            BatchStatus::Pending { stage, tickets } => {
                response.stage = stage;
                response.open_tickets = tickets;
            }
            BatchStatus::Completed { report } => {
                response.status = "completed".to_string();
                response.row_failures.extend(report.failures);
                response.rows = report.rows;
                response.totals = Some(report.totals);
            }
        }

        response
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::MissingColumns { columns } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "MISSING_COLUMNS",
                    message,
                    format!("Add the columns {} to the sheet header", columns.join(", ")),
                ),
            },
            EngineError::SheetReadError { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("SHEET_READ_ERROR", message),
            },
            EngineError::InvalidTime { .. }
            | EngineError::InvalidDate { .. }
            | EngineError::InvalidAmount { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("PARSE_ERROR", message),
            },
            EngineError::InvalidRate { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("INVALID_RATE", message),
            },
            EngineError::AmountOverflow { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("AMOUNT_OVERFLOW", message),
            },
            EngineError::InvalidCorrection { .. } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::new("INVALID_CORRECTION", message),
            },
            EngineError::SessionNotFound { id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "BATCH_NOT_FOUND",
                    message,
                    format!("No batch with id {} is open on this server", id),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_missing_columns_maps_to_400() {
        let api_error: ApiErrorResponse = EngineError::MissingColumns {
            columns: vec!["Exit".to_string()],
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "MISSING_COLUMNS");
        assert_eq!(api_error.error.message, "Sheet is missing required columns: Exit");
    }

    #[test]
    fn test_session_not_found_maps_to_404() {
        let api_error: ApiErrorResponse = EngineError::SessionNotFound { id: Uuid::nil() }.into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.error.code, "BATCH_NOT_FOUND");
    }

    #[test]
    fn test_invalid_correction_maps_to_422() {
        let api_error: ApiErrorResponse = EngineError::InvalidCorrection {
            punch: "row 0".to_string(),
            message: "no correction is pending for this punch".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api_error.error.code, "INVALID_CORRECTION");
    }

    #[test]
    fn test_config_errors_are_server_errors() {
        let api_error: ApiErrorResponse = EngineError::ConfigNotFound {
            path: "rules.yaml".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
