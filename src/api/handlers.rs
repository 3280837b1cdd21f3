//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::write_payroll_csv;
use crate::pipeline::{BatchSession, BatchStatus};

use super::request::{CorrectionRequest, CreateBatchRequest};
use super::response::{ApiError, ApiErrorResponse, BatchStatusResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/batches", post(create_batch_handler))
        .route(
            "/batches/:id",
            get(get_batch_handler).delete(delete_batch_handler),
        )
        .route("/batches/:id/corrections", post(corrections_handler))
        .route("/batches/:id/payroll.csv", get(export_handler))
        .with_state(state)
}

/// Handler for `POST /batches`.
///
/// Validates the sheet, starts a session and runs it as far as it goes
/// without an operator.
async fn create_batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateBatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing batch upload");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let config = state.config();
    let rate = request
        .rate_per_hour
        .unwrap_or(config.rules().default_hourly_rate);
    let holidays = request.holiday_set(config.holidays());

    let start_time = Instant::now();
    let mut session = match BatchSession::start(&request.sheet, rate, holidays) {
        Ok(session) => session,
        Err(err) => return error_response(err, correlation_id),
    };
    let status = session.advance(config.rules());
    let body = BatchStatusResponse::new(&session, status);
    state.sessions().insert(session);

    info!(
        correlation_id = %correlation_id,
        batch_id = %body.batch_id,
        status = %body.status,
        open_tickets = body.open_tickets.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Batch created"
    );

    json_response(StatusCode::CREATED, &body)
}

/// Handler for `GET /batches/:id`.
async fn get_batch_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, batch_id = %id, "Fetching batch status");

    match state.sessions().get(id) {
        Ok(session) => {
            let status = session.status();
            json_response(StatusCode::OK, &BatchStatusResponse::new(&session, status))
        }
        Err(err) => error_response(err, correlation_id),
    }
}

/// Handler for `POST /batches/:id/corrections`.
///
/// Records the decisions and advances the batch.
async fn corrections_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<CorrectionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, batch_id = %id, "Processing corrections");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let rules = state.config().rules();
    let result = state.sessions().update(id, |session| {
        session.decide(&request.decisions)?;
        let status = session.advance(rules);
        Ok(BatchStatusResponse::new(session, status))
    });

    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                batch_id = %id,
                decisions = request.decisions.len(),
                status = %body.status,
                "Corrections recorded"
            );
            json_response(StatusCode::OK, &body)
        }
        Err(err) => error_response(err, correlation_id),
    }
}

/// Handler for `DELETE /batches/:id`.
async fn delete_batch_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = Uuid::new_v4();

    match state.sessions().remove(id) {
        Ok(_) => {
            info!(correlation_id = %correlation_id, batch_id = %id, "Batch discarded");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => error_response(err, correlation_id),
    }
}

/// Handler for `GET /batches/:id/payroll.csv`.
async fn export_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = Uuid::new_v4();

    let session = match state.sessions().get(id) {
        Ok(session) => session,
        Err(err) => return error_response(err, correlation_id),
    };

    let report = match session.status() {
        BatchStatus::Completed { report } => report,
        BatchStatus::Pending { stage, tickets } => {
            warn!(
                correlation_id = %correlation_id,
                batch_id = %id,
                open_tickets = tickets.len(),
                "Export requested before corrections were decided"
            );
            return json_response(
                StatusCode::CONFLICT,
                &ApiError::with_details(
                    "BATCH_PENDING",
                    "Payroll has not been computed yet",
                    format!("{} correction(s) still open at stage {:?}", tickets.len(), stage),
                ),
            );
        }
    };

    let mut csv = Vec::new();
    if let Err(err) = write_payroll_csv(&mut csv, &report.rows) {
        return error_response(err, correlation_id);
    }

    info!(correlation_id = %correlation_id, batch_id = %id, rows = report.rows.len(), "Payroll exported");
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/csv")], csv).into_response()
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(err: EngineError, correlation_id: Uuid) -> Response {
    warn!(correlation_id = %correlation_id, error = %err, "Request failed");
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, &api_error.error)
}

fn rejection_response(rejection: JsonRejection, correlation_id: Uuid) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, &error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesLoader;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = RulesLoader::load("./config/default").expect("Failed to load config");
        AppState::new(config)
    }

    fn sheet(rows: Value) -> Value {
        json!({
            "columns": ["Employee", "Date", "Entry", "Exit",
                        "InventoryDeduction", "CashDeduction", "Withdrawal"],
            "rows": rows
        })
    }

    async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        router.oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_api_001_clean_batch_completes() {
        let router = create_router(create_test_state());
        let response = send(
            router,
            "POST",
            "/batches",
            Some(json!({
                "sheet": sheet(json!([["Ana", "2025-03-10", "18:00", "21:00", "0", "0", "0"]])),
                "rate_per_hour": "1000"
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("content-type").unwrap(), "application/json");

        let body: BatchStatusResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body.status, "completed");
        assert_eq!(body.rows[0].normal_hours, "2:00");
        assert_eq!(body.rows[0].special_hours, "1:00");
        assert_eq!(body.totals.unwrap().total_pay, rust_decimal::Decimal::from(3300));
    }

    #[tokio::test]
    async fn test_api_002_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/batches")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{invalid json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_api_003_missing_sheet_returns_validation_error() {
        let router = create_router(create_test_state());
        let response = send(router, "POST", "/batches", Some(json!({"rate_per_hour": "1"}))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_api_004_missing_columns_returns_400() {
        let router = create_router(create_test_state());
        let response = send(
            router,
            "POST",
            "/batches",
            Some(json!({"sheet": {"columns": ["Employee", "Date", "Entry"], "rows": []}})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "MISSING_COLUMNS");
        assert!(error.message.contains("Exit"));
    }

    #[tokio::test]
    async fn test_api_005_unknown_batch_returns_404() {
        let router = create_router(create_test_state());
        let uri = format!("/batches/{}", Uuid::new_v4());
        let response = send(router, "GET", &uri, None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "BATCH_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_api_006_export_before_completion_conflicts() {
        let state = create_test_state();
        let created = send(
            create_router(state.clone()),
            "POST",
            "/batches",
            Some(json!({"sheet": sheet(json!([["Ana", "2025-03-10", "11:00", "", "0", "0", "0"]]))})),
        )
        .await;
        let body = body_json(created).await;
        assert_eq!(body["status"], "pending");

        let uri = format!("/batches/{}/payroll.csv", body["batch_id"].as_str().unwrap());
        let response = send(create_router(state), "GET", &uri, None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_api_007_delete_discards_batch() {
        let state = create_test_state();
        let created = send(
            create_router(state.clone()),
            "POST",
            "/batches",
            Some(json!({"sheet": sheet(json!([]))})),
        )
        .await;
        let id = body_json(created).await["batch_id"].as_str().unwrap().to_string();

        let uri = format!("/batches/{}", id);
        let deleted = send(create_router(state.clone()), "DELETE", &uri, None).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        assert!(state.sessions().is_empty());

        let again = send(create_router(state), "DELETE", &uri, None).await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }
}
