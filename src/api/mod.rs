//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints for uploading attendance
//! sheets, deciding corrections and collecting the computed payroll.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CorrectionRequest, CreateBatchRequest};
pub use response::{ApiError, BatchStatusResponse};
pub use state::AppState;
