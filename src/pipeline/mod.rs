//! Batch orchestration.
//!
//! [`compute_batch`] is the gated payroll step. [`BatchSession`] strings
//! reconciliation, review and payroll together as a resumable state
//! machine, and [`SessionStore`] keeps sessions for the HTTP service.

mod compute;
mod session;
mod store;

pub use compute::{BatchComputation, compute_batch};
pub use session::{BatchSession, BatchStage, BatchStatus, CorrectionAction, CorrectionDecision};
pub use store::{DEFAULT_SESSION_TTL, SessionStore};
