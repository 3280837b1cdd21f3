//! Punch reconciliation.
//!
//! Everything that happens to a batch between ingestion and payroll:
//! collapsing over-counted punches, dropping days without attendance,
//! detecting incomplete and ambiguous punches, and recording the operator
//! decisions that resolve them.

mod ambiguity;
mod completeness;
mod deduplication;
mod incomplete;
mod ledger;

pub use ambiguity::{Suspicion, classify_suspicion, detect_ambiguous};
pub use completeness::split_attendance;
pub use deduplication::{
    DeduplicationReport, DuplicatePair, MergedGroup, UnresolvedGroup, resolve_duplicates,
};
pub use incomplete::detect_incomplete;
pub use ledger::{CorrectionLedger, Gate};
