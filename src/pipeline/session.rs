//! The batch session state machine.
//!
//! A [`BatchSession`] carries one uploaded sheet from ingestion to a
//! computed payroll. Operator review is a stage the session parks in:
//! [`BatchSession::advance`] returns [`BatchStatus::Pending`] instead of
//! waiting, and a later call resumes from the same stage once decisions
//! were recorded with [`BatchSession::decide`]. The whole session is
//! serializable so resuming may happen in another process.
//!
//! ```text
//! Reconcile → IncompleteReview → AmbiguityCheck → AmbiguityReview → Calculate → Completed
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::calculation::validate_rate;
use crate::config::PayrollRules;
use crate::error::EngineResult;
use crate::models::{
    AttendanceSheet, BatchReport, ClockSide, CorrectionTicket, HolidaySet, Punch, PunchId,
    RowFailure,
};
use crate::reconciliation::{
    CorrectionLedger, Gate, MergedGroup, UnresolvedGroup, detect_ambiguous, detect_incomplete,
    resolve_duplicates, split_attendance,
};

use super::compute::{BatchComputation, compute_batch};

/// Where a session is in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStage {
    /// Collapse duplicates, drop empty days, detect incomplete punches.
    Reconcile,
    /// Waiting for incomplete punches to be completed.
    IncompleteReview,
    /// Detect inverted entry/exit pairs.
    AmbiguityCheck,
    /// Waiting for ambiguous punches to be swapped or kept.
    AmbiguityReview,
    /// Compute payroll.
    Calculate,
    /// Payroll is available.
    Completed,
}

/// What [`BatchSession::advance`] reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchStatus {
    /// The session is parked at a review stage.
    Pending {
        /// The review stage.
        stage: BatchStage,
        /// Tickets waiting for a decision.
        tickets: Vec<CorrectionTicket>,
    },
    /// Payroll was computed.
    Completed {
        /// The computed batch.
        report: BatchReport,
    },
}

/// An operator decision on one punch.
///
/// Serialized flat, for example
/// `{"punch": {"row": 3}, "action": "complete", "known_as": "entry", "missing_time": "19:00"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionDecision {
    /// The punch the decision is about.
    pub punch: PunchId,
    /// What to do with it.
    #[serde(flatten)]
    pub action: CorrectionAction,
}

/// The decision itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CorrectionAction {
    /// Complete an incomplete punch.
    Complete {
        /// What the recorded time really was.
        known_as: ClockSide,
        /// The time for the other side.
        missing_time: String,
    },
    /// Swap entry and exit of an ambiguous punch.
    Swap,
    /// Keep an ambiguous punch as recorded.
    Keep,
}

/// One batch, from sheet to payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSession {
    /// Session identity.
    pub id: Uuid,
    /// When the session was started.
    pub created_at: DateTime<Utc>,
    /// Hourly rate for the batch.
    pub rate: Decimal,
    /// Holidays for the batch.
    pub holidays: HolidaySet,
    /// Current stage.
    pub stage: BatchStage,
    /// Working dataset.
    pub punches: Vec<Punch>,
    /// Punches with neither entry nor exit.
    pub excluded: Vec<Punch>,
    /// Rows that could not be read from the sheet.
    pub ingestion_failures: Vec<RowFailure>,
    /// Three-punch groups that were collapsed.
    pub merged_groups: Vec<MergedGroup>,
    /// Three-punch groups left as they were.
    pub unresolved_groups: Vec<UnresolvedGroup>,
    /// Tickets still live.
    pub ledger: CorrectionLedger,
    /// Tickets already written into the dataset.
    pub applied: Vec<CorrectionTicket>,
    /// Payroll, once computed.
    pub report: Option<BatchReport>,
}

impl BatchSession {
    /// Reads a sheet into a new session at the `Reconcile` stage.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRate`](crate::error::EngineError::InvalidRate)
    /// for a negative rate and
    /// [`EngineError::MissingColumns`](crate::error::EngineError::MissingColumns)
    /// when the header lacks a required column.
    pub fn start(sheet: &AttendanceSheet, rate: Decimal, holidays: HolidaySet) -> EngineResult<Self> {
        let rate = validate_rate(rate)?;
        let ingestion = sheet.to_punches()?;
        let id = Uuid::new_v4();

        info!(
            session = %id,
            rows = sheet.rows.len(),
            punches = ingestion.punches.len(),
            unreadable = ingestion.failures.len(),
            "Started batch session"
        );

        Ok(Self {
            id,
            created_at: Utc::now(),
            rate,
            holidays,
            stage: BatchStage::Reconcile,
            punches: ingestion.punches,
            excluded: Vec::new(),
            ingestion_failures: ingestion.failures,
            merged_groups: Vec::new(),
            unresolved_groups: Vec::new(),
            ledger: CorrectionLedger::new(),
            applied: Vec::new(),
            report: None,
        })
    }

    /// Runs stages until the session needs an operator or completes.
    ///
    /// Calling it again on a parked session applies any confirmed
    /// decisions and moves on if nothing is left open.
    pub fn advance(&mut self, rules: &PayrollRules) -> BatchStatus {
        loop {
            match self.stage {
                BatchStage::Reconcile => {
                    let report = resolve_duplicates(std::mem::take(&mut self.punches), &rules.deduplication);
                    self.merged_groups = report.merged_groups;
                    self.unresolved_groups = report.unresolved_groups;

                    let (with, without) = split_attendance(report.punches);
                    self.punches = with;
                    self.excluded = without;

                    self.ledger.open(detect_incomplete(&self.punches));
                    self.stage = BatchStage::IncompleteReview;
                }
                BatchStage::IncompleteReview => {
                    if let Some(status) = self.review() {
                        return status;
                    }
                    self.stage = BatchStage::AmbiguityCheck;
                }
                BatchStage::AmbiguityCheck => {
                    self.ledger.open(detect_ambiguous(&self.punches, &rules.ambiguity));
                    self.stage = BatchStage::AmbiguityReview;
                }
                BatchStage::AmbiguityReview => {
                    if let Some(status) = self.review() {
                        return status;
                    }
                    self.stage = BatchStage::Calculate;
                }
                BatchStage::Calculate => {
                    match compute_batch(
                        &mut self.punches,
                        self.rate,
                        &self.holidays,
                        &mut self.ledger,
                        rules,
                    ) {
                        BatchComputation::Pending(tickets) => {
                            return BatchStatus::Pending {
                                stage: self.stage,
                                tickets,
                            };
                        }
                        BatchComputation::Computed(report) => {
                            info!(
                                session = %self.id,
                                rows = report.rows.len(),
                                total_pay = %report.totals.total_pay,
                                "Batch session completed"
                            );
                            self.report = Some(report);
                            self.stage = BatchStage::Completed;
                        }
                    }
                }
                BatchStage::Completed => match &self.report {
                    Some(report) => {
                        return BatchStatus::Completed {
                            report: report.clone(),
                        };
                    }
                    None => self.stage = BatchStage::Calculate,
                },
            }
        }
    }

    /// Reports the current status without running any stage.
    pub fn status(&self) -> BatchStatus {
        match (&self.stage, &self.report) {
            (BatchStage::Completed, Some(report)) => BatchStatus::Completed {
                report: report.clone(),
            },
            _ => BatchStatus::Pending {
                stage: self.stage,
                tickets: self.ledger.open_tickets(),
            },
        }
    }

    /// Records operator decisions against the ledger.
    ///
    /// Decisions are all-or-nothing: if one is rejected none is recorded.
    /// Call [`advance`](Self::advance) afterwards to apply them.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCorrection`](crate::error::EngineError::InvalidCorrection)
    /// for the first decision the ledger rejects.
    pub fn decide(&mut self, decisions: &[CorrectionDecision]) -> EngineResult<()> {
        let mut ledger = self.ledger.clone();
        for decision in decisions {
            match &decision.action {
                CorrectionAction::Complete {
                    known_as,
                    missing_time,
                } => ledger.complete_incomplete(decision.punch, *known_as, missing_time)?,
                CorrectionAction::Swap => ledger.confirm_swap(decision.punch)?,
                CorrectionAction::Keep => {
                    ledger.keep_as_recorded(decision.punch)?;
                }
            }
        }
        self.ledger = ledger;

        info!(session = %self.id, decisions = decisions.len(), "Recorded operator decisions");
        Ok(())
    }

    /// Applies confirmed decisions and parks the session if anything is
    /// still open.
    fn review(&mut self) -> Option<BatchStatus> {
        self.applied.extend(self.ledger.apply_to(&mut self.punches));
        match self.ledger.gate() {
            Gate::Open => None,
            Gate::Blocked(_) => Some(BatchStatus::Pending {
                stage: self.stage,
                tickets: self.ledger.surface(),
            }),
        }
    }
}
