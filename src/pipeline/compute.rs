//! Gated batch computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calculation::aggregate_batch;
use crate::config::PayrollRules;
use crate::models::{BatchReport, CorrectionTicket, HolidaySet, Punch};
use crate::reconciliation::{CorrectionLedger, Gate};

/// Outcome of [`compute_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum BatchComputation {
    /// Payroll did not run; these tickets still need a decision.
    Pending(Vec<CorrectionTicket>),
    /// Payroll ran.
    Computed(BatchReport),
}

/// Computes payroll for a batch once every correction is decided.
///
/// Confirmed decisions in `ledger` are first written into `punches`. If
/// any ticket is still open afterwards the batch is not computed and the
/// open tickets are returned instead. There is no way to force past an
/// open ticket.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::config::PayrollRules;
/// use payroll_engine::models::{ClockReading, ClockSide, HolidaySet, Punch, PunchId};
/// use payroll_engine::pipeline::{BatchComputation, compute_batch};
/// use payroll_engine::reconciliation::{CorrectionLedger, detect_incomplete};
/// use rust_decimal::Decimal;
///
/// let mut punches = vec![Punch {
///     id: PunchId::source(0),
///     employee: "Ana".to_string(),
///     date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
///     entry: ClockReading::from_raw("11:00"),
///     exit: ClockReading::Absent,
///     inventory_deduction: Decimal::ZERO,
///     cash_deduction: Decimal::ZERO,
///     withdrawal: Decimal::ZERO,
/// }];
/// let rules = PayrollRules::default();
/// let rate = Decimal::from(1000);
///
/// let mut ledger = CorrectionLedger::new();
/// ledger.open(detect_incomplete(&punches));
///
/// let outcome = compute_batch(&mut punches, rate, &HolidaySet::new(), &mut ledger, &rules);
/// assert!(matches!(outcome, BatchComputation::Pending(ref open) if open.len() == 1));
///
/// ledger.complete_incomplete(PunchId::source(0), ClockSide::Entry, "15:00").unwrap();
/// match compute_batch(&mut punches, rate, &HolidaySet::new(), &mut ledger, &rules) {
///     BatchComputation::Computed(report) => assert_eq!(report.totals.total_pay, Decimal::from(4000)),
///     BatchComputation::Pending(_) => unreachable!(),
/// }
/// ```
pub fn compute_batch(
    punches: &mut [Punch],
    rate: Decimal,
    holidays: &HolidaySet,
    ledger: &mut CorrectionLedger,
    rules: &PayrollRules,
) -> BatchComputation {
    ledger.apply_to(punches);

    match ledger.gate() {
        Gate::Blocked(open) => {
            info!(open = open.len(), "Payroll held until corrections are decided");
            BatchComputation::Pending(ledger.surface())
        }
        Gate::Open => BatchComputation::Computed(aggregate_batch(punches, rate, holidays, rules)),
    }
}
