//! Detection of punches whose entry and exit look inverted.
//!
//! Three heuristics are checked in order and the first one that fires
//! names the ticket's reason:
//!
//! 1. the entry is at or after the late-entry threshold (20:00 by default);
//! 2. the exit is at or before the early-exit threshold (10:00 by default);
//! 3. the entry is later than the exit.
//!
//! Times are compared as times of day. No overnight adjustment is made
//! here, so a legitimate 21:00 to 01:00 shift is flagged by the first rule
//! even though payroll later treats it as an overnight shift.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::config::AmbiguityRules;
use crate::models::{
    AmbiguousPayload, CorrectionTicket, Punch, TicketPayload, TicketState, format_clock,
};

/// Which heuristic flagged a punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suspicion {
    /// The entry is late enough to be an exit.
    LateEntry,
    /// The exit is early enough to be an entry.
    EarlyExit,
    /// The entry comes after the exit.
    EntryAfterExit,
}

impl Suspicion {
    /// Human-readable reason for an operator.
    pub fn reason(self, entry: NaiveTime, exit: NaiveTime) -> String {
        match self {
            Suspicion::LateEntry => format!(
                "Entry recorded at {} (entry too late, could be an exit)",
                format_clock(entry)
            ),
            Suspicion::EarlyExit => format!(
                "Exit recorded at {} (exit too early, could be an entry)",
                format_clock(exit)
            ),
            Suspicion::EntryAfterExit => format!(
                "Entry ({}) is after exit ({}), possible assignment error",
                format_clock(entry),
                format_clock(exit)
            ),
        }
    }
}

/// Returns the first heuristic that flags the pair, if any.
///
/// # Example
///
/// ```
/// use chrono::NaiveTime;
/// use payroll_engine::config::AmbiguityRules;
/// use payroll_engine::reconciliation::{Suspicion, classify_suspicion};
///
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let rules = AmbiguityRules::default();
///
/// assert_eq!(classify_suspicion(at(21, 30), at(22, 0), &rules), Some(Suspicion::LateEntry));
/// assert_eq!(classify_suspicion(at(8, 0), at(9, 30), &rules), Some(Suspicion::EarlyExit));
/// assert_eq!(classify_suspicion(at(15, 0), at(11, 0), &rules), Some(Suspicion::EntryAfterExit));
/// assert_eq!(classify_suspicion(at(11, 0), at(19, 0), &rules), None);
/// ```
pub fn classify_suspicion(
    entry: NaiveTime,
    exit: NaiveTime,
    rules: &AmbiguityRules,
) -> Option<Suspicion> {
    if entry >= rules.late_entry {
        Some(Suspicion::LateEntry)
    } else if exit <= rules.early_exit {
        Some(Suspicion::EarlyExit)
    } else if entry > exit {
        Some(Suspicion::EntryAfterExit)
    } else {
        None
    }
}

/// Raises an ambiguous ticket for every complete punch that a heuristic
/// flags.
///
/// Punches with an absent or unreadable side are skipped; the former are
/// handled as incomplete and the latter fail at calculation time.
pub fn detect_ambiguous(punches: &[Punch], rules: &AmbiguityRules) -> Vec<CorrectionTicket> {
    punches
        .iter()
        .filter_map(|punch| {
            let entry = punch.entry_time().ok()?;
            let exit = punch.exit_time().ok()?;
            let suspicion = classify_suspicion(entry, exit, rules)?;
            Some(CorrectionTicket {
                punch: punch.id,
                employee: punch.employee.clone(),
                date: punch.date,
                state: TicketState::Detected,
                payload: TicketPayload::Ambiguous(AmbiguousPayload {
                    original_entry: punch.entry.as_str().to_string(),
                    original_exit: punch.exit.as_str().to_string(),
                    reason: suspicion.reason(entry, exit),
                    swap_decision: false,
                }),
            })
        })
        .collect()
}
