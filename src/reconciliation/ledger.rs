//! The per-batch correction ledger and payroll gate.
//!
//! The ledger owns every [`CorrectionTicket`] of a batch. Operator
//! decisions are recorded against it by punch identity, and
//! [`CorrectionLedger::apply_to`] writes confirmed decisions back into the
//! working dataset. Payroll must not run while [`CorrectionLedger::gate`]
//! reports [`Gate::Blocked`].

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    ClockReading, ClockSide, CorrectionTicket, Punch, PunchId, TicketPayload, TicketState,
    format_clock, parse_clock,
};

/// Whether payroll may run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "punches", rename_all = "snake_case")]
pub enum Gate {
    /// No ticket is waiting for a decision.
    Open,
    /// These punches still need an operator decision.
    Blocked(Vec<PunchId>),
}

impl Gate {
    /// Returns true when payroll may run.
    pub fn is_open(&self) -> bool {
        matches!(self, Gate::Open)
    }
}

/// Tickets of one batch, at most one live ticket per punch.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::models::{ClockReading, ClockSide, Punch, PunchId};
/// use payroll_engine::reconciliation::{CorrectionLedger, Gate, detect_incomplete};
/// use rust_decimal::Decimal;
///
/// let mut punches = vec![Punch {
///     id: PunchId::source(0),
///     employee: "Ana".to_string(),
///     date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
///     entry: ClockReading::from_raw("10:45"),
///     exit: ClockReading::Absent,
///     inventory_deduction: Decimal::ZERO,
///     cash_deduction: Decimal::ZERO,
///     withdrawal: Decimal::ZERO,
/// }];
///
/// let mut ledger = CorrectionLedger::new();
/// ledger.open(detect_incomplete(&punches));
/// assert_eq!(ledger.gate(), Gate::Blocked(vec![PunchId::source(0)]));
///
/// ledger.complete_incomplete(PunchId::source(0), ClockSide::Entry, "19:30").unwrap();
/// assert!(ledger.gate().is_open());
///
/// let applied = ledger.apply_to(&mut punches);
/// assert_eq!(applied.len(), 1);
/// assert_eq!(punches[0].exit.as_str(), "19:30");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionLedger {
    tickets: Vec<CorrectionTicket>,
}

impl CorrectionLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds freshly detected tickets in the `Detected` state.
    ///
    /// A ticket for a punch that already has a live ticket is ignored.
    /// Returns the number of tickets added.
    pub fn open(&mut self, tickets: impl IntoIterator<Item = CorrectionTicket>) -> usize {
        let mut opened = 0;
        for mut ticket in tickets {
            if self.position(ticket.punch).is_some() {
                warn!(punch = %ticket.punch, "Punch already has a live ticket, ignoring new one");
                continue;
            }
            ticket.state = TicketState::Detected;
            self.tickets.push(ticket);
            opened += 1;
        }
        if opened > 0 {
            info!(opened, "Opened correction tickets");
        }
        opened
    }

    /// Moves `Detected` tickets to `AwaitingDecision` and returns every
    /// ticket still waiting for a decision.
    pub fn surface(&mut self) -> Vec<CorrectionTicket> {
        for ticket in &mut self.tickets {
            if ticket.state == TicketState::Detected {
                ticket.state = TicketState::AwaitingDecision;
            }
        }
        self.open_tickets()
    }

    /// Tickets still waiting for a decision, in ledger order.
    pub fn open_tickets(&self) -> Vec<CorrectionTicket> {
        self.tickets
            .iter()
            .filter(|t| t.state.is_open())
            .cloned()
            .collect()
    }

    /// Records the completion of an incomplete punch.
    ///
    /// `known_as` says what the recorded time really was; `missing_time`
    /// is the value for the other side. Both are committed together and
    /// the ticket becomes `Confirmed`. A later decision overwrites an
    /// earlier one until the ledger is applied.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCorrection`] if the punch has no live
    /// ticket, the ticket is not incomplete, or `missing_time` is not a
    /// valid clock time. Midnight is rejected too: `0:00` reads as absent.
    pub fn complete_incomplete(
        &mut self,
        punch: PunchId,
        known_as: ClockSide,
        missing_time: &str,
    ) -> EngineResult<()> {
        let time = parse_clock(missing_time).ok_or_else(|| {
            invalid(punch, format!("'{}' is not a valid time", missing_time.trim()))
        })?;
        let supplied = format_clock(time);
        // 0:00 is the absent marker and would be dropped on apply.
        if ClockReading::from_raw(&supplied).is_absent() {
            return Err(invalid(
                punch,
                format!("'{}' reads as an absent clock value", missing_time.trim()),
            ));
        }

        let ticket = self.live_ticket_mut(punch)?;
        match &mut ticket.payload {
            TicketPayload::Incomplete(payload) => {
                payload.chosen_classification = Some(known_as);
                payload.supplied_time = Some(supplied);
            }
            TicketPayload::Ambiguous(_) => {
                return Err(invalid(punch, "the punch is ambiguous, not incomplete"));
            }
        }
        ticket.state = TicketState::Confirmed;
        Ok(())
    }

    /// Confirms that an ambiguous punch should have entry and exit swapped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCorrection`] if the punch has no live
    /// ticket or the ticket is not ambiguous.
    pub fn confirm_swap(&mut self, punch: PunchId) -> EngineResult<()> {
        let ticket = self.live_ticket_mut(punch)?;
        match &mut ticket.payload {
            TicketPayload::Ambiguous(payload) => payload.swap_decision = true,
            TicketPayload::Incomplete(_) => {
                return Err(invalid(punch, "the punch is incomplete, not ambiguous"));
            }
        }
        ticket.state = TicketState::Confirmed;
        Ok(())
    }

    /// Keeps an ambiguous punch as recorded, dropping its ticket.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCorrection`] if the punch has no live
    /// ticket or the ticket is not ambiguous.
    pub fn keep_as_recorded(&mut self, punch: PunchId) -> EngineResult<CorrectionTicket> {
        let ticket = self.live_ticket_mut(punch)?;
        if !matches!(ticket.payload, TicketPayload::Ambiguous(_)) {
            return Err(invalid(punch, "only ambiguous punches can be kept as recorded"));
        }
        let index = self.position(punch).ok_or_else(|| unknown(punch))?;
        Ok(self.tickets.remove(index))
    }

    /// Reports whether payroll may run.
    pub fn gate(&self) -> Gate {
        let blocked: Vec<PunchId> = self
            .tickets
            .iter()
            .filter(|t| t.state.is_open())
            .map(|t| t.punch)
            .collect();
        if blocked.is_empty() {
            Gate::Open
        } else {
            Gate::Blocked(blocked)
        }
    }

    /// Writes every confirmed decision into `punches`, matching by
    /// identity.
    ///
    /// Applied tickets are marked `Applied`, removed from the ledger and
    /// returned. Tickets still waiting for a decision stay in place. A
    /// confirmed ticket whose punch is not in `punches` is dropped with a
    /// warning.
    pub fn apply_to(&mut self, punches: &mut [Punch]) -> Vec<CorrectionTicket> {
        let (confirmed, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tickets)
            .into_iter()
            .partition(|t| t.state == TicketState::Confirmed);
        self.tickets = pending;

        let mut applied = Vec::with_capacity(confirmed.len());
        for mut ticket in confirmed {
            let Some(punch) = punches.iter_mut().find(|p| p.id == ticket.punch) else {
                warn!(punch = %ticket.punch, "Confirmed ticket has no matching punch, dropping it");
                continue;
            };
            apply_decision(punch, &ticket.payload);
            ticket.state = TicketState::Applied;
            applied.push(ticket);
        }

        if !applied.is_empty() {
            info!(applied = applied.len(), "Applied operator corrections");
        }
        applied
    }

    /// Every live ticket, in ledger order.
    pub fn tickets(&self) -> &[CorrectionTicket] {
        &self.tickets
    }

    /// Number of live tickets.
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// Returns true when the ledger holds no ticket.
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    fn position(&self, punch: PunchId) -> Option<usize> {
        self.tickets.iter().position(|t| t.punch == punch)
    }

    fn live_ticket_mut(&mut self, punch: PunchId) -> EngineResult<&mut CorrectionTicket> {
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.punch == punch)
            .ok_or_else(|| unknown(punch))?;
        if ticket.state == TicketState::Applied {
            return Err(invalid(punch, "the correction was already applied"));
        }
        Ok(ticket)
    }
}

fn apply_decision(punch: &mut Punch, payload: &TicketPayload) {
    match payload {
        TicketPayload::Incomplete(payload) => {
            let (Some(known_as), Some(supplied)) =
                (payload.chosen_classification, payload.supplied_time.as_deref())
            else {
                return;
            };
            punch.set_reading(known_as, ClockReading::from_raw(&payload.known_time));
            punch.set_reading(known_as.opposite(), ClockReading::from_raw(supplied));
        }
        TicketPayload::Ambiguous(payload) => {
            if payload.swap_decision {
                std::mem::swap(&mut punch.entry, &mut punch.exit);
            }
        }
    }
}

fn invalid(punch: PunchId, message: impl Into<String>) -> EngineError {
    EngineError::InvalidCorrection {
        punch: punch.to_string(),
        message: message.into(),
    }
}

fn unknown(punch: PunchId) -> EngineError {
    invalid(punch, "no correction is pending for this punch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AmbiguityRules;
    use crate::reconciliation::{detect_ambiguous, detect_incomplete};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn make_punch(row: usize, entry: &str, exit: &str) -> Punch {
        Punch {
            id: PunchId::source(row),
            employee: "Ana".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            entry: ClockReading::from_raw(entry),
            exit: ClockReading::from_raw(exit),
            inventory_deduction: Decimal::ZERO,
            cash_deduction: Decimal::ZERO,
            withdrawal: Decimal::ZERO,
        }
    }

    fn ledger_for(punches: &[Punch]) -> CorrectionLedger {
        let mut ledger = CorrectionLedger::new();
        ledger.open(detect_incomplete(punches));
        ledger.open(detect_ambiguous(punches, &AmbiguityRules::default()));
        ledger
    }

    #[test]
    fn test_empty_ledger_gate_is_open() {
        assert_eq!(CorrectionLedger::new().gate(), Gate::Open);
    }

    /// LED-001: surfacing moves detected tickets to awaiting decision
    #[test]
    fn test_surface_transitions_to_awaiting_decision() {
        let punches = vec![make_punch(0, "10:45", ""), make_punch(1, "11:00", "19:00")];
        let mut ledger = ledger_for(&punches);

        let surfaced = ledger.surface();
        assert_eq!(surfaced.len(), 1);
        assert_eq!(surfaced[0].state, TicketState::AwaitingDecision);
        assert_eq!(ledger.gate(), Gate::Blocked(vec![PunchId::source(0)]));
    }

    /// LED-002: known time reclassified as the exit, entry supplied
    #[test]
    fn test_complete_with_known_time_as_exit() {
        let mut punches = vec![make_punch(0, "19:00", "")];
        let mut ledger = ledger_for(&punches);

        ledger
            .complete_incomplete(PunchId::source(0), ClockSide::Exit, "11:00")
            .unwrap();
        let applied = ledger.apply_to(&mut punches);

        assert_eq!(applied[0].state, TicketState::Applied);
        assert_eq!(punches[0].entry.as_str(), "11:00");
        assert_eq!(punches[0].exit.as_str(), "19:00");
        assert!(ledger.is_empty());
    }

    /// LED-003: an unparsable supplied time leaves the ticket open
    #[test]
    fn test_invalid_supplied_time_is_rejected() {
        let punches = vec![make_punch(0, "10:45", "")];
        let mut ledger = ledger_for(&punches);

        let err = ledger
            .complete_incomplete(PunchId::source(0), ClockSide::Entry, "25:99")
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCorrection { .. }));
        assert!(!ledger.gate().is_open());
    }

    /// LED-003b: midnight cannot be supplied because it reads as absent
    #[test]
    fn test_midnight_supplied_time_is_rejected() {
        let punches = vec![make_punch(0, "19:00", "")];
        let mut ledger = ledger_for(&punches);

        for midnight in ["00:00", "0:00", "00:00:30"] {
            let err = ledger
                .complete_incomplete(PunchId::source(0), ClockSide::Entry, midnight)
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidCorrection { .. }));
        }
        assert_eq!(ledger.gate(), Gate::Blocked(vec![PunchId::source(0)]));
    }

    /// LED-004: the supplied time is normalized to H:MM
    #[test]
    fn test_supplied_time_is_normalized() {
        let mut punches = vec![make_punch(0, "10:45", "")];
        let mut ledger = ledger_for(&punches);
        ledger
            .complete_incomplete(PunchId::source(0), ClockSide::Entry, "09:05:00")
            .unwrap();
        ledger.apply_to(&mut punches);
        assert_eq!(punches[0].exit.as_str(), "9:05");
    }

    /// LED-005: swap exchanges entry and exit on apply
    #[test]
    fn test_confirm_swap() {
        let mut punches = vec![make_punch(0, "21:30", "11:00")];
        let mut ledger = ledger_for(&punches);

        ledger.confirm_swap(PunchId::source(0)).unwrap();
        assert!(ledger.gate().is_open());
        ledger.apply_to(&mut punches);

        assert_eq!(punches[0].entry.as_str(), "11:00");
        assert_eq!(punches[0].exit.as_str(), "21:30");
    }

    /// LED-006: keep drops the ticket and leaves the punch untouched
    #[test]
    fn test_keep_as_recorded() {
        let mut punches = vec![make_punch(0, "21:30", "22:00")];
        let mut ledger = ledger_for(&punches);

        let kept = ledger.keep_as_recorded(PunchId::source(0)).unwrap();
        assert_eq!(kept.state, TicketState::Detected);
        assert!(ledger.is_empty());
        assert!(ledger.apply_to(&mut punches).is_empty());
        assert_eq!(punches[0].entry.as_str(), "21:30");
    }

    #[test]
    fn test_wrong_kind_decisions_are_rejected() {
        let punches = vec![make_punch(0, "10:45", ""), make_punch(1, "21:30", "22:00")];
        let mut ledger = ledger_for(&punches);

        assert!(ledger.confirm_swap(PunchId::source(0)).is_err());
        assert!(ledger.keep_as_recorded(PunchId::source(0)).is_err());
        assert!(
            ledger
                .complete_incomplete(PunchId::source(1), ClockSide::Entry, "12:00")
                .is_err()
        );
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_unknown_punch_is_rejected() {
        let mut ledger = CorrectionLedger::new();
        let err = ledger.confirm_swap(PunchId::source(9)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid correction for punch row 9: no correction is pending for this punch"
        );
    }

    #[test]
    fn test_later_decision_overwrites_earlier_one() {
        let mut punches = vec![make_punch(0, "10:45", "")];
        let mut ledger = ledger_for(&punches);
        ledger
            .complete_incomplete(PunchId::source(0), ClockSide::Entry, "18:00")
            .unwrap();
        ledger
            .complete_incomplete(PunchId::source(0), ClockSide::Entry, "19:00")
            .unwrap();
        ledger.apply_to(&mut punches);
        assert_eq!(punches[0].exit.as_str(), "19:00");
    }

    #[test]
    fn test_decision_after_apply_is_rejected() {
        let mut punches = vec![make_punch(0, "21:30", "11:00")];
        let mut ledger = ledger_for(&punches);
        ledger.confirm_swap(PunchId::source(0)).unwrap();
        ledger.apply_to(&mut punches);

        assert!(ledger.confirm_swap(PunchId::source(0)).is_err());
    }

    #[test]
    fn test_apply_leaves_open_tickets_in_place() {
        let mut punches = vec![make_punch(0, "10:45", ""), make_punch(1, "", "19:00")];
        let mut ledger = ledger_for(&punches);
        ledger
            .complete_incomplete(PunchId::source(0), ClockSide::Entry, "18:00")
            .unwrap();

        let applied = ledger.apply_to(&mut punches);
        assert_eq!(applied.len(), 1);
        assert_eq!(ledger.gate(), Gate::Blocked(vec![PunchId::source(1)]));
        assert!(punches[1].entry.is_absent());
    }

    #[test]
    fn test_one_live_ticket_per_punch() {
        let punches = vec![make_punch(0, "10:45", "")];
        let mut ledger = ledger_for(&punches);
        assert_eq!(ledger.open(detect_incomplete(&punches)), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_ledger_survives_serialization() {
        let punches = vec![make_punch(0, "10:45", ""), make_punch(1, "21:30", "22:00")];
        let mut ledger = ledger_for(&punches);
        ledger.confirm_swap(PunchId::source(1)).unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let back: CorrectionLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }
}
