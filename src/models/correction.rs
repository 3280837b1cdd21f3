//! Correction ticket models.
//!
//! A [`CorrectionTicket`] is one unit of operator work: a punch that is
//! incomplete or whose entry/exit look inverted. Tickets move through
//! [`TicketState`] inside a [`CorrectionLedger`](crate::reconciliation::CorrectionLedger).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::punch::{ClockSide, PunchId};

/// The kind of problem a ticket tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    /// Exactly one of entry/exit is absent.
    Incomplete,
    /// Both are present but the assignment looks inverted.
    Ambiguous,
}

/// Lifecycle state of a ticket.
///
/// `Detected → AwaitingDecision → Confirmed → Applied`. Tickets in the
/// first two states block payroll computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    /// Produced by a detector, not yet shown to an operator.
    Detected,
    /// Shown to an operator, waiting for a decision.
    AwaitingDecision,
    /// The operator committed a decision.
    Confirmed,
    /// The decision was written back into the dataset.
    Applied,
}

impl TicketState {
    /// Returns true while the ticket still needs an operator decision.
    pub fn is_open(self) -> bool {
        matches!(self, TicketState::Detected | TicketState::AwaitingDecision)
    }
}

/// Details of an incomplete punch and the operator's completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompletePayload {
    /// The side that was absent on the sheet.
    pub missing_field: ClockSide,
    /// The value of the side that was present, verbatim.
    pub known_time: String,
    /// What the operator says the known time really was.
    #[serde(default)]
    pub chosen_classification: Option<ClockSide>,
    /// The time the operator supplied for the other side, as `H:MM`.
    #[serde(default)]
    pub supplied_time: Option<String>,
}

/// Details of a suspicious punch and the operator's swap decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousPayload {
    /// Entry text as recorded.
    pub original_entry: String,
    /// Exit text as recorded.
    pub original_exit: String,
    /// Why the punch was flagged.
    pub reason: String,
    /// Whether the operator chose to swap entry and exit.
    #[serde(default)]
    pub swap_decision: bool,
}

/// Kind-specific ticket data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TicketPayload {
    /// See [`IncompletePayload`].
    Incomplete(IncompletePayload),
    /// See [`AmbiguousPayload`].
    Ambiguous(AmbiguousPayload),
}

/// One flagged punch awaiting, or carrying, an operator decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionTicket {
    /// The punch the ticket is about.
    pub punch: PunchId,
    /// Employee of the punch, for display.
    pub employee: String,
    /// Date of the punch, for display.
    pub date: NaiveDate,
    /// Current lifecycle state.
    pub state: TicketState,
    /// Kind-specific data.
    pub payload: TicketPayload,
}

impl CorrectionTicket {
    /// The kind of problem this ticket tracks.
    pub fn kind(&self) -> TicketKind {
        match self.payload {
            TicketPayload::Incomplete(_) => TicketKind::Incomplete,
            TicketPayload::Ambiguous(_) => TicketKind::Ambiguous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ticket(payload: TicketPayload) -> CorrectionTicket {
        CorrectionTicket {
            punch: PunchId::source(7),
            employee: "Ana".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            state: TicketState::Detected,
            payload,
        }
    }

    #[test]
    fn test_open_states() {
        assert!(TicketState::Detected.is_open());
        assert!(TicketState::AwaitingDecision.is_open());
        assert!(!TicketState::Confirmed.is_open());
        assert!(!TicketState::Applied.is_open());
    }

    #[test]
    fn test_kind_follows_payload() {
        let incomplete = make_ticket(TicketPayload::Incomplete(IncompletePayload {
            missing_field: ClockSide::Exit,
            known_time: "10:45".to_string(),
            chosen_classification: None,
            supplied_time: None,
        }));
        assert_eq!(incomplete.kind(), TicketKind::Incomplete);

        let ambiguous = make_ticket(TicketPayload::Ambiguous(AmbiguousPayload {
            original_entry: "21:30".to_string(),
            original_exit: "22:00".to_string(),
            reason: "entry too late".to_string(),
            swap_decision: false,
        }));
        assert_eq!(ambiguous.kind(), TicketKind::Ambiguous);
    }

    #[test]
    fn test_ticket_json_shape() {
        let ticket = make_ticket(TicketPayload::Incomplete(IncompletePayload {
            missing_field: ClockSide::Entry,
            known_time: "18:00".to_string(),
            chosen_classification: None,
            supplied_time: None,
        }));
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["state"], "detected");
        assert_eq!(json["payload"]["kind"], "incomplete");
        assert_eq!(json["payload"]["missing_field"], "entry");
        assert_eq!(json["punch"]["row"], 7);

        let back: CorrectionTicket = serde_json::from_value(json).unwrap();
        assert_eq!(back, ticket);
    }
}
