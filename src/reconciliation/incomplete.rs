//! Detection of punches with exactly one clock value.

use crate::models::{CorrectionTicket, IncompletePayload, Punch, TicketPayload, TicketState};

/// Raises an incomplete ticket for every punch missing exactly one side.
///
/// The ticket records which side is absent and the recorded value of the
/// other side verbatim. Tickets are returned in input order.
pub fn detect_incomplete(punches: &[Punch]) -> Vec<CorrectionTicket> {
    punches
        .iter()
        .filter_map(|punch| {
            let missing = punch.missing_side()?;
            Some(CorrectionTicket {
                punch: punch.id,
                employee: punch.employee.clone(),
                date: punch.date,
                state: TicketState::Detected,
                payload: TicketPayload::Incomplete(IncompletePayload {
                    missing_field: missing,
                    known_time: punch.reading(missing.opposite()).as_str().to_string(),
                    chosen_classification: None,
                    supplied_time: None,
                }),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockReading, ClockSide, PunchId, TicketKind};
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

    /// INC-001: missing exit records the entry as the known time
    #[test]
    fn test_missing_exit() {
        let tickets = detect_incomplete(&[make_punch(4, "10:45", "nan")]);
        assert_eq!(tickets.len(), 1);
        let ticket = &tickets[0];
        assert_eq!(ticket.punch, PunchId::source(4));
        assert_eq!(ticket.kind(), TicketKind::Incomplete);
        assert_eq!(ticket.state, TicketState::Detected);
        match &ticket.payload {
            TicketPayload::Incomplete(payload) => {
                assert_eq!(payload.missing_field, ClockSide::Exit);
                assert_eq!(payload.known_time, "10:45");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    /// INC-002: missing entry records the exit verbatim
    #[test]
    fn test_missing_entry_keeps_text_verbatim() {
        let tickets = detect_incomplete(&[make_punch(0, "", "21:30:00")]);
        match &tickets[0].payload {
            TicketPayload::Incomplete(payload) => {
                assert_eq!(payload.missing_field, ClockSide::Entry);
                assert_eq!(payload.known_time, "21:30:00");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_complete_and_empty_punches_raise_nothing() {
        let tickets = detect_incomplete(&[make_punch(0, "11:00", "19:00"), make_punch(1, "", "")]);
        assert!(tickets.is_empty());
    }

    #[test]
    fn test_tickets_follow_input_order() {
        let tickets = detect_incomplete(&[
            make_punch(3, "", "19:00"),
            make_punch(1, "11:00", "19:00"),
            make_punch(2, "12:00", ""),
        ]);
        let rows: Vec<usize> = tickets.iter().map(|t| t.punch.row).collect();
        assert_eq!(rows, vec![3, 2]);
    }
}
