//! status transition engine.
//!
//! a deterministic state machine over closed enums: no string status
//! literals, every transition is an explicit match. a line may cycle
//! between active/extended/late and the partial-return states across
//! multiple return events until nothing is outstanding.

use crate::types::{LineStatus, TransactionStatus};

/// derive a line's next status after reconciliation.
///
/// `returned_this_call` is the unit count accepted in the current return;
/// zero means the line was not declared and is only being re-evaluated
/// for lateness.
pub fn next_line_status(
    current: LineStatus,
    returned_this_call: u32,
    quantity_outstanding: u32,
    days_overdue: u32,
) -> LineStatus {
    if returned_this_call > 0 {
        if quantity_outstanding == 0 {
            LineStatus::Returned
        } else if days_overdue > 0 {
            LineStatus::LatePartialReturn
        } else {
            LineStatus::PartialReturn
        }
    } else {
        // re-evaluation only: an overdue line that was running becomes late
        match current {
            LineStatus::Active | LineStatus::Extended if days_overdue > 0 => LineStatus::Late,
            other => other,
        }
    }
}

/// aggregate line statuses into a transaction status.
///
/// precedence (highest wins): late-partial > late > partial > extended >
/// active > pre-pickup states. the transaction completes if and only if
/// every line is returned, so an outstanding overdue line is never
/// reported as merely partial.
pub fn aggregate_status(line_statuses: &[LineStatus]) -> TransactionStatus {
    if line_statuses.is_empty() {
        return TransactionStatus::Reserved;
    }

    if line_statuses.iter().all(|s| *s == LineStatus::Returned) {
        return TransactionStatus::Completed;
    }

    let most_severe = line_statuses
        .iter()
        .max_by_key(|s| s.severity())
        .copied()
        .unwrap_or(LineStatus::Reserved);

    match most_severe {
        LineStatus::LatePartialReturn => TransactionStatus::LatePartialReturn,
        LineStatus::Late => TransactionStatus::Late,
        LineStatus::PartialReturn => TransactionStatus::PartialReturn,
        LineStatus::Extended => TransactionStatus::Extended,
        LineStatus::Active => TransactionStatus::Active,
        LineStatus::PickedUp => TransactionStatus::PickedUp,
        LineStatus::Confirmed => TransactionStatus::Confirmed,
        LineStatus::Reserved | LineStatus::Returned => TransactionStatus::Reserved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_return_is_terminal() {
        let next = next_line_status(LineStatus::Active, 2, 0, 0);
        assert_eq!(next, LineStatus::Returned);
    }

    #[test]
    fn test_full_return_late_still_terminal() {
        // fee applies, but the line still closes out
        let next = next_line_status(LineStatus::Late, 2, 0, 3);
        assert_eq!(next, LineStatus::Returned);
    }

    #[test]
    fn test_partial_return_on_time() {
        let next = next_line_status(LineStatus::Active, 1, 2, 0);
        assert_eq!(next, LineStatus::PartialReturn);
    }

    #[test]
    fn test_partial_return_overdue() {
        let next = next_line_status(LineStatus::Active, 1, 2, 4);
        assert_eq!(next, LineStatus::LatePartialReturn);
    }

    #[test]
    fn test_reevaluation_marks_running_line_late() {
        assert_eq!(
            next_line_status(LineStatus::Active, 0, 3, 1),
            LineStatus::Late
        );
        assert_eq!(
            next_line_status(LineStatus::Extended, 0, 3, 1),
            LineStatus::Late
        );
    }

    #[test]
    fn test_reevaluation_leaves_other_states_unchanged() {
        assert_eq!(
            next_line_status(LineStatus::Active, 0, 3, 0),
            LineStatus::Active
        );
        assert_eq!(
            next_line_status(LineStatus::PickedUp, 0, 3, 1),
            LineStatus::PickedUp
        );
        assert_eq!(
            next_line_status(LineStatus::PartialReturn, 0, 1, 2),
            LineStatus::PartialReturn
        );
    }

    #[test]
    fn test_line_cycles_across_return_events() {
        // partial -> late partial -> returned over three calls
        let s1 = next_line_status(LineStatus::Active, 1, 2, 0);
        assert_eq!(s1, LineStatus::PartialReturn);
        let s2 = next_line_status(s1, 1, 1, 2);
        assert_eq!(s2, LineStatus::LatePartialReturn);
        let s3 = next_line_status(s2, 1, 0, 5);
        assert_eq!(s3, LineStatus::Returned);
    }

    #[test]
    fn test_aggregate_completes_only_when_all_returned() {
        assert_eq!(
            aggregate_status(&[LineStatus::Returned, LineStatus::Returned]),
            TransactionStatus::Completed
        );
        assert_eq!(
            aggregate_status(&[LineStatus::Returned, LineStatus::Active]),
            TransactionStatus::Active
        );
    }

    #[test]
    fn test_aggregate_precedence() {
        assert_eq!(
            aggregate_status(&[
                LineStatus::PartialReturn,
                LineStatus::LatePartialReturn,
                LineStatus::Active,
            ]),
            TransactionStatus::LatePartialReturn
        );
        assert_eq!(
            aggregate_status(&[LineStatus::Late, LineStatus::PartialReturn]),
            TransactionStatus::Late
        );
        assert_eq!(
            aggregate_status(&[LineStatus::Extended, LineStatus::PartialReturn]),
            TransactionStatus::PartialReturn
        );
    }

    #[test]
    fn test_aggregate_empty_defaults_to_reserved() {
        assert_eq!(aggregate_status(&[]), TransactionStatus::Reserved);
    }
}
