//! return orchestrator: validates a request end-to-end, derives statuses
//! and settlement, and assembles an immutable result plus domain events.
//!
//! the engine performs no i/o and never mutates its inputs. callers must
//! serialize concurrent returns for the same transaction and persist the
//! result with an optimistic-concurrency check; two interleaved calls on
//! stale snapshots of one line could each pass the over-return bound and
//! jointly exceed the rented quantity.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::config::SettlementConfig;
use crate::decimal::Money;
use crate::errors::{RejectedReturn, SettlementError};
use crate::events::{Event, EventStore};
use crate::pricing;
use crate::returns::{reconcile, ReconciledLine, ReturnRequest};
use crate::settlement::{self, SettlementResult};
use crate::state::{RentalLine, RentalTransaction};
use crate::status::{aggregate_status, next_line_status};
use crate::types::{LineId, LineStatus, TransactionId, TransactionStatus};

/// the derived next state for one line. cumulative quantities are the new
/// totals for the caller to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOutcome {
    pub line_id: LineId,
    pub previous_status: LineStatus,
    pub new_status: LineStatus,
    pub quantity_returned_good: u32,
    pub quantity_returned_damaged: u32,
    pub quantity_returned_beyond_repair: u32,
    pub quantity_returned_lost: u32,
    pub returned_this_call: u32,
    pub quantity_outstanding: u32,
    pub days_overdue: u32,
    pub late_fee: Money,
    /// fully returned, but past due: the line closes out and the fee
    /// still applies
    pub returned_late: bool,
}

/// immutable output of an accepted return. the caller persists the new
/// statuses and quantities and dispatches the events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnResult {
    pub transaction_id: TransactionId,
    pub previous_status: TransactionStatus,
    pub new_status: TransactionStatus,
    pub updated_at: DateTime<Utc>,
    pub line_outcomes: Vec<LineOutcome>,
    pub settlement: SettlementResult,
    pub events: Vec<Event>,
}

/// entry point for the return pipeline
pub struct ReturnProcessor {
    config: SettlementConfig,
}

impl ReturnProcessor {
    pub fn new(config: SettlementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// process a return request against a freshly-loaded transaction
    /// snapshot at the explicit instant `as_of`.
    ///
    /// all-or-nothing: every declaration is reconciled and all validation
    /// errors are collected; any failure rejects the whole request with
    /// the full list and no state is derived. configuration and
    /// static-data violations are fatal and abort before reconciliation.
    pub fn process(
        &self,
        transaction: &RentalTransaction,
        request: &ReturnRequest,
        as_of: DateTime<Utc>,
    ) -> std::result::Result<ReturnResult, RejectedReturn> {
        self.config.validate().map_err(RejectedReturn::fatal)?;
        transaction.validate().map_err(RejectedReturn::fatal)?;

        let reconciled = self.reconcile_all(transaction, request)?;

        let settlement =
            settlement::compute_settlement(transaction, &reconciled, as_of, &self.config)
                .map_err(RejectedReturn::fatal)?;

        let mut events = EventStore::new();
        let mut line_outcomes = Vec::new();
        let mut new_statuses = Vec::with_capacity(transaction.lines.len());

        for line in &transaction.lines {
            let outcome = match reconciled.iter().find(|r| r.line_id == line.line_id) {
                Some(rec) => self.returned_line_outcome(transaction, line, rec, as_of, &mut events),
                None => self.reevaluated_line_outcome(line, as_of),
            };

            new_statuses.push(outcome.new_status);
            // undeclared lines appear only when re-evaluation moved them
            if outcome.returned_this_call > 0 || outcome.new_status != outcome.previous_status {
                line_outcomes.push(outcome);
            }
        }

        let new_status = aggregate_status(&new_statuses);

        events.emit(Event::TransactionSettled {
            transaction_id: transaction.transaction_id,
            old_status: transaction.status,
            new_status,
            rental_subtotal: settlement.rental_subtotal,
            late_fee_total: settlement.late_fee_total,
            damage_cost_total: settlement.damage_cost_total,
            cleaning_cost_total: settlement.cleaning_cost_total,
            deposit_held: settlement.deposit_held,
            deposit_refund: settlement.deposit_refund,
            net_balance: settlement.net_balance,
            timestamp: as_of,
        });

        Ok(ReturnResult {
            transaction_id: transaction.transaction_id,
            previous_status: transaction.status,
            new_status,
            updated_at: as_of,
            line_outcomes,
            settlement,
            events: events.take_events(),
        })
    }

    /// process with an injected time provider; delegates to [`process`]
    /// with `time.now()`.
    ///
    /// [`process`]: ReturnProcessor::process
    pub fn process_at(
        &self,
        transaction: &RentalTransaction,
        request: &ReturnRequest,
        time: &SafeTimeProvider,
    ) -> std::result::Result<ReturnResult, RejectedReturn> {
        self.process(transaction, request, time.now())
    }

    fn reconcile_all(
        &self,
        transaction: &RentalTransaction,
        request: &ReturnRequest,
    ) -> std::result::Result<Vec<ReconciledLine>, RejectedReturn> {
        let mut errors = Vec::new();
        let mut reconciled = Vec::with_capacity(request.declarations.len());
        let mut seen: HashSet<LineId> = HashSet::new();

        for declaration in &request.declarations {
            if !seen.insert(declaration.line_id) {
                errors.push(SettlementError::DuplicateDeclaration {
                    line_id: declaration.line_id,
                });
                continue;
            }

            let Some(line) = transaction.line(declaration.line_id) else {
                errors.push(SettlementError::LineNotFound {
                    line_id: declaration.line_id,
                });
                continue;
            };

            match reconcile(line, declaration, &self.config) {
                Ok(rec) => reconciled.push(rec),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(reconciled)
        } else {
            Err(RejectedReturn::new(errors))
        }
    }

    fn returned_line_outcome(
        &self,
        transaction: &RentalTransaction,
        line: &RentalLine,
        rec: &ReconciledLine,
        as_of: DateTime<Utc>,
        events: &mut EventStore,
    ) -> LineOutcome {
        let days_overdue = pricing::days_overdue(line, as_of);
        let new_status = next_line_status(
            line.status,
            rec.returned_this_call,
            rec.quantity_outstanding,
            days_overdue,
        );
        let fee = settlement::calculate_late_fee(
            line,
            rec.returned_this_call,
            days_overdue,
            self.config.late_fee_multiplier,
        );

        events.emit(Event::LineReturned {
            transaction_id: transaction.transaction_id,
            line_id: line.line_id,
            old_status: line.status,
            new_status,
            quantity_good: rec.quantity_good,
            quantity_damaged: rec.quantity_damaged,
            quantity_beyond_repair: rec.quantity_beyond_repair,
            quantity_lost: rec.quantity_lost,
            quantity_outstanding: rec.quantity_outstanding,
            days_overdue,
            timestamp: as_of,
        });

        if fee.fee_amount.is_positive() {
            events.emit(Event::LateFeeAssessed {
                transaction_id: transaction.transaction_id,
                line_id: line.line_id,
                fee_amount: fee.fee_amount,
                days_overdue,
                returned_quantity: rec.returned_this_call,
                timestamp: as_of,
            });
        }

        LineOutcome {
            line_id: line.line_id,
            previous_status: line.status,
            new_status,
            quantity_returned_good: line.quantity_returned_good + rec.quantity_good,
            quantity_returned_damaged: line.quantity_returned_damaged + rec.quantity_damaged,
            quantity_returned_beyond_repair: line.quantity_returned_beyond_repair
                + rec.quantity_beyond_repair,
            quantity_returned_lost: line.quantity_returned_lost + rec.quantity_lost,
            returned_this_call: rec.returned_this_call,
            quantity_outstanding: rec.quantity_outstanding,
            days_overdue,
            late_fee: fee.fee_amount,
            returned_late: rec.quantity_outstanding == 0 && days_overdue > 0,
        }
    }

    fn reevaluated_line_outcome(&self, line: &RentalLine, as_of: DateTime<Utc>) -> LineOutcome {
        let days_overdue = pricing::days_overdue(line, as_of);
        let new_status =
            next_line_status(line.status, 0, line.quantity_outstanding(), days_overdue);

        LineOutcome {
            line_id: line.line_id,
            previous_status: line.status,
            new_status,
            quantity_returned_good: line.quantity_returned_good,
            quantity_returned_damaged: line.quantity_returned_damaged,
            quantity_returned_beyond_repair: line.quantity_returned_beyond_repair,
            quantity_returned_lost: line.quantity_returned_lost,
            returned_this_call: 0,
            quantity_outstanding: line.quantity_outstanding(),
            days_overdue,
            late_fee: Money::ZERO,
            returned_late: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::{DamageDetail, ReturnDeclaration};
    use crate::types::{DamageSeverity, DamageType, PeriodUnit};
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn line(rate: i64, qty: u32, deposit: i64) -> RentalLine {
        let mut l = RentalLine::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            qty,
            Money::from_major(rate),
            3,
            PeriodUnit::Day,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(),
            Money::from_major(deposit),
        );
        l.status = LineStatus::Active;
        l
    }

    fn transaction(lines: Vec<RentalLine>) -> RentalTransaction {
        let mut txn = RentalTransaction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            lines,
        );
        txn.status = TransactionStatus::Active;
        txn
    }

    fn processor() -> ReturnProcessor {
        ReturnProcessor::new(SettlementConfig::standard())
    }

    fn on_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap()
    }

    fn three_days_late() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 10, 0, 0).unwrap()
    }

    fn damage_detail(severity: DamageSeverity, quantity: u32, cost: i64) -> DamageDetail {
        DamageDetail {
            damage_type: DamageType::Physical,
            severity,
            quantity,
            estimated_repair_cost: Money::from_major(cost),
            description: "scratched housing".to_string(),
        }
    }

    /// caller-side persistence of an accepted result, for multi-call tests
    fn apply(txn: &mut RentalTransaction, result: &ReturnResult) {
        for outcome in &result.line_outcomes {
            let line = txn
                .lines
                .iter_mut()
                .find(|l| l.line_id == outcome.line_id)
                .unwrap();
            line.quantity_returned_good = outcome.quantity_returned_good;
            line.quantity_returned_damaged = outcome.quantity_returned_damaged;
            line.quantity_returned_beyond_repair = outcome.quantity_returned_beyond_repair;
            line.quantity_returned_lost = outcome.quantity_returned_lost;
            line.status = outcome.new_status;
        }
        txn.status = result.new_status;
        txn.updated_at = result.updated_at;
    }

    #[test]
    fn test_full_on_time_return() {
        let l = line(500, 2, 0);
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let request = ReturnRequest::new(vec![ReturnDeclaration::good(id, 2)]);

        let result = processor().process(&txn, &request, on_time()).unwrap();

        assert_eq!(result.settlement.rental_subtotal, Money::from_major(3_000));
        assert_eq!(result.settlement.late_fee_total, Money::ZERO);
        assert_eq!(result.new_status, TransactionStatus::Completed);
        assert_eq!(result.line_outcomes[0].new_status, LineStatus::Returned);
        assert!(!result.line_outcomes[0].returned_late);
    }

    #[test]
    fn test_full_late_return_charges_fee_and_completes() {
        let l = line(500, 2, 0);
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let request = ReturnRequest::new(vec![ReturnDeclaration::good(id, 2)]);

        let result = processor()
            .process(&txn, &request, three_days_late())
            .unwrap();

        // 3 days x 500 x 1.5 x 2 units
        assert_eq!(result.settlement.late_fee_total, Money::from_major(4_500));
        assert_eq!(result.new_status, TransactionStatus::Completed);
        let outcome = &result.line_outcomes[0];
        assert_eq!(outcome.new_status, LineStatus::Returned);
        assert!(outcome.returned_late);
        assert_eq!(outcome.days_overdue, 3);
    }

    #[test]
    fn test_partial_return_with_damage() {
        let l = line(500, 3, 0);
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let request = ReturnRequest::new(vec![ReturnDeclaration {
            quantity_damaged: 1,
            damage_details: vec![damage_detail(DamageSeverity::Moderate, 1, 200)],
            ..ReturnDeclaration::good(id, 1)
        }]);

        let result = processor().process(&txn, &request, on_time()).unwrap();

        let outcome = &result.line_outcomes[0];
        assert_eq!(outcome.quantity_outstanding, 1);
        assert_eq!(outcome.new_status, LineStatus::PartialReturn);
        assert_eq!(result.new_status, TransactionStatus::PartialReturn);
        assert_eq!(result.settlement.damage_cost_total, Money::from_major(200));
        assert_eq!(result.settlement.repair_cost_total, Money::from_major(200));
    }

    #[test]
    fn test_damage_detail_mismatch_rejects() {
        let l = line(500, 3, 0);
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let request = ReturnRequest::new(vec![ReturnDeclaration {
            quantity_damaged: 2,
            damage_details: vec![damage_detail(DamageSeverity::Moderate, 1, 200)],
            ..ReturnDeclaration::good(id, 0)
        }]);

        let rejection = processor().process(&txn, &request, on_time()).unwrap_err();
        assert!(!rejection.is_fatal());
        assert!(matches!(
            rejection.errors[0],
            SettlementError::DamageDetailMismatch {
                declared: 2,
                covered: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_over_return_rejects_with_maximum_and_mutates_nothing() {
        let mut l = line(500, 3, 0);
        l.quantity_returned_good = 2;
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let snapshot = txn.clone();
        let request = ReturnRequest::new(vec![ReturnDeclaration::good(id, 2)]);

        let rejection = processor().process(&txn, &request, on_time()).unwrap_err();
        assert!(matches!(
            rejection.errors[0],
            SettlementError::OverReturn {
                max_acceptable: 1,
                ..
            }
        ));
        assert_eq!(txn, snapshot);
    }

    #[test]
    fn test_deposit_shortfall_becomes_balance_due() {
        // deposit 2000 x 2 held, damage 4500: refund floors at zero and
        // the uncovered 500 plus rental lands in the balance
        let l = line(500, 2, 2_000);
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let request = ReturnRequest::new(vec![ReturnDeclaration {
            quantity_damaged: 2,
            damage_details: vec![damage_detail(DamageSeverity::Severe, 2, 2_250)],
            ..ReturnDeclaration::good(id, 0)
        }]);

        let result = processor().process(&txn, &request, on_time()).unwrap();
        let s = &result.settlement;
        assert_eq!(s.deposit_held, Money::from_major(4_000));
        assert_eq!(s.deposit_refund, Money::ZERO);
        // 3000 rental + 4500 damage - 4000 deposit
        assert_eq!(s.net_balance, Money::from_major(3_500));
    }

    #[test]
    fn test_atomicity_one_bad_line_rejects_all() {
        let l1 = line(500, 2, 0);
        let l2 = line(300, 1, 0);
        let (id1, id2) = (l1.line_id, l2.line_id);
        let txn = transaction(vec![l1, l2]);
        let snapshot = txn.clone();

        let request = ReturnRequest::new(vec![
            ReturnDeclaration::good(id1, 1),
            ReturnDeclaration::good(id2, 5), // over-return
        ]);

        let rejection = processor().process(&txn, &request, on_time()).unwrap_err();
        assert_eq!(rejection.errors.len(), 1);
        assert_eq!(txn, snapshot);
    }

    #[test]
    fn test_all_line_errors_collected() {
        let l = line(500, 2, 0);
        let id = l.line_id;
        let txn = transaction(vec![l]);

        let request = ReturnRequest::new(vec![
            ReturnDeclaration::good(Uuid::new_v4(), 1), // unknown line
            ReturnDeclaration::good(id, 0),             // empty
            ReturnDeclaration::good(id, 5),             // duplicate of line id
        ]);

        let rejection = processor().process(&txn, &request, on_time()).unwrap_err();
        assert_eq!(rejection.errors.len(), 3);
        assert!(matches!(
            rejection.errors[0],
            SettlementError::LineNotFound { .. }
        ));
        assert!(matches!(
            rejection.errors[1],
            SettlementError::EmptyReturn { .. }
        ));
        assert!(matches!(
            rejection.errors[2],
            SettlementError::DuplicateDeclaration { .. }
        ));
    }

    #[test]
    fn test_invalid_config_is_fatal_before_reconciliation() {
        let l = line(500, 2, 0);
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let request = ReturnRequest::new(vec![ReturnDeclaration::good(id, 5)]);

        let bad = ReturnProcessor::new(SettlementConfig {
            late_fee_multiplier: dec!(-1),
            ..SettlementConfig::standard()
        });

        let rejection = bad.process(&txn, &request, on_time()).unwrap_err();
        assert!(rejection.is_fatal());
        // the over-return was never inspected
        assert_eq!(rejection.errors.len(), 1);
    }

    #[test]
    fn test_undeclared_overdue_line_goes_late() {
        let l1 = line(500, 2, 0);
        let l2 = line(300, 1, 0);
        let id1 = l1.line_id;
        let id2 = l2.line_id;
        let txn = transaction(vec![l1, l2]);
        let request = ReturnRequest::new(vec![ReturnDeclaration::good(id1, 2)]);

        let result = processor()
            .process(&txn, &request, three_days_late())
            .unwrap();

        let late_line = result
            .line_outcomes
            .iter()
            .find(|o| o.line_id == id2)
            .unwrap();
        assert_eq!(late_line.new_status, LineStatus::Late);
        assert_eq!(late_line.returned_this_call, 0);
        assert_eq!(late_line.late_fee, Money::ZERO);
        // the overdue open line dominates the returned one
        assert_eq!(result.new_status, TransactionStatus::Late);
    }

    #[test]
    fn test_events_reconstruct_the_decision() {
        let l = line(500, 2, 0);
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let request = ReturnRequest::new(vec![ReturnDeclaration::good(id, 2)]);

        let result = processor()
            .process(&txn, &request, three_days_late())
            .unwrap();

        assert_eq!(result.events.len(), 3);
        assert!(matches!(
            result.events[0],
            Event::LineReturned {
                old_status: LineStatus::Active,
                new_status: LineStatus::Returned,
                quantity_good: 2,
                days_overdue: 3,
                ..
            }
        ));
        assert!(matches!(
            result.events[1],
            Event::LateFeeAssessed { fee_amount, .. } if fee_amount == Money::from_major(4_500)
        ));
        assert!(matches!(
            result.events[2],
            Event::TransactionSettled {
                new_status: TransactionStatus::Completed,
                ..
            }
        ));
    }

    #[test]
    fn test_monotonicity_across_sequential_returns() {
        let l = line(500, 3, 0);
        let id = l.line_id;
        let mut txn = transaction(vec![l]);
        let p = processor();

        let mut outstanding = txn.lines[0].quantity_outstanding();
        for (qty, as_of) in [
            (1, on_time()),
            (1, three_days_late()),
            (1, Utc.with_ymd_and_hms(2024, 3, 9, 9, 0, 0).unwrap()),
        ] {
            let request = ReturnRequest::new(vec![ReturnDeclaration::good(id, qty)]);
            let result = p.process(&txn, &request, as_of).unwrap();
            apply(&mut txn, &result);

            let next = txn.lines[0].quantity_outstanding();
            assert!(next < outstanding);
            outstanding = next;
            assert!(txn.lines[0].returned_total() <= txn.lines[0].quantity_rented);
        }

        assert_eq!(outstanding, 0);
        assert_eq!(txn.status, TransactionStatus::Completed);
        assert_eq!(txn.lines[0].status, LineStatus::Returned);
    }

    #[test]
    fn test_partial_then_late_partial_cycle() {
        let l = line(500, 3, 0);
        let id = l.line_id;
        let mut txn = transaction(vec![l]);
        let p = processor();

        let first = p
            .process(
                &txn,
                &ReturnRequest::new(vec![ReturnDeclaration::good(id, 1)]),
                on_time(),
            )
            .unwrap();
        assert_eq!(first.new_status, TransactionStatus::PartialReturn);
        apply(&mut txn, &first);

        let second = p
            .process(
                &txn,
                &ReturnRequest::new(vec![ReturnDeclaration::good(id, 1)]),
                three_days_late(),
            )
            .unwrap();
        assert_eq!(second.new_status, TransactionStatus::LatePartialReturn);
        assert_eq!(
            second.line_outcomes[0].new_status,
            LineStatus::LatePartialReturn
        );
    }

    #[test]
    fn test_lost_units_consume_deposit() {
        let l = line(500, 2, 2_000);
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let request = ReturnRequest::new(vec![ReturnDeclaration {
            quantity_lost: 1,
            ..ReturnDeclaration::good(id, 1)
        }]);

        let result = processor().process(&txn, &request, on_time()).unwrap();
        assert_eq!(
            result.settlement.loss_charge_total,
            Money::from_major(2_000)
        );
        assert_eq!(result.settlement.deposit_refund, Money::from_major(2_000));
        assert_eq!(result.new_status, TransactionStatus::Completed);
    }

    #[test]
    fn test_balance_identity_on_mixed_return() {
        let l1 = line(333, 3, 1_000);
        let l2 = line(75, 2, 250);
        let (id1, id2) = (l1.line_id, l2.line_id);
        let txn = transaction(vec![l1, l2]);
        let request = ReturnRequest::new(vec![
            ReturnDeclaration {
                quantity_damaged: 1,
                damage_details: vec![damage_detail(DamageSeverity::Minor, 1, 42)],
                cleaning_charge: Some(Money::from_major(15)),
                ..ReturnDeclaration::good(id1, 1)
            },
            ReturnDeclaration::good(id2, 2),
        ]);

        let result = processor()
            .process(&txn, &request, three_days_late())
            .unwrap();
        let s = &result.settlement;
        assert_eq!(s.net_balance, s.total_charges() - s.deposit_held);
    }

    #[test]
    fn test_process_at_uses_injected_time() {
        let l = line(500, 2, 0);
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let request = ReturnRequest::new(vec![ReturnDeclaration::good(id, 2)]);

        let time = SafeTimeProvider::new(TimeSource::Test(three_days_late()));
        let result = processor().process_at(&txn, &request, &time).unwrap();
        assert_eq!(result.settlement.late_fee_total, Money::from_major(4_500));
        assert_eq!(result.updated_at, three_days_late());
    }

    #[test]
    fn test_result_serializes_for_audit() {
        let l = line(500, 2, 0);
        let id = l.line_id;
        let txn = transaction(vec![l]);
        let request = ReturnRequest::new(vec![ReturnDeclaration::good(id, 2)]);

        let result = processor().process(&txn, &request, on_time()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: ReturnResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
