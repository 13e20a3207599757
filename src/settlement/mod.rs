//! settlement calculator: late fees, damage and cleaning charges, deposit
//! allocation and the net balance.

pub mod damage;
pub mod late_fee;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SettlementConfig;
use crate::decimal::Money;
use crate::errors::{Result, SettlementError};
use crate::pricing;
use crate::returns::ReconciledLine;
use crate::state::RentalTransaction;

pub use damage::{assess_damage, DamageAssessment};
pub use late_fee::{calculate_late_fee, LateFeeCalculation};

/// financial outcome of a return. positive net balance is owed by the
/// customer; negative is a refund due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// rental fee for the whole transaction, owed regardless of condition
    pub rental_subtotal: Money,
    pub late_fee_total: Money,
    /// repair costs plus loss charges
    pub damage_cost_total: Money,
    /// repairable-damage component of `damage_cost_total`
    pub repair_cost_total: Money,
    /// deposit write-off component of `damage_cost_total`
    pub loss_charge_total: Money,
    pub cleaning_cost_total: Money,
    /// full deposit across all lines, held until the transaction completes
    pub deposit_held: Money,
    /// deposit remaining after damage and cleaning, floored at zero
    pub deposit_refund: Money,
    pub net_balance: Money,
}

impl SettlementResult {
    /// charges accumulated in this settlement, before deposit allocation
    pub fn total_charges(&self) -> Money {
        self.rental_subtotal + self.late_fee_total + self.damage_cost_total
            + self.cleaning_cost_total
    }
}

/// compute the settlement for an accepted return.
///
/// the rental subtotal and deposit cover every line of the transaction;
/// late fees and damage charges apply to the reconciled lines of this
/// call. intermediate sums stay exact; only the final net balance is
/// rounded, half-up, at the configured currency scale.
pub fn compute_settlement(
    transaction: &RentalTransaction,
    reconciled: &[ReconciledLine],
    as_of: DateTime<Utc>,
    config: &SettlementConfig,
) -> Result<SettlementResult> {
    let rental_subtotal: Money = transaction.lines.iter().map(pricing::line_subtotal).sum();
    let deposit_held = transaction.deposit_held();

    let mut late_fee_total = Money::ZERO;
    let mut repair_cost_total = Money::ZERO;
    let mut loss_charge_total = Money::ZERO;
    let mut cleaning_cost_total = Money::ZERO;

    for rec in reconciled {
        let line = transaction
            .line(rec.line_id)
            .ok_or(SettlementError::LineNotFound {
                line_id: rec.line_id,
            })?;

        let overdue = pricing::days_overdue(line, as_of);
        late_fee_total += calculate_late_fee(
            line,
            rec.returned_this_call,
            overdue,
            config.late_fee_multiplier,
        )
        .fee_amount;

        let assessment = assess_damage(line, rec, config);
        repair_cost_total += assessment.repair_cost;
        loss_charge_total += assessment.loss_charge;
        cleaning_cost_total += rec.cleaning_charge;
    }

    let damage_cost_total = repair_cost_total + loss_charge_total;
    let deposit_refund =
        (deposit_held - damage_cost_total - cleaning_cost_total).max(Money::ZERO);
    let net_balance = (rental_subtotal + late_fee_total + damage_cost_total
        + cleaning_cost_total
        - deposit_held)
        .round_half_up(config.currency_scale);

    Ok(SettlementResult {
        rental_subtotal,
        late_fee_total,
        damage_cost_total,
        repair_cost_total,
        loss_charge_total,
        cleaning_cost_total,
        deposit_held,
        deposit_refund,
        net_balance,
    })
}
