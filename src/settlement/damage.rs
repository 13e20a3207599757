//! damage and write-off charges for one reconciled line.

use crate::config::SettlementConfig;
use crate::decimal::Money;
use crate::returns::ReconciledLine;
use crate::state::RentalLine;

/// damage charges for one line, repair costs and deposit write-offs kept
/// apart so the two are never silently merged
#[derive(Debug, Clone, PartialEq)]
pub struct DamageAssessment {
    /// estimated repair cost for repairable damaged units
    pub repair_cost: Money,
    /// write-off charge for beyond-repair and lost units
    pub loss_charge: Money,
    pub write_off_quantity: u32,
}

impl DamageAssessment {
    pub fn total(&self) -> Money {
        self.repair_cost + self.loss_charge
    }
}

/// price the damage on one reconciled line.
///
/// repairable details charge their estimated repair cost per unit.
/// beyond-repair and lost units consume the deposit per unit, capped at
/// the deposit held for those units; a configured replacement multiplier
/// additionally caps the per-unit charge at unit_rate x multiplier.
pub fn assess_damage(
    line: &RentalLine,
    reconciled: &ReconciledLine,
    config: &SettlementConfig,
) -> DamageAssessment {
    let repair_cost = reconciled
        .damage_details
        .iter()
        .filter(|d| d.severity.is_repairable())
        .map(|d| d.estimated_repair_cost * d.quantity)
        .sum();

    let write_off_quantity = reconciled.write_off_quantity();
    let per_unit_charge = match config.replacement_rate_multiplier {
        Some(multiplier) => {
            let replacement_value = line.unit_rate * multiplier;
            line.deposit_per_unit.min(replacement_value)
        }
        None => line.deposit_per_unit,
    };
    let loss_charge = (per_unit_charge * write_off_quantity)
        .min(line.deposit_per_unit * write_off_quantity);

    DamageAssessment {
        repair_cost,
        loss_charge,
        write_off_quantity,
    }
}
