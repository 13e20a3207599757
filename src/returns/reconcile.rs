//! condition reconciler: validates a return declaration against a line's
//! rented and already-returned quantities and normalizes the breakdown.

use crate::config::SettlementConfig;
use crate::errors::{Result, SettlementError};
use crate::returns::{ReconciledLine, ReturnDeclaration};
use crate::state::RentalLine;

/// validate one declaration against its line.
///
/// checks run in order: a non-empty declaration, the over-return bound,
/// damage-detail coverage, then detail well-formedness. reconciliation of
/// each line in a request is independent; the orchestrator collects every
/// line's error before rejecting, so one bad line never hides another.
pub fn reconcile(
    line: &RentalLine,
    declaration: &ReturnDeclaration,
    config: &SettlementConfig,
) -> Result<ReconciledLine> {
    let declared = declaration.declared_total();
    if declared == 0 {
        return Err(SettlementError::EmptyReturn {
            line_id: declaration.line_id,
        });
    }

    let previously_returned = line.returned_total();
    let max_acceptable = line.quantity_rented.saturating_sub(previously_returned);
    if declared > max_acceptable {
        return Err(SettlementError::OverReturn {
            line_id: declaration.line_id,
            declared,
            max_acceptable,
        });
    }

    check_damage_coverage(declaration)?;

    for detail in &declaration.damage_details {
        if detail.quantity == 0 {
            return Err(SettlementError::InvalidDamageDetail {
                line_id: declaration.line_id,
                message: "detail quantity must be positive".to_string(),
            });
        }
        if detail.estimated_repair_cost.is_negative() {
            return Err(SettlementError::InvalidDamageDetail {
                line_id: declaration.line_id,
                message: format!(
                    "negative repair cost: {}",
                    detail.estimated_repair_cost
                ),
            });
        }
    }

    Ok(ReconciledLine {
        line_id: declaration.line_id,
        quantity_good: declaration.quantity_good,
        quantity_damaged: declaration.quantity_damaged,
        quantity_beyond_repair: declaration.quantity_beyond_repair,
        quantity_lost: declaration.quantity_lost,
        previously_returned,
        returned_this_call: declared,
        quantity_outstanding: line.quantity_rented - previously_returned - declared,
        damage_details: declaration.damage_details.clone(),
        cleaning_charge: declaration
            .cleaning_charge
            .unwrap_or(config.default_cleaning_charge),
    })
}

/// damage details must cover the declared damaged and beyond-repair
/// quantities exactly, partitioned by severity. a single combined total
/// would let one detail span both classes and double-count a unit as both
/// a repair cost and a deposit write-off.
fn check_damage_coverage(declaration: &ReturnDeclaration) -> Result<()> {
    let (mut repairable_covered, mut write_off_covered) = (0_u32, 0_u32);
    for detail in &declaration.damage_details {
        if detail.severity.is_repairable() {
            repairable_covered += detail.quantity;
        } else {
            write_off_covered += detail.quantity;
        }
    }

    if repairable_covered != declaration.quantity_damaged
        || write_off_covered != declaration.quantity_beyond_repair
    {
        return Err(SettlementError::DamageDetailMismatch {
            line_id: declaration.line_id,
            declared: declaration.quantity_damaged + declaration.quantity_beyond_repair,
            covered: repairable_covered + write_off_covered,
        });
    }

    Ok(())
}
